use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::{
    app::UIConfig,
    backend::{BackendStatus, EmailBackend},
    workflow::{Notification, NotificationLevel, Step, WorkflowController},
};

/// One line of user input, interpreted for the current step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardInput {
    Quit,
    Reset,
    Health,
    ShowSession,
    Help,
    /// Topic, feedback, or recipient depending on the step
    Submit(String),
}

/// Parse a line; `:`-prefixed words are commands at every step
pub fn parse_input(line: &str) -> WizardInput {
    let trimmed = line.trim();
    match trimmed {
        ":q" | ":quit" | ":exit" => WizardInput::Quit,
        ":r" | ":reset" | ":new" => WizardInput::Reset,
        ":health" => WizardInput::Health,
        ":session" => WizardInput::ShowSession,
        ":h" | ":help" | "?" => WizardInput::Help,
        _ => WizardInput::Submit(line.to_string()),
    }
}

/// Line-oriented front end for the workflow controller
pub struct Wizard {
    controller: WorkflowController,
    ui: UIConfig,
}

impl Wizard {
    pub fn new(backend: Arc<dyn EmailBackend>, ui: UIConfig) -> Self {
        Self {
            controller: WorkflowController::new(backend),
            ui,
        }
    }

    pub fn controller(&self) -> &WorkflowController {
        &self.controller
    }

    /// Run against the real terminal
    pub async fn run(&mut self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout();
        self.run_with(stdin, &mut stdout).await
    }

    /// Run the prompt loop until `:quit` or end of input
    pub async fn run_with<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();

        writeln!(out, "{}", "mailwizard - AI email generator".bold())?;
        writeln!(out, "Type :help for commands.")?;
        self.controller.check_health().await;
        self.flush_notifications(out)?;

        loop {
            self.render(out)?;
            write!(out, "{} ", self.prompt().cyan())?;
            out.flush()?;

            let line = match lines.next_line().await? {
                Some(line) => line,
                None => break,
            };

            match parse_input(&line) {
                WizardInput::Quit => break,
                WizardInput::Reset => self.controller.reset(),
                WizardInput::Health => {
                    self.controller.check_health().await;
                }
                WizardInput::Help => self.print_help(out)?,
                WizardInput::ShowSession => self.show_session(out).await?,
                WizardInput::Submit(text) => self.submit(text, out).await?,
            }

            self.flush_notifications(out)?;
        }

        writeln!(out, "Bye!")?;
        Ok(())
    }

    async fn submit<W: Write>(&mut self, text: String, out: &mut W) -> Result<()> {
        let result = match self.controller.step() {
            Step::Topic => {
                if !self.controller.can_submit_topic() {
                    writeln!(
                        out,
                        "{}",
                        "Backend is offline; generation is disabled. Type :health to retry."
                            .yellow()
                    )?;
                    return Ok(());
                }
                writeln!(out, "Generating...")?;
                self.controller.submit_topic(&text).await
            }
            Step::Draft => {
                self.controller.set_feedback_input(text.clone());
                if text.trim().is_empty() {
                    writeln!(out, "Finalizing...")?;
                } else {
                    writeln!(out, "Updating...")?;
                }
                self.controller.submit_feedback(&text).await
            }
            Step::Final => {
                writeln!(out, "Sending...")?;
                self.controller.send_email(&text).await
            }
            Step::Sent => {
                self.controller.reset();
                Ok(())
            }
        };

        // Errors already reached the user as notifications
        if let Err(e) = result {
            debug!("Action failed: {:?}", e);
        }
        Ok(())
    }

    async fn show_session<W: Write>(&mut self, out: &mut W) -> Result<()> {
        match self.controller.refresh_session().await {
            Ok(snapshot) => {
                writeln!(out, "Session {}", snapshot.session_id.bold())?;
                writeln!(out, "  Topic: {}", snapshot.topic)?;
                if let Some(created_at) = &snapshot.created_at {
                    writeln!(out, "  Created: {}", created_at)?;
                }
                writeln!(out, "  Feedback entries: {}", snapshot.feedback_history.len())?;
                if !snapshot.receiver_mail.is_empty() {
                    writeln!(out, "  Sent to: {}", snapshot.receiver_mail)?;
                }
            }
            Err(e) => debug!("Session fetch failed: {:?}", e),
        }
        Ok(())
    }

    fn prompt(&self) -> &'static str {
        match self.controller.step() {
            Step::Topic => "Email topic >",
            Step::Draft => "Feedback (blank to finalize) >",
            Step::Final => "Recipient email >",
            Step::Sent => "Press Enter to create another email >",
        }
    }

    fn render<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", self.status_line())?;
        if self.ui.show_step_indicator {
            writeln!(out, "{}", step_indicator(self.controller.step()))?;
        }

        let session = self.controller.session();
        match session.step() {
            Step::Topic => {
                writeln!(out, "{}", "Generate Email".bold())?;
                writeln!(out, "What email would you like to create?")?;
            }
            Step::Draft => {
                writeln!(out, "{}", "Refine Email".bold())?;
                write_block(out, session.content())?;
                if !session.feedback_history().is_empty() {
                    writeln!(out, "Feedback applied:")?;
                    for (i, feedback) in session.feedback_history().iter().enumerate() {
                        writeln!(out, "  {}. {}", i + 1, feedback)?;
                    }
                }
            }
            Step::Final => {
                writeln!(out, "{}", "Email Ready!".bold().green())?;
                write_block(out, session.final_content().unwrap_or_default())?;
                writeln!(out, "Enter a recipient to send, or :reset to start over.")?;
            }
            Step::Sent => {
                writeln!(out, "{}", "Email Sent Successfully!".bold().green())?;
            }
        }
        Ok(())
    }

    fn status_line(&self) -> String {
        let status = self.controller.backend_status();
        match status {
            BackendStatus::Online => format!("● {}", status.label()).green().to_string(),
            BackendStatus::Offline => format!("● {}", status.label()).red().to_string(),
            BackendStatus::Checking => format!("● {}", status.label()).yellow().to_string(),
        }
    }

    fn print_help<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Commands:")?;
        writeln!(out, "  :reset    start over with a new email")?;
        writeln!(out, "  :session  show the backend's record of this session")?;
        writeln!(out, "  :health   check the backend connection again")?;
        writeln!(out, "  :quit     exit")?;
        Ok(())
    }

    fn flush_notifications<W: Write>(&mut self, out: &mut W) -> Result<()> {
        for notification in self.controller.take_notifications() {
            writeln!(out, "{}", format_notification(&notification))?;
        }
        Ok(())
    }
}

/// `[✓ Generate] > [2 Refine] > 3 Finalize > 4 Send`
pub fn step_indicator(current: Step) -> String {
    Step::ALL
        .iter()
        .map(|step| {
            if *step < current {
                format!("[✓ {}]", step.name()).green().to_string()
            } else if *step == current {
                format!("[{} {}]", step.number(), step.name())
                    .bold()
                    .to_string()
            } else {
                format!("{} {}", step.number(), step.name()).dimmed().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

fn format_notification(notification: &Notification) -> String {
    match notification.level {
        NotificationLevel::Success => format!("✔ {}", notification.message).green().to_string(),
        NotificationLevel::Info => format!("ℹ {}", notification.message).blue().to_string(),
        NotificationLevel::Error => format!("✖ {}", notification.message).red().to_string(),
    }
}

fn write_block<W: Write>(out: &mut W, text: &str) -> Result<()> {
    writeln!(out, "{}", "-".repeat(60).dimmed())?;
    writeln!(out, "{}", text)?;
    writeln!(out, "{}", "-".repeat(60).dimmed())?;
    Ok(())
}
