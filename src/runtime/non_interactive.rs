use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::{
    backend::{BackendStatus, EmailBackend},
    cli::OutputFormat,
    utils::WizardError,
    workflow::{Step, WorkflowController},
};

/// What a one-shot run should do
#[derive(Debug, Clone, Default)]
pub struct RunPlan {
    pub topic: String,
    /// Applied in order; blank entries are skipped
    pub feedback: Vec<String>,
    pub send_to: Option<String>,
}

/// Result of a non-interactive run
#[derive(Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub topic: String,
    /// Step the workflow reached
    pub step: Step,
    pub session_id: Option<String>,
    /// Last generated draft
    pub draft: String,
    pub feedback_history: Vec<String>,
    pub final_content: Option<String>,
    pub sent_to: Option<String>,
    /// Notifications raised along the way, in order
    pub messages: Vec<String>,
    /// Any errors that occurred
    pub errors: Vec<String>,
    pub metadata: RunMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunMetadata {
    pub backend_url: String,
    pub duration_ms: u128,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Non-interactive runner: topic -> feedback* -> finalize -> send?
pub struct NonInteractiveRunner {
    controller: WorkflowController,
    backend_url: String,
}

impl NonInteractiveRunner {
    pub fn new(backend: Arc<dyn EmailBackend>, backend_url: impl Into<String>) -> Self {
        Self {
            controller: WorkflowController::new(backend),
            backend_url: backend_url.into(),
        }
    }

    /// Walk the whole workflow once, stopping at the first failure
    pub async fn execute(&mut self, plan: RunPlan) -> RunReport {
        let start_time = Instant::now();
        let mut errors = Vec::new();
        let mut sent_to = None;

        if let Err(e) = self.walk(&plan, &mut sent_to).await {
            errors.push(e.to_string());
        }

        let messages = self
            .controller
            .take_notifications()
            .into_iter()
            .filter(|n| !n.is_error())
            .map(|n| n.message)
            .collect();

        let session = self.controller.session();
        RunReport {
            topic: plan.topic,
            step: session.step(),
            session_id: session.id().map(str::to_string),
            draft: session.content().to_string(),
            feedback_history: session.feedback_history().to_vec(),
            final_content: session.final_content().map(str::to_string),
            sent_to,
            messages,
            errors,
            metadata: RunMetadata {
                backend_url: self.backend_url.clone(),
                duration_ms: start_time.elapsed().as_millis(),
            },
        }
    }

    async fn walk(
        &mut self,
        plan: &RunPlan,
        sent_to: &mut Option<String>,
    ) -> Result<(), WizardError> {
        if self.controller.check_health().await == BackendStatus::Offline {
            return Err(WizardError::Offline);
        }

        self.controller.submit_topic(&plan.topic).await?;

        for feedback in plan.feedback.iter().filter(|f| !f.trim().is_empty()) {
            self.controller.submit_feedback(feedback).await?;
        }

        self.controller.finalize().await?;

        if let Some(recipient) = &plan.send_to {
            self.controller.send_email(recipient).await?;
            *sent_to = Some(recipient.trim().to_string());
        }

        Ok(())
    }

    /// Format the report according to the output format
    pub fn format_result(&self, report: &RunReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_else(|e| {
                format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)
            }),
            OutputFormat::Text => {
                let mut output = String::new();

                match &report.final_content {
                    Some(content) => output.push_str(content),
                    None => output.push_str(&report.draft),
                }

                if !report.feedback_history.is_empty() {
                    output.push_str("\n\n--- Feedback applied ---\n");
                    for (i, feedback) in report.feedback_history.iter().enumerate() {
                        output.push_str(&format!("{}. {}\n", i + 1, feedback));
                    }
                }

                output.push_str(&format!(
                    "\n--- Step {} of 4: {} ---\n",
                    report.step.number(),
                    report.step.name()
                ));
                if let Some(recipient) = &report.sent_to {
                    output.push_str(&format!("Sent to {}\n", recipient));
                }

                if !report.errors.is_empty() {
                    output.push_str("\n--- Errors ---\n");
                    for error in &report.errors {
                        output.push_str(&format!("- {}\n", error));
                    }
                }

                output
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        ApiError, FeedbackResponse, FinalizeResponse, GenerateResponse, MockEmailBackend,
        SendEmailResponse,
    };
    use pretty_assertions::assert_eq;

    fn healthy_backend() -> MockEmailBackend {
        let mut backend = MockEmailBackend::new();
        backend.expect_probe().returning(|_| Ok(()));
        backend.expect_generate().returning(|_| {
            Ok(GenerateResponse {
                success: true,
                session_id: "abc123".to_string(),
                content: "Dear team,...".to_string(),
            })
        });
        backend.expect_feedback().returning(|_, feedback| {
            Ok(FeedbackResponse {
                success: true,
                content: format!("Dear team ({}),...", feedback),
                feedback_history: vec![feedback.to_string()],
            })
        });
        backend.expect_finalize().returning(|_| {
            Ok(FinalizeResponse {
                success: true,
                final_content: "Final: Dear team,...".to_string(),
            })
        });
        backend
    }

    fn plan() -> RunPlan {
        RunPlan {
            topic: "Meeting invitation for project kickoff".to_string(),
            feedback: vec!["Make it more formal".to_string(), "  ".to_string()],
            send_to: None,
        }
    }

    #[tokio::test]
    async fn test_run_to_final() {
        let mut runner = NonInteractiveRunner::new(Arc::new(healthy_backend()), "http://test");
        let report = runner.execute(plan()).await;

        assert!(report.succeeded(), "{:?}", report.errors);
        assert_eq!(report.step, Step::Final);
        assert_eq!(report.session_id.as_deref(), Some("abc123"));
        assert_eq!(report.feedback_history, vec!["Make it more formal"]);
        assert_eq!(report.final_content.as_deref(), Some("Final: Dear team,..."));
        assert_eq!(report.sent_to, None);
    }

    #[tokio::test]
    async fn test_run_with_send() {
        let mut backend = healthy_backend();
        backend
            .expect_send_email()
            .withf(|id, email| id == "abc123" && email == "a@b.com")
            .times(1)
            .returning(|_, _| {
                Ok(SendEmailResponse {
                    success: true,
                    message: None,
                })
            });
        let mut runner = NonInteractiveRunner::new(Arc::new(backend), "http://test");

        let report = runner
            .execute(RunPlan {
                send_to: Some(" a@b.com ".to_string()),
                ..plan()
            })
            .await;

        assert_eq!(report.step, Step::Sent);
        assert_eq!(report.sent_to.as_deref(), Some("a@b.com"));
        assert!(report
            .messages
            .contains(&"Email sent successfully!".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_recipient_stops_at_final() {
        let mut runner = NonInteractiveRunner::new(Arc::new(healthy_backend()), "http://test");

        let report = runner
            .execute(RunPlan {
                send_to: Some("not-an-address".to_string()),
                ..plan()
            })
            .await;

        assert_eq!(report.step, Step::Final);
        assert_eq!(report.errors, vec!["Please enter a valid email address"]);
    }

    #[tokio::test]
    async fn test_offline_backend_aborts_before_generating() {
        let mut backend = MockEmailBackend::new();
        backend.expect_probe().times(2).returning(|_| {
            Err(ApiError::Backend {
                status: 503,
                message: None,
            })
        });
        let mut runner = NonInteractiveRunner::new(Arc::new(backend), "http://test");

        let report = runner.execute(plan()).await;
        assert_eq!(report.step, Step::Topic);
        assert!(!report.succeeded());
    }

    #[tokio::test]
    async fn test_text_and_json_formats() {
        let mut runner = NonInteractiveRunner::new(Arc::new(healthy_backend()), "http://test");
        let report = runner.execute(plan()).await;

        let text = runner.format_result(&report, OutputFormat::Text);
        assert!(text.starts_with("Final: Dear team,..."));
        assert!(text.contains("1. Make it more formal"));
        assert!(text.contains("Step 3 of 4: Finalize"));

        let json = runner.format_result(&report, OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["step"], "Final");
        assert_eq!(parsed["metadata"]["backend_url"], "http://test");
    }
}
