use std::sync::Arc;
use tracing::{debug, warn};

use super::notify::{Notification, NotificationLevel};
use super::session::Session;
use super::step::{Action, Step};
use super::validate::{validate_feedback, validate_recipient, validate_topic};
use crate::backend::{
    check_health, ApiError, BackendStatus, EmailBackend, Endpoint, FeedbackResponse,
    FinalizeResponse, GenerateResponse, SendEmailResponse, SessionSnapshot,
};
use crate::utils::WizardError;

/// Tag attached to an in-flight request
///
/// A response is applied only if the controller is still at the same epoch
/// and holds the same session token it held when the request began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    session_id: Option<String>,
    action: Action,
}

impl Ticket {
    pub fn action(&self) -> Action {
        self.action
    }
}

#[derive(Debug, Clone)]
enum Request {
    Generate { topic: String },
    Feedback { session_id: String, feedback: String },
    Finalize { session_id: String },
    SendEmail { session_id: String, email: String },
    Session { session_id: String },
}

impl Request {
    fn endpoint(&self) -> Endpoint {
        match self {
            Request::Generate { .. } => Endpoint::Generate,
            Request::Feedback { .. } => Endpoint::Feedback,
            Request::Finalize { .. } => Endpoint::Finalize,
            Request::SendEmail { .. } => Endpoint::SendEmail,
            Request::Session { .. } => Endpoint::Session,
        }
    }

    async fn dispatch(self, backend: &dyn EmailBackend) -> Result<Reply, ApiError> {
        match self {
            Request::Generate { topic } => {
                let response = backend.generate(&topic).await?;
                Ok(Reply::Generated { topic, response })
            }
            Request::Feedback {
                session_id,
                feedback,
            } => backend
                .feedback(&session_id, &feedback)
                .await
                .map(Reply::FeedbackApplied),
            Request::Finalize { session_id } => {
                backend.finalize(&session_id).await.map(Reply::Finalized)
            }
            Request::SendEmail { session_id, email } => {
                backend.send_email(&session_id, &email).await.map(Reply::Sent)
            }
            Request::Session { session_id } => {
                backend.session(&session_id).await.map(Reply::Snapshot)
            }
        }
    }
}

#[derive(Debug)]
enum Reply {
    Generated {
        topic: String,
        response: GenerateResponse,
    },
    FeedbackApplied(FeedbackResponse),
    Finalized(FinalizeResponse),
    Sent(SendEmailResponse),
    Snapshot(SessionSnapshot),
}

/// A request accepted by the controller but not yet sent
///
/// Send it with [`Pending::dispatch`] (possibly from a background task) and
/// hand the [`Completion`] back to [`WorkflowController::complete`].
#[derive(Debug)]
pub struct Pending {
    ticket: Ticket,
    request: Request,
}

impl Pending {
    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    pub fn endpoint(&self) -> Endpoint {
        self.request.endpoint()
    }

    pub async fn dispatch(self, backend: &dyn EmailBackend) -> Completion {
        let endpoint = self.request.endpoint();
        let outcome = self.request.dispatch(backend).await;
        Completion {
            ticket: self.ticket,
            endpoint,
            outcome,
        }
    }
}

/// The backend's answer to a [`Pending`] request, tagged with its ticket
#[derive(Debug)]
pub struct Completion {
    ticket: Ticket,
    endpoint: Endpoint,
    outcome: Result<Reply, ApiError>,
}

impl Completion {
    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }
}

/// What `complete` did with a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// Superseded by a reset or a later request; state untouched
    Stale,
}

/// Drives one email session through Topic -> Draft -> Final -> Sent
pub struct WorkflowController {
    backend: Arc<dyn EmailBackend>,
    session: Session,
    status: BackendStatus,
    busy: bool,
    epoch: u64,
    feedback_input: String,
    snapshot: Option<SessionSnapshot>,
    notifications: Vec<Notification>,
}

impl WorkflowController {
    pub fn new(backend: Arc<dyn EmailBackend>) -> Self {
        Self {
            backend,
            session: Session::default(),
            status: BackendStatus::default(),
            busy: false,
            epoch: 0,
            feedback_input: String::new(),
            snapshot: None,
            notifications: Vec::new(),
        }
    }

    pub fn backend(&self) -> Arc<dyn EmailBackend> {
        Arc::clone(&self.backend)
    }

    pub fn step(&self) -> Step {
        self.session.step()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// True while a request is in flight; callers check before acting
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn backend_status(&self) -> BackendStatus {
        self.status
    }

    /// Topic submission is disabled, not rejected, while the backend is known offline
    pub fn can_submit_topic(&self) -> bool {
        self.step() == Step::Topic && !self.busy && self.status != BackendStatus::Offline
    }

    pub fn feedback_input(&self) -> &str {
        &self.feedback_input
    }

    pub fn set_feedback_input(&mut self, input: impl Into<String>) {
        self.feedback_input = input.into();
    }

    /// Last server-side view fetched by `refresh_session`
    pub fn snapshot(&self) -> Option<&SessionSnapshot> {
        self.snapshot.as_ref()
    }

    /// Drain queued notifications, oldest first
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Probe the backend and record whether it is reachable
    pub async fn check_health(&mut self) -> BackendStatus {
        let backend = Arc::clone(&self.backend);
        self.status = check_health(backend.as_ref()).await;

        match self.status {
            BackendStatus::Online => {
                self.notify(NotificationLevel::Success, "Connected to backend successfully")
            }
            _ => self.notify(
                NotificationLevel::Error,
                "Cannot connect to backend. Please ensure the backend server is running.",
            ),
        }
        self.status
    }

    /// Step 1: generate the initial draft
    pub async fn submit_topic(&mut self, topic: &str) -> Result<(), WizardError> {
        let pending = self.prepare_topic(topic)?;
        self.run(pending).await
    }

    /// Step 2: regenerate with feedback, or finalize when the feedback is blank
    pub async fn submit_feedback(&mut self, feedback: &str) -> Result<(), WizardError> {
        let pending = self.prepare_feedback(feedback)?;
        self.run(pending).await
    }

    /// Step 2 -> 3: freeze the current draft
    pub async fn finalize(&mut self) -> Result<(), WizardError> {
        let pending = self.prepare_finalize()?;
        self.run(pending).await
    }

    /// Step 3 -> 4: deliver the final version
    pub async fn send_email(&mut self, recipient: &str) -> Result<(), WizardError> {
        let pending = self.prepare_send(recipient)?;
        self.run(pending).await
    }

    /// Fetch the backend's record of the current session
    pub async fn refresh_session(&mut self) -> Result<SessionSnapshot, WizardError> {
        let pending = self.prepare_refresh()?;
        self.run(pending).await?;
        self.snapshot.clone().ok_or_else(|| WizardError::Unexpected {
            message: Endpoint::Session.fallback_message().to_string(),
            detail: "session response was not recorded".to_string(),
        })
    }

    /// Back to step 1 with nothing kept; any in-flight response becomes stale
    pub fn reset(&mut self) {
        if self.busy {
            debug!("Reset while a request is in flight; its response will be discarded");
            self.notify(NotificationLevel::Info, "Discarded the request in progress");
        }
        self.epoch += 1;
        self.busy = false;
        self.session.clear();
        self.feedback_input.clear();
        self.snapshot = None;
        self.notify(NotificationLevel::Success, "Ready to create a new email!");
    }

    pub fn prepare_topic(&mut self, topic: &str) -> Result<Pending, WizardError> {
        self.guard(Action::SubmitTopic)?;
        if self.status == BackendStatus::Offline {
            return Err(self.fail(WizardError::Offline));
        }
        let topic = validate_topic(topic).map_err(|e| self.fail(e))?;

        Ok(self.begin(
            Action::SubmitTopic,
            Request::Generate {
                topic: topic.to_string(),
            },
        ))
    }

    pub fn prepare_feedback(&mut self, feedback: &str) -> Result<Pending, WizardError> {
        self.guard(Action::SubmitFeedback)?;
        if feedback.trim().is_empty() {
            return self.prepare_finalize();
        }
        let feedback = validate_feedback(feedback).map_err(|e| self.fail(e))?;
        let session_id = self.require_session(Action::SubmitFeedback)?;

        Ok(self.begin(
            Action::SubmitFeedback,
            Request::Feedback {
                session_id,
                feedback: feedback.to_string(),
            },
        ))
    }

    pub fn prepare_finalize(&mut self) -> Result<Pending, WizardError> {
        self.guard(Action::Finalize)?;
        let session_id = self.require_session(Action::Finalize)?;

        Ok(self.begin(Action::Finalize, Request::Finalize { session_id }))
    }

    pub fn prepare_send(&mut self, recipient: &str) -> Result<Pending, WizardError> {
        self.guard(Action::SendEmail)?;
        let email = validate_recipient(recipient).map_err(|e| self.fail(e))?;
        let session_id = self.require_session(Action::SendEmail)?;

        Ok(self.begin(
            Action::SendEmail,
            Request::SendEmail {
                session_id,
                email: email.to_string(),
            },
        ))
    }

    pub fn prepare_refresh(&mut self) -> Result<Pending, WizardError> {
        self.guard(Action::RefreshSession)?;
        let session_id = self.require_session(Action::RefreshSession)?;

        Ok(self.begin(Action::RefreshSession, Request::Session { session_id }))
    }

    /// Apply a backend response, unless it has been superseded
    pub fn complete(&mut self, completion: Completion) -> Result<Applied, WizardError> {
        let Completion {
            ticket,
            endpoint,
            outcome,
        } = completion;

        if !self.is_current(&ticket) {
            debug!(
                "Discarding stale {} response to {} (epoch {}, now {})",
                ticket.action(),
                endpoint,
                ticket.epoch,
                self.epoch
            );
            return Ok(Applied::Stale);
        }
        self.busy = false;

        let reply = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                if e.is_timeout() {
                    warn!("{} timed out", endpoint);
                } else {
                    warn!("{} failed: {}", endpoint, e);
                }
                return Err(self.fail(e.into_wizard_error(endpoint)));
            }
        };

        match reply {
            Reply::Generated { topic, response } => {
                if response.session_id.trim().is_empty() {
                    let err = ApiError::Unexpected("generate response has no session_id".into());
                    return Err(self.fail(err.into_wizard_error(endpoint)));
                }
                debug!("Started session {}", response.session_id);
                self.session.start(response.session_id, topic, response.content);
                self.snapshot = None;
                self.notify(NotificationLevel::Success, "Email draft generated successfully!");
            }
            Reply::FeedbackApplied(response) => {
                self.session.apply_feedback(response.content, response.feedback_history);
                self.feedback_input.clear();
                self.notify(NotificationLevel::Success, "Email updated with your feedback!");
            }
            Reply::Finalized(response) => {
                self.session.finalize(response.final_content);
                self.notify(NotificationLevel::Success, "Email finalized successfully!");
            }
            Reply::Sent(response) => {
                self.session.mark_sent();
                let message = response
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Email sent successfully!".to_string());
                self.notify(NotificationLevel::Success, message);
            }
            Reply::Snapshot(snapshot) => {
                self.snapshot = Some(snapshot);
            }
        }

        Ok(Applied::Updated)
    }

    async fn run(&mut self, pending: Pending) -> Result<(), WizardError> {
        let backend = Arc::clone(&self.backend);
        let completion = pending.dispatch(backend.as_ref()).await;
        self.complete(completion).map(|_| ())
    }

    fn guard(&mut self, action: Action) -> Result<(), WizardError> {
        if self.busy {
            return Err(self.fail(WizardError::Busy));
        }
        let step = self.step();
        if !step.allows(action) {
            return Err(self.fail(WizardError::InvalidStep { action, step }));
        }
        Ok(())
    }

    fn require_session(&mut self, action: Action) -> Result<String, WizardError> {
        match self.session.id() {
            Some(id) => Ok(id.to_string()),
            None => {
                let step = self.step();
                Err(self.fail(WizardError::InvalidStep { action, step }))
            }
        }
    }

    fn begin(&mut self, action: Action, request: Request) -> Pending {
        self.epoch += 1;
        self.busy = true;
        debug!("Dispatching {} (epoch {})", request.endpoint(), self.epoch);
        Pending {
            ticket: Ticket {
                epoch: self.epoch,
                session_id: self.session.id().map(str::to_string),
                action,
            },
            request,
        }
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.epoch == self.epoch && ticket.session_id.as_deref() == self.session.id()
    }

    fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
    }

    /// Surface an error as a notification and hand it back for `?`
    fn fail(&mut self, err: WizardError) -> WizardError {
        if err.is_local() {
            debug!("Rejected locally: {}", err);
        }
        self.notify(NotificationLevel::Error, err.to_string());
        err
    }
}
