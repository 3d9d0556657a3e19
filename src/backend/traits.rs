use async_trait::async_trait;

use super::error::ApiError;
use super::types::{
    FeedbackResponse, FinalizeResponse, GenerateResponse, SendEmailResponse, SessionSnapshot,
};

/// The remote service that does all the actual generation work
///
/// Implementations only move requests and responses; every workflow rule
/// lives in the controller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailBackend: Send + Sync {
    /// GET a liveness path; any 2xx is healthy
    async fn probe(&self, path: &str) -> Result<(), ApiError>;

    /// Generate the initial draft for a topic, opening a session
    async fn generate(&self, topic: &str) -> Result<GenerateResponse, ApiError>;

    /// Regenerate the draft of `session_id` with one more piece of feedback
    async fn feedback(&self, session_id: &str, feedback: &str)
        -> Result<FeedbackResponse, ApiError>;

    /// Freeze the current draft
    async fn finalize(&self, session_id: &str) -> Result<FinalizeResponse, ApiError>;

    /// Deliver the finalized email
    async fn send_email(&self, session_id: &str, email: &str)
        -> Result<SendEmailResponse, ApiError>;

    /// Server-side view of a session
    async fn session(&self, session_id: &str) -> Result<SessionSnapshot, ApiError>;
}
