use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{FEEDBACK_PATH, FINALIZE_PATH, GENERATE_PATH, SEND_EMAIL_PATH, SESSION_PATH};

/// Workflow routes, used for routing and for picking a fallback message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Generate,
    Feedback,
    Finalize,
    SendEmail,
    Session,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Generate => GENERATE_PATH,
            Self::Feedback => FEEDBACK_PATH,
            Self::Finalize => FINALIZE_PATH,
            Self::SendEmail => SEND_EMAIL_PATH,
            Self::Session => SESSION_PATH,
        }
    }

    /// Message shown when the backend gives us nothing better
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::Generate => "Failed to generate email",
            Self::Feedback => "Failed to process feedback",
            Self::Finalize => "Failed to finalize email",
            Self::SendEmail => "Failed to send email",
            Self::Session => "Failed to fetch session",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// Request bodies

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest<'a> {
    pub topic: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct FeedbackRequest<'a> {
    pub session_id: &'a str,
    pub feedback: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct FinalizeRequest<'a> {
    pub session_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendEmailRequest<'a> {
    pub session_id: &'a str,
    pub email: &'a str,
}

// Response bodies

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    pub session_id: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    pub content: String,
    #[serde(default)]
    pub feedback_history: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizeResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    pub final_content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendEmailResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Everything the backend knows about one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub generated_content: String,
    #[serde(default)]
    pub feedback_history: Vec<String>,
    #[serde(default)]
    pub final_data: String,
    #[serde(default)]
    pub receiver_mail: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Shape of every error body the backend sends
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

fn default_success() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_bodies_use_wire_names() {
        let body = serde_json::to_value(SendEmailRequest {
            session_id: "abc123",
            email: "a@b.com",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"session_id": "abc123", "email": "a@b.com"})
        );
    }

    #[test]
    fn test_feedback_history_defaults_to_empty() {
        let resp: FeedbackResponse =
            serde_json::from_str(r#"{"success": true, "content": "v2"}"#).unwrap();
        assert!(resp.feedback_history.is_empty());
    }

    #[test]
    fn test_send_response_message_is_optional() {
        let resp: SendEmailResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert_eq!(resp.message, None);
    }

    #[test]
    fn test_session_snapshot_from_backend_shape() {
        let snapshot: SessionSnapshot = serde_json::from_str(
            r#"{
                "session_id": "abc123",
                "topic": "Kickoff",
                "generated_content": "Dear team,",
                "feedback_history": ["Make it more formal"],
                "final_data": "",
                "receiver_mail": "",
                "created_at": "2024-05-01T10:00:00"
            }"#,
        )
        .unwrap();
        assert_eq!(snapshot.feedback_history, vec!["Make it more formal"]);
        assert_eq!(snapshot.created_at.as_deref(), Some("2024-05-01T10:00:00"));
    }

    #[test]
    fn test_fallback_messages() {
        assert_eq!(Endpoint::Generate.fallback_message(), "Failed to generate email");
        assert_eq!(Endpoint::SendEmail.fallback_message(), "Failed to send email");
        assert_eq!(Endpoint::Feedback.path(), "/api/feedback");
    }
}
