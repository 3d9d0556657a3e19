use thiserror::Error;

use super::types::Endpoint;
use crate::utils::WizardError;

/// Errors returned by an [`EmailBackend`](super::EmailBackend)
#[derive(Debug, Error)]
pub enum ApiError {
    /// Timeout, refused connection, DNS failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx status, or a 2xx body carrying `success: false`
    #[error("Backend error {status}: {}", message.as_deref().unwrap_or("no error message"))]
    Backend { status: u16, message: Option<String> },

    /// Body that does not match the expected shape
    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// The `error` field reported by the server, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Backend { message, .. } => message.as_deref().filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Network(e) if e.is_timeout())
    }

    /// Convert to the user-facing error for a given endpoint
    ///
    /// Only a server-reported message is shown verbatim; everything else
    /// collapses to the endpoint's fallback text, with the cause kept in
    /// `detail` for logging.
    pub fn into_wizard_error(self, endpoint: Endpoint) -> WizardError {
        let fallback = endpoint.fallback_message().to_string();
        match self {
            ApiError::Backend { status, message } => WizardError::Backend {
                status,
                message: message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or(fallback),
            },
            ApiError::Network(e) => WizardError::Network {
                message: fallback,
                detail: e.to_string(),
            },
            ApiError::Unexpected(detail) => WizardError::Unexpected {
                message: fallback,
                detail,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_wins() {
        let err = ApiError::Backend {
            status: 400,
            message: Some("Topic must not exceed 500 characters".to_string()),
        };
        assert_eq!(
            err.into_wizard_error(Endpoint::Generate).to_string(),
            "Topic must not exceed 500 characters"
        );
    }

    #[test]
    fn test_missing_message_uses_fallback() {
        let err = ApiError::Backend {
            status: 502,
            message: None,
        };
        assert_eq!(
            err.into_wizard_error(Endpoint::Finalize).to_string(),
            "Failed to finalize email"
        );

        let err = ApiError::Backend {
            status: 500,
            message: Some("  ".to_string()),
        };
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_unexpected_keeps_detail() {
        let err = ApiError::Unexpected("missing field `content`".to_string());
        match err.into_wizard_error(Endpoint::Feedback) {
            WizardError::Unexpected { message, detail } => {
                assert_eq!(message, "Failed to process feedback");
                assert!(detail.contains("content"));
            }
            other => panic!("Expected unexpected error, got {other:?}"),
        }
    }
}
