use thiserror::Error;

use crate::workflow::{Action, Step};

/// Main error type for the email wizard
///
/// The `Display` output of every variant is the message shown to the user,
/// so backend-facing variants carry the already-resolved text.
#[derive(Error, Debug)]
pub enum WizardError {
    /// Rejected locally before any request was made
    #[error("{0}")]
    Validation(String),

    /// Timeout, refused connection, DNS failure
    #[error("{message}")]
    Network { message: String, detail: String },

    /// Non-2xx (or `success: false`) response from the backend
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// The backend answered with a body we could not make sense of
    #[error("{message}")]
    Unexpected { message: String, detail: String },

    #[error("Cannot {action} while at the {step} step")]
    InvalidStep { action: Action, step: Step },

    #[error("Another request is already in progress")]
    Busy,

    #[error("Backend is offline; topic submission is disabled")]
    Offline,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WizardError {
    /// Errors raised locally, before the backend was contacted
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            WizardError::Validation(_)
                | WizardError::InvalidStep { .. }
                | WizardError::Busy
                | WizardError::Offline
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, WizardError::Validation(_))
    }
}
