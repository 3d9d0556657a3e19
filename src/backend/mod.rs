// Gateway module for the generation backend - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod error;
mod health;
mod http;
mod traits;
mod types;

// Public re-exports - the ONLY way to access backend functionality
pub use error::ApiError;
pub use health::{check_health, BackendStatus};
pub use http::HttpBackend;
pub use traits::EmailBackend;
#[cfg(test)]
pub use traits::MockEmailBackend;
pub use types::{
    Endpoint, FeedbackResponse, FinalizeResponse, GenerateResponse, SendEmailResponse,
    SessionSnapshot,
};
