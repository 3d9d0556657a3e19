// Gateway module for the session workflow - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod controller;
mod notify;
mod session;
mod step;
mod validate;

// Public re-exports - the ONLY way to access workflow functionality
pub use controller::{Applied, Completion, Pending, Ticket, WorkflowController};
pub use notify::{Notification, NotificationLevel};
pub use session::Session;
pub use step::{Action, Step};
pub use validate::{is_valid_email, validate_feedback, validate_recipient, validate_topic};
