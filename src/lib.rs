pub mod app;
pub mod backend;
pub mod cli;
pub mod constants;
pub mod runtime;
pub mod utils;
pub mod workflow;

pub use app::{load_config, Config};
pub use backend::{EmailBackend, HttpBackend};
pub use utils::WizardError;
pub use workflow::{Step, WorkflowController};
