/// Runtime front ends - Gateway

mod interactive;
mod non_interactive;

pub use interactive::{parse_input, step_indicator, Wizard, WizardInput};
pub use non_interactive::{NonInteractiveRunner, RunMetadata, RunPlan, RunReport};
