use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{EMAIL_PATTERN, MAX_FEEDBACK_CHARS, MAX_TOPIC_CHARS, MIN_TOPIC_CHARS};
use crate::utils::WizardError;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("EMAIL_PATTERN is a valid regex"));

/// Validate a topic and return it trimmed
pub fn validate_topic(topic: &str) -> Result<&str, WizardError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(WizardError::Validation(
            "Please enter an email topic".to_string(),
        ));
    }
    let len = topic.chars().count();
    if len < MIN_TOPIC_CHARS {
        return Err(WizardError::Validation(format!(
            "Topic must be at least {} characters",
            MIN_TOPIC_CHARS
        )));
    }
    if len > MAX_TOPIC_CHARS {
        return Err(WizardError::Validation(format!(
            "Topic must not exceed {} characters",
            MAX_TOPIC_CHARS
        )));
    }
    Ok(topic)
}

/// Validate non-empty feedback and return it trimmed
///
/// Empty feedback is not an error at the controller level (it means
/// "finalize"), so callers check for that before getting here.
pub fn validate_feedback(feedback: &str) -> Result<&str, WizardError> {
    let feedback = feedback.trim();
    if feedback.chars().count() > MAX_FEEDBACK_CHARS {
        return Err(WizardError::Validation(format!(
            "Feedback must not exceed {} characters",
            MAX_FEEDBACK_CHARS
        )));
    }
    Ok(feedback)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Validate a recipient address and return it trimmed
pub fn validate_recipient(email: &str) -> Result<&str, WizardError> {
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(WizardError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }
    Ok(email)
}
