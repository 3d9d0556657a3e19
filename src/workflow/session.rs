use serde::Serialize;

use super::step::Step;

/// The single in-memory email session held by the controller
///
/// The backend token is present exactly when `step` is past `Topic`; every
/// mutator below keeps that pairing intact.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    step: Step,
    id: Option<String>,
    topic: String,
    content: String,
    feedback_history: Vec<String>,
    final_content: Option<String>,
}

impl Session {
    pub fn step(&self) -> Step {
        self.step
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Latest generated draft
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn feedback_history(&self) -> &[String] {
        &self.feedback_history
    }

    pub fn final_content(&self) -> Option<&str> {
        self.final_content.as_deref()
    }

    /// Start a new session from a generated draft
    pub(crate) fn start(&mut self, id: String, topic: String, content: String) {
        *self = Self {
            step: Step::Draft,
            id: Some(id),
            topic,
            content,
            feedback_history: Vec::new(),
            final_content: None,
        };
    }

    /// Replace the draft and the history with what the backend returned
    pub(crate) fn apply_feedback(&mut self, content: String, history: Vec<String>) {
        self.content = content;
        self.feedback_history = history;
    }

    pub(crate) fn finalize(&mut self, final_content: String) {
        self.final_content = Some(final_content);
        self.step = Step::Final;
    }

    pub(crate) fn mark_sent(&mut self) {
        self.step = Step::Sent;
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
