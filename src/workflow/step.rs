use serde::{Deserialize, Serialize};
use std::fmt;

/// The four wizard steps, in the order the user walks through them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    /// Enter a topic and generate the first draft
    Topic,
    /// Review the draft and refine it with feedback
    Draft,
    /// Draft frozen into its final, sendable version
    Final,
    /// Final version delivered to a recipient
    Sent,
}

impl Default for Step {
    fn default() -> Self {
        Self::Topic
    }
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Topic, Step::Draft, Step::Final, Step::Sent];

    /// 1-based position shown in the step indicator
    pub fn number(&self) -> u8 {
        match self {
            Self::Topic => 1,
            Self::Draft => 2,
            Self::Final => 3,
            Self::Sent => 4,
        }
    }

    /// Short name for the step indicator
    pub fn name(&self) -> &'static str {
        match self {
            Self::Topic => "Generate",
            Self::Draft => "Refine",
            Self::Final => "Finalize",
            Self::Sent => "Send",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Topic => "Create initial draft",
            Self::Draft => "Add feedback",
            Self::Final => "Review final version",
            Self::Sent => "Deliver email",
        }
    }

    /// Whether a backend session token must exist at this step
    pub fn has_session(&self) -> bool {
        !matches!(self, Self::Topic)
    }

    /// Transition table: which actions each step accepts
    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::Reset => true,
            Action::SubmitTopic => matches!(self, Self::Topic),
            Action::SubmitFeedback | Action::Finalize => matches!(self, Self::Draft),
            Action::SendEmail => matches!(self, Self::Final),
            Action::RefreshSession => self.has_session(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// User intents the controller accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    SubmitTopic,
    SubmitFeedback,
    Finalize,
    SendEmail,
    RefreshSession,
    Reset,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SubmitTopic => "generate a draft",
            Self::SubmitFeedback => "apply feedback",
            Self::Finalize => "finalize",
            Self::SendEmail => "send email",
            Self::RefreshSession => "fetch the session",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_numbers_are_ordered() {
        let numbers: Vec<u8> = Step::ALL.iter().map(Step::number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert!(Step::Topic < Step::Draft);
        assert!(Step::Final < Step::Sent);
    }

    #[test]
    fn test_transition_table() {
        assert!(Step::Topic.allows(Action::SubmitTopic));
        assert!(!Step::Topic.allows(Action::SubmitFeedback));
        assert!(!Step::Topic.allows(Action::RefreshSession));

        assert!(Step::Draft.allows(Action::SubmitFeedback));
        assert!(Step::Draft.allows(Action::Finalize));
        assert!(!Step::Draft.allows(Action::SendEmail));

        assert!(Step::Final.allows(Action::SendEmail));
        assert!(!Step::Final.allows(Action::Finalize));

        assert!(!Step::Sent.allows(Action::SendEmail));
        assert!(!Step::Sent.allows(Action::SubmitTopic));
    }

    #[test]
    fn test_reset_always_allowed() {
        for step in Step::ALL {
            assert!(step.allows(Action::Reset));
        }
    }
}
