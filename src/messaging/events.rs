/// Event types for the wizard
///
/// Events represent things that have happened (past tense).
/// They are broadcast to all subscribers.
use std::fmt;

/// Severity of a user-visible notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A message surfaced to the user (toast, banner, status line)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Wizard events
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    /// A step passed validation
    StepValidated { step: usize },

    /// A step failed validation
    StepRejected { step: usize, errors: Vec<String> },

    /// Current step changed
    Navigated { from: usize, to: usize },

    /// Submission refused because some steps are invalid
    SubmitBlocked { failed_steps: Vec<usize> },

    /// Endpoint accepted the record
    SubmitSucceeded { id: String },

    /// Endpoint or transport rejected the record
    SubmitFailed { message: String },

    /// User-visible notification
    Notice(Notification),
}

impl WizardEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            WizardEvent::StepValidated { step } => format!("Step {} validated", step),
            WizardEvent::StepRejected { step, errors } => {
                format!("Step {} rejected ({} errors)", step, errors.len())
            }
            WizardEvent::Navigated { from, to } => format!("Moved from step {} to {}", from, to),
            WizardEvent::SubmitBlocked { failed_steps } => {
                format!("Submission blocked by steps {:?}", failed_steps)
            }
            WizardEvent::SubmitSucceeded { id } => format!("Submitted as {}", id),
            WizardEvent::SubmitFailed { message } => format!("Submission failed: {}", message),
            WizardEvent::Notice(notice) => notice.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_levels() {
        assert!(Notification::error("Oops", "bad").is_error());
        assert!(!Notification::success("Done", "ok").is_error());
    }

    #[test]
    fn test_event_description() {
        let event = WizardEvent::Navigated { from: 1, to: 2 };
        assert_eq!(event.description(), "Moved from step 1 to 2");

        let event = WizardEvent::Notice(Notification::error("Step 2", "Fix the highlighted fields"));
        assert_eq!(event.description(), "Step 2: Fix the highlighted fields");
    }
}
