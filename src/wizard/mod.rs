/// Multi-step form wizard
///
/// Walks a record through numbered steps, validating each one before the user
/// may move forward, and gates the final submission on every step being valid.
///
/// ## Architecture
///
/// ```text
/// WizardEngine<R>
///   ├── StepDefinition<R> (title, owned fields, rules, steps it reads)
///   ├── WizardState<R> (current step, completed/errored sets, inline errors)
///   └── NotificationSink (toasts and events for the view layer)
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// use claimdesk::claims::DriverClaim;
///
/// let mut wizard = DriverClaim::wizard()?;
///
/// wizard.update_field("policy_number", "POL-123456");
/// if !wizard.go_next().is_moved() {
///     // Render wizard.field_error(...) next to each field
/// }
///
/// let outcome = wizard.submit(&endpoint);
/// ```
///
/// ## Rules
///
/// 1. Steps are numbered from 1 and never skipped by `go_next`
/// 2. A step is completed or errored, never both
/// 3. Backward and direct jumps never validate
/// 4. Changing a field reopens its step and the steps that read it
/// 5. Submission re-validates every step that is not completed

pub mod steps;
pub mod state;
pub mod flow;

// Re-export commonly used types
pub use steps::{FieldError, FieldErrors, StepBuilder, StepDefinition};
pub use state::WizardState;
pub use flow::{NavigationResult, SubmitOutcome, WizardEngine};
