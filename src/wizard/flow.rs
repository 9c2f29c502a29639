/// Wizard flow management
///
/// Drives navigation through the steps, runs step validation, and gates the
/// final submission on every step being valid.
use std::collections::BTreeSet;
use std::sync::Arc;

use super::state::WizardState;
use super::steps::StepDefinition;
use crate::error::{DefinitionError, SubmitError};
use crate::messaging::{Notification, NotificationSink, NullSink, WizardEvent};
use crate::record::{FieldValue, FormRecord};
use crate::submit::{Created, SubmitEndpoint};

const LOG_TARGET: &str = "claimdesk::wizard";

/// Navigation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationResult {
    /// Navigation succeeded
    Moved { from: usize, to: usize },

    /// Navigation blocked (at boundary, out of range, or validation failed)
    Blocked { reason: String },
}

impl NavigationResult {
    pub fn is_moved(&self) -> bool {
        matches!(self, NavigationResult::Moved { .. })
    }
}

/// Result of a submission attempt
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Endpoint accepted the record
    Submitted(Created),

    /// Some steps failed re-validation; the endpoint was not called
    Blocked { failed_steps: Vec<usize> },

    /// Endpoint or transport failed; the record is unchanged
    Failed(SubmitError),

    /// A submission is already in flight; nothing was done
    AlreadySubmitting,
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }

    /// Id of the created resource, if the submission went through
    pub fn created_id(&self) -> Option<&str> {
        match self {
            SubmitOutcome::Submitted(created) => Some(&created.id),
            _ => None,
        }
    }
}

/// Multi-step form wizard
///
/// Owns the [`WizardState`] and the static step definitions. View code reads
/// state through the accessors and changes it only through the operations
/// below.
pub struct WizardEngine<R> {
    steps: Vec<StepDefinition<R>>,
    state: WizardState<R>,
    sink: Arc<dyn NotificationSink>,
}

impl<R: FormRecord> WizardEngine<R> {
    /// Create a wizard over `steps`, which must be numbered 1, 2, ... in order
    pub fn new(steps: Vec<StepDefinition<R>>, record: R) -> Result<Self, DefinitionError> {
        if steps.is_empty() {
            return Err(DefinitionError::NoSteps);
        }

        for (position, step) in steps.iter().enumerate() {
            let expected = position + 1;
            if step.index() != expected {
                return Err(DefinitionError::OutOfOrder {
                    expected,
                    found: step.index(),
                });
            }
        }

        let total = steps.len();
        for step in &steps {
            if let Some(&target) = step.reads().iter().find(|t| !(1..=total).contains(*t)) {
                return Err(DefinitionError::UnknownDependency {
                    step: step.index(),
                    target,
                });
            }
        }

        Ok(Self {
            state: WizardState::new(total, record),
            steps,
            sink: Arc::new(NullSink),
        })
    }

    /// Route notifications and events to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn state(&self) -> &WizardState<R> {
        &self.state
    }

    pub fn record(&self) -> &R {
        self.state.record()
    }

    /// Get current step
    pub fn current_step(&self) -> usize {
        self.state.current_step()
    }

    pub fn total_steps(&self) -> usize {
        self.state.total_steps()
    }

    /// Definition of step `index`
    pub fn step(&self, index: usize) -> Option<&StepDefinition<R>> {
        index.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    pub fn steps(&self) -> &[StepDefinition<R>] {
        &self.steps
    }

    pub fn is_first(&self) -> bool {
        self.current_step() == 1
    }

    pub fn is_last(&self) -> bool {
        self.current_step() == self.total_steps()
    }

    /// Check if can go back
    pub fn can_go_back(&self) -> bool {
        !self.is_first()
    }

    /// Check if can go forward (validation still decides)
    pub fn can_go_forward(&self) -> bool {
        !self.is_last()
    }

    /// Fraction of steps whose latest validation succeeded
    pub fn progress(&self) -> f32 {
        self.state.progress()
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting()
    }

    /// Inline error currently attached to `field`
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.state.field_error(field)
    }

    /// Step that owns `field`
    pub fn owner_of(&self, field: &str) -> Option<usize> {
        self.steps
            .iter()
            .find(|step| step.owns(field))
            .map(StepDefinition::index)
    }

    /// Steps whose validation reads fields owned by `step`
    pub fn dependents_of(&self, step: usize) -> Vec<usize> {
        self.steps
            .iter()
            .filter(|def| def.reads().contains(&step))
            .map(StepDefinition::index)
            .collect()
    }

    /// Write a value into the record
    ///
    /// A changed value drops the completion of the step owning the field and
    /// of every step that reads it, so submit validates them again. Error
    /// flags stay until the next validation pass. Unknown field names are
    /// ignored.
    pub fn update_field(&mut self, name: &str, value: impl Into<FieldValue>) {
        let value = value.into();
        let changed = self.state.record().field(name) != value;

        if !self.state.record_mut().set_field(name, value) {
            tracing::warn!(target: LOG_TARGET, field = name, "Ignoring update of unknown field");
            return;
        }

        if changed {
            for step in self.affected_steps(name) {
                if self.state.invalidate_step(step) {
                    tracing::debug!(target: LOG_TARGET, step, field = name, "Completion invalidated");
                }
            }
        }
    }

    /// Steps owning `field` plus the steps that read them
    fn affected_steps(&self, field: &str) -> BTreeSet<usize> {
        let mut affected = BTreeSet::new();
        for owner in self.steps.iter().filter(|step| step.owns(field)) {
            affected.insert(owner.index());
            affected.extend(self.dependents_of(owner.index()));
        }
        affected
    }

    /// Validate one step against the full record
    ///
    /// Returns true when the step passes. A failure flags the step, attaches
    /// per-field messages, and raises one notification.
    pub fn validate_step(&mut self, step: usize) -> bool {
        self.run_validation(step, true)
    }

    /// Validate the current step and advance if it passes
    pub fn go_next(&mut self) -> NavigationResult {
        let from = self.current_step();

        if !self.validate_step(from) {
            return NavigationResult::Blocked {
                reason: format!("Step {} has errors", from),
            };
        }

        if from >= self.total_steps() {
            return NavigationResult::Blocked {
                reason: "Already at last step".to_string(),
            };
        }

        self.move_to(from + 1)
    }

    /// Go back one step without validating
    pub fn go_previous(&mut self) -> NavigationResult {
        let from = self.current_step();

        if from <= 1 {
            return NavigationResult::Blocked {
                reason: "Already at first step".to_string(),
            };
        }

        self.move_to(from - 1)
    }

    /// Jump to any step without validating
    pub fn go_to_step(&mut self, step: usize) -> NavigationResult {
        if !self.state.contains_step(step) {
            return NavigationResult::Blocked {
                reason: format!("No step {} (wizard has {})", step, self.total_steps()),
            };
        }

        self.move_to(step)
    }

    /// Validate everything and hand the record to `endpoint`
    ///
    /// The record is never modified here; a failed submission can be retried
    /// by calling this again.
    pub fn submit<E>(&mut self, endpoint: &E) -> SubmitOutcome
    where
        E: SubmitEndpoint<R> + ?Sized,
    {
        if let Err(outcome) = self.prepare_submit() {
            return outcome;
        }

        let result = endpoint.submit(self.state.record());
        self.finish_submit(result)
    }

    /// Finish a submission started with [`WizardEngine::begin_submit`]
    pub fn finish_submit(&mut self, result: Result<Created, SubmitError>) -> SubmitOutcome {
        if !self.state.is_submitting() {
            tracing::warn!(target: LOG_TARGET, "finish_submit called with no submission in flight");
        }
        self.state.set_submitting(false);

        match result {
            Ok(created) => {
                tracing::info!(target: LOG_TARGET, id = %created.id, "Submission accepted");
                self.sink.notify(Notification::success(
                    "Submitted",
                    format!("Reference {}", created.id),
                ));
                self.sink.emit(WizardEvent::SubmitSucceeded {
                    id: created.id.clone(),
                });
                SubmitOutcome::Submitted(created)
            }
            Err(error) => {
                tracing::error!(target: LOG_TARGET, "Submission failed: {}", error);
                let message = error.user_message();
                self.sink
                    .notify(Notification::error("Submission failed", message.clone()));
                self.sink.emit(WizardEvent::SubmitFailed { message });
                SubmitOutcome::Failed(error)
            }
        }
    }

    fn move_to(&mut self, to: usize) -> NavigationResult {
        let from = self.current_step();
        self.state.set_current_step(to);

        tracing::debug!(target: LOG_TARGET, from, to, "Navigated");
        self.sink.emit(WizardEvent::Navigated { from, to });

        NavigationResult::Moved { from, to }
    }

    fn run_validation(&mut self, step: usize, notify: bool) -> bool {
        let Some(definition) = step.checked_sub(1).and_then(|i| self.steps.get(i)) else {
            tracing::warn!(target: LOG_TARGET, step, "Validation requested for unknown step");
            return false;
        };

        match definition.validate(self.state.record()) {
            Ok(()) => {
                self.state
                    .replace_field_errors(definition.required_fields(), &[]);
                self.state.mark_step_completed(step);

                tracing::debug!(target: LOG_TARGET, step, "Step validated");
                self.sink.emit(WizardEvent::StepValidated { step });
                true
            }
            Err(errors) => {
                self.state
                    .replace_field_errors(definition.required_fields(), &errors);
                self.state.mark_step_errored(step);

                tracing::warn!(
                    target: LOG_TARGET,
                    step,
                    errors = errors.len(),
                    "Step failed validation"
                );
                if notify {
                    self.sink.notify(Notification::error(
                        format!("Step {}: {}", step, definition.title()),
                        "Please fix the highlighted fields before continuing.",
                    ));
                }
                self.sink.emit(WizardEvent::StepRejected {
                    step,
                    errors: errors.iter().map(ToString::to_string).collect(),
                });
                false
            }
        }
    }

    /// Guard, mark in flight, and re-validate every step
    fn prepare_submit(&mut self) -> Result<(), SubmitOutcome> {
        if self.state.is_submitting() {
            tracing::debug!(target: LOG_TARGET, "Submission already in flight");
            return Err(SubmitOutcome::AlreadySubmitting);
        }
        self.state.set_submitting(true);

        let current = self.current_step();
        self.run_validation(current, false);

        // Edits already dropped stale completions; steps reached by jumping
        // were never completed. Everything not completed is checked again.
        for step in 1..=self.total_steps() {
            if step != current && !self.state.is_step_completed(step) {
                self.run_validation(step, false);
            }
        }

        let failed_steps = self.state.incomplete_steps();
        if failed_steps.is_empty() {
            return Ok(());
        }

        self.state.set_submitting(false);
        tracing::warn!(target: LOG_TARGET, ?failed_steps, "Submission blocked");
        self.sink.notify(Notification::error(
            "Incomplete claim",
            "Please complete all required steps before submitting.",
        ));
        self.sink.emit(WizardEvent::SubmitBlocked {
            failed_steps: failed_steps.clone(),
        });
        Err(SubmitOutcome::Blocked { failed_steps })
    }
}

impl<R: FormRecord + Clone> WizardEngine<R> {
    /// Start a submission whose network round-trip runs elsewhere
    ///
    /// On success the engine is marked as submitting and a copy of the record
    /// is returned for the endpoint; report the endpoint's answer through
    /// [`WizardEngine::finish_submit`]. Calling this again before then yields
    /// [`SubmitOutcome::AlreadySubmitting`].
    pub fn begin_submit(&mut self) -> Result<R, SubmitOutcome> {
        self.prepare_submit()?;
        Ok(self.state.record().clone())
    }
}
