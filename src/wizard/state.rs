/// Wizard state management
///
/// Tracks the current step, which steps passed or failed their latest
/// validation, the accumulated record, and whether a submission is in flight.
use std::collections::{BTreeMap, BTreeSet};

use super::steps::FieldError;

/// State of one wizard session
///
/// A step index is never in both `completed_steps` and `errored_steps`;
/// the only way to move a step between the sets is through
/// [`WizardState::mark_step_completed`] and [`WizardState::mark_step_errored`].
#[derive(Debug, Clone)]
pub struct WizardState<R> {
    /// Current step (1-indexed)
    current_step: usize,

    /// Total number of steps
    total_steps: usize,

    /// Steps whose most recent validation succeeded
    completed_steps: BTreeSet<usize>,

    /// Steps whose most recent validation failed
    errored_steps: BTreeSet<usize>,

    /// Inline error message per field, from the latest validation of its step
    field_errors: BTreeMap<String, String>,

    /// Values accumulated across all steps
    record: R,

    /// True only while the final submission is in flight
    is_submitting: bool,
}

impl<R> WizardState<R> {
    /// Create a fresh state on step 1 with the record's defaults
    ///
    /// `total_steps` is clamped to at least one step.
    pub fn new(total_steps: usize, record: R) -> Self {
        Self {
            current_step: 1,
            total_steps: total_steps.max(1),
            completed_steps: BTreeSet::new(),
            errored_steps: BTreeSet::new(),
            field_errors: BTreeMap::new(),
            record,
            is_submitting: false,
        }
    }

    /// Get current step
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Whether `step` is a valid index for this wizard
    pub fn contains_step(&self, step: usize) -> bool {
        (1..=self.total_steps).contains(&step)
    }

    /// Set current step. Out-of-range steps are ignored and return false.
    pub fn set_current_step(&mut self, step: usize) -> bool {
        if !self.contains_step(step) {
            return false;
        }
        self.current_step = step;
        true
    }

    pub fn completed_steps(&self) -> &BTreeSet<usize> {
        &self.completed_steps
    }

    pub fn errored_steps(&self) -> &BTreeSet<usize> {
        &self.errored_steps
    }

    /// Check if a step is completed
    pub fn is_step_completed(&self, step: usize) -> bool {
        self.completed_steps.contains(&step)
    }

    /// Check if a step is errored
    pub fn is_step_errored(&self, step: usize) -> bool {
        self.errored_steps.contains(&step)
    }

    /// Record a successful validation of `step`
    pub fn mark_step_completed(&mut self, step: usize) {
        self.errored_steps.remove(&step);
        self.completed_steps.insert(step);
    }

    /// Record a failed validation of `step`
    pub fn mark_step_errored(&mut self, step: usize) {
        self.completed_steps.remove(&step);
        self.errored_steps.insert(step);
    }

    /// Forget a step's completion after one of the fields it depends on changed
    ///
    /// The errored set is left alone: an error flag only clears on a
    /// successful validation.
    pub fn invalidate_step(&mut self, step: usize) -> bool {
        self.completed_steps.remove(&step)
    }

    /// Whether every step is in the completed set
    pub fn all_steps_completed(&self) -> bool {
        (1..=self.total_steps).all(|step| self.completed_steps.contains(&step))
    }

    /// Steps not in the completed set, in order
    pub fn incomplete_steps(&self) -> Vec<usize> {
        (1..=self.total_steps)
            .filter(|step| !self.completed_steps.contains(step))
            .collect()
    }

    /// Get completion progress (0.0-1.0)
    pub fn progress(&self) -> f32 {
        let total_steps = self.total_steps as f32;
        let completed_count = self.completed_steps.len() as f32;

        (completed_count / total_steps).min(1.0)
    }

    /// Inline message currently attached to `field`
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    /// Replace the inline errors of one step's fields
    ///
    /// Messages for `owned` fields are cleared first, then `errors` are
    /// attached. Errors for fields outside `owned` are attached as well,
    /// since a rule may flag a field it reads from another step.
    pub fn replace_field_errors<'a>(
        &mut self,
        owned: impl IntoIterator<Item = &'a String>,
        errors: &[FieldError],
    ) {
        for field in owned {
            self.field_errors.remove(field);
        }
        for error in errors {
            self.field_errors
                .entry(error.field.clone())
                .or_insert_with(|| error.message.clone());
        }
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut R {
        &mut self.record
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.is_submitting = submitting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_wizard_state() {
        let state = WizardState::new(3, ());
        assert_eq!(state.current_step(), 1);
        assert_eq!(state.total_steps(), 3);
        assert!(state.completed_steps().is_empty());
        assert!(state.errored_steps().is_empty());
        assert!(!state.is_submitting());
        assert_eq!(state.progress(), 0.0);
    }

    #[test]
    fn test_zero_steps_clamped() {
        let state = WizardState::new(0, ());
        assert_eq!(state.total_steps(), 1);
        assert!(state.contains_step(1));
    }

    #[test]
    fn test_set_current_step_bounds() {
        let mut state = WizardState::new(3, ());
        assert!(state.set_current_step(3));
        assert_eq!(state.current_step(), 3);

        assert!(!state.set_current_step(0));
        assert!(!state.set_current_step(4));
        assert_eq!(state.current_step(), 3);
    }

    #[test]
    fn test_sets_stay_disjoint() {
        let mut state = WizardState::new(3, ());

        state.mark_step_errored(2);
        assert!(state.is_step_errored(2));
        assert!(!state.is_step_completed(2));

        state.mark_step_completed(2);
        assert!(state.is_step_completed(2));
        assert!(!state.is_step_errored(2));

        state.mark_step_errored(2);
        assert!(state.is_step_errored(2));
        assert!(!state.is_step_completed(2));
    }

    #[test]
    fn test_invalidate_step_keeps_error_flag() {
        let mut state = WizardState::new(3, ());
        state.mark_step_completed(1);
        state.mark_step_errored(2);

        assert!(state.invalidate_step(1));
        assert!(!state.invalidate_step(1));
        assert!(!state.invalidate_step(2));

        assert!(!state.is_step_completed(1));
        assert!(!state.is_step_errored(1));
        assert!(state.is_step_errored(2));
    }

    #[test]
    fn test_progress_calculation() {
        let mut state = WizardState::new(4, ());
        state.mark_step_completed(1);
        assert_eq!(state.progress(), 0.25);
        assert_eq!(state.incomplete_steps(), vec![2, 3, 4]);

        for step in 2..=4 {
            state.mark_step_completed(step);
        }
        assert_eq!(state.progress(), 1.0);
        assert!(state.all_steps_completed());
    }

    #[test]
    fn test_replace_field_errors() {
        let mut state = WizardState::new(2, ());
        let owned = vec!["a".to_string(), "b".to_string()];

        state.replace_field_errors(
            &owned,
            &[FieldError::new("a", "A missing"), FieldError::new("b", "B missing")],
        );
        assert_eq!(state.field_error("a"), Some("A missing"));
        assert_eq!(state.field_error("b"), Some("B missing"));

        state.replace_field_errors(&owned, &[FieldError::new("b", "B still missing")]);
        assert_eq!(state.field_error("a"), None);
        assert_eq!(state.field_error("b"), Some("B still missing"));

        state.replace_field_errors(&owned, &[]);
        assert!(state.field_errors().is_empty());
    }
}
