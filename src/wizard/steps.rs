/// Wizard step definitions
///
/// A step is one page of a multi-page form: the fields it owns, the other
/// steps it reads from, and the validator that decides whether it passes.
use std::collections::BTreeSet;
use std::fmt;

use crate::record::{FieldValue, FormRecord};

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Ordered list of field errors produced by one validation pass
pub type FieldErrors = Vec<FieldError>;

/// Validation rule. Returns the field error when the rule is violated.
pub type Rule<R> = Box<dyn Fn(&R) -> Option<FieldError> + Send + Sync>;

/// Static definition of one wizard step
pub struct StepDefinition<R> {
    index: usize,
    title: String,
    required_fields: BTreeSet<String>,
    reads: BTreeSet<usize>,
    rules: Vec<Rule<R>>,
}

impl<R: FormRecord + 'static> StepDefinition<R> {
    /// Start building step `index` (1-indexed)
    pub fn builder(index: usize, title: impl Into<String>) -> StepBuilder<R> {
        StepBuilder::new(index, title)
    }
}

impl<R: FormRecord> StepDefinition<R> {
    /// Step number (1-indexed)
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Fields this step's schema validates
    pub fn required_fields(&self) -> &BTreeSet<String> {
        &self.required_fields
    }

    /// Other steps whose fields this step's validator reads
    pub fn reads(&self) -> &BTreeSet<usize> {
        &self.reads
    }

    /// Whether a field belongs to this step
    pub fn owns(&self, field: &str) -> bool {
        self.required_fields.contains(field)
    }

    /// Run every rule against the full record
    ///
    /// All rules are evaluated so the caller gets every failing field at once,
    /// in declaration order.
    pub fn validate(&self, record: &R) -> Result<(), FieldErrors> {
        let errors: FieldErrors = self.rules.iter().filter_map(|rule| rule(record)).collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl<R> fmt::Debug for StepDefinition<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("index", &self.index)
            .field("title", &self.title)
            .field("required_fields", &self.required_fields)
            .field("reads", &self.reads)
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Builder for [`StepDefinition`]
pub struct StepBuilder<R> {
    index: usize,
    title: String,
    required_fields: BTreeSet<String>,
    reads: BTreeSet<usize>,
    rules: Vec<Rule<R>>,
}

impl<R: FormRecord + 'static> StepBuilder<R> {
    pub fn new(index: usize, title: impl Into<String>) -> Self {
        Self {
            index,
            title: title.into(),
            required_fields: BTreeSet::new(),
            reads: BTreeSet::new(),
            rules: Vec::new(),
        }
    }

    /// Declare a field as owned by this step without attaching a rule
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.required_fields.insert(name.into());
        self
    }

    /// Field must not be blank
    pub fn require(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = field.into();
        let message = message.into();
        self.required_fields.insert(field.clone());
        self.rules.push(Box::new(move |record: &R| {
            if record.field(&field).is_blank() {
                Some(FieldError::new(&field, &message))
            } else {
                None
            }
        }));
        self
    }

    /// Field must not be blank while `condition` holds on the record
    ///
    /// Used for conditional fields, e.g. a report number that is only
    /// required once "police report filed" is ticked.
    pub fn require_if(
        mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        condition: impl Fn(&R) -> bool + Send + Sync + 'static,
    ) -> Self {
        let field = field.into();
        let message = message.into();
        self.required_fields.insert(field.clone());
        self.rules.push(Box::new(move |record: &R| {
            if condition(record) && record.field(&field).is_blank() {
                Some(FieldError::new(&field, &message))
            } else {
                None
            }
        }));
        self
    }

    /// Field must satisfy `check` (blank values are left to `require`)
    pub fn check(
        mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        check: impl Fn(&FieldValue) -> bool + Send + Sync + 'static,
    ) -> Self {
        let field = field.into();
        let message = message.into();
        self.required_fields.insert(field.clone());
        self.rules.push(Box::new(move |record: &R| {
            let value = record.field(&field);
            if !value.is_blank() && !check(&value) {
                Some(FieldError::new(&field, &message))
            } else {
                None
            }
        }));
        self
    }

    /// Arbitrary rule over the whole record
    pub fn validate(
        mut self,
        rule: impl Fn(&R) -> Option<FieldError> + Send + Sync + 'static,
    ) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Declare that this step's rules read fields owned by step `index`
    pub fn reads(mut self, index: usize) -> Self {
        if index != self.index {
            self.reads.insert(index);
        }
        self
    }

    pub fn build(self) -> StepDefinition<R> {
        StepDefinition {
            index: self.index,
            title: self.title,
            required_fields: self.required_fields,
            reads: self.reads,
            rules: self.rules,
        }
    }
}
