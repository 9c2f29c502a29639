//! Form records
//!
//! A record is the union of every step's fields for one wizard session.
//! The engine only talks to records through [`FormRecord`], so typed claim
//! structs and the loosely-typed [`DynamicRecord`] are interchangeable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single field value as entered by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    /// Not yet filled in
    #[default]
    Empty,

    /// Free text (dates travel as ISO `YYYY-MM-DD` text)
    Text(String),

    /// Checkbox / toggle
    Bool(bool),

    /// Numeric input
    Number(f64),
}

impl FieldValue {
    /// True for `Empty` and whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
        }
    }

    /// Text content, trimmed. Non-text values yield an empty string.
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(text) => text.trim(),
            _ => "",
        }
    }

    /// Boolean content. Anything that is not `Bool(true)` is false.
    pub fn as_bool(&self) -> bool {
        matches!(self, FieldValue::Bool(true))
    }

    /// Numeric content. Numeric text is parsed, everything else is `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Text(text) => write!(f, "{}", text),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Empty)
    }
}

/// Record shape the wizard engine can drive
pub trait FormRecord {
    /// Read a field by name. Unknown names read as `Empty`.
    fn field(&self, name: &str) -> FieldValue;

    /// Write a field by name. Returns false when the record has no such field.
    fn set_field(&mut self, name: &str, value: FieldValue) -> bool;

    /// All field names this record declares
    fn field_names(&self) -> Vec<String>;
}

/// String-keyed record for forms without a dedicated struct
///
/// The set of field names is fixed at construction; writes to names that
/// were never declared are refused.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicRecord {
    values: BTreeMap<String, FieldValue>,
}

impl DynamicRecord {
    /// Create an empty record with no declared fields
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field with its default value
    pub fn with_field(mut self, name: impl Into<String>, default: impl Into<FieldValue>) -> Self {
        self.values.insert(name.into(), default.into());
        self
    }

    /// Whether the field was declared
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FormRecord for DynamicRecord {
    fn field(&self, name: &str) -> FieldValue {
        self.values.get(name).cloned().unwrap_or_default()
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn field_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values() {
        assert!(FieldValue::Empty.is_blank());
        assert!(FieldValue::from("   ").is_blank());
        assert!(!FieldValue::from("x").is_blank());
        assert!(!FieldValue::Bool(false).is_blank());
        assert!(!FieldValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(FieldValue::from("  hello ").as_text(), "hello");
        assert_eq!(FieldValue::Bool(true).as_text(), "");
        assert!(FieldValue::Bool(true).as_bool());
        assert!(!FieldValue::from("true").as_bool());
        assert_eq!(FieldValue::from("12.5").as_number(), Some(12.5));
        assert_eq!(FieldValue::from(3_i64).as_number(), Some(3.0));
        assert_eq!(FieldValue::Empty.as_number(), None);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(FieldValue::from(None::<&str>), FieldValue::Empty);
        assert_eq!(FieldValue::from(Some("a")), FieldValue::Text("a".to_string()));
    }

    #[test]
    fn test_dynamic_record_defaults() {
        let record = DynamicRecord::new()
            .with_field("name", "")
            .with_field("agree", false);

        assert_eq!(record.len(), 2);
        assert_eq!(record.field_names(), vec!["agree".to_string(), "name".to_string()]);
        assert_eq!(record.field("name"), FieldValue::Text(String::new()));
        assert_eq!(record.field("agree"), FieldValue::Bool(false));
        assert_eq!(record.field("missing"), FieldValue::Empty);
    }

    #[test]
    fn test_dynamic_record_rejects_unknown_fields() {
        let mut record = DynamicRecord::new().with_field("name", "");

        assert!(record.set_field("name", "Ada".into()));
        assert!(!record.set_field("nickname", "A".into()));
        assert!(!record.contains("nickname"));
        assert_eq!(record.field("name").as_text(), "Ada");
    }

    #[test]
    fn test_dynamic_record_serializes_flat() {
        let record = DynamicRecord::new()
            .with_field("name", "Ada")
            .with_field("agree", true)
            .with_field("count", 2_i64);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "Ada");
        assert_eq!(json["agree"], true);
        assert_eq!(json["count"], 2.0);
    }
}
