/// Claim intake wizards
///
/// Concrete records and step schemas for the two intake flows:
/// - **Driver claim**: filed by our insured driver
/// - **Third-party claim**: filed against one of our insured vehicles
///
/// Each record is a plain serde struct; the wizard engine drives it through
/// [`FormRecord`](crate::record::FormRecord).

pub mod driver;
pub mod rules;
pub mod third_party;

pub use driver::DriverClaim;
pub use third_party::ThirdPartyClaim;

use crate::record::FieldValue;

/// Which intake flow a session belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimKind {
    Driver,
    ThirdParty,
}

impl ClaimKind {
    pub fn title(&self) -> &'static str {
        match self {
            ClaimKind::Driver => "Driver claim",
            ClaimKind::ThirdParty => "Third-party claim",
        }
    }
}

impl std::str::FromStr for ClaimKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driver" => Ok(ClaimKind::Driver),
            "third-party" | "third_party" | "thirdparty" => Ok(ClaimKind::ThirdParty),
            other => Err(format!("Unknown claim kind: {}", other)),
        }
    }
}

/// Text stored in a string field; non-text values keep their display form
fn text_field(value: FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text,
        FieldValue::Empty => String::new(),
        other => other.to_string(),
    }
}

fn number_field(value: &FieldValue) -> Option<f64> {
    value.as_number()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_kind_parsing() {
        assert_eq!("driver".parse::<ClaimKind>(), Ok(ClaimKind::Driver));
        assert_eq!("Third-Party".parse::<ClaimKind>(), Ok(ClaimKind::ThirdParty));
        assert!("fleet".parse::<ClaimKind>().is_err());
    }

    #[test]
    fn test_text_field_conversion() {
        assert_eq!(text_field(FieldValue::from("abc")), "abc");
        assert_eq!(text_field(FieldValue::Empty), "");
        assert_eq!(text_field(FieldValue::Number(12.0)), "12");
        assert_eq!(number_field(&FieldValue::Empty), None);
    }
}
