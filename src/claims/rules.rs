/// Field format rules shared by the claim wizards
///
/// Every check takes the raw field value and is only consulted for
/// non-blank input; emptiness is handled by `require`.
use regex::Regex;
use std::sync::OnceLock;

use crate::record::FieldValue;

fn matches_pattern(cell: &'static OnceLock<Option<Regex>>, pattern: &str, text: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

/// `POL-` followed by at least six digits
pub fn is_policy_number(value: &FieldValue) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    matches_pattern(&RE, r"^POL-\d{6,}$", &value.as_text().to_ascii_uppercase())
}

pub fn is_email(value: &FieldValue) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    matches_pattern(&RE, r"^[^@\s]+@[^@\s]+\.[^@\s]+$", value.as_text())
}

/// Digits with optional leading `+`, spaces and dashes; at least seven digits
pub fn is_phone(value: &FieldValue) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let text = value.as_text();
    let digits = text.chars().filter(char::is_ascii_digit).count();
    digits >= 7 && matches_pattern(&RE, r"^\+?[0-9][0-9 \-]*$", text)
}

/// Registration plate: 2-10 letters, digits, spaces or dashes
pub fn is_plate(value: &FieldValue) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    matches_pattern(&RE, r"^[A-Za-z0-9][A-Za-z0-9 \-]{1,9}$", value.as_text())
}

/// ISO calendar date `YYYY-MM-DD`
pub fn is_iso_date(value: &FieldValue) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let text = value.as_text();
    if !matches_pattern(&RE, r"^\d{4}-\d{2}-\d{2}$", text) {
        return false;
    }

    let mut parts = text.split('-').filter_map(|p| p.parse::<u32>().ok());
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    let days_in_month = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => return false,
    };

    (1..=days_in_month).contains(&day)
}

fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Text of at least `min` characters
pub fn min_length(min: usize) -> impl Fn(&FieldValue) -> bool + Send + Sync + 'static {
    move |value: &FieldValue| value.as_text().chars().count() >= min
}

/// A number that is zero or more (numeric text accepted)
pub fn is_non_negative(value: &FieldValue) -> bool {
    value.as_number().map(|n| n.is_finite() && n >= 0.0).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::from(s)
    }

    #[test]
    fn test_policy_number() {
        assert!(is_policy_number(&text("POL-123456")));
        assert!(is_policy_number(&text("pol-1234567")));
        assert!(!is_policy_number(&text("POL-12345")));
        assert!(!is_policy_number(&text("123456")));
    }

    #[test]
    fn test_email() {
        assert!(is_email(&text("driver@example.com")));
        assert!(!is_email(&text("driver@example")));
        assert!(!is_email(&text("driver example.com")));
    }

    #[test]
    fn test_phone() {
        assert!(is_phone(&text("+44 20 7946 0958")));
        assert!(is_phone(&text("555-0100-12")));
        assert!(!is_phone(&text("12345")));
        assert!(!is_phone(&text("call me")));
    }

    #[test]
    fn test_plate() {
        assert!(is_plate(&text("AB12 CDE")));
        assert!(is_plate(&text("7-XYZ-123")));
        assert!(!is_plate(&text("A")));
        assert!(!is_plate(&text("PLATE#1")));
    }

    #[test]
    fn test_iso_date() {
        assert!(is_iso_date(&text("2024-02-29")));
        assert!(!is_iso_date(&text("2023-02-29")));
        assert!(!is_iso_date(&text("2024-13-01")));
        assert!(!is_iso_date(&text("2024-04-31")));
        assert!(!is_iso_date(&text("29/02/2024")));
    }

    #[test]
    fn test_min_length_and_amounts() {
        let check = min_length(5);
        assert!(check(&text("hello")));
        assert!(!check(&text("hey")));

        assert!(is_non_negative(&FieldValue::Number(0.0)));
        assert!(is_non_negative(&text("1200.50")));
        assert!(!is_non_negative(&FieldValue::Number(-1.0)));
        assert!(!is_non_negative(&text("lots")));
    }
}
