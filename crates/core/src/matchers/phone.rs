//! Phone number matcher.
//!
//! Numbers are reduced to their digits, keeping a single leading `+`. A stored
//! value ending in `*` is a prefix pattern (`+1555*`). Equality ignores the
//! leading `+` so that `+15551234567` and `15551234567` are the same number.

use super::Matcher;

const MIN_DIGITS: usize = 7;
const MAX_DIGITS: usize = 15;

/// Two-digit ITU calling codes. Zones 1 and 7 use one digit; anything not
/// listed here uses three.
const TWO_DIGIT_CALLING_CODES: &[&str] = &[
    "20", "27", "30", "31", "32", "33", "34", "36", "39", "40", "41", "43", "44", "45", "46",
    "47", "48", "49", "51", "52", "53", "54", "55", "56", "57", "58", "60", "61", "62", "63",
    "64", "65", "66", "81", "82", "84", "86", "90", "91", "92", "93", "94", "95", "98",
];

/// Matches phone numbers by digits, with prefix wildcards.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneMatcher;

impl PhoneMatcher {
    fn digits(normalized: &str) -> &str {
        normalized.strip_prefix('+').unwrap_or(normalized)
    }

    fn calling_code(digits: &str) -> Option<&str> {
        let first = digits.chars().next()?;
        let len = match first {
            '1' | '7' => 1,
            '0' => return None,
            _ if digits.len() >= 2 && TWO_DIGIT_CALLING_CODES.contains(&&digits[..2]) => 2,
            _ => 3,
        };
        digits.get(..len)
    }
}

impl Matcher for PhoneMatcher {
    fn match_type(&self) -> &'static str {
        "phone"
    }

    fn normalize(&self, value: &str) -> String {
        let value = value.trim();
        let mut normalized = String::with_capacity(value.len());
        if value.starts_with('+') {
            normalized.push('+');
        }
        normalized.extend(value.chars().filter(char::is_ascii_digit));
        normalized
    }

    fn matches(&self, stored: &str, candidate: &str) -> bool {
        let candidate = self.normalize(candidate);
        let candidate_digits = Self::digits(&candidate);
        if candidate_digits.is_empty() {
            return false;
        }

        if let Some(prefix) = stored.trim().strip_suffix('*') {
            let prefix = self.normalize(prefix);
            let prefix_digits = Self::digits(&prefix);
            return !prefix_digits.is_empty() && candidate_digits.starts_with(prefix_digits);
        }

        let stored = self.normalize(stored);
        if stored == candidate {
            return true;
        }
        let stored_digits = Self::digits(&stored);
        !stored_digits.is_empty() && stored_digits == candidate_digits
    }

    fn validate(&self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }

        let (body, is_prefix) = match value.strip_suffix('*') {
            Some(body) => (body, true),
            None => (value, false),
        };
        if body.contains('*') {
            return false;
        }

        let normalized = self.normalize(body);
        let count = Self::digits(&normalized).len();
        if is_prefix {
            (1..=MAX_DIGITS).contains(&count)
        } else {
            (MIN_DIGITS..=MAX_DIGITS).contains(&count)
        }
    }

    fn extract(&self, value: &str) -> Option<String> {
        let normalized = self.normalize(value);
        let digits = normalized.strip_prefix('+')?;
        Self::calling_code(digits).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let matcher = PhoneMatcher;
        assert_eq!(matcher.normalize("+1 (555) 123-4567"), "+15551234567");
        assert_eq!(matcher.normalize("555.123.4567"), "5551234567");
        assert_eq!(matcher.normalize("++12+34"), "+1234");
        assert_eq!(matcher.normalize("call me"), "");
    }

    #[test]
    fn test_exact_and_plus_insensitive_match() {
        let matcher = PhoneMatcher;
        assert!(matcher.matches("+1 555 123 4567", "+15551234567"));
        assert!(matcher.matches("+15551234567", "15551234567"));
        assert!(matcher.matches("15551234567", "+1-555-123-4567"));
        assert!(!matcher.matches("+15551234567", "+15551234568"));
    }

    #[test]
    fn test_prefix_wildcard() {
        let matcher = PhoneMatcher;
        assert!(matcher.matches("+1555*", "+1 555 999 0000"));
        assert!(matcher.matches("+1555*", "15559990000"));
        assert!(!matcher.matches("+1555*", "+1666 999 0000"));
        assert!(!matcher.matches("*", "+15551234567"));
    }

    #[test]
    fn test_empty_candidate() {
        let matcher = PhoneMatcher;
        assert!(!matcher.matches("+15551234567", "n/a"));
        assert!(!matcher.matches("", ""));
    }

    #[test]
    fn test_validate() {
        let matcher = PhoneMatcher;
        assert!(matcher.validate("+1 555 123 4567"));
        assert!(matcher.validate("1234567"));
        assert!(matcher.validate("+123456789012345"));
        assert!(matcher.validate("+44*"));
        assert!(!matcher.validate("123456"));
        assert!(!matcher.validate("+1234567890123456"));
        assert!(!matcher.validate("*"));
        assert!(!matcher.validate("+1*555*"));
        assert!(!matcher.validate(""));
    }

    #[test]
    fn test_extract_calling_code() {
        let matcher = PhoneMatcher;
        assert_eq!(matcher.extract("+1 555 123 4567"), Some("1".to_string()));
        assert_eq!(matcher.extract("+7 495 123 4567"), Some("7".to_string()));
        assert_eq!(matcher.extract("+44 20 7946 0958"), Some("44".to_string()));
        assert_eq!(matcher.extract("+353 1 234 5678"), Some("353".to_string()));
        assert_eq!(matcher.extract("+49 30 1234567"), Some("49".to_string()));
        assert_eq!(matcher.extract("020 7946 0958"), None);
        assert_eq!(matcher.extract("+"), None);
    }
}
