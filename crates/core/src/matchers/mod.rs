//! Value matchers.
//!
//! A matcher owns the normalization, comparison, validation and extraction
//! rules for one kind of value (email, IP, phone number, ...). Matchers are
//! stateless and never fail: malformed input degrades to an empty string,
//! `false` or `None`.

pub mod country;
pub mod domain;
pub mod email;
pub mod exact;
pub mod fingerprint;
pub mod glob;
pub mod ip;
pub mod phone;
pub mod regex;
pub mod registry;

pub use country::CountryMatcher;
pub use domain::DomainMatcher;
pub use email::EmailMatcher;
pub use exact::ExactMatcher;
pub use fingerprint::FingerprintMatcher;
pub use glob::GlobMatcher;
pub use ip::IpMatcher;
pub use phone::PhoneMatcher;
pub use self::regex::RegexMatcher;
pub use registry::MatcherRegistry;

use serde_json::Value;

/// Contract shared by every value matcher.
pub trait Matcher: Send + Sync {
    /// Type identifier this matcher is registered under.
    fn match_type(&self) -> &'static str;

    /// Canonical form of a value. Unconvertible input yields an empty string.
    fn normalize(&self, value: &str) -> String;

    /// Whether `candidate` is covered by the stored value or pattern.
    fn matches(&self, stored: &str, candidate: &str) -> bool;

    /// Whether `value` is acceptable as a stored value or pattern.
    fn validate(&self, value: &str) -> bool;

    /// Pull a sub-component out of a value (e.g. the domain of an email).
    fn extract(&self, _value: &str) -> Option<String> {
        None
    }
}

/// Convert an untyped value into a candidate string.
///
/// Strings pass through, numbers and booleans are stringified, anything else
/// becomes an empty string so that comparisons fail naturally.
#[must_use]
pub fn candidate_from_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}
