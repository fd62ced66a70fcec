//! Exact string matcher.

use super::Matcher;

/// Case-sensitive equality after trimming. Empty values never match.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl Matcher for ExactMatcher {
    fn match_type(&self) -> &'static str {
        "exact"
    }

    fn normalize(&self, value: &str) -> String {
        value.trim().to_string()
    }

    fn matches(&self, stored: &str, candidate: &str) -> bool {
        let stored = self.normalize(stored);
        !stored.is_empty() && stored == self.normalize(candidate)
    }

    fn validate(&self, value: &str) -> bool {
        !value.trim().is_empty()
    }
}
