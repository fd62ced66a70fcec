//! Device fingerprint matcher.

use super::Matcher;

const MIN_LENGTH: usize = 8;
const MAX_LENGTH: usize = 128;

/// Exact, case-sensitive comparison of opaque device fingerprints.
///
/// Fingerprints are hashes, so no wildcard or pattern syntax is honoured.
#[derive(Debug, Clone, Copy, Default)]
pub struct FingerprintMatcher;

impl Matcher for FingerprintMatcher {
    fn match_type(&self) -> &'static str {
        "fingerprint"
    }

    fn normalize(&self, value: &str) -> String {
        value.trim().to_string()
    }

    fn matches(&self, stored: &str, candidate: &str) -> bool {
        let stored = self.normalize(stored);
        !stored.is_empty() && stored == self.normalize(candidate)
    }

    fn validate(&self, value: &str) -> bool {
        let value = value.trim();
        (MIN_LENGTH..=MAX_LENGTH).contains(&value.len())
            && value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    }
}
