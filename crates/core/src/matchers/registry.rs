//! Matcher lookup by type identifier.

use std::collections::HashMap;
use std::sync::Arc;

use sanction_common::RegexLimits;

use super::{
    CountryMatcher, DomainMatcher, EmailMatcher, ExactMatcher, FingerprintMatcher, GlobMatcher,
    IpMatcher, Matcher, PhoneMatcher, RegexMatcher,
};

/// Maps type identifiers (`"email"`, `"ip"`, ...) to matcher instances.
///
/// Populated once at startup and read-only afterwards. Unknown types are not
/// an error here: lookups return `None` and the convenience methods return
/// `false`, leaving it to the caller to treat the criterion as invalid.
#[derive(Clone, Default)]
pub struct MatcherRegistry {
    matchers: HashMap<String, Arc<dyn Matcher>>,
}

impl MatcherRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the nine built-in matchers.
    #[must_use]
    pub fn with_defaults(regex_limits: RegexLimits) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ExactMatcher));
        registry.register(Arc::new(EmailMatcher));
        registry.register(Arc::new(DomainMatcher));
        registry.register(Arc::new(PhoneMatcher));
        registry.register(Arc::new(IpMatcher));
        registry.register(Arc::new(CountryMatcher));
        registry.register(Arc::new(FingerprintMatcher));
        registry.register(Arc::new(GlobMatcher));
        registry.register(Arc::new(RegexMatcher::new(regex_limits)));
        registry
    }

    /// Register a matcher under its own type identifier, replacing any
    /// previous matcher with the same identifier.
    pub fn register(&mut self, matcher: Arc<dyn Matcher>) -> &mut Self {
        self.matchers
            .insert(matcher.match_type().to_string(), matcher);
        self
    }

    /// Look up a matcher.
    #[must_use]
    pub fn get(&self, match_type: &str) -> Option<Arc<dyn Matcher>> {
        self.matchers.get(match_type).cloned()
    }

    /// Whether a matcher is registered for `match_type`.
    #[must_use]
    pub fn contains(&self, match_type: &str) -> bool {
        self.matchers.contains_key(match_type)
    }

    /// Registered type identifiers, sorted.
    #[must_use]
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.matchers.keys().cloned().collect();
        types.sort();
        types
    }

    /// Evaluate `candidate` against a stored value of the given type.
    #[must_use]
    pub fn matches(&self, match_type: &str, stored: &str, candidate: &str) -> bool {
        match self.matchers.get(match_type) {
            Some(matcher) => matcher.matches(stored, candidate),
            None => {
                tracing::warn!(match_type, "No matcher registered for type");
                false
            }
        }
    }

    /// Validate a stored value of the given type.
    #[must_use]
    pub fn validate(&self, match_type: &str, value: &str) -> bool {
        self.matchers
            .get(match_type)
            .is_some_and(|matcher| matcher.validate(value))
    }

    /// Normalize a value of the given type.
    #[must_use]
    pub fn normalize(&self, match_type: &str, value: &str) -> Option<String> {
        self.matchers
            .get(match_type)
            .map(|matcher| matcher.normalize(value))
    }
}

impl std::fmt::Debug for MatcherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatcherRegistry")
            .field("types", &self.types())
            .finish()
    }
}
