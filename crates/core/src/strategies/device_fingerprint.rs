//! Device fingerprint gate.

use std::sync::Arc;

use super::{Metadata, Strategy, present};
use crate::context::RequestContext;
use crate::matchers::{FingerprintMatcher, Matcher, candidate_from_value};
use crate::resolvers::DeviceResolver;

/// Applies when the caller's device fingerprint equals `metadata.fingerprint`.
pub struct DeviceFingerprintStrategy {
    resolver: Arc<dyn DeviceResolver>,
    matcher: FingerprintMatcher,
}

impl DeviceFingerprintStrategy {
    /// Registry identifier.
    pub const IDENTIFIER: &'static str = "device_fingerprint";

    /// Create a strategy resolving fingerprints with `resolver`.
    #[must_use]
    pub fn new(resolver: Arc<dyn DeviceResolver>) -> Self {
        Self {
            resolver,
            matcher: FingerprintMatcher,
        }
    }
}

impl Strategy for DeviceFingerprintStrategy {
    fn identifier(&self) -> &str {
        Self::IDENTIFIER
    }

    fn matches(&self, ctx: &RequestContext, metadata: &Metadata) -> bool {
        let Some(expected) = present(metadata, "fingerprint") else {
            return false;
        };
        let Some(fingerprint) = self.resolver.resolve(ctx) else {
            tracing::debug!("Device fingerprint unresolved; device gate closed");
            return false;
        };

        self.matcher
            .matches(&candidate_from_value(expected), &fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolvers::HeaderDeviceResolver;
    use serde_json::{Value, json};

    fn strategy() -> DeviceFingerprintStrategy {
        DeviceFingerprintStrategy::new(Arc::new(HeaderDeviceResolver::default()))
    }

    fn ctx(fingerprint: &str) -> RequestContext {
        RequestContext::new("GET", "/").with_header("X-Device-Fingerprint", fingerprint)
    }

    fn metadata(value: Value) -> Metadata {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_exact_fingerprint() {
        let expected = metadata(json!({"fingerprint": "fp_AbC123xyz"}));
        assert!(strategy().matches(&ctx("fp_AbC123xyz"), &expected));
        assert!(strategy().matches(&ctx("  fp_AbC123xyz "), &expected));
        assert!(!strategy().matches(&ctx("fp_abc123xyz"), &expected));
    }

    #[test]
    fn test_missing_pieces_close_gate() {
        assert!(!strategy().matches(&ctx("fp_AbC123xyz"), &Metadata::new()));
        assert!(!strategy().matches(&ctx("fp_AbC123xyz"), &metadata(json!({"fingerprint": null}))));
        assert!(!strategy().matches(
            &RequestContext::default(),
            &metadata(json!({"fingerprint": "fp_AbC123xyz"}))
        ));
    }
}
