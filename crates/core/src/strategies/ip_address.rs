//! Client IP gate.

use std::sync::Arc;

use serde_json::Value;

use super::{Metadata, Strategy, present};
use crate::context::RequestContext;
use crate::matchers::{IpMatcher, Matcher, candidate_from_value};
use crate::resolvers::IpResolver;

/// Applies when the client IP falls within `metadata.ip`.
///
/// `ip` holds an address or CIDR range, or a list of them (any may match).
pub struct IpAddressStrategy {
    resolver: Arc<dyn IpResolver>,
    matcher: IpMatcher,
}

impl IpAddressStrategy {
    /// Registry identifier.
    pub const IDENTIFIER: &'static str = "ip_address";

    /// Create a strategy resolving client IPs with `resolver`.
    #[must_use]
    pub fn new(resolver: Arc<dyn IpResolver>) -> Self {
        Self {
            resolver,
            matcher: IpMatcher,
        }
    }
}

impl Strategy for IpAddressStrategy {
    fn identifier(&self) -> &str {
        Self::IDENTIFIER
    }

    fn matches(&self, ctx: &RequestContext, metadata: &Metadata) -> bool {
        let Some(pattern) = present(metadata, "ip") else {
            return false;
        };
        let Some(client_ip) = self.resolver.resolve(ctx) else {
            tracing::debug!("Client IP unresolved; ip_address gate closed");
            return false;
        };

        match pattern {
            Value::Array(patterns) => patterns
                .iter()
                .any(|p| self.matcher.matches(&candidate_from_value(p), &client_ip)),
            single => self
                .matcher
                .matches(&candidate_from_value(single), &client_ip),
        }
    }
}
