//! Geographic gate.

use std::sync::Arc;

use serde_json::Value;

use super::{Metadata, Strategy, present};
use crate::context::RequestContext;
use crate::matchers::{CountryMatcher, Matcher, candidate_from_value};
use crate::resolvers::{GeoResolver, IpResolver};

/// Applies when the client's country is listed in `metadata.countries`.
pub struct CountryStrategy {
    ip_resolver: Arc<dyn IpResolver>,
    geo_resolver: Arc<dyn GeoResolver>,
    matcher: CountryMatcher,
}

impl CountryStrategy {
    /// Registry identifier.
    pub const IDENTIFIER: &'static str = "country";

    /// Create a strategy resolving IPs, then countries.
    #[must_use]
    pub fn new(ip_resolver: Arc<dyn IpResolver>, geo_resolver: Arc<dyn GeoResolver>) -> Self {
        Self {
            ip_resolver,
            geo_resolver,
            matcher: CountryMatcher,
        }
    }
}

impl Strategy for CountryStrategy {
    fn identifier(&self) -> &str {
        Self::IDENTIFIER
    }

    fn matches(&self, ctx: &RequestContext, metadata: &Metadata) -> bool {
        let Some(Value::Array(countries)) = present(metadata, "countries") else {
            return false;
        };
        if countries.is_empty() {
            return false;
        }

        let Some(ip) = self.ip_resolver.resolve(ctx) else {
            tracing::debug!("Client IP unresolved; country gate closed");
            return false;
        };
        let Some(country) = self.geo_resolver.country(&ip) else {
            tracing::debug!(ip = %ip, "Country unresolved; country gate closed");
            return false;
        };

        countries
            .iter()
            .any(|code| self.matcher.matches(&candidate_from_value(code), &country))
    }
}
