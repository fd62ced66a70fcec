//! Strategy lookup by identifier.

use std::collections::HashMap;
use std::sync::Arc;

use chrono_tz::Tz;

use super::{
    CountryStrategy, DeviceFingerprintStrategy, IpAddressStrategy, Metadata, SimpleStrategy,
    Strategy, TimeWindowStrategy,
};
use crate::clock::Clock;
use crate::context::RequestContext;
use crate::resolvers::{DeviceResolver, GeoResolver, IpResolver};

/// Maps identifiers (`"simple"`, `"time_window"`, ...) to strategies.
///
/// Populated once at startup and read-only afterwards.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn Strategy>>,
}

impl StrategyRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in strategies.
    ///
    /// Conditional strategies wrap application predicates and are registered
    /// separately with [`StrategyRegistry::register`].
    #[must_use]
    pub fn with_defaults(
        ip_resolver: Arc<dyn IpResolver>,
        geo_resolver: Arc<dyn GeoResolver>,
        device_resolver: Arc<dyn DeviceResolver>,
        default_timezone: Tz,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SimpleStrategy));
        registry.register(Arc::new(TimeWindowStrategy::with_clock(
            default_timezone,
            clock,
        )));
        registry.register(Arc::new(IpAddressStrategy::new(ip_resolver.clone())));
        registry.register(Arc::new(CountryStrategy::new(ip_resolver, geo_resolver)));
        registry.register(Arc::new(DeviceFingerprintStrategy::new(device_resolver)));
        registry
    }

    /// Register a strategy under its own identifier, replacing any previous
    /// strategy with the same identifier.
    pub fn register(&mut self, strategy: Arc<dyn Strategy>) -> &mut Self {
        self.strategies
            .insert(strategy.identifier().to_string(), strategy);
        self
    }

    /// Look up a strategy.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<Arc<dyn Strategy>> {
        self.strategies.get(identifier).cloned()
    }

    /// Whether a strategy is registered under `identifier`.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.strategies.contains_key(identifier)
    }

    /// Registered identifiers, sorted.
    #[must_use]
    pub fn identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<String> = self.strategies.keys().cloned().collect();
        identifiers.sort();
        identifiers
    }

    /// Evaluate a strategy by identifier. Unknown identifiers evaluate to
    /// `false`.
    #[must_use]
    pub fn evaluate(&self, identifier: &str, ctx: &RequestContext, metadata: &Metadata) -> bool {
        match self.strategies.get(identifier) {
            Some(strategy) => {
                let matched = strategy.matches(ctx, metadata);
                tracing::trace!(strategy = identifier, matched, "Evaluated strategy");
                matched
            }
            None => {
                tracing::warn!(strategy = identifier, "No strategy registered");
                false
            }
        }
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}
