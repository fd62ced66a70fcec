//! Strategies: conditional gates evaluated against request facts.
//!
//! A suspension may name a strategy and carry metadata for it. The
//! suspension only applies to a request when its strategy returns `true`.
//! Strategies never fail; a missing fact (no client IP, unknown country,
//! malformed metadata) means the gate is closed and the suspension does not
//! apply to this request.

pub mod conditional;
pub mod country;
pub mod device_fingerprint;
pub mod ip_address;
pub mod registry;
pub mod simple;
pub mod time_window;

pub use conditional::{ConditionalStrategy, truthy};
pub use country::CountryStrategy;
pub use device_fingerprint::DeviceFingerprintStrategy;
pub use ip_address::IpAddressStrategy;
pub use registry::StrategyRegistry;
pub use simple::SimpleStrategy;
pub use time_window::TimeWindowStrategy;

use serde_json::{Map, Value};

use crate::context::RequestContext;

/// Strategy metadata as stored on a suspension.
pub type Metadata = Map<String, Value>;

/// Contract shared by every strategy.
pub trait Strategy: Send + Sync {
    /// Identifier this strategy is registered under.
    fn identifier(&self) -> &str;

    /// Whether the gate is open for this request.
    fn matches(&self, ctx: &RequestContext, metadata: &Metadata) -> bool;
}

/// Fetch a metadata entry, treating JSON `null` as absent.
pub(crate) fn present<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a Value> {
    metadata.get(key).filter(|value| !value.is_null())
}
