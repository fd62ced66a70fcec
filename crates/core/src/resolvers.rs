//! Collaborators that turn a request into facts (client IP, location,
//! device fingerprint).
//!
//! Resolution may involve I/O, caching and timeouts; all of that belongs to
//! the implementation. The core only relies on the call contract: a missing
//! fact is `None`, never an error.

use std::collections::HashMap;
use std::net::IpAddr;

use crate::context::RequestContext;

/// Extracts the client IP from a request.
pub trait IpResolver: Send + Sync {
    /// The client IP, if it can be determined.
    fn resolve(&self, ctx: &RequestContext) -> Option<String>;
}

/// Looks up geographic facts for an IP address.
pub trait GeoResolver: Send + Sync {
    /// ISO 3166-1 alpha-2 country code.
    fn country(&self, ip: &str) -> Option<String>;

    /// Region or state name.
    fn region(&self, _ip: &str) -> Option<String> {
        None
    }

    /// City name.
    fn city(&self, _ip: &str) -> Option<String> {
        None
    }

    /// Latitude and longitude.
    fn coordinates(&self, _ip: &str) -> Option<(f64, f64)> {
        None
    }
}

/// Extracts a device fingerprint from a request.
pub trait DeviceResolver: Send + Sync {
    /// The caller's fingerprint, if present.
    fn resolve(&self, ctx: &RequestContext) -> Option<String>;
}

/// Uses the socket peer address.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteAddrIpResolver;

impl IpResolver for RemoteAddrIpResolver {
    fn resolve(&self, ctx: &RequestContext) -> Option<String> {
        ctx.remote_addr().map(|addr| addr.to_string())
    }
}

/// Reads the client IP from proxy headers, falling back to the peer address.
///
/// Only deploy behind a proxy that overwrites these headers; otherwise the
/// client chooses its own IP.
#[derive(Debug, Clone)]
pub struct HeaderIpResolver {
    headers: Vec<String>,
}

impl Default for HeaderIpResolver {
    fn default() -> Self {
        Self::new(["x-forwarded-for", "x-real-ip"])
    }
}

impl HeaderIpResolver {
    /// Consult `headers` in order.
    #[must_use]
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
        }
    }
}

impl IpResolver for HeaderIpResolver {
    fn resolve(&self, ctx: &RequestContext) -> Option<String> {
        // X-Forwarded-For lists the original client first.
        self.headers
            .iter()
            .filter_map(|name| ctx.header(name))
            .flat_map(|value| value.split(','))
            .find_map(|candidate| candidate.trim().parse::<IpAddr>().ok())
            .or_else(|| ctx.remote_addr())
            .map(|addr| addr.to_string())
    }
}

/// Reads the device fingerprint from a request header.
#[derive(Debug, Clone)]
pub struct HeaderDeviceResolver {
    header: String,
}

impl Default for HeaderDeviceResolver {
    fn default() -> Self {
        Self::new("x-device-fingerprint")
    }
}

impl HeaderDeviceResolver {
    /// Read the fingerprint from `header`.
    #[must_use]
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl DeviceResolver for HeaderDeviceResolver {
    fn resolve(&self, ctx: &RequestContext) -> Option<String> {
        ctx.header(&self.header)
            .map(str::trim)
            .filter(|fp| !fp.is_empty())
            .map(str::to_string)
    }
}

/// Geographic facts for one address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoLocation {
    /// ISO 3166-1 alpha-2 country code.
    pub country: Option<String>,
    /// Region or state name.
    pub region: Option<String>,
    /// City name.
    pub city: Option<String>,
    /// Latitude and longitude.
    pub coordinates: Option<(f64, f64)>,
}

impl GeoLocation {
    /// A location known only by country.
    #[must_use]
    pub fn country(code: impl Into<String>) -> Self {
        Self {
            country: Some(code.into()),
            ..Self::default()
        }
    }
}

/// Fixed in-memory lookup table, keyed by IP literal.
#[derive(Debug, Clone, Default)]
pub struct StaticGeoResolver {
    locations: HashMap<String, GeoLocation>,
}

impl StaticGeoResolver {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the location for `ip`.
    #[must_use]
    pub fn with_location(mut self, ip: &str, location: GeoLocation) -> Self {
        self.locations.insert(ip.trim().to_string(), location);
        self
    }

    fn lookup(&self, ip: &str) -> Option<&GeoLocation> {
        self.locations.get(ip.trim())
    }
}

impl GeoResolver for StaticGeoResolver {
    fn country(&self, ip: &str) -> Option<String> {
        self.lookup(ip)?.country.clone()
    }

    fn region(&self, ip: &str) -> Option<String> {
        self.lookup(ip)?.region.clone()
    }

    fn city(&self, ip: &str) -> Option<String> {
        self.lookup(ip)?.city.clone()
    }

    fn coordinates(&self, ip: &str) -> Option<(f64, f64)> {
        self.lookup(ip)?.coordinates
    }
}

/// Resolves nothing. Country gates never apply with this resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeoResolver;

impl GeoResolver for NoGeoResolver {
    fn country(&self, _ip: &str) -> Option<String> {
        None
    }
}
