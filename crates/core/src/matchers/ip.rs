//! IP address matcher with CIDR containment.
//!
//! IPv4 ranges are compared as masked 32-bit integers. IPv6 ranges are
//! compared byte-wise: whole prefix bytes must be equal, then the partial
//! byte (if any) is compared under a high-bit mask.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::IpNet;

use super::Matcher;

/// Matches IP literals exactly, or by CIDR containment.
#[derive(Debug, Clone, Copy, Default)]
pub struct IpMatcher;

/// Whether `candidate` lies within `subnet/prefix_len` (IPv4).
///
/// A prefix longer than 32 bits never matches.
#[must_use]
pub fn ipv4_in_cidr(subnet: Ipv4Addr, prefix_len: u32, candidate: Ipv4Addr) -> bool {
    if prefix_len > 32 {
        return false;
    }
    let mask = ipv4_mask(prefix_len);
    (u32::from(subnet) & mask) == (u32::from(candidate) & mask)
}

/// Network mask for an IPv4 prefix length of at most 32.
#[must_use]
pub const fn ipv4_mask(prefix_len: u32) -> u32 {
    // `u32::MAX << 32` overflows, so /0 is special-cased.
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (32 - prefix_len)
    }
}

/// Whether `candidate` lies within `subnet/prefix_len` (IPv6).
///
/// A prefix longer than 128 bits never matches.
#[must_use]
pub fn ipv6_in_cidr(subnet: Ipv6Addr, prefix_len: u32, candidate: Ipv6Addr) -> bool {
    if prefix_len > 128 {
        return false;
    }
    let subnet = subnet.octets();
    let candidate = candidate.octets();

    let whole_bytes = (prefix_len / 8) as usize;
    if subnet[..whole_bytes] != candidate[..whole_bytes] {
        return false;
    }

    let remaining_bits = prefix_len % 8;
    if remaining_bits == 0 {
        return true;
    }
    let mask = (0xFF_u16 << (8 - remaining_bits)) as u8;
    (subnet[whole_bytes] & mask) == (candidate[whole_bytes] & mask)
}

impl IpMatcher {
    fn cidr_contains(cidr: &str, candidate: &str) -> bool {
        let Ok(net) = cidr.parse::<IpNet>() else {
            return false;
        };
        let Ok(candidate) = candidate.parse::<IpAddr>() else {
            return false;
        };

        match (net, candidate) {
            (IpNet::V4(net), IpAddr::V4(candidate)) => {
                ipv4_in_cidr(net.addr(), u32::from(net.prefix_len()), candidate)
            }
            (IpNet::V6(net), IpAddr::V6(candidate)) => {
                ipv6_in_cidr(net.addr(), u32::from(net.prefix_len()), candidate)
            }
            _ => false,
        }
    }
}

impl Matcher for IpMatcher {
    fn match_type(&self) -> &'static str {
        "ip"
    }

    fn normalize(&self, value: &str) -> String {
        value.trim().to_string()
    }

    fn matches(&self, stored: &str, candidate: &str) -> bool {
        let stored = self.normalize(stored);
        let candidate = self.normalize(candidate);
        if stored.is_empty() || candidate.is_empty() {
            return false;
        }

        if stored == candidate {
            return true;
        }
        if stored.contains('/') {
            return Self::cidr_contains(&stored, &candidate);
        }
        false
    }

    fn validate(&self, value: &str) -> bool {
        let value = self.normalize(value);
        if value.contains('/') {
            value.parse::<IpNet>().is_ok()
        } else {
            value.parse::<IpAddr>().is_ok()
        }
    }
}
