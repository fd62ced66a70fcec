//! Domain name matcher.
//!
//! A stored plain domain covers itself and all of its subdomains. A stored
//! `*.example.com` covers `example.com` and every subdomain as well; the
//! wildcard form exists so administrators can be explicit about intent.

use super::Matcher;

const MAX_DOMAIN_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;

/// Whether `host` is a syntactically valid hostname (one or more labels).
pub(crate) fn is_valid_hostname(host: &str) -> bool {
    if host.is_empty() || host.len() > MAX_DOMAIN_LENGTH {
        return false;
    }

    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LENGTH
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    })
}

/// Matches domains and their subdomains.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainMatcher;

impl DomainMatcher {
    fn strip_scheme(mut value: &str) -> &str {
        loop {
            if let Some(rest) = value.strip_prefix("https://") {
                value = rest;
            } else if let Some(rest) = value.strip_prefix("http://") {
                value = rest;
            } else {
                return value;
            }
        }
    }

    fn strip_path(value: &str) -> &str {
        match value.find(['/', '?', '#']) {
            Some(idx) => &value[..idx],
            None => value,
        }
    }

    fn strip_port(value: &str) -> &str {
        // Several colons means a bare IPv6 literal; leave it alone.
        match value.split_once(':') {
            Some((host, port)) if !port.contains(':') => host,
            _ => value,
        }
    }

    fn covers(base: &str, candidate: &str) -> bool {
        candidate == base
            || candidate
                .strip_suffix(base)
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}

impl Matcher for DomainMatcher {
    fn match_type(&self) -> &'static str {
        "domain"
    }

    fn normalize(&self, value: &str) -> String {
        let value = value.trim().to_lowercase();
        let value = Self::strip_scheme(&value);
        let value = Self::strip_path(value);
        let value = Self::strip_port(value);
        value
            .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
            .trim_start()
            .to_string()
    }

    fn matches(&self, stored: &str, candidate: &str) -> bool {
        let stored = self.normalize(stored);
        let candidate = self.normalize(candidate);
        if stored.is_empty() || candidate.is_empty() {
            return false;
        }

        match stored.strip_prefix("*.") {
            Some(base) if !base.is_empty() => Self::covers(base, &candidate),
            Some(_) => false,
            None => Self::covers(&stored, &candidate),
        }
    }

    fn validate(&self, value: &str) -> bool {
        let value = self.normalize(value);
        let host = value.strip_prefix("*.").unwrap_or(&value);
        is_valid_hostname(host)
    }

    fn extract(&self, value: &str) -> Option<String> {
        let value = self.normalize(value);
        let host = value.strip_prefix("*.").unwrap_or(&value);
        if !is_valid_hostname(host) {
            return None;
        }

        let labels: Vec<&str> = host.split('.').collect();
        let root = if labels.len() > 2 {
            labels[labels.len() - 2..].join(".")
        } else {
            host.to_string()
        };
        Some(root)
    }
}
