//! Email address matcher.
//!
//! Stored values are either a full address (`spam@example.com`) or a pattern
//! where `*` stands for any run of characters that does not cross the `@`
//! (`*@example.com`, `admin@*`, `*bot*@example.*`).

use regex::RegexBuilder;

use super::Matcher;
use super::domain::is_valid_hostname;

/// Matches email addresses, with `*` wildcards in either part.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailMatcher;

impl EmailMatcher {
    /// Translate a wildcard pattern into an anchored regex source.
    fn wildcard_to_regex(pattern: &str) -> String {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("[^@]*");
        format!("^{body}$")
    }

    fn wildcard_matches(pattern: &str, candidate: &str) -> bool {
        match RegexBuilder::new(&Self::wildcard_to_regex(pattern))
            .case_insensitive(true)
            .build()
        {
            Ok(re) => re.is_match(candidate),
            Err(e) => {
                tracing::debug!(pattern, error = %e, "Rejected email wildcard pattern");
                false
            }
        }
    }

    fn split_address(value: &str) -> Option<(&str, &str)> {
        let mut parts = value.split('@');
        let local = parts.next()?;
        let domain = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        Some((local, domain))
    }

    fn is_valid_local_part(local: &str) -> bool {
        !local.is_empty()
            && local.len() <= 64
            && !local.starts_with('.')
            && !local.ends_with('.')
            && !local.contains("..")
            && local
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$%&'+-/=?^_`{|}~.".contains(c))
    }
}

impl Matcher for EmailMatcher {
    fn match_type(&self) -> &'static str {
        "email"
    }

    fn normalize(&self, value: &str) -> String {
        value.to_lowercase().trim().to_string()
    }

    fn matches(&self, stored: &str, candidate: &str) -> bool {
        let stored = self.normalize(stored);
        let candidate = self.normalize(candidate);
        if stored.is_empty() || candidate.is_empty() {
            return false;
        }

        if stored.contains('*') {
            Self::wildcard_matches(&stored, &candidate)
        } else {
            stored == candidate
        }
    }

    fn validate(&self, value: &str) -> bool {
        let value = self.normalize(value);
        let Some((local, domain)) = Self::split_address(&value) else {
            return false;
        };

        if value.contains('*') {
            let has_content = |side: &str| side.chars().any(|c| c != '*');
            return !local.is_empty()
                && !domain.is_empty()
                && !value.chars().any(char::is_whitespace)
                && (has_content(local) || has_content(domain));
        }

        Self::is_valid_local_part(local) && domain.contains('.') && is_valid_hostname(domain)
    }

    fn extract(&self, value: &str) -> Option<String> {
        let value = self.normalize(value);
        let (_, domain) = Self::split_address(&value)?;
        (!domain.is_empty()).then(|| domain.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let matcher = EmailMatcher;
        assert!(matcher.matches("Spam@Example.com", " spam@example.COM "));
        assert!(!matcher.matches("spam@example.com", "spam2@example.com"));
    }

    #[test]
    fn test_wildcard_local_part() {
        let matcher = EmailMatcher;
        assert!(matcher.matches("*@x.com", "a@x.com"));
        assert!(matcher.matches("*@x.com", "A.B+tag@X.COM"));
        assert!(!matcher.matches("*@x.com", "a@y.com"));
        assert!(!matcher.matches("*@x.com", "a@sub.x.com"));
    }

    #[test]
    fn test_wildcard_does_not_cross_at_sign() {
        let matcher = EmailMatcher;
        assert!(matcher.matches("admin@*", "admin@example.org"));
        assert!(!matcher.matches("admin@*", "superadmin@example.org"));
        assert!(!matcher.matches("a*@x.com", "a@b@x.com"));
    }

    #[test]
    fn test_wildcard_in_both_parts() {
        let matcher = EmailMatcher;
        assert!(matcher.matches("*bot*@mail.*", "spambot99@mail.ru"));
        assert!(!matcher.matches("*bot*@mail.*", "human@mail.ru"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let matcher = EmailMatcher;
        assert!(matcher.matches("a.b+*@x.com", "a.b+1@x.com"));
        assert!(!matcher.matches("a.b+*@x.com", "axb+1@x.com"));
    }

    #[test]
    fn test_validate() {
        let matcher = EmailMatcher;
        assert!(matcher.validate("user@example.com"));
        assert!(matcher.validate("*@example.com"));
        assert!(matcher.validate("user@*"));
        assert!(!matcher.validate("*@*"));
        assert!(!matcher.validate("**@**"));
        assert!(!matcher.validate("no-at-sign"));
        assert!(!matcher.validate("two@@example.com"));
        assert!(!matcher.validate("a@b@example.com"));
        assert!(!matcher.validate("user@localhost"));
        assert!(!matcher.validate("@example.com"));
        assert!(!matcher.validate("*@"));
    }

    #[test]
    fn test_extract_domain() {
        let matcher = EmailMatcher;
        assert_eq!(
            matcher.extract("User@Example.com"),
            Some("example.com".to_string())
        );
        assert_eq!(matcher.extract("not-an-email"), None);
        assert_eq!(matcher.extract("a@b@c"), None);
        assert_eq!(matcher.extract("user@"), None);
    }
}
