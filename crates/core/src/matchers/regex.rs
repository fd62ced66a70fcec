//! Delimited regular expression matcher.
//!
//! Stored patterns carry their own delimiters and trailing flags, e.g.
//! `/^spam[0-9]+$/i` or `#bot|crawler#`. Bracket-style delimiters pair up:
//! `(…)`, `[…]`, `{…}` and `<…>`.
//!
//! Patterns run on a finite-automaton engine, so catastrophic backtracking
//! cannot occur. Every compile is bounded per pattern by [`RegexLimits`]
//! (program size, lazy DFA cache size and parser nesting depth); nothing is
//! configured process-wide, so concurrent evaluations never interfere.
//! Constructs the engine cannot bound (backreferences, look-around) are
//! rejected as invalid patterns.

use regex::{Regex, RegexBuilder};
use sanction_common::RegexLimits;

use super::Matcher;

/// Flags recognised after the closing delimiter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PatternFlags {
    case_insensitive: bool,
    multi_line: bool,
    dot_all: bool,
    extended: bool,
    ungreedy: bool,
    anchored: bool,
}

impl PatternFlags {
    fn parse(flags: &str) -> Option<Self> {
        let mut parsed = Self::default();
        for flag in flags.chars() {
            match flag {
                'i' => parsed.case_insensitive = true,
                'm' => parsed.multi_line = true,
                's' => parsed.dot_all = true,
                'x' => parsed.extended = true,
                'U' => parsed.ungreedy = true,
                'A' => parsed.anchored = true,
                // Unicode mode and end-only `$` are already the engine defaults.
                'u' | 'D' => {}
                _ => return None,
            }
        }
        Some(parsed)
    }
}

/// Split `/body/flags` into its body and flags.
fn split_delimited(pattern: &str) -> Option<(&str, &str)> {
    let open = pattern.chars().next()?;
    if open.is_alphanumeric() || open.is_whitespace() || open == '\\' {
        return None;
    }
    let close = match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        '<' => '>',
        other => other,
    };

    let rest = &pattern[open.len_utf8()..];
    let end = rest.rfind(close)?;
    Some((&rest[..end], &rest[end + close.len_utf8()..]))
}

/// Matches values against delimited regular expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexMatcher {
    limits: RegexLimits,
}

impl RegexMatcher {
    /// Create a matcher that compiles patterns under `limits`.
    #[must_use]
    pub const fn new(limits: RegexLimits) -> Self {
        Self { limits }
    }

    /// The bounds applied to each compiled pattern.
    #[must_use]
    pub const fn limits(&self) -> RegexLimits {
        self.limits
    }

    /// Compile a delimited pattern under the configured bounds.
    pub fn compile(&self, pattern: &str) -> Result<Regex, String> {
        let pattern = pattern.trim();
        if pattern.len() > self.limits.max_pattern_length {
            return Err(format!(
                "pattern exceeds {} bytes",
                self.limits.max_pattern_length
            ));
        }

        let (body, flags) =
            split_delimited(pattern).ok_or_else(|| "missing or unbalanced delimiters".to_string())?;
        let flags = PatternFlags::parse(flags).ok_or_else(|| format!("unknown flags '{flags}'"))?;

        let source = if flags.anchored {
            format!(r"\A(?:{body})")
        } else {
            body.to_string()
        };

        RegexBuilder::new(&source)
            .case_insensitive(flags.case_insensitive)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_all)
            .ignore_whitespace(flags.extended)
            .swap_greed(flags.ungreedy)
            .size_limit(self.limits.size_limit)
            .dfa_size_limit(self.limits.dfa_size_limit)
            .nest_limit(self.limits.nest_limit)
            .build()
            .map_err(|e| e.to_string())
    }
}

impl Matcher for RegexMatcher {
    fn match_type(&self) -> &'static str {
        "regex"
    }

    fn normalize(&self, value: &str) -> String {
        value.trim().to_string()
    }

    fn matches(&self, stored: &str, candidate: &str) -> bool {
        match self.compile(stored) {
            Ok(re) => {
                let matched = re.is_match(candidate);
                tracing::trace!(pattern = stored, matched, "Evaluated regex pattern");
                matched
            }
            Err(error) => {
                tracing::debug!(pattern = stored, %error, "Rejected regex pattern");
                false
            }
        }
    }

    fn validate(&self, value: &str) -> bool {
        self.compile(value).is_ok()
    }
}
