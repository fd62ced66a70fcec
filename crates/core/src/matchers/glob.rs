//! Shell-style wildcard matcher.
//!
//! Supported syntax: `*` (any run, including empty), `?` (exactly one
//! character), `[abc]` / `[a-z]` (character class) and `[!abc]` / `[^abc]`
//! (negated class). An unterminated `[` is taken literally. Matching is
//! case-insensitive and covers the whole candidate.

use regex::RegexBuilder;

use super::Matcher;

/// Matches values against shell-style glob patterns.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobMatcher;

/// Translate a glob pattern into an anchored regex source.
#[must_use]
pub fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                while i + 1 < chars.len() && chars[i + 1] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => match parse_class(&chars, i) {
                Some((class, end)) => {
                    out.push_str(&class);
                    i = end;
                }
                None => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
        i += 1;
    }

    out.push('$');
    out
}

/// Parse a character class starting at `chars[start] == '['`.
///
/// Returns the regex class and the index of the closing `]`.
fn parse_class(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut j = start + 1;
    let negated = matches!(chars.get(j), Some('!' | '^'));
    if negated {
        j += 1;
    }

    let members_start = j;
    // A `]` right after the opening bracket is a member, not the terminator.
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    if j >= chars.len() {
        return None;
    }

    let mut class = String::from("[");
    if negated {
        class.push('^');
    }
    for &c in &chars[members_start..j] {
        if matches!(c, '\\' | '[' | ']' | '^' | '&' | '~') {
            class.push('\\');
        }
        class.push(c);
    }
    class.push(']');
    Some((class, j))
}

impl Matcher for GlobMatcher {
    fn match_type(&self) -> &'static str {
        "glob"
    }

    fn normalize(&self, value: &str) -> String {
        value.trim().to_string()
    }

    fn matches(&self, stored: &str, candidate: &str) -> bool {
        let pattern = self.normalize(stored);
        if pattern.is_empty() {
            return false;
        }
        let candidate = self.normalize(candidate);

        match RegexBuilder::new(&glob_to_regex(&pattern))
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
        {
            Ok(re) => re.is_match(&candidate),
            Err(e) => {
                tracing::debug!(pattern, error = %e, "Rejected glob pattern");
                false
            }
        }
    }

    fn validate(&self, value: &str) -> bool {
        !value.trim().is_empty()
    }
}
