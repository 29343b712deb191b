// This file is part of posh, an interactive job-controlling shell.
// Licensed under the MIT license or the Apache License, Version 2.0, at
// your option.

//! Pattern matching for pathname (glob) expansion.
//!
//! This crate supports the subset of POSIX globbing that an interactive
//! shell's pathname expansion needs:
//!
//! - `?` — any single character other than `/`
//! - `*` — any run of characters, including none, other than `/`
//! - `[...]` — a bracket expression, with an optional leading `!` for
//!   negation and support for `a-z`-style ranges
//!
//! Like `yash-fnmatch`, matching is implemented by translating the pattern
//! to an anchored [`regex::Regex`] rather than hand-rolling a matcher; this
//! crate does not attempt locale-aware collating symbols or equivalence
//! classes, which are out of scope for this shell.

use regex::Regex;
use thiserror::Error;

/// Error returned when a pattern cannot be translated to a matcher.
#[derive(Debug, Error)]
pub enum Error {
    /// A `[` bracket expression was never closed.
    #[error("unterminated bracket expression")]
    UnterminatedBracket,
    /// The translated pattern was rejected by the regex engine.
    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),
}

/// A compiled globbing pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    literal_prefix_is_dot: bool,
}

impl Pattern {
    /// Parses a shell globbing pattern.
    pub fn parse(pattern: &str) -> Result<Self, Error> {
        let literal_prefix_is_dot = pattern.starts_with('.');
        let regex_source = translate(pattern)?;
        let regex = Regex::new(&regex_source)?;
        Ok(Pattern {
            regex,
            literal_prefix_is_dot,
        })
    }

    /// Returns whether the pattern's text begins with a literal dot, in
    /// which case the conventional exclusion of dot-files does not apply.
    #[must_use]
    pub fn literal_prefix_is_dot(&self) -> bool {
        self.literal_prefix_is_dot
    }

    /// Returns whether `name` matches this pattern in its entirety.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Returns whether `pattern` contains any unescaped globbing metacharacter.
///
/// The lexer and expander use this to decide whether a word needs to go
/// through pathname expansion at all.
#[must_use]
pub fn has_wildcard(pattern: &str) -> bool {
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '*' | '?' | '[' => return true,
            _ => {}
        }
    }
    false
}

fn translate(pattern: &str) -> Result<String, Error> {
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            '*' => {
                out.push_str("[^/]*");
                i += 1;
            }
            '[' => {
                let (fragment, next) = translate_bracket(&chars, i)?;
                out.push_str(&fragment);
                i = next;
            }
            '\\' if i + 1 < chars.len() => {
                out.push_str(&regex::escape(&chars[i + 1].to_string()));
                i += 2;
            }
            c => {
                out.push_str(&regex::escape(&c.to_string()));
                i += 1;
            }
        }
    }
    out.push('$');
    Ok(out)
}

/// Translates a `[...]` bracket expression starting at `chars[start] == '['`.
/// Returns the regex fragment and the index just past the closing `]`.
fn translate_bracket(chars: &[char], start: usize) -> Result<(String, usize), Error> {
    let mut i = start + 1;
    let negate = matches!(chars.get(i), Some('!') | Some('^'));
    if negate {
        i += 1;
    }
    // POSIX: a `]` immediately after `[` or `[!` is a literal member, not
    // the closing bracket.
    let members_start = i;
    if chars.get(i) == Some(&']') {
        i += 1;
    }
    while i < chars.len() && chars[i] != ']' {
        i += 1;
    }
    if i >= chars.len() {
        return Err(Error::UnterminatedBracket);
    }
    let members: String = chars[members_start..i].iter().collect();
    let mut fragment = String::with_capacity(members.len() + 4);
    fragment.push('[');
    if negate {
        fragment.push('^');
    }
    fragment.push_str("/"); // `/` is never matched by a bracket expression
    // Escape characters that are regex-special inside a class but not in a
    // POSIX bracket expression.
    for c in members.chars() {
        if matches!(c, '\\' | '^' | ']') {
            fragment.push('\\');
        }
        fragment.push(c);
    }
    fragment.push(']');
    Ok((fragment, i + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn matches(pattern: &str, name: &str) -> bool {
        Pattern::parse(pattern).unwrap().is_match(name)
    }

    #[test]
    fn star_matches_any_run() {
        assert!(matches("*.txt", "a.txt"));
        assert!(matches("*.txt", ".txt"));
        assert!(!matches("*.txt", "a.txt.bak"));
    }

    #[test]
    fn star_does_not_cross_slash() {
        assert!(!matches("*", "a/b"));
    }

    #[test]
    fn question_matches_one_char() {
        assert!(matches("a?c", "abc"));
        assert!(!matches("a?c", "ac"));
        assert!(!matches("a?c", "abbc"));
    }

    #[test]
    fn bracket_class_matches_member() {
        assert!(matches("[abc]", "b"));
        assert!(!matches("[abc]", "d"));
    }

    #[test]
    fn bracket_class_negation() {
        assert!(matches("[!abc]", "d"));
        assert!(!matches("[!abc]", "a"));
    }

    #[test]
    fn bracket_class_range() {
        assert!(matches("[a-z]", "m"));
        assert!(!matches("[a-z]", "M"));
    }

    #[test]
    fn unterminated_bracket_is_an_error() {
        assert_matches!(Pattern::parse("[abc"), Err(Error::UnterminatedBracket));
    }

    #[test]
    fn literal_prefix_is_dot_detects_leading_dot() {
        assert!(Pattern::parse(".*").unwrap().literal_prefix_is_dot());
        assert!(!Pattern::parse("*").unwrap().literal_prefix_is_dot());
    }

    #[test]
    fn has_wildcard_detects_metacharacters() {
        assert!(has_wildcard("*.txt"));
        assert!(has_wildcard("a?c"));
        assert!(has_wildcard("[ab]"));
        assert!(!has_wildcard("plain"));
        assert!(!has_wildcard(r"\*"));
    }
}
