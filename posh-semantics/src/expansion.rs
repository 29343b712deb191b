// This file is part of posh, an interactive job-controlling shell.
// Copyright (C) 2024 posh contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Word expansion: tilde, parameter, and pathname expansion, applied in
//! that order and respecting each segment's quoting.
//!
//! Only pathname expansion can turn one word into more than one resulting
//! argument; the other two always produce exactly one string. There is no
//! field splitting independent of pathname expansion, since the lexer
//! already did all the word splitting this shell performs.

use posh_env::VariableStore;
use posh_syntax::ast::{Quoting, Stage, Word};
use std::path::Path;

/// Expands every word of a stage's argument vector into the final argv,
/// run before forking the stage.
pub fn expand_argv(stage: &Stage, vars: &VariableStore) -> Vec<String> {
    stage.words.iter().flat_map(|w| expand_word(w, vars)).collect()
}

/// Expands a word that is known to not undergo pathname expansion:
/// assignment values and redirection targets. Tilde and parameter
/// expansion still apply.
pub fn expand_scalar(word: &Word, vars: &VariableStore) -> String {
    expand_tilde_and_parameters(word, vars)
        .into_iter()
        .map(|(text, _)| text)
        .collect()
}

/// Expands one word to the final argument(s) it contributes. Ordinarily
/// this is a single-element vector; pathname expansion with
/// more than one match yields one element per match, sorted
/// lexicographically, and a pattern that matches nothing expands to
/// itself verbatim (the "NOCHECK" fallback).
pub fn expand_word(word: &Word, vars: &VariableStore) -> Vec<String> {
    let pieces = expand_tilde_and_parameters(word, vars);

    let has_wildcard = pieces
        .iter()
        .any(|(text, quoting)| *quoting == Quoting::Unquoted && posh_fnmatch::has_wildcard(text));
    if !has_wildcard {
        return vec![pieces.into_iter().map(|(t, _)| t).collect()];
    }

    let mut plain = String::new();
    let mut pattern = String::new();
    for (text, quoting) in &pieces {
        plain.push_str(text);
        if *quoting == Quoting::Unquoted {
            pattern.push_str(text);
        } else {
            escape_into(text, &mut pattern);
        }
    }

    match glob(&pattern) {
        Some(mut matches) if !matches.is_empty() => {
            matches.sort();
            matches
        }
        _ => vec![plain],
    }
}

/// Quotes every fnmatch metacharacter in `text` so that it matches only
/// itself, and appends the result to `out`. Used so that a wildcard
/// character that came from a quoted segment never acts as one: quoted
/// segments are never subject to pathname expansion.
fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        if matches!(c, '*' | '?' | '[' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Applies tilde expansion (to the word's leading unquoted segment only)
/// and parameter expansion (to every segment except single-quoted ones),
/// returning each segment's resulting text alongside its original
/// quoting so the caller can still decide whether it participates in
/// pathname expansion.
fn expand_tilde_and_parameters(word: &Word, vars: &VariableStore) -> Vec<(String, Quoting)> {
    word.segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let mut text = segment.text.clone();
            if i == 0 && segment.quoting == Quoting::Unquoted {
                text = expand_tilde(&text, vars);
            }
            if segment.quoting != Quoting::Single {
                text = expand_parameters(&text, vars);
            }
            (text, segment.quoting)
        })
        .collect()
}

/// Expands a leading `~` or `~name` prefix to a home directory. Leaves
/// the text untouched if it doesn't start with `~`, or if the named
/// user can't be resolved.
fn expand_tilde(text: &str, vars: &VariableStore) -> String {
    let Some(rest) = text.strip_prefix('~') else {
        return text.to_owned();
    };
    let (name, remainder) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };
    let home = if name.is_empty() {
        vars.get("HOME")
    } else {
        nix::unistd::User::from_name(name)
            .ok()
            .flatten()
            .map(|u| u.dir.to_string_lossy().into_owned())
    };
    match home {
        Some(home) => format!("{home}{remainder}"),
        None => text.to_owned(),
    }
}

/// Substitutes `$NAME`, `${NAME}`, and the special one-character
/// parameters `$?`/`$$`/`$!` with their values, an unset parameter
/// expanding to the empty string.
fn expand_parameters(text: &str, vars: &VariableStore) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '$' || i + 1 >= chars.len() {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        match chars[i + 1] {
            '{' => {
                if let Some(rel) = chars[i + 2..].iter().position(|&c| c == '}') {
                    let name: String = chars[i + 2..i + 2 + rel].iter().collect();
                    out.push_str(&vars.get(&name).unwrap_or_default());
                    i += 2 + rel + 1;
                } else {
                    out.push('$');
                    i += 1;
                }
            }
            c @ ('?' | '$' | '!') => {
                out.push_str(&vars.get(&c.to_string()).unwrap_or_default());
                i += 2;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_') {
                    end += 1;
                }
                let name: String = chars[start..end].iter().collect();
                out.push_str(&vars.get(&name).unwrap_or_default());
                i = end;
            }
            // `$0` is the shell's invocation name; there are no other
            // positional parameters to expand, so a single digit is the
            // entire name.
            c if c.is_ascii_digit() => {
                out.push_str(&vars.get(&c.to_string()).unwrap_or_default());
                i += 2;
            }
            _ => {
                out.push('$');
                i += 1;
            }
        }
    }
    out
}

/// Matches `pattern` (only its final `/`-separated component may be a
/// glob; a literal directory prefix is used verbatim) against the
/// directory it names, returning sorted matches. Hidden (dot-prefixed)
/// entries are excluded unless the pattern itself begins with `.`.
fn glob(pattern: &str) -> Option<Vec<String>> {
    let (dir, base) = match pattern.rfind('/') {
        Some(idx) => (&pattern[..idx], &pattern[idx + 1..]),
        None => ("", pattern),
    };
    let matcher = posh_fnmatch::Pattern::parse(base).ok()?;
    let dir_to_read: &Path = if dir.is_empty() { Path::new(".") } else { Path::new(dir) };

    let mut matches = Vec::new();
    for entry in std::fs::read_dir(dir_to_read).ok()?.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') && !matcher.literal_prefix_is_dot() {
            continue;
        }
        if matcher.is_match(&name) {
            matches.push(if dir.is_empty() {
                name.into_owned()
            } else {
                format!("{dir}/{name}")
            });
        }
    }
    Some(matches)
}
