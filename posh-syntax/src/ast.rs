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

//! Data model for pipeline plans, stages, redirections, and words.

/// Quoting that applied to a [`Segment`] of a [`Word`] as lexed.
///
/// The expander consults this to decide which expansions a segment is
/// eligible for: unquoted text gets all three expansions, double-quoted
/// text gets parameter expansion only, and single-quoted (or
/// backslash-escaped) text gets none.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Quoting {
    Unquoted,
    Single,
    Double,
}

/// One contiguous run of text carrying a single quoting disposition.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Segment {
    pub text: String,
    pub quoting: Quoting,
}

/// A lexed word: a sequence of segments that the expander turns into zero
/// or more final argument strings.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Word {
    pub segments: Vec<Segment>,
}

impl Word {
    pub fn unquoted(text: impl Into<String>) -> Self {
        Word {
            segments: vec![Segment {
                text: text.into(),
                quoting: Quoting::Unquoted,
            }],
        }
    }

    /// Renders the word back to a string, ignoring quoting, for diagnostics
    /// and job-table display.
    pub fn raw_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// If this word has the lexical shape of an assignment (`NAME=value`),
    /// i.e. its first segment is unquoted text beginning with a POSIX
    /// identifier followed by `=`, splits it into the name and the
    /// remaining value word. Only the first segment is inspected: the `=`
    /// itself must not be quoted or escaped.
    pub fn as_assignment(&self) -> Option<(String, Word)> {
        let first = self.segments.first()?;
        if first.quoting != Quoting::Unquoted {
            return None;
        }
        let eq = first.text.find('=')?;
        let name = &first.text[..eq];
        if name.is_empty() || !is_identifier(name) {
            return None;
        }
        let mut rest_segments = Vec::with_capacity(self.segments.len());
        let tail = &first.text[eq + 1..];
        if !tail.is_empty() {
            rest_segments.push(Segment {
                text: tail.to_owned(),
                quoting: Quoting::Unquoted,
            });
        }
        rest_segments.extend(self.segments[1..].iter().cloned());
        Some((name.to_owned(), Word { segments: rest_segments }))
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// How a redirection's target file is opened.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RedirMode {
    Read,
    WriteTrunc,
    WriteAppend,
}

/// A single `<`, `>`, or `>>` redirection.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Redirection {
    /// The fd this redirection targets: 0 for `<`, 1 for `>`/`>>`.
    pub fd: i32,
    pub target: Word,
    pub mode: RedirMode,
}

/// One stage of a pipeline: assignments, an argument vector, and
/// redirections, in the order the parser encountered them.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Stage {
    pub assignments: Vec<(String, Word)>,
    pub words: Vec<Word>,
    pub redirections: Vec<Redirection>,
}

impl Stage {
    /// Whether this stage has no command word at all (only assignments
    /// and/or redirections). Such a stage never forks or execs; see
    /// `DESIGN.md` for how the executor treats it.
    pub fn is_argv_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// An ordered sequence of one or more command stages connected by pipes,
/// plus the pipeline-level `!` and `&` flags.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Pipeline {
    pub negate: bool,
    pub background: bool,
    pub stages: Vec<Stage>,
}

impl Pipeline {
    /// A pipeline with zero stages, parsed from a blank input line.
    pub fn empty() -> Self {
        Pipeline::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquoted_assignment_is_recognized() {
        let word = Word::unquoted("FOO=bar");
        let (name, value) = word.as_assignment().unwrap();
        assert_eq!(name, "FOO");
        assert_eq!(value.raw_text(), "bar");
    }

    #[test]
    fn word_with_quoted_name_prefix_is_not_an_assignment() {
        let word = Word {
            segments: vec![Segment {
                text: "FOO".to_owned(),
                quoting: Quoting::Double,
            }],
        };
        assert!(word.as_assignment().is_none());
    }

    #[test]
    fn word_without_equals_is_not_an_assignment() {
        assert!(Word::unquoted("echo").as_assignment().is_none());
    }

    #[test]
    fn assignment_value_may_include_quoted_segments() {
        let word = Word {
            segments: vec![
                Segment {
                    text: "FOO=".to_owned(),
                    quoting: Quoting::Unquoted,
                },
                Segment {
                    text: "a b".to_owned(),
                    quoting: Quoting::Single,
                },
            ],
        };
        let (name, value) = word.as_assignment().unwrap();
        assert_eq!(name, "FOO");
        assert_eq!(value.segments[0].quoting, Quoting::Single);
        assert_eq!(value.raw_text(), "a b");
    }
}
