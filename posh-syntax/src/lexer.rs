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

//! State-machine tokenizer.
//!
//! The four lexer states (NORMAL, IN_SINGLE, IN_DOUBLE, ESCAPED) are not
//! encoded as an explicit enum here: each is instead a dedicated scanning
//! loop (`scan_single`, `scan_double`) entered and exited at the quote
//! character, which keeps the per-state logic next to the character class
//! it handles. The operator set recognized is a closed set: `| < > >> & !`.

use crate::ast::{Quoting, Segment, Word};
use crate::error::ParseError;

/// A lexed token: either a word or one of the recognized operators.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Token {
    Word(Word),
    Pipe,
    Less,
    Great,
    DGreat,
    Amp,
    Bang,
}

/// Lexes one input line into a sequence of tokens.
pub fn lex(line: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    let mut tokens = Vec::new();
    let mut segments: Vec<Segment> = Vec::new();
    let mut buf = String::new();
    let mut word_open = false;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\'' => {
                flush_buf(&mut buf, &mut segments);
                word_open = true;
                i = scan_single(&chars, i, &mut segments)?;
            }
            '"' => {
                flush_buf(&mut buf, &mut segments);
                word_open = true;
                i = scan_double(&chars, i, &mut segments)?;
            }
            '\\' => {
                if i + 1 >= chars.len() {
                    return Err(ParseError::UnterminatedEscape);
                }
                flush_buf(&mut buf, &mut segments);
                word_open = true;
                segments.push(Segment {
                    text: chars[i + 1].to_string(),
                    quoting: Quoting::Single,
                });
                i += 2;
            }
            c if c.is_whitespace() => {
                flush_word(&mut word_open, &mut buf, &mut segments, &mut tokens);
                i += 1;
            }
            '|' | '<' | '&' | '!' => {
                flush_word(&mut word_open, &mut buf, &mut segments, &mut tokens);
                tokens.push(match c {
                    '|' => Token::Pipe,
                    '<' => Token::Less,
                    '&' => Token::Amp,
                    '!' => Token::Bang,
                    _ => unreachable!(),
                });
                i += 1;
            }
            '>' => {
                flush_word(&mut word_open, &mut buf, &mut segments, &mut tokens);
                if chars.get(i + 1) == Some(&'>') {
                    tokens.push(Token::DGreat);
                    i += 2;
                } else {
                    tokens.push(Token::Great);
                    i += 1;
                }
            }
            c => {
                word_open = true;
                buf.push(c);
                i += 1;
            }
        }
    }
    flush_word(&mut word_open, &mut buf, &mut segments, &mut tokens);
    Ok(tokens)
}

fn flush_buf(buf: &mut String, segments: &mut Vec<Segment>) {
    if !buf.is_empty() {
        segments.push(Segment {
            text: std::mem::take(buf),
            quoting: Quoting::Unquoted,
        });
    }
}

fn flush_word(
    word_open: &mut bool,
    buf: &mut String,
    segments: &mut Vec<Segment>,
    tokens: &mut Vec<Token>,
) {
    if *word_open {
        flush_buf(buf, segments);
        tokens.push(Token::Word(Word {
            segments: std::mem::take(segments),
        }));
        *word_open = false;
    }
}

/// Scans a `'...'` single-quoted segment starting at `chars[i] == '\''`.
/// Returns the index just past the closing quote.
fn scan_single(chars: &[char], i: usize, segments: &mut Vec<Segment>) -> Result<usize, ParseError> {
    let mut j = i + 1;
    let start = j;
    while j < chars.len() && chars[j] != '\'' {
        j += 1;
    }
    if j >= chars.len() {
        return Err(ParseError::UnterminatedQuote);
    }
    segments.push(Segment {
        text: chars[start..j].iter().collect(),
        quoting: Quoting::Single,
    });
    Ok(j + 1)
}

/// Scans a `"..."` double-quoted segment starting at `chars[i] == '"'`.
///
/// Within double quotes, only `\"`, `\\`, `\$`, and `` \` `` are
/// recognized escapes (POSIX); each escaped character is split off into
/// its own single-quoted-equivalent segment so later parameter expansion
/// never mistakes it for an unescaped `$`.
fn scan_double(chars: &[char], i: usize, segments: &mut Vec<Segment>) -> Result<usize, ParseError> {
    let mut j = i + 1;
    let mut buf = String::new();
    loop {
        if j >= chars.len() {
            return Err(ParseError::UnterminatedQuote);
        }
        match chars[j] {
            '"' => {
                j += 1;
                break;
            }
            '\\' if matches!(chars.get(j + 1), Some('"' | '\\' | '$' | '`')) => {
                if !buf.is_empty() {
                    segments.push(Segment {
                        text: std::mem::take(&mut buf),
                        quoting: Quoting::Double,
                    });
                }
                segments.push(Segment {
                    text: chars[j + 1].to_string(),
                    quoting: Quoting::Single,
                });
                j += 2;
            }
            c => {
                buf.push(c);
                j += 1;
            }
        }
    }
    if !buf.is_empty() {
        segments.push(Segment {
            text: buf,
            quoting: Quoting::Double,
        });
    }
    Ok(j)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(tokens: &[Token]) -> Vec<&Word> {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Word(w) => Some(w),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn unquoted_word_round_trips() {
        let tokens = lex("hello").unwrap();
        assert_eq!(tokens, vec![Token::Word(Word::unquoted("hello"))]);
    }

    #[test]
    fn single_quoted_word_preserves_contents_verbatim() {
        let tokens = lex("'a b $x'").unwrap();
        let w = &words(&tokens)[0];
        assert_eq!(w.segments.len(), 1);
        assert_eq!(w.segments[0].text, "a b $x");
        assert_eq!(w.segments[0].quoting, Quoting::Single);
    }

    #[test]
    fn unterminated_single_quote_is_an_error() {
        assert_eq!(lex("'abc").unwrap_err(), ParseError::UnterminatedQuote);
    }

    #[test]
    fn unterminated_double_quote_is_an_error() {
        assert_eq!(lex("\"abc").unwrap_err(), ParseError::UnterminatedQuote);
    }

    #[test]
    fn adjacent_quoted_and_unquoted_runs_form_one_word() {
        let tokens = lex("a'b'c").unwrap();
        assert_eq!(tokens.len(), 1);
        let w = &words(&tokens)[0];
        assert_eq!(w.segments.len(), 3);
        assert_eq!(w.raw_text(), "abc");
    }

    #[test]
    fn operators_terminate_a_word_without_surrounding_space() {
        let tokens = lex("a>b").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word(Word::unquoted("a")),
                Token::Great,
                Token::Word(Word::unquoted("b")),
            ]
        );
    }

    #[test]
    fn double_greater_is_a_single_token() {
        let tokens = lex("a>>b").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word(Word::unquoted("a")),
                Token::DGreat,
                Token::Word(Word::unquoted("b")),
            ]
        );
    }

    #[test]
    fn pipeline_operators_are_recognized() {
        let tokens = lex("a | b & ! c").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word(Word::unquoted("a")),
                Token::Pipe,
                Token::Word(Word::unquoted("b")),
                Token::Amp,
                Token::Bang,
                Token::Word(Word::unquoted("c")),
            ]
        );
    }

    #[test]
    fn double_quotes_allow_escaping_the_dollar_sign() {
        let tokens = lex(r#""\$HOME""#).unwrap();
        let w = &words(&tokens)[0];
        assert_eq!(w.segments.len(), 1);
        assert_eq!(w.segments[0].text, "$HOME");
        assert_eq!(w.segments[0].quoting, Quoting::Single);
    }

    #[test]
    fn double_quotes_keep_unescaped_dollar_as_double_quoted() {
        let tokens = lex("\"$HOME\"").unwrap();
        let w = &words(&tokens)[0];
        assert_eq!(w.segments[0].text, "$HOME");
        assert_eq!(w.segments[0].quoting, Quoting::Double);
    }

    #[test]
    fn backslash_escapes_a_single_character_outside_quotes() {
        let tokens = lex(r"a\ b").unwrap();
        let w = &words(&tokens)[0];
        assert_eq!(w.raw_text(), "a b");
        assert_eq!(w.segments.len(), 2);
    }

    #[test]
    fn trailing_backslash_is_an_error() {
        assert_eq!(lex("a\\").unwrap_err(), ParseError::UnterminatedEscape);
    }

    #[test]
    fn empty_line_lexes_to_no_tokens() {
        assert_eq!(lex("").unwrap(), vec![]);
        assert_eq!(lex("   ").unwrap(), vec![]);
    }
}
