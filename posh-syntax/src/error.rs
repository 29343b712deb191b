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

//! Errors produced by the lexer and parser.

use thiserror::Error;

/// A lexing or parsing failure.
///
/// Every variant is reported to fd 2 and sets `$?` to 2; the shell's read
/// loop always continues to the next prompt afterward.
#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum ParseError {
    /// A `'` or `"` was opened but never closed before end of line.
    #[error("unterminated quote")]
    UnterminatedQuote,

    /// A trailing, unescaped backslash has nothing to escape.
    #[error("unterminated escape")]
    UnterminatedEscape,

    /// A stage has no assignments, words, or redirections at all, e.g. two
    /// adjacent `|` operators.
    #[error("syntax error: empty command")]
    EmptyStage,

    /// A redirection operator (`<`, `>`, `>>`) was not followed by a word.
    #[error("syntax error: missing redirection target")]
    MissingRedirectionTarget,

    /// `&` appeared somewhere other than at the very end of the pipeline.
    #[error("syntax error: `&` must be the last token")]
    MisplacedAmpersand,

    /// `!` appeared somewhere other than at the start of the pipeline.
    #[error("syntax error: `!` must precede the first command")]
    MisplacedBang,

    /// Tokens remained after a complete pipeline was parsed.
    #[error("syntax error near unexpected token")]
    UnexpectedToken,
}
