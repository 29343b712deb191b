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

//! Lexer, AST, and parser that turn one input line into a [`Pipeline`].
//!
//! The three stages are deliberately kept as separate, narrow passes:
//! [`lexer::lex`] turns a line into a token stream while preserving per
//! segment quoting provenance; [`parser::parse`] consumes the token stream
//! into a [`ast::Pipeline`]. Expansion (tilde, parameter, pathname) is out
//! of scope for this crate; it runs afterwards, in `posh-semantics`, where
//! the variable store and file system are available.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{Pipeline, Quoting, Redirection, RedirMode, Segment, Stage, Word};
pub use error::ParseError;

/// Lexes and parses one input line into a pipeline plan.
pub fn parse_line(line: &str) -> Result<Pipeline, ParseError> {
    let tokens = lexer::lex(line)?;
    parser::parse(tokens)
}
