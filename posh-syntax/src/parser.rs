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

//! Recursive-descent parser for this grammar:
//!
//! ```text
//! pipeline   := [ "!" ] stage ( "|" stage )* [ "&" ]
//! stage      := assignment* ( word | redirect )*
//! assignment := NAME "=" WORD
//! redirect   := ( "<" | ">" | ">>" ) word
//! ```
//!
//! The `stage` production is written here as zero-or-more rather than
//! one-or-more: a stage consisting solely of assignments (`FOO=bar` with
//! nothing else) is accepted as a variable-assignment command, so that a
//! standalone assignment line works as its own pipeline. See
//! `DESIGN.md` for the full rationale. A stage with *nothing at all* —
//! no assignments, no words, no redirections — is still rejected as
//! [`ParseError::EmptyStage`].
//!
//! The parser is a single explicit state machine over the token cursor;
//! its states (expecting a command, consuming assignments, consuming
//! arguments, expecting a redirection target) are the `match` arms of
//! [`parse_stage`] rather than a separate enum, since each state maps to
//! exactly one token-consuming decision.

use crate::ast::{Pipeline, RedirMode, Redirection, Stage};
use crate::error::ParseError;
use crate::lexer::Token;

/// Parses a token stream (as produced by [`crate::lexer::lex`]) into a
/// pipeline plan.
pub fn parse(tokens: Vec<Token>) -> Result<Pipeline, ParseError> {
    if tokens.is_empty() {
        return Ok(Pipeline::empty());
    }

    let mut tokens = tokens.into_iter().peekable();
    let mut pipeline = Pipeline::default();

    if matches!(tokens.peek(), Some(Token::Bang)) {
        tokens.next();
        pipeline.negate = true;
    }

    pipeline.stages.push(parse_stage(&mut tokens)?);

    while matches!(tokens.peek(), Some(Token::Pipe)) {
        tokens.next();
        pipeline.stages.push(parse_stage(&mut tokens)?);
    }

    if matches!(tokens.peek(), Some(Token::Amp)) {
        tokens.next();
        pipeline.background = true;
    }

    match tokens.next() {
        None => Ok(pipeline),
        Some(Token::Bang) => Err(ParseError::MisplacedBang),
        Some(Token::Amp) => Err(ParseError::MisplacedAmpersand),
        Some(_) => Err(ParseError::UnexpectedToken),
    }
}

fn parse_stage<I>(tokens: &mut std::iter::Peekable<I>) -> Result<Stage, ParseError>
where
    I: Iterator<Item = Token>,
{
    let mut stage = Stage::default();

    // assignment* -- only recognized before the first non-assignment word.
    while let Some(Token::Word(_)) = tokens.peek() {
        let Some(Token::Word(word)) = tokens.peek().cloned() else {
            unreachable!()
        };
        match word.as_assignment() {
            Some((name, value)) => {
                tokens.next();
                stage.assignments.push((name, value));
            }
            None => break,
        }
    }

    // ( word | redirect )*
    loop {
        match tokens.peek() {
            Some(Token::Word(_)) => {
                let Some(Token::Word(word)) = tokens.next() else {
                    unreachable!()
                };
                stage.words.push(word);
            }
            Some(Token::Less) => {
                tokens.next();
                stage
                    .redirections
                    .push(parse_redirection(tokens, 0, RedirMode::Read)?);
            }
            Some(Token::Great) => {
                tokens.next();
                stage
                    .redirections
                    .push(parse_redirection(tokens, 1, RedirMode::WriteTrunc)?);
            }
            Some(Token::DGreat) => {
                tokens.next();
                stage
                    .redirections
                    .push(parse_redirection(tokens, 1, RedirMode::WriteAppend)?);
            }
            Some(Token::Bang) => return Err(ParseError::MisplacedBang),
            Some(Token::Pipe) | Some(Token::Amp) | None => break,
        }
    }

    if stage.assignments.is_empty() && stage.words.is_empty() && stage.redirections.is_empty() {
        return Err(ParseError::EmptyStage);
    }

    Ok(stage)
}

fn parse_redirection<I>(
    tokens: &mut std::iter::Peekable<I>,
    fd: i32,
    mode: RedirMode,
) -> Result<Redirection, ParseError>
where
    I: Iterator<Item = Token>,
{
    match tokens.next() {
        Some(Token::Word(target)) => Ok(Redirection { fd, target, mode }),
        _ => Err(ParseError::MissingRedirectionTarget),
    }
}
