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

//! Expansion and the pipeline executor/job controller: the layer that
//! turns a parsed [`posh_syntax::ast::Pipeline`] into running processes
//! against a [`posh_env::Env`].

pub mod builtin;
pub mod executor;
pub mod expansion;

pub use builtin::{BuiltinFn, BuiltinOutcome, Builtins};
pub use executor::{execute, reap_background, wait_foreground, ExecError, Outcome};
