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

//! The builtin dispatch table.
//!
//! This type lives here rather than in `posh-builtin` so that the
//! executor can check "is this a builtin?" without depending on the
//! crate that implements them; `posh-builtin` depends on
//! `posh-semantics`, not the other way around.

use posh_env::Env;
use std::collections::HashMap;

/// What a builtin produced.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BuiltinOutcome {
    /// The builtin ran and produced this status.
    Status(i32),
    /// The `exit` builtin: the whole shell should terminate with this
    /// status once control returns to the caller that can act on it.
    Exit(i32),
}

pub type BuiltinFn = fn(&mut Env, &[String]) -> BuiltinOutcome;

/// A name-indexed table of builtins, looked up by the executor before
/// falling back to a `PATH` search.
#[derive(Default)]
pub struct Builtins(HashMap<&'static str, BuiltinFn>);

impl Builtins {
    pub fn new() -> Self {
        Builtins::default()
    }

    pub fn register(&mut self, name: &'static str, f: BuiltinFn) {
        self.0.insert(name, f);
    }

    pub fn get(&self, name: &str) -> Option<BuiltinFn> {
        self.0.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Env, _: &[String]) -> BuiltinOutcome {
        BuiltinOutcome::Status(0)
    }

    #[test]
    fn unregistered_name_is_not_found() {
        let builtins = Builtins::new();
        assert!(builtins.get("cd").is_none());
    }

    #[test]
    fn registered_name_is_found() {
        let mut builtins = Builtins::new();
        builtins.register("cd", noop);
        assert!(builtins.get("cd").is_some());
    }
}
