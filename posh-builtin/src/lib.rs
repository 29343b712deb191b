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

//! Builtin commands: `cd`, `export`, `jobs`, `fg`, `bg`,
//! `exit`, and the supplemented `wait`.

mod bg;
mod cd;
mod exit;
mod export;
mod fg;
mod jobs;
mod wait;

use posh_semantics::Builtins;

/// Builds the dispatch table the executor checks before falling back to
/// a `PATH` search.
pub fn table() -> Builtins {
    let mut builtins = Builtins::new();
    builtins.register("cd", cd::main);
    builtins.register("export", export::main);
    builtins.register("jobs", jobs::main);
    builtins.register("fg", fg::main);
    builtins.register("bg", bg::main);
    builtins.register("exit", exit::main);
    builtins.register("wait", wait::main);
    builtins
}
