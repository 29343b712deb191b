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

//! `export NAME[=VALUE]…` marks names exported, optionally
//! assigning a value first. With no operands, prints every exported
//! variable in `NAME=VALUE` form, one per line — the usual shape real
//! shells give a bare `export` even though the source spec does not
//! spell it out.

use posh_env::Env;
use posh_semantics::BuiltinOutcome;

pub fn main(env: &mut Env, args: &[String]) -> BuiltinOutcome {
    if args.is_empty() {
        let mut names: Vec<_> = env.variables.exported_environment();
        names.sort();
        for entry in names {
            println!("export {entry}");
        }
        return BuiltinOutcome::Status(0);
    }

    for arg in args {
        match arg.split_once('=') {
            Some((name, value)) => env.variables.set(name, value, true),
            None => env.variables.export(arg),
        }
    }
    BuiltinOutcome::Status(0)
}
