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

//! `cd [dir]` changes the shell's working directory,
//! defaulting to `HOME` with no operand.

use posh_env::Env;
use posh_semantics::BuiltinOutcome;
use std::path::Path;

pub fn main(env: &mut Env, args: &[String]) -> BuiltinOutcome {
    let target = match args.first() {
        Some(dir) => dir.clone(),
        None => match env.variables.get("HOME") {
            Some(home) => home,
            None => {
                eprintln!("posh: cd: HOME not set");
                return BuiltinOutcome::Status(1);
            }
        },
    };

    match env.system.chdir(Path::new(&target)) {
        Ok(()) => BuiltinOutcome::Status(0),
        Err(e) => {
            eprintln!("posh: cd: {target}: {e}");
            BuiltinOutcome::Status(1)
        }
    }
}
