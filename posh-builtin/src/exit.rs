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

//! `exit [N]` terminates the shell with status `N`, or the
//! last command's status if omitted.

use posh_env::Env;
use posh_semantics::BuiltinOutcome;

pub fn main(env: &mut Env, args: &[String]) -> BuiltinOutcome {
    let status = match args.first() {
        Some(n) => match n.parse::<i32>() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("posh: exit: {n}: not a number");
                255
            }
        },
        None => env.last_status(),
    };
    BuiltinOutcome::Exit(status & 0xff)
}
