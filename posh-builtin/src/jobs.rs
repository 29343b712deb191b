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

//! `jobs` prints the job table.

use posh_env::{Env, JobState};
use posh_semantics::BuiltinOutcome;

pub fn main(env: &mut Env, _args: &[String]) -> BuiltinOutcome {
    let current = env.jobs.most_recent().map(|j| j.id);
    for job in env.jobs.enumerate() {
        let mark = if Some(job.id) == current { '+' } else { ' ' };
        let status = match job.state {
            JobState::Running => "Running",
            JobState::Stopped => "Stopped",
            JobState::Done { exit_status: 0 } => "Done",
            JobState::Done { .. } => "Exit",
        };
        println!("[{}]{mark}  {status:<10} {}", job.id, job.command);
    }
    BuiltinOutcome::Status(0)
}
