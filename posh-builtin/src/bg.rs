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

//! `bg [job_id]` resumes the most-recently-stopped job
//! without placing it in the foreground.

use nix::sys::signal::Signal;
use posh_env::Env;
use posh_semantics::BuiltinOutcome;

pub fn main(env: &mut Env, args: &[String]) -> BuiltinOutcome {
    let id = match args.first() {
        Some(spec) => env.jobs.resolve_job_spec(spec),
        None => env.jobs.most_recent_stopped().map(|j| j.id),
    };
    let Some(id) = id else {
        eprintln!("posh: bg: no such job");
        return BuiltinOutcome::Status(1);
    };
    let Some(job) = env.jobs.lookup(id) else {
        eprintln!("posh: bg: no such job");
        return BuiltinOutcome::Status(1);
    };
    let pgid = job.pgid;
    println!("[{id}] {}", job.command);

    if let Err(e) = env.system.kill(pgid, Some(Signal::SIGCONT)) {
        eprintln!("posh: bg: {e}");
        return BuiltinOutcome::Status(1);
    }
    if let Some(job) = env.jobs.lookup_mut(id) {
        job.state = posh_env::JobState::Running;
        job.background = true;
    }
    BuiltinOutcome::Status(0)
}
