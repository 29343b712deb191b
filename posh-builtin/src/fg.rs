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

//! `fg [job_id]` resumes a job in the foreground and waits
//! for it the same way a freshly launched foreground pipeline would.
//! `job_id` accepts the `%N`/`%+`/`%-`/bare-`N` forms `DESIGN.md` adds on
//! top of the source spec's no-operand case.

use nix::sys::signal::Signal;
use posh_env::Env;
use posh_semantics::BuiltinOutcome;

pub fn main(env: &mut Env, args: &[String]) -> BuiltinOutcome {
    let spec = args.first().map(String::as_str).unwrap_or("");
    let Some(id) = env.jobs.resolve_job_spec(spec) else {
        eprintln!("posh: fg: no such job");
        return BuiltinOutcome::Status(1);
    };
    let Some(job) = env.jobs.lookup(id) else {
        eprintln!("posh: fg: no such job");
        return BuiltinOutcome::Status(1);
    };
    let pgid = job.pgid;
    println!("{}", job.command);

    if env.interactive {
        let _ = env.system.tcsetpgrp(0, pgid);
    }
    if let Err(e) = env.system.kill(pgid, Some(Signal::SIGCONT)) {
        eprintln!("posh: fg: {e}");
        return BuiltinOutcome::Status(1);
    }
    if let Some(job) = env.jobs.lookup_mut(id) {
        job.state = posh_env::JobState::Running;
        job.background = false;
    }

    BuiltinOutcome::Status(posh_semantics::wait_foreground(env, pgid, false))
}
