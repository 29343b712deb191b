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

//! `wait [job_id]` — a supplemented builtin (`DESIGN.md`, not in the
//! source spec's builtin list): blocks until the named job, or every
//! currently tracked job if none is named, terminates. A job that only
//! stops does not satisfy `wait`; waiting resumes until it actually
//! exits or is killed, matching real shells.

use nix::unistd::Pid;
use posh_env::job::JobEventKind;
use posh_env::{Env, JobState};
use posh_semantics::BuiltinOutcome;

pub fn main(env: &mut Env, args: &[String]) -> BuiltinOutcome {
    match args.first() {
        Some(spec) => {
            let Some(id) = env.jobs.resolve_job_spec(spec) else {
                eprintln!("posh: wait: {spec}: no such job");
                return BuiltinOutcome::Status(127);
            };
            let Some(pgid) = env.jobs.lookup(id).map(|j| j.pgid) else {
                return BuiltinOutcome::Status(127);
            };
            BuiltinOutcome::Status(wait_until_done(env, pgid))
        }
        None => {
            while env.jobs.enumerate().next().is_some() {
                match env.system.waitpid_blocking(None) {
                    Ok(status) => {
                        env.jobs.apply_wait_status(&status);
                    }
                    Err(_) => break,
                }
            }
            BuiltinOutcome::Status(0)
        }
    }
}

fn wait_until_done(env: &mut Env, pgid: Pid) -> i32 {
    let target = Pid::from_raw(-pgid.as_raw());
    loop {
        let status = match env.system.waitpid_blocking(Some(target)) {
            Ok(status) => status,
            Err(_) => return 127,
        };
        if let Some(event) = env.jobs.apply_wait_status(&status) {
            if event.kind == JobEventKind::Done {
                return match event.job.state {
                    JobState::Done { exit_status } => exit_status,
                    _ => 0,
                };
            }
        }
    }
}
