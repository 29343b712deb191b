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

//! The job table.
//!
//! A [`Job`] represents one launched pipeline: its process group, the set
//! of member pids the reaper is still waiting to see exit, and the last
//! stage's exit status once known. The table is keyed by a small integer
//! job id (the user-facing `%N`).

use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use std::collections::{BTreeMap, HashSet};

/// The state of a job, updated by [`JobTable::apply_wait_status`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum JobState {
    Running,
    Stopped,
    Done { exit_status: i32 },
}

/// One tracked process group and its last known state.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: u32,
    pub pgid: Pid,
    pub state: JobState,
    pub command: String,
    pub background: bool,
    /// Member pids the reaper has not yet seen exit or die by signal.
    pending: HashSet<Pid>,
    /// The final stage's pid; only its exit/signal status becomes the
    /// pipeline's reported exit status.
    last_pid: Pid,
    last_status: i32,
}

/// What happened to a job as a result of one `waitpid` result.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum JobEventKind {
    Stopped,
    Continued,
    Done,
}

/// A state transition the reaper observed, paired with a snapshot of the
/// job it happened to (for `Done`, the job has already been removed from
/// the table).
#[derive(Debug, Clone)]
pub struct JobEvent {
    pub kind: JobEventKind,
    pub job: Job,
}

/// The ordered collection of jobs, keyed by job id.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: BTreeMap<u32, Job>,
    next_id: u32,
}

impl JobTable {
    pub fn new() -> Self {
        JobTable {
            jobs: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Registers a newly launched pipeline. `pids` lists every process
    /// the executor forked for it, in stage order; the last one is the
    /// pipeline's status-bearing stage.
    pub fn add(&mut self, pgid: Pid, pids: &[Pid], command: String, background: bool) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let last_pid = *pids.last().expect("a pipeline has at least one stage");
        self.jobs.insert(
            id,
            Job {
                id,
                pgid,
                state: JobState::Running,
                command,
                background,
                pending: pids.iter().copied().collect(),
                last_pid,
                last_status: 0,
            },
        );
        id
    }

    pub fn lookup(&self, id: u32) -> Option<&Job> {
        self.jobs.get(&id)
    }

    pub fn lookup_mut(&mut self, id: u32) -> Option<&mut Job> {
        self.jobs.get_mut(&id)
    }

    pub fn remove(&mut self, id: u32) -> Option<Job> {
        self.jobs.remove(&id)
    }

    pub fn enumerate(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    /// The job most recently added that is still tracked: what bare
    /// `fg`/`bg` operate on.
    pub fn most_recent(&self) -> Option<&Job> {
        self.jobs.values().max_by_key(|j| j.id)
    }

    /// The most recently added job that is currently `Stopped`, which is
    /// what a bare `bg` resumes.
    pub fn most_recent_stopped(&self) -> Option<&Job> {
        self.jobs
            .values()
            .filter(|j| matches!(j.state, JobState::Stopped))
            .max_by_key(|j| j.id)
    }

    /// Parses a `fg`/`bg` job-id operand (`%N`, `%%`/`%+`, `%-`, or a bare
    /// `N`) and returns the matching job id, if any. See `DESIGN.md` for
    /// how this job-id syntax was grounded.
    pub fn resolve_job_spec(&self, spec: &str) -> Option<u32> {
        let spec = spec.strip_prefix('%').unwrap_or(spec);
        match spec {
            "" | "+" | "%" => self.most_recent().map(|j| j.id),
            "-" => {
                let mut ids: Vec<u32> = self.jobs.keys().copied().collect();
                ids.sort_unstable();
                ids.iter().rev().nth(1).copied()
            }
            n => n.parse().ok().filter(|id| self.jobs.contains_key(id)),
        }
    }

    /// Applies one `waitpid` result to whichever job has `pid` among its
    /// pending members, mutating job state and, for `Exited`/`Signaled`,
    /// removing the job once every member has been reaped.
    pub fn apply_wait_status(&mut self, status: &WaitStatus) -> Option<JobEvent> {
        let pid = status_pid(status)?;
        let id = self
            .jobs
            .iter()
            .find(|(_, j)| j.pending.contains(&pid))
            .map(|(id, _)| *id)?;

        match status {
            WaitStatus::Exited(_, code) => self.retire_member(id, pid, *code),
            WaitStatus::Signaled(_, signal, _) => {
                self.retire_member(id, pid, 128 + *signal as i32)
            }
            WaitStatus::Stopped(..) => {
                let job = self.jobs.get_mut(&id)?;
                job.state = JobState::Stopped;
                Some(JobEvent {
                    kind: JobEventKind::Stopped,
                    job: job.clone(),
                })
            }
            WaitStatus::Continued(_) => {
                let job = self.jobs.get_mut(&id)?;
                job.state = JobState::Running;
                Some(JobEvent {
                    kind: JobEventKind::Continued,
                    job: job.clone(),
                })
            }
            _ => None,
        }
    }

    fn retire_member(&mut self, id: u32, pid: Pid, status: i32) -> Option<JobEvent> {
        let job = self.jobs.get_mut(&id)?;
        job.pending.remove(&pid);
        if pid == job.last_pid {
            job.last_status = status;
        }
        if job.pending.is_empty() {
            job.state = JobState::Done {
                exit_status: job.last_status,
            };
            let job = self.jobs.remove(&id)?;
            Some(JobEvent {
                kind: JobEventKind::Done,
                job,
            })
        } else {
            None
        }
    }
}

fn status_pid(status: &WaitStatus) -> Option<Pid> {
    match status {
        WaitStatus::Exited(pid, _)
        | WaitStatus::Signaled(pid, _, _)
        | WaitStatus::Stopped(pid, _)
        | WaitStatus::Continued(pid) => Some(*pid),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exited(pid: i32, code: i32) -> WaitStatus {
        WaitStatus::Exited(Pid::from_raw(pid), code)
    }

    #[test]
    fn single_stage_job_completes_on_first_exit() {
        let mut table = JobTable::new();
        let id = table.add(Pid::from_raw(100), &[Pid::from_raw(100)], "a".into(), true);
        let event = table.apply_wait_status(&exited(100, 3)).unwrap();
        assert_eq!(event.kind, JobEventKind::Done);
        assert_eq!(event.job.state, JobState::Done { exit_status: 3 });
        assert!(table.lookup(id).is_none());
    }

    #[test]
    fn multi_stage_job_waits_for_every_member() {
        let mut table = JobTable::new();
        let pids = [Pid::from_raw(100), Pid::from_raw(101)];
        table.add(Pid::from_raw(100), &pids, "a | b".into(), true);
        assert!(table.apply_wait_status(&exited(100, 1)).is_none());
        let event = table.apply_wait_status(&exited(101, 5)).unwrap();
        assert_eq!(event.job.state, JobState::Done { exit_status: 5 });
    }

    #[test]
    fn only_the_last_stage_status_is_reported() {
        let mut table = JobTable::new();
        let pids = [Pid::from_raw(100), Pid::from_raw(101)];
        table.add(Pid::from_raw(100), &pids, "a | b".into(), true);
        table.apply_wait_status(&exited(100, 99)).unwrap(); // first stage fails...
        let event = table.apply_wait_status(&exited(101, 0)).unwrap(); // ...but last succeeds
        assert_eq!(event.job.state, JobState::Done { exit_status: 0 });
    }

    #[test]
    fn stop_transitions_state_without_removing_the_job() {
        let mut table = JobTable::new();
        let id = table.add(Pid::from_raw(100), &[Pid::from_raw(100)], "a".into(), false);
        let event = table
            .apply_wait_status(&WaitStatus::Stopped(Pid::from_raw(100), nix::sys::signal::Signal::SIGTSTP))
            .unwrap();
        assert_eq!(event.kind, JobEventKind::Stopped);
        assert_eq!(table.lookup(id).unwrap().state, JobState::Stopped);
    }

    #[test]
    fn resolve_job_spec_supports_percent_n_and_bare_n() {
        let mut table = JobTable::new();
        let id = table.add(Pid::from_raw(100), &[Pid::from_raw(100)], "a".into(), true);
        assert_eq!(table.resolve_job_spec(&format!("%{id}")), Some(id));
        assert_eq!(table.resolve_job_spec(&format!("{id}")), Some(id));
    }

    #[test]
    fn resolve_job_spec_empty_and_plus_mean_most_recent() {
        let mut table = JobTable::new();
        table.add(Pid::from_raw(100), &[Pid::from_raw(100)], "a".into(), true);
        let last = table.add(Pid::from_raw(200), &[Pid::from_raw(200)], "b".into(), true);
        assert_eq!(table.resolve_job_spec(""), Some(last));
        assert_eq!(table.resolve_job_spec("%+"), Some(last));
    }
}
