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

//! The pipeline launcher and job controller.
//!
//! [`execute`] implements the fork/pipe/dup/setpgid/tcsetpgrp choreography
//! for a whole [`Pipeline`] and reports its result as an [`Outcome`].
//! [`reap_background`] drains whatever SIGCHLD already told the reaper
//! about, for jobs that are not the one currently occupying the
//! foreground wait.
//!
//! Both the parent and each child call `setpgid`, and both call
//! `tcsetpgrp` on the foreground path. This is intentionally redundant:
//! whichever of parent or child runs first wins the race to put the
//! child in its process group, and the other call is a no-op.

use crate::builtin::{BuiltinOutcome, Builtins};
use crate::expansion;
use posh_env::job::{JobEvent, JobEventKind};
use posh_env::signal::restore_child_dispositions;
use posh_env::system::{Errno, OpenMode, System};
use posh_env::Env;
use posh_syntax::ast::{Pipeline, RedirMode, Stage};
use std::ffi::CString;
use std::os::unix::io::RawFd;

/// What running a pipeline produced.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Outcome {
    /// The pipeline ran to completion (or was backgrounded); carries the
    /// exit status to store in `$?`.
    Status(i32),
    /// The `exit` builtin was invoked directly by the shell (only
    /// possible through the single-builtin fast path): the whole shell
    /// should terminate with this status.
    Exit(i32),
}

/// Fatal executor errors: conditions severe enough that the pipeline
/// could not even be launched.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("cannot create pipe: {0}")]
    Pipe(Errno),
    #[error("cannot fork: {0}")]
    Fork(Errno),
}

/// Runs one parsed pipeline to completion (or backgrounds it) against
/// `env`, dispatching to `builtins` for any stage whose command name
/// matches one.
pub fn execute(env: &mut Env, builtins: &Builtins, pipeline: &Pipeline) -> Result<Outcome, ExecError> {
    if pipeline.stages.is_empty() {
        return Ok(Outcome::Status(0));
    }

    if let Some(outcome) = try_fast_path(env, builtins, pipeline) {
        return Ok(outcome);
    }

    let n = pipeline.stages.len();
    let pipes = allocate_pipes(env, n - 1)?;
    let mut children = Vec::with_capacity(n);
    let mut pgid = None;

    for (i, stage) in pipeline.stages.iter().enumerate() {
        // SAFETY: no other thread exists in this single-threaded shell,
        // so nothing else can be mid-mutation of state the child needs.
        match unsafe { env.system.fork() }.map_err(ExecError::Fork)? {
            nix::unistd::ForkResult::Child => {
                run_child(env, builtins, stage, i, n, &pipes, pgid, pipeline.background);
            }
            nix::unistd::ForkResult::Parent { child } => {
                let this_pgid = *pgid.get_or_insert(child);
                let _ = env.system.setpgid(child, this_pgid);
                if env.interactive && !pipeline.background && i == 0 {
                    let _ = env.system.tcsetpgrp(0, this_pgid);
                }
                children.push(child);
            }
        }
    }

    for &(r, w) in &pipes {
        let _ = env.system.close(r);
        let _ = env.system.close(w);
    }

    let pgid = pgid.expect("at least one stage was forked");
    let command_text = render_command_text(pipeline);
    let job_id = env.jobs.add(pgid, &children, command_text, pipeline.background);

    if pipeline.background {
        env.variables.last_background_pgid = pgid.as_raw();
        println!("[{job_id}] {}", pgid.as_raw());
        return Ok(Outcome::Status(0));
    }

    Ok(Outcome::Status(wait_foreground(env, pgid, pipeline.negate)))
}

/// If the pipeline is a single, foreground stage naming a builtin, runs
/// it directly in the shell process instead of forking, so the builtin's
/// side effects (`cd`, `export`, `exit`, ...) persist in the shell.
/// Returns `None` if the general fork/pipe path must be used instead.
fn try_fast_path(env: &mut Env, builtins: &Builtins, pipeline: &Pipeline) -> Option<Outcome> {
    if pipeline.background || pipeline.stages.len() != 1 {
        return None;
    }
    let stage = &pipeline.stages[0];
    let argv = expansion::expand_argv(stage, &env.variables);
    let name = argv.first()?;
    let builtin = builtins.get(name)?;

    apply_assignments(env, stage);

    let saved = match save_and_redirect(env, stage) {
        Ok(saved) => saved,
        Err(e) => {
            eprintln!("posh: {name}: {e}");
            return Some(Outcome::Status(1));
        }
    };

    let outcome = builtin(env, &argv[1..]);

    restore_fds(env, saved);

    let status = match outcome {
        BuiltinOutcome::Status(s) => s,
        BuiltinOutcome::Exit(s) => return Some(apply_negate(pipeline.negate, s, true)),
    };
    Some(apply_negate(pipeline.negate, status, false))
}

fn apply_negate(negate: bool, status: i32, is_exit: bool) -> Outcome {
    let status = if negate {
        if status == 0 {
            1
        } else {
            0
        }
    } else {
        status
    };
    if is_exit {
        Outcome::Exit(status)
    } else {
        Outcome::Status(status)
    }
}

/// Redirects the fast path's fds in the shell's own process, returning
/// the saved originals so they can be restored once the builtin
/// returns. A builtin that runs in-process must not leak its
/// redirection past its own invocation.
fn save_and_redirect(env: &Env, stage: &Stage) -> Result<Vec<(RawFd, RawFd)>, Errno> {
    let mut saved = Vec::new();
    for redir in &stage.redirections {
        let target = expansion::expand_scalar(&redir.target, &env.variables);
        let saved_fd = nix::unistd::dup(redir.fd).map_err(|e| {
            for (orig, backup) in &saved {
                let _ = env.system.dup2(*backup, *orig);
                let _ = env.system.close(*backup);
            }
            e
        })?;
        if let Err(e) = open_and_install(env, redir.fd, &target, redir.mode) {
            let _ = env.system.dup2(saved_fd, redir.fd);
            let _ = env.system.close(saved_fd);
            for (orig, backup) in &saved {
                let _ = env.system.dup2(*backup, *orig);
                let _ = env.system.close(*backup);
            }
            return Err(e);
        }
        saved.push((redir.fd, saved_fd));
    }
    Ok(saved)
}

fn restore_fds(env: &Env, saved: Vec<(RawFd, RawFd)>) {
    for (orig, backup) in saved {
        let _ = env.system.dup2(backup, orig);
        let _ = env.system.close(backup);
    }
}

fn open_and_install(env: &Env, fd: RawFd, target: &str, mode: RedirMode) -> Result<(), Errno> {
    let open_mode = match mode {
        RedirMode::Read => OpenMode::Read,
        RedirMode::WriteTrunc => OpenMode::WriteTrunc,
        RedirMode::WriteAppend => OpenMode::WriteAppend,
    };
    let c_target = CString::new(target).map_err(|_| Errno::EINVAL)?;
    let opened = env.system.open(&c_target, open_mode, 0o644)?;
    let result = env.system.dup2(opened, fd);
    let _ = env.system.close(opened);
    result
}

fn apply_assignments(env: &mut Env, stage: &Stage) {
    for (name, value) in &stage.assignments {
        let value = expansion::expand_scalar(value, &env.variables);
        env.variables.set(name, value, false);
    }
}

fn allocate_pipes(env: &Env, count: usize) -> Result<Vec<(RawFd, RawFd)>, ExecError> {
    let mut pipes = Vec::with_capacity(count);
    for _ in 0..count {
        match env.system.pipe() {
            Ok(p) => pipes.push(p),
            Err(e) => {
                for &(r, w) in &pipes {
                    let _ = env.system.close(r);
                    let _ = env.system.close(w);
                }
                return Err(ExecError::Pipe(e));
            }
        }
    }
    Ok(pipes)
}

/// The body of every forked pipeline-stage child. Never returns: every
/// path ends in `env.system.exit`.
fn run_child(
    env: &mut Env,
    builtins: &Builtins,
    stage: &Stage,
    index: usize,
    stage_count: usize,
    pipes: &[(RawFd, RawFd)],
    pgid: Option<nix::unistd::Pid>,
    background: bool,
) -> ! {
    let _ = restore_child_dispositions(env.system.as_ref());

    let pid = env.system.getpid();
    let this_pgid = pgid.unwrap_or(pid);
    let _ = env.system.setpgid(pid, this_pgid);
    if env.interactive && !background && index == 0 {
        let _ = env.system.tcsetpgrp(0, this_pgid);
    }

    if index > 0 {
        let (prev_read, _) = pipes[index - 1];
        let _ = env.system.dup2(prev_read, 0);
    }
    if index < stage_count - 1 {
        let (_, next_write) = pipes[index];
        let _ = env.system.dup2(next_write, 1);
    }
    for &(r, w) in pipes {
        let _ = env.system.close(r);
        let _ = env.system.close(w);
    }

    for redir in &stage.redirections {
        let target = expansion::expand_scalar(&redir.target, &env.variables);
        if let Err(e) = open_and_install(env, redir.fd, &target, redir.mode) {
            eprintln!("posh: {target}: {e}");
            env.system.exit(1);
        }
    }

    apply_assignments(env, stage);
    let argv = expansion::expand_argv(stage, &env.variables);

    let Some(name) = argv.first().cloned() else {
        env.system.exit(0);
    };

    if let Some(builtin) = builtins.get(&name) {
        let status = match builtin(env, &argv[1..]) {
            BuiltinOutcome::Status(s) | BuiltinOutcome::Exit(s) => s,
        };
        env.system.exit(status);
    }

    match posh_env::path::resolve(env.system.as_ref(), &name, env.variables.get("PATH").as_deref()) {
        Some(path) => {
            let Ok(c_path) = CString::new(path.as_os_str().to_string_lossy().into_owned()) else {
                eprintln!("posh: {name}: invalid path");
                env.system.exit(126);
            };
            let c_args: Vec<CString> = argv.iter().filter_map(|a| CString::new(a.as_str()).ok()).collect();
            let mut envp = env.variables.exported_environment();
            for (name, _) in &stage.assignments {
                if let Some(value) = env.variables.get(name) {
                    envp.retain(|e| !e.starts_with(&format!("{name}=")));
                    envp.push(format!("{name}={value}"));
                }
            }
            let c_envp: Vec<CString> = envp.into_iter().filter_map(|e| CString::new(e).ok()).collect();
            let err = env.system.execve(&c_path, &c_args, &c_envp);
            eprintln!("posh: {name}: {err}");
            env.system.exit(126);
        }
        None => {
            eprintln!("posh: {name}: command not found");
            env.system.exit(127);
        }
    }
}

/// Waits for a foreground pipeline to either finish or stop, reclaiming
/// the terminal in either case, and returns the status to report as
/// `$?`. Also used by the `fg` builtin, which resumes a stopped job
/// into the foreground and then waits on it the same way a freshly
/// launched pipeline would.
pub fn wait_foreground(env: &mut Env, pgid: nix::unistd::Pid, negate: bool) -> i32 {
    let wait_target = nix::unistd::Pid::from_raw(-pgid.as_raw());
    loop {
        let status = match env.system.waitpid_blocking(Some(wait_target)) {
            Ok(status) => status,
            Err(_) => break,
        };
        match env.jobs.apply_wait_status(&status) {
            Some(JobEvent { kind: JobEventKind::Stopped, job }) => {
                eprintln!("[{}]+  Stopped                 {}", job.id, job.command);
                reclaim_terminal(env);
                return 0;
            }
            Some(JobEvent {
                kind: JobEventKind::Done,
                job,
            }) => {
                reclaim_terminal(env);
                let status = match job.state {
                    posh_env::JobState::Done { exit_status } => exit_status,
                    _ => 0,
                };
                return if negate {
                    if status == 0 {
                        1
                    } else {
                        0
                    }
                } else {
                    status
                };
            }
            _ => continue,
        }
    }
    reclaim_terminal(env);
    0
}

fn reclaim_terminal(env: &Env) {
    if env.interactive {
        let _ = env.system.tcsetpgrp(0, env.shell_pgid);
    }
}

/// Drains every child-state change SIGCHLD has already told the reaper
/// about, printing a notification line for jobs that finished or
/// stopped in the background. Called at the top of the read loop, never
/// while a foreground wait is in progress. Does nothing if no SIGCHLD
/// has arrived since the last call, so an idle loop never pays for a
/// `waitpid` syscall.
pub fn reap_background(env: &mut Env) {
    if !posh_env::signal::take_sigchld() {
        return;
    }
    loop {
        match env.system.waitpid_nonblocking() {
            Ok(Some(status)) => {
                if let Some(event) = env.jobs.apply_wait_status(&status) {
                    print_background_event(&event);
                }
            }
            Ok(None) | Err(_) => break,
        }
    }
}

fn print_background_event(event: &JobEvent) {
    match event.kind {
        JobEventKind::Done => {
            let status = match event.job.state {
                posh_env::JobState::Done { exit_status } if exit_status != 0 => {
                    format!("Exit {exit_status}")
                }
                _ => "Done".to_owned(),
            };
            println!("[{}]+  {status}                    {}", event.job.id, event.job.command);
        }
        JobEventKind::Stopped => {
            println!("[{}]+  Stopped                 {}", event.job.id, event.job.command);
        }
        JobEventKind::Continued => {}
    }
}

fn render_command_text(pipeline: &Pipeline) -> String {
    pipeline
        .stages
        .iter()
        .map(|stage| {
            stage
                .words
                .iter()
                .map(|w| w.raw_text())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
