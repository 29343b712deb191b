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

//! The `System` trait: every primitive the executor and job controller
//! need from the operating system (fork, exec, pipe, dup, process groups,
//! the controlling terminal, signals, `PATH`-adjacent file checks).
//!
//! A finer split into single-method subtraits would let code depending
//! on, say, just `chdir` be tested without a full system double, but
//! this crate has exactly one implementor (`RealSystem`) and no virtual
//! test double, so that split is not worth its ceremony here; everything
//! lives on one trait (see `DESIGN.md` for the tradeoff).

mod real;

pub use real::RealSystem;

use nix::sys::wait::WaitStatus;
use nix::unistd::{ForkResult, Pid};
use std::ffi::{CStr, CString};
use std::os::unix::io::RawFd;
use std::path::Path;

pub use nix::errno::Errno;
/// Result type for every `System` operation; `Errno` is reused directly
/// from `nix` rather than wrapped, since this crate has only the one
/// (real) backend.
pub type Result<T> = std::result::Result<T, Errno>;

/// How a redirection or `open` builtin opens its target file.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OpenMode {
    Read,
    WriteTrunc,
    WriteAppend,
}

/// The operating-system interface the executor, job controller, and
/// `cd`/`jobs`/`fg`/`bg` builtins are built on.
pub trait System {
    /// Forks the process. Returns in both parent and child, like
    /// `nix::unistd::fork`, which this trait mirrors 1:1. `unsafe` for
    /// the reasons `libc::fork` is: the child may only
    /// call async-signal-safe functions until it execs or exits.
    ///
    /// # Safety
    /// Must only be called when it is safe to fork: no other thread may
    /// be holding a lock the child will need, since only the calling
    /// thread survives into the child.
    unsafe fn fork(&self) -> Result<ForkResult>;

    /// Replaces the calling process's image. Never returns on success.
    fn execve(&self, path: &CStr, args: &[CString], envs: &[CString]) -> Errno;

    fn pipe(&self) -> Result<(RawFd, RawFd)>;
    fn dup2(&self, from: RawFd, to: RawFd) -> Result<()>;
    fn close(&self, fd: RawFd) -> Result<()>;
    fn open(&self, path: &CStr, mode: OpenMode, create_mode: u32) -> Result<RawFd>;

    fn getpid(&self) -> Pid;
    fn getpgrp(&self) -> Pid;
    fn setpgid(&self, pid: Pid, pgid: Pid) -> Result<()>;

    fn tcgetpgrp(&self, fd: RawFd) -> Result<Pid>;
    fn tcsetpgrp(&self, fd: RawFd, pgid: Pid) -> Result<()>;
    fn isatty(&self, fd: RawFd) -> bool;

    /// Waits for any state change (exit, signal death, stop, continue) in
    /// any child, without blocking if none is yet available.
    fn waitpid_nonblocking(&self) -> Result<Option<WaitStatus>>;
    /// Blocks until the given pid (or, if `None`, any child) changes
    /// state; used only for the foreground wait.
    fn waitpid_blocking(&self, pid: Option<Pid>) -> Result<WaitStatus>;

    fn kill(&self, pid: Pid, signal: Option<nix::sys::signal::Signal>) -> Result<()>;

    /// Restores the default disposition for a job-control-relevant
    /// signal. Called in every forked child before exec.
    fn reset_signal_default(&self, signal: nix::sys::signal::Signal) -> Result<()>;
    /// Sets a signal's disposition to `SIG_IGN`. The shell itself ignores
    /// the terminal-generated job-control signals this way.
    fn ignore_signal(&self, signal: nix::sys::signal::Signal) -> Result<()>;

    fn chdir(&self, path: &Path) -> Result<()>;
    fn getcwd(&self) -> Result<std::path::PathBuf>;

    /// Whether `path` names a regular, executable file.
    fn is_executable_file(&self, path: &CStr) -> bool;

    fn exit(&self, status: i32) -> !;
}
