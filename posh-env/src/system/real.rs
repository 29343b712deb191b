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

//! `RealSystem`: the `System` implementation that actually talks to the
//! kernel, via `nix`.

use super::{Errno, OpenMode, Result, System};
use nix::fcntl::OFlag;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::{WaitPidFlag, WaitStatus};
use nix::unistd::{self, AccessFlags, ForkResult, Pid};
use std::ffi::{CStr, CString};
use std::os::unix::io::RawFd;
use std::path::{Path, PathBuf};

/// `RealSystem` carries no state: the state it exposes belongs to the
/// kernel. Constructing more than one is harmless but pointless, since
/// all instances observe and mutate the same process.
#[derive(Debug, Default)]
pub struct RealSystem;

impl RealSystem {
    pub fn new() -> Self {
        RealSystem
    }
}

fn is_regular_executable(path: &CStr) -> bool {
    let is_file = matches!(
        nix::sys::stat::stat(path),
        Ok(st) if st.st_mode & nix::libc::S_IFMT == nix::libc::S_IFREG
    );
    is_file && unistd::access(path, AccessFlags::X_OK).is_ok()
}

impl System for RealSystem {
    unsafe fn fork(&self) -> Result<ForkResult> {
        unistd::fork()
    }

    fn execve(&self, path: &CStr, args: &[CString], envs: &[CString]) -> Errno {
        loop {
            match unistd::execve(path, args, envs) {
                Err(Errno::EINTR) => continue,
                Err(e) => return e,
                Ok(_never) => unreachable!("execve does not return on success"),
            }
        }
    }

    fn pipe(&self) -> Result<(RawFd, RawFd)> {
        unistd::pipe().map(|(r, w)| (r, w))
    }

    fn dup2(&self, from: RawFd, to: RawFd) -> Result<()> {
        loop {
            match unistd::dup2(from, to) {
                Ok(_) => return Ok(()),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn close(&self, fd: RawFd) -> Result<()> {
        match unistd::close(fd) {
            Ok(()) | Err(Errno::EBADF) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn open(&self, path: &CStr, mode: OpenMode, create_mode: u32) -> Result<RawFd> {
        let flags = match mode {
            OpenMode::Read => OFlag::O_RDONLY,
            OpenMode::WriteTrunc => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            OpenMode::WriteAppend => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND,
        };
        let file_mode = Mode::from_bits_truncate(create_mode);
        nix::fcntl::open(path, flags, file_mode)
    }

    fn getpid(&self) -> Pid {
        unistd::getpid()
    }

    fn getpgrp(&self) -> Pid {
        unistd::getpgrp()
    }

    fn setpgid(&self, pid: Pid, pgid: Pid) -> Result<()> {
        unistd::setpgid(pid, pgid)
    }

    fn tcgetpgrp(&self, fd: RawFd) -> Result<Pid> {
        unistd::tcgetpgrp(fd)
    }

    fn tcsetpgrp(&self, fd: RawFd, pgid: Pid) -> Result<()> {
        unistd::tcsetpgrp(fd, pgid)
    }

    fn isatty(&self, fd: RawFd) -> bool {
        unistd::isatty(fd).unwrap_or(false)
    }

    fn waitpid_nonblocking(&self) -> Result<Option<WaitStatus>> {
        let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
        match nix::sys::wait::waitpid(None, Some(flags)) {
            Ok(WaitStatus::StillAlive) => Ok(None),
            Ok(status) => Ok(Some(status)),
            Err(Errno::ECHILD) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn waitpid_blocking(&self, pid: Option<Pid>) -> Result<WaitStatus> {
        let flags = WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
        loop {
            match nix::sys::wait::waitpid(pid, Some(flags)) {
                Err(Errno::EINTR) => continue,
                other => return other,
            }
        }
    }

    fn kill(&self, pid: Pid, signal: Option<Signal>) -> Result<()> {
        signal::kill(pid, signal)
    }

    fn reset_signal_default(&self, signal: Signal) -> Result<()> {
        unsafe { signal::signal(signal, SigHandler::SigDfl) }.map(|_| ())
    }

    fn ignore_signal(&self, signal: Signal) -> Result<()> {
        unsafe { signal::signal(signal, SigHandler::SigIgn) }.map(|_| ())
    }

    fn chdir(&self, path: &Path) -> Result<()> {
        unistd::chdir(path)
    }

    fn getcwd(&self) -> Result<PathBuf> {
        unistd::getcwd()
    }

    fn is_executable_file(&self, path: &CStr) -> bool {
        is_regular_executable(path)
    }

    fn exit(&self, status: i32) -> ! {
        std::process::exit(status)
    }
}
