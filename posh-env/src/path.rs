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

//! `PATH` search: a colon-split existence check, not a full POSIX
//! command-search algorithm (hashing, `CDPATH`-style caching, and
//! function/builtin precedence are handled by the caller, not here).

use crate::system::System;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

const DEFAULT_PATH: &str = "/usr/bin:/bin";

/// Resolves `command` to an executable path.
///
/// If `command` contains a `/`, it is used verbatim. Otherwise each
/// colon-separated directory of `path_var` (or [`DEFAULT_PATH`] if unset)
/// is tried in order; the first that yields an executable regular file
/// wins. Returns `None` if no candidate is executable.
pub fn resolve(system: &dyn System, command: &str, path_var: Option<&str>) -> Option<PathBuf> {
    if command.contains('/') {
        let candidate = PathBuf::from(command);
        return is_executable(system, &candidate).then_some(candidate);
    }

    let path_var = path_var.unwrap_or(DEFAULT_PATH);
    for dir in path_var.split(':') {
        let dir = if dir.is_empty() { "." } else { dir };
        let candidate = Path::new(dir).join(command);
        if is_executable(system, &candidate) {
            return Some(candidate);
        }
    }
    None
}

fn is_executable(system: &dyn System, path: &Path) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    system.is_executable_file(&c_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{Errno, OpenMode, Result, System};
    use nix::sys::signal::Signal;
    use nix::sys::wait::WaitStatus;
    use nix::unistd::{ForkResult, Pid};
    use std::ffi::{CStr, CString};
    use std::os::unix::io::RawFd;
    use std::path::PathBuf;

    /// A fake `System` whose only honest method is `is_executable_file`,
    /// used to exercise `resolve`'s directory-search logic in isolation.
    struct FakeSystem {
        executables: Vec<PathBuf>,
    }

    impl System for FakeSystem {
        unsafe fn fork(&self) -> Result<ForkResult> {
            unimplemented!()
        }
        fn execve(&self, _: &CStr, _: &[CString], _: &[CString]) -> Errno {
            unimplemented!()
        }
        fn pipe(&self) -> Result<(RawFd, RawFd)> {
            unimplemented!()
        }
        fn dup2(&self, _: RawFd, _: RawFd) -> Result<()> {
            unimplemented!()
        }
        fn close(&self, _: RawFd) -> Result<()> {
            unimplemented!()
        }
        fn open(&self, _: &CStr, _: OpenMode, _: u32) -> Result<RawFd> {
            unimplemented!()
        }
        fn getpid(&self) -> Pid {
            unimplemented!()
        }
        fn getpgrp(&self) -> Pid {
            unimplemented!()
        }
        fn setpgid(&self, _: Pid, _: Pid) -> Result<()> {
            unimplemented!()
        }
        fn tcgetpgrp(&self, _: RawFd) -> Result<Pid> {
            unimplemented!()
        }
        fn tcsetpgrp(&self, _: RawFd, _: Pid) -> Result<()> {
            unimplemented!()
        }
        fn isatty(&self, _: RawFd) -> bool {
            false
        }
        fn waitpid_nonblocking(&self) -> Result<Option<WaitStatus>> {
            unimplemented!()
        }
        fn waitpid_blocking(&self, _: Option<Pid>) -> Result<WaitStatus> {
            unimplemented!()
        }
        fn kill(&self, _: Pid, _: Option<Signal>) -> Result<()> {
            unimplemented!()
        }
        fn reset_signal_default(&self, _: Signal) -> Result<()> {
            unimplemented!()
        }
        fn ignore_signal(&self, _: Signal) -> Result<()> {
            unimplemented!()
        }
        fn chdir(&self, _: &Path) -> Result<()> {
            unimplemented!()
        }
        fn getcwd(&self) -> Result<PathBuf> {
            unimplemented!()
        }
        fn is_executable_file(&self, path: &CStr) -> bool {
            let path = PathBuf::from(std::str::from_utf8(path.to_bytes()).unwrap());
            self.executables.contains(&path)
        }
        fn exit(&self, _: i32) -> ! {
            unimplemented!()
        }
    }

    #[test]
    fn command_with_slash_is_used_verbatim() {
        let system = FakeSystem {
            executables: vec![PathBuf::from("./local/tool")],
        };
        assert_eq!(
            resolve(&system, "./local/tool", Some("/usr/bin")),
            Some(PathBuf::from("./local/tool"))
        );
    }

    #[test]
    fn first_matching_directory_in_path_wins() {
        let system = FakeSystem {
            executables: vec![PathBuf::from("/bin/ls")],
        };
        assert_eq!(
            resolve(&system, "ls", Some("/usr/bin:/bin")),
            Some(PathBuf::from("/bin/ls"))
        );
    }

    #[test]
    fn missing_command_resolves_to_none() {
        let system = FakeSystem { executables: vec![] };
        assert_eq!(resolve(&system, "nope", Some("/usr/bin:/bin")), None);
    }

    #[test]
    fn unset_path_falls_back_to_default() {
        let system = FakeSystem {
            executables: vec![PathBuf::from("/bin/sh")],
        };
        assert_eq!(resolve(&system, "sh", None), Some(PathBuf::from("/bin/sh")));
    }
}
