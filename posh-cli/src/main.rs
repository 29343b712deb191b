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

//! The `posh` binary: argv handling and the REPL driver.
//!
//! Command-line handling is a hand-rolled argv scan rather than a
//! dependency on an argument-parsing crate: the surface is a single
//! optional positional operand (a script path), which does not earn its
//! own parser.

use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use posh_env::{Env, RealSystem};
use posh_semantics::Outcome;
use std::io::Write;
use std::os::unix::io::{IntoRawFd, RawFd};

/// Input lines may not exceed this many bytes.
const MAX_LINE_BYTES: usize = 4096;

fn main() {
    let mut args = std::env::args();
    let arg0 = args.next().unwrap_or_else(|| "posh".to_owned());

    let script_path = args.next();
    let input_fd: RawFd = match &script_path {
        Some(path) => match std::fs::File::open(path) {
            Ok(file) => {
                let fd = file.into_raw_fd();
                // A script file is the shell's own, never a descriptor a
                // launched command should inherit.
                let _ = fcntl(fd, FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC));
                fd
            }
            Err(e) => {
                eprintln!("posh: {path}: {e}");
                std::process::exit(127);
            }
        },
        // fd 0 is read directly, unbuffered: a pipeline stage like `cat`
        // inherits fd 0 verbatim, so the shell must never read ahead past
        // the newline that ends the line it is currently parsing.
        None => 0,
    };

    let mut env = Env::new(Box::new(RealSystem::new()));
    env.variables.arg0 = arg0;
    env.variables.shell_pid = env.system.getpid().as_raw();
    // A script given on the command line is never treated as interactive,
    // even if fd 0 happens to be a terminal.
    if script_path.is_some() {
        env.interactive = false;
    }

    if let Err(e) = posh_env::signal::install_shell_dispositions(env.system.as_ref()) {
        eprintln!("posh: warning: could not install signal dispositions: {e}");
    }

    let status = run(&mut env, input_fd);
    std::process::exit(status);
}

fn run(env: &mut Env, input: RawFd) -> i32 {
    let builtins = posh_builtin::table();

    loop {
        posh_semantics::reap_background(env);

        if env.interactive {
            print!("$ ");
            let _ = std::io::stdout().flush();
        }

        match read_line(input) {
            Ok(Some(line)) => {
                let pipeline = match posh_syntax::parse_line(&line) {
                    Ok(pipeline) => pipeline,
                    Err(e) => {
                        eprintln!("posh: {e}");
                        env.set_last_status(2);
                        continue;
                    }
                };

                match posh_semantics::execute(env, &builtins, &pipeline) {
                    Ok(Outcome::Status(status)) => env.set_last_status(status),
                    Ok(Outcome::Exit(status)) => return status,
                    Err(e) => {
                        eprintln!("posh: {e}");
                        return 1;
                    }
                }
            }
            Ok(None) => return env.last_status(),
            Err(e) => {
                eprintln!("posh: {e}");
                return 1;
            }
        }
    }
}

/// Reads one line (without its trailing newline) directly off `input`,
/// one byte per `read(2)` call. Returns `Ok(None)` on EOF with nothing
/// read. A line exceeding [`MAX_LINE_BYTES`] is reported as an error
/// rather than silently truncated or split.
///
/// This intentionally bypasses any userspace buffering: `input` may be
/// fd 0, which a launched command's own stdin is `dup2`'d from, so the
/// shell must leave every byte after the line's terminating newline
/// untouched in the underlying pipe or terminal for that command to see.
fn read_line(input: RawFd) -> std::io::Result<Option<String>> {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = nix::unistd::read(input, &mut byte)
            .map_err(|e| std::io::Error::from_raw_os_error(e as i32))?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(None);
            }
            break;
        }
        if byte[0] == b'\n' {
            break;
        }
        buf.push(byte[0]);
        if buf.len() > MAX_LINE_BYTES {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "input line exceeds the 4096-byte limit",
            ));
        }
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_env::system::{Errno, OpenMode, Result, System};
    use nix::sys::signal::Signal;
    use nix::sys::wait::WaitStatus;
    use nix::unistd::{ForkResult, Pid};
    use std::ffi::{CStr, CString};
    use std::path::{Path, PathBuf};

    /// Writes `bytes` into a pipe and returns its read end, closing the
    /// write end immediately so the read end reports EOF once drained —
    /// a stand-in for fd 0 that `read_line`/`run` can read unbuffered.
    fn fixture_input(bytes: &[u8]) -> RawFd {
        let (read_fd, write_fd) = nix::unistd::pipe().unwrap();
        nix::unistd::write(&write_fd, bytes).unwrap();
        drop(write_fd);
        read_fd.into_raw_fd()
    }

    /// A no-op `System` sufficient to exercise `run`'s line-reading and
    /// dispatch logic without forking anything real.
    struct NullSystem;

    impl System for NullSystem {
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
            Ok(())
        }
        fn open(&self, _: &CStr, _: OpenMode, _: u32) -> Result<RawFd> {
            unimplemented!()
        }
        fn getpid(&self) -> Pid {
            Pid::from_raw(4242)
        }
        fn getpgrp(&self) -> Pid {
            Pid::from_raw(4242)
        }
        fn setpgid(&self, _: Pid, _: Pid) -> Result<()> {
            Ok(())
        }
        fn tcgetpgrp(&self, _: RawFd) -> Result<Pid> {
            unimplemented!()
        }
        fn tcsetpgrp(&self, _: RawFd, _: Pid) -> Result<()> {
            Ok(())
        }
        fn isatty(&self, _: RawFd) -> bool {
            false
        }
        fn waitpid_nonblocking(&self) -> Result<Option<WaitStatus>> {
            Ok(None)
        }
        fn waitpid_blocking(&self, _: Option<Pid>) -> Result<WaitStatus> {
            unimplemented!()
        }
        fn kill(&self, _: Pid, _: Option<Signal>) -> Result<()> {
            unimplemented!()
        }
        fn reset_signal_default(&self, _: Signal) -> Result<()> {
            Ok(())
        }
        fn ignore_signal(&self, _: Signal) -> Result<()> {
            Ok(())
        }
        fn chdir(&self, _: &Path) -> Result<()> {
            unimplemented!()
        }
        fn getcwd(&self) -> Result<PathBuf> {
            unimplemented!()
        }
        fn is_executable_file(&self, _: &CStr) -> bool {
            false
        }
        fn exit(&self, _: i32) -> ! {
            unimplemented!()
        }
    }

    #[test]
    fn read_line_strips_newline_and_reports_eof() {
        let input = fixture_input(b"echo hi\n");
        assert_eq!(read_line(input).unwrap(), Some("echo hi".to_owned()));
        assert_eq!(read_line(input).unwrap(), None);
    }

    #[test]
    fn read_line_accepts_a_final_line_with_no_trailing_newline() {
        let input = fixture_input(b"echo hi");
        assert_eq!(read_line(input).unwrap(), Some("echo hi".to_owned()));
    }

    #[test]
    fn oversized_line_is_rejected() {
        let long = vec![b'a'; MAX_LINE_BYTES + 1];
        let input = fixture_input(&long);
        assert!(read_line(input).is_err());
    }

    #[test]
    fn exit_builtin_terminates_the_read_loop() {
        let mut env = Env::new(Box::new(NullSystem));
        let input = fixture_input(b"exit 7\n");
        assert_eq!(run(&mut env, input), 7);
    }

    #[test]
    fn parse_error_sets_status_two_and_continues() {
        let mut env = Env::new(Box::new(NullSystem));
        let input = fixture_input(b"|\nexit $?\n");
        assert_eq!(run(&mut env, input), 2);
    }

    #[test]
    fn blank_line_is_a_no_op_pipeline() {
        let mut env = Env::new(Box::new(NullSystem));
        let input = fixture_input(b"\nexit 0\n");
        assert_eq!(run(&mut env, input), 0);
    }
}
