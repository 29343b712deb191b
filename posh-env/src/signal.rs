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

//! Shell-level signal bootstrap and the deferred SIGCHLD flag.
//!
//! The SIGCHLD handler below does only what is async-signal-safe: it
//! stores `true` into a static atomic. The reaper, running at the next
//! safe point (top of the read loop, or right after a blocking wait),
//! drains that flag and calls `waitpid` itself — a deferred-notification
//! pattern preferable to doing real work in signal context, simplified
//! to a single flag since this shell only ever needs to know that some
//! child changed state, not which signal arrived.

use crate::system::System;
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicBool, Ordering};

static SIGCHLD_CAUGHT: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigchld(_signal: libc::c_int) {
    // Async-signal-safe: a single non-atomic-RMW store.
    SIGCHLD_CAUGHT.store(true, Ordering::Relaxed);
}

/// Returns whether SIGCHLD has been caught since the last call, clearing
/// the flag. The reaper calls this to decide whether a non-blocking
/// `waitpid` sweep is worth doing.
pub fn take_sigchld() -> bool {
    SIGCHLD_CAUGHT.swap(false, Ordering::Relaxed)
}

/// Job-control signals whose default disposition matters to this shell:
/// delivered to the terminal's foreground process group, they would
/// otherwise stop or kill the shell itself.
pub const JOB_CONTROL_SIGNALS: [Signal; 5] = [
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGTSTP,
    Signal::SIGTTIN,
    Signal::SIGTTOU,
];

/// Installs the shell's own signal dispositions: ignore every job-control
/// signal (the shell's residence in its own process group is the primary
/// defense; this is the documented defense-in-depth for races and manual
/// `kill`s) and install the SIGCHLD handler with `SA_RESTART` so that the
/// interactive read loop resumes transparently after a reap.
pub fn install_shell_dispositions(system: &dyn System) -> nix::Result<()> {
    if system.isatty(0) {
        for &signal in &JOB_CONTROL_SIGNALS {
            system.ignore_signal(signal)?;
        }
    }

    let action = SigAction::new(
        SigHandler::Handler(on_sigchld),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // SAFETY: `on_sigchld` only performs an async-signal-safe atomic store.
    unsafe { nix::sys::signal::sigaction(Signal::SIGCHLD, &action) }?;
    Ok(())
}

/// Restores default dispositions for every job-control signal and
/// SIGCHLD. Every forked child calls this before exec: ignore
/// dispositions persist across `execve`, so a child that
/// didn't restore defaults would be immune to `^C` even though the shell
/// never meant to make external programs signal-proof.
pub fn restore_child_dispositions(system: &dyn System) -> nix::Result<()> {
    for &signal in &JOB_CONTROL_SIGNALS {
        system.reset_signal_default(signal)?;
    }
    system.reset_signal_default(Signal::SIGCHLD)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigchld_flag_starts_clear_and_latches_once_set() {
        // Reset in case another test in this process set it.
        let _ = take_sigchld();
        SIGCHLD_CAUGHT.store(true, Ordering::Relaxed);
        assert!(take_sigchld());
        assert!(!take_sigchld());
    }
}
