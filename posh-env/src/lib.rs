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

//! Execution environment: the variable store, the job table, the `System`
//! interface to the operating system, and `PATH` search.
//!
//! `posh-env` owns every piece of process-wide state a running shell
//! needs but contains no pipeline semantics itself; `posh-semantics`
//! builds expansion and the executor on top of the types defined here.

pub mod job;
pub mod path;
pub mod signal;
pub mod system;
pub mod variable;

pub use job::{Job, JobState, JobTable};
pub use system::{RealSystem, System};
pub use variable::VariableStore;

use nix::unistd::Pid;

/// The live state of one shell process: variables, jobs, and a handle to
/// the system. `posh-semantics::Executor` and `posh-builtin`'s builtins
/// take `&mut Env` as their shared piece of mutable state, exactly as the
/// teacher's `yash_env::Env` is threaded through builtins and semantics.
pub struct Env {
    pub variables: VariableStore,
    pub jobs: JobTable,
    pub system: Box<dyn System>,
    /// Whether fd 0 is a terminal and the shell should behave
    /// interactively (prompt, job control).
    pub interactive: bool,
    /// This shell's own process group, restored as the terminal's
    /// foreground group whenever no job is in the foreground.
    pub shell_pgid: Pid,
}

impl Env {
    pub fn new(system: Box<dyn System>) -> Self {
        let shell_pgid = system.getpgrp();
        let interactive = system.isatty(0);
        Env {
            variables: VariableStore::new(),
            jobs: JobTable::new(),
            system,
            interactive,
            shell_pgid,
        }
    }

    /// `$?`: the most recently completed pipeline's exit status. Kept on
    /// `VariableStore` rather than duplicated here, so there is exactly
    /// one place that can go stale.
    pub fn last_status(&self) -> i32 {
        self.variables.last_status
    }

    /// `$0`: the name the shell was invoked as. Kept on `VariableStore`
    /// alongside the other pseudo-variables it serves directly.
    pub fn arg0(&self) -> &str {
        &self.variables.arg0
    }

    pub fn set_last_status(&mut self, status: i32) {
        self.variables.last_status = status;
    }
}
