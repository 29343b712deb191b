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

//! The variable store: a keyed store of `(name, value, exported?)`
//! tuples, with the exported subset mirrored into the process
//! environment that `execve` passes to children.

use indexmap::IndexMap;

/// One variable's value and export flag. Names never have more than one
/// live entry; `set` overwrites in place.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Variable {
    pub value: String,
    pub exported: bool,
}

/// The shell's variable store.
///
/// `$?`, `$$`, `$!`, and `$0` are *not* stored here: they are served
/// directly by [`VariableStore::get`] from values the executor/job table
/// (or `arg0`) push in, so that they can never be shadowed or persisted
/// by an ordinary assignment.
///
/// Assignments are never mirrored into the real process environment via
/// `std::env::set_var`: a child only ever sees the shell's exported
/// variables through the explicit envp [`VariableStore::exported_environment`]
/// builds for `execve`.
#[derive(Debug, Default)]
pub struct VariableStore {
    entries: IndexMap<String, Variable>,
    pub last_status: i32,
    pub shell_pid: i32,
    pub last_background_pgid: i32,
    pub arg0: String,
}

impl VariableStore {
    pub fn new() -> Self {
        VariableStore::default()
    }

    /// Looks up `name`, falling back to the process environment for names
    /// that have never been assigned in the shell but were inherited at
    /// startup and exported by the parent.
    pub fn get(&self, name: &str) -> Option<String> {
        match name {
            "?" => return Some(self.last_status.to_string()),
            "$" => return Some(self.shell_pid.to_string()),
            "0" => return Some(self.arg0.clone()),
            "!" => {
                return if self.last_background_pgid == 0 {
                    None
                } else {
                    Some(self.last_background_pgid.to_string())
                }
            }
            _ => {}
        }
        if let Some(var) = self.entries.get(name) {
            return Some(var.value.clone());
        }
        std::env::var(name).ok()
    }

    /// Sets `name` to `value`. If `exported` is true (or the variable was
    /// already exported), it is picked up the next time
    /// [`VariableStore::exported_environment`] builds a child's envp.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>, exported: bool) {
        let name = name.into();
        let value = value.into();
        let entry = self.entries.entry(name).or_insert_with(|| Variable {
            value: String::new(),
            exported: false,
        });
        entry.value = value;
        entry.exported |= exported;
    }

    /// Marks an existing variable as exported. A name with no prior value
    /// becomes an exported empty-valued variable, matching `export NAME`
    /// with no `=value` on a previously-unset name.
    pub fn export(&mut self, name: &str) {
        let entry = self.entries.entry(name.to_owned()).or_insert_with(|| Variable {
            value: String::new(),
            exported: false,
        });
        entry.exported = true;
    }

    pub fn is_exported(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|v| v.exported)
    }

    /// All currently defined shell variables, in insertion order, for
    /// `export -p`-style enumeration. Backed by an `IndexMap` so that
    /// iteration order matches assignment order, as real shells print it.
    pub fn enumerate(&self) -> IndexMap<String, Variable> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// The environment a freshly exec'd child should receive: every
    /// exported shell variable as a `NAME=value` string.
    pub fn exported_environment(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, v)| v.exported)
            .map(|(k, v)| format!("{k}={}", v.value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let mut store = VariableStore::new();
        store.set("FOO", "bar", false);
        assert_eq!(store.get("FOO"), Some("bar".to_owned()));
    }

    #[test]
    fn undefined_variable_is_none_unless_in_process_environment() {
        let store = VariableStore::new();
        assert_eq!(store.get("POSH_TEST_DOES_NOT_EXIST_XYZ"), None);
    }

    #[test]
    fn export_mirrors_into_exported_environment() {
        let mut store = VariableStore::new();
        store.set("FOO", "bar", false);
        assert!(store.exported_environment().is_empty());
        store.export("FOO");
        assert_eq!(store.exported_environment(), vec!["FOO=bar".to_owned()]);
    }

    #[test]
    fn set_with_export_flag_exports_immediately() {
        let mut store = VariableStore::new();
        store.set("FOO", "bar", true);
        assert!(store.is_exported("FOO"));
    }

    #[test]
    fn pseudo_variables_are_served_directly_and_not_stored() {
        let mut store = VariableStore::new();
        store.last_status = 7;
        store.shell_pid = 1234;
        assert_eq!(store.get("?"), Some("7".to_owned()));
        assert_eq!(store.get("$"), Some("1234".to_owned()));
        assert_eq!(store.enumerate().get("?"), None);
    }

    #[test]
    fn last_background_pgid_is_none_until_set() {
        let store = VariableStore::new();
        assert_eq!(store.get("!"), None);
    }

    #[test]
    fn arg0_parameter_is_served_from_the_store() {
        let mut store = VariableStore::new();
        store.arg0 = "posh".to_owned();
        assert_eq!(store.get("0"), Some("posh".to_owned()));
        assert_eq!(store.enumerate().get("0"), None);
    }
}
