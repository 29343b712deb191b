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

//! End-to-end scenarios run against the real `posh` binary.
//! Every script is fed on stdin with `interactive` effectively off (fd 0
//! is a pipe, not a terminal), so no prompt text appears in captured
//! output.

use std::io::Write;
use std::process::{Command, Stdio};

const BIN: &str = env!("CARGO_BIN_EXE_posh");

fn run_script(script: &str, dir: &std::path::Path) -> std::process::Output {
    let mut child = Command::new(BIN)
        .current_dir(dir)
        .env("HOME", dir)
        .env("PATH", std::env::var_os("PATH").unwrap())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("posh should start");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(script.as_bytes())
        .unwrap();

    child.wait_with_output().expect("posh should exit")
}

#[test]
fn echo_prints_its_argument() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script("echo hello\n", dir.path());
    assert_eq!(out.stdout, b"hello\n");
    assert!(out.status.success());
}

#[test]
fn double_quotes_preserve_internal_spacing_but_still_split_words() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script("echo \"a b\"  c\n", dir.path());
    assert_eq!(out.stdout, b"a b c\n");
}

#[test]
fn pipeline_status_is_the_last_stage() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script("true | false | true\necho $?\n", dir.path());
    assert_eq!(out.stdout, b"0\n");
}

#[test]
fn exit_status_is_visible_to_the_next_command() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script("false\necho $?\n", dir.path());
    assert_eq!(out.stdout, b"1\n");
}

#[test]
fn shell_variable_set_on_one_line_is_read_on_the_next() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script("FOO=bar\necho $FOO\n", dir.path());
    assert_eq!(out.stdout, b"bar\n");
}

#[test]
fn pathname_expansion_sorts_matches() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b.txt", "a.txt", "c.txt"] {
        std::fs::write(dir.path().join(name), "").unwrap();
    }
    let out = run_script("echo *.txt\n", dir.path());
    assert_eq!(out.stdout, b"a.txt b.txt c.txt\n");
}

#[test]
fn redirected_output_is_written_to_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script("cat > out.txt\nhi\n", dir.path());
    assert!(out.status.success());
    let contents = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
    assert_eq!(contents, "hi\n");
}

#[test]
fn negation_inverts_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script("! true\necho $?\n", dir.path());
    assert_eq!(out.stdout, b"1\n");

    let out = run_script("! false\necho $?\n", dir.path());
    assert_eq!(out.stdout, b"0\n");
}

#[test]
fn cd_changes_directory_for_subsequent_commands() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("sub/marker.txt"), "").unwrap();
    let out = run_script("cd sub\necho *.txt\n", dir.path());
    assert_eq!(out.stdout, b"marker.txt\n");
}

#[test]
fn empty_pipeline_from_a_blank_line_does_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script("\necho ok\n", dir.path());
    assert_eq!(out.stdout, b"ok\n");
}

#[test]
fn parse_error_reports_to_stderr_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script("|\necho still-alive\n", dir.path());
    assert!(!out.stderr.is_empty());
    assert_eq!(out.stdout, b"still-alive\n");
}

#[test]
fn background_job_appears_in_jobs_listing() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script("sleep 1 &\njobs\n", dir.path());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("Running") && stdout.contains("sleep 1"),
        "expected a running job line, got: {stdout:?}"
    );
}
