// This file is part of the yutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use std::process::{Command, Output};

fn echo_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_echo"));
    cmd.env_remove("POSIXLY_CORRECT");
    cmd
}

fn run(args: &[&str]) -> Output {
    echo_cmd().args(args).output().expect("failed to run echo")
}

fn run_posixly_correct(args: &[&str]) -> Output {
    echo_cmd()
        .env("POSIXLY_CORRECT", "1")
        .args(args)
        .output()
        .expect("failed to run echo")
}

#[test]
fn no_arguments_prints_a_newline() {
    let output = run(&[]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"\n");
}

#[test]
fn arguments_are_joined_by_single_spaces() {
    let output = run(&["hello", "world"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"hello world\n");
}

#[test]
fn n_suppresses_trailing_newline() {
    let output = run(&["-n", "hello"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"hello");
}

#[test]
#[cfg(not(feature = "xpg-echo"))]
fn escapes_are_off_by_default() {
    let output = run(&[r"a\tb"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"a\\tb\n");
}

#[test]
fn e_enables_escapes() {
    let output = run(&["-e", r"a\tb\nc"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"a\tb\nc\n");
}

#[test]
fn uppercase_e_disables_escapes_last_wins() {
    let output = run(&["-e", "-E", r"a\tb"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"a\\tb\n");
}

#[test]
fn clustered_flags_are_recognized() {
    let output = run(&["-ne", r"x\ty"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"x\ty");
}

#[test]
fn invalid_cluster_is_ordinary_text() {
    let output = run(&["-nq", "x"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"-nq x\n");
}

#[test]
fn dash_alone_is_ordinary_text() {
    let output = run(&["-", "x"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"- x\n");
}

#[test]
fn c_escape_stops_all_output() {
    // later arguments and the trailing newline are discarded
    let output = run(&["-e", r"a\cb", "tail"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"a");
}

#[test]
fn hex_escapes() {
    let output = run(&["-e", r"\x41\x4a\x7"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"AJ\x07\n");

    // \x without a hex digit stays literal
    let output = run(&["-e", r"\xzz"]);
    assert_eq!(output.stdout, b"\\xzz\n");
}

#[test]
fn octal_escapes() {
    let output = run(&["-e", r"\0101\101"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"AA\n");

    let output = run(&["-e", r"\0"]);
    assert_eq!(output.stdout, b"\0\n");
}

#[test]
fn unrecognized_escape_prints_backslash_and_letter() {
    let output = run(&["-e", r"\q\8"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"\\q\\8\n");
}

#[test]
fn posixly_correct_enables_escapes() {
    let output = run_posixly_correct(&[r"a\tb"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"a\tb\n");
}

#[test]
fn posixly_correct_prints_option_like_arguments() {
    // the first argument is not -n, so -e is plain text
    let output = run_posixly_correct(&["-e", "hello"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"-e hello\n");
}

#[test]
#[cfg(not(feature = "xpg-echo"))]
fn posixly_correct_still_honors_leading_n() {
    let output = run_posixly_correct(&["-n", "hello"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"hello");
}

#[test]
fn help_only_as_sole_argument() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "stdout: {stdout}");

    // anywhere else it is ordinary text
    let output = run(&["x", "--help"]);
    assert_eq!(output.stdout, b"x --help\n");
}

#[test]
fn version_only_as_sole_argument() {
    let output = run(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")), "stdout: {stdout}");
}
