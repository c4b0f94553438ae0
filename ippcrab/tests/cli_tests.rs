mod common;

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn ippcrab(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_ippcrab"))
        .args(args)
        .env("IPPCRAB_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn source(file: &str) -> String {
    common::input_path(file).to_string_lossy().into_owned()
}

#[test]
fn test_source_file_with_stdin_input() {
    let output = ippcrab(&["--source", &source("hello.xml")], "crab\n");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(output.stdout, b"Hello, crab!\n");
}

#[test]
fn test_input_file_with_stdin_source() {
    let program = std::fs::read_to_string(common::input_path("write_42.xml")).unwrap();
    let output = ippcrab(&["-i", &source("hello.xml")], &program);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(output.stdout, b"42");
}

#[test]
fn test_exit_code_is_forwarded() {
    let output = ippcrab(&["-s", &source("exit_code.xml")], "");
    assert_eq!(output.status.code(), Some(7));
    assert_eq!(output.stdout, b"before");
}

#[test]
fn test_error_code_and_message() {
    let output = ippcrab(&["--source", &source("div_zero.xml")], "");
    assert_eq!(output.status.code(), Some(57));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("division by zero"), "{stderr}");
}

#[test]
fn test_missing_arguments() {
    assert_eq!(ippcrab(&[], "").status.code(), Some(10));
    assert_eq!(ippcrab(&["--bogus"], "").status.code(), Some(10));
}

#[test]
fn test_help() {
    let output = ippcrab(&["--help"], "");
    assert_eq!(output.status.code(), Some(0));
    assert!(!output.stdout.is_empty());
}

#[test]
fn test_unreadable_source() {
    let output = ippcrab(&["--source", "/nonexistent/program.xml"], "");
    assert_eq!(output.status.code(), Some(11));
    let output = ippcrab(
        &["-s", &source("write_42.xml"), "-i", "/nonexistent/input.txt"],
        "",
    );
    assert_eq!(output.status.code(), Some(11));
}

#[test]
fn test_source_with_invalid_utf8() {
    let path = std::env::temp_dir().join(format!("ippcrab-invalid-{}.xml", std::process::id()));
    std::fs::write(&path, b"<program language=\"IPPcode23\">\xff\xfe</program>").unwrap();
    let output = ippcrab(&["--source", &path.to_string_lossy()], "");
    std::fs::remove_file(&path).unwrap();
    assert_eq!(output.status.code(), Some(31));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("error: XML document is not valid UTF-8"), "{stderr}");
}
