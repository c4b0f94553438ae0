//! Common test utilities and macros

use std::path::Path;

#[derive(Debug)]
pub enum TestResult {
    /// Fell off the end of the program with the given output.
    Success(String),
    /// Terminated by `EXIT` with the given code and output.
    Exit(u8, String),
    /// Failed with the given code and message.
    Error(u8, String),
    /// Failed with the given code and a message matching the pattern.
    ErrorRegex(u8, String),
}

impl PartialEq for TestResult {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TestResult::Success(a), TestResult::Success(b)) => a == b,
            (TestResult::Exit(a, out_a), TestResult::Exit(b, out_b)) => a == b && out_a == out_b,
            (TestResult::Error(a, msg_a), TestResult::Error(b, msg_b)) => a == b && msg_a == msg_b,
            (TestResult::ErrorRegex(a, pattern), TestResult::Error(b, msg))
            | (TestResult::Error(b, msg), TestResult::ErrorRegex(a, pattern)) => {
                a == b && regex::Regex::new(pattern).unwrap().is_match(msg)
            }
            _ => false,
        }
    }
}

/// Everything a program run produced.
#[derive(Debug)]
pub struct Outcome {
    pub code: u8,
    pub stdout: String,
    pub stderr: String,
}

pub fn run_program(source_file: &Path, input: &str) -> Outcome {
    let source = std::fs::read_to_string(source_file)
        .unwrap_or_else(|err| panic!("cannot read {}: {err}", source_file.display()));
    let mut input = input.as_bytes();
    let (mut stdout, mut stderr) = (Vec::<u8>::new(), Vec::<u8>::new());
    let code = ippcrab::execute(&source, &mut input, &mut stdout, &mut stderr);
    Outcome {
        code,
        stdout: String::from_utf8(stdout).unwrap(),
        stderr: String::from_utf8(stderr).unwrap(),
    }
}

pub fn run_interpreter_test(source_file: &Path, input: &str) -> TestResult {
    let outcome = run_program(source_file, input);
    let failure = outcome
        .stderr
        .lines()
        .last()
        .and_then(|line| line.strip_prefix("error: "));
    match failure {
        Some(message) => TestResult::Error(outcome.code, message.to_string()),
        None if outcome.code == 0 => TestResult::Success(outcome.stdout),
        None => TestResult::Exit(outcome.code, outcome.stdout),
    }
}

pub fn input_path(file: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("inputs")
        .join(file)
}

#[macro_export]
macro_rules! check_program {
    ($test_name:ident, source=$source_file:expr, result=$expected:expr) => {
        check_program!($test_name, source = $source_file, input = "", result = $expected);
    };
    ($test_name:ident, source=$source_file:expr, input=$input:expr, result=$expected:expr) => {
        #[test]
        fn $test_name() {
            let source_path = crate::common::input_path($source_file);
            let result = crate::common::run_interpreter_test(&source_path, $input);
            assert_eq!(result, $expected);
        }
    };
}
