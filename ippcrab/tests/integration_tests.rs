#[macro_use]
mod common;

use common::TestResult;

check_program!(
    test_write_42,
    source = "write_42.xml",
    result = TestResult::Success("42".to_string())
);

check_program!(
    test_exit_code,
    source = "exit_code.xml",
    result = TestResult::Exit(7, "before".to_string())
);

check_program!(
    test_hello,
    source = "hello.xml",
    input = "world\n",
    result = TestResult::Success("Hello, world!\n".to_string())
);

check_program!(
    test_recursive_factorial,
    source = "factorial.xml",
    result = TestResult::Success("120".to_string())
);

check_program!(
    test_string_instructions,
    source = "strings.xml",
    result = TestResult::Success("ahoj světe\n10\nv\nAhoj světe\n104\nΩ\n".to_string())
);

check_program!(
    test_read_types,
    source = "read_types.xml",
    input = "42\ntrue\nsome text\nabc\n",
    result = TestResult::Success("42truesome textnilnil".to_string())
);

check_program!(
    test_counting_loop,
    source = "loop.xml",
    result = TestResult::Success("01234\n".to_string())
);

// Loader errors
check_program!(
    test_not_well_formed,
    source = "not_well_formed.xml",
    result = TestResult::ErrorRegex(31, r"^XML document is not well-formed".to_string())
);

check_program!(
    test_wrong_structure,
    source = "wrong_structure.xml",
    result = TestResult::ErrorRegex(32, r"not contiguous".to_string())
);

// Static check errors
check_program!(
    test_duplicate_label,
    source = "duplicate_label.xml",
    result = TestResult::Error(
        52,
        "label `here` is already defined at instruction 0 (instruction 1: LABEL)".to_string()
    )
);

check_program!(
    test_undefined_label,
    source = "undefined_label.xml",
    result = TestResult::Error(52, "undefined label(s): nowhere".to_string())
);

// Runtime errors
check_program!(
    test_type_mismatch,
    source = "type_mismatch.xml",
    result = TestResult::ErrorRegex(53, r"ADD cannot operate on \(string, int\)".to_string())
);

check_program!(
    test_undefined_variable,
    source = "undefined_var.xml",
    result = TestResult::Error(
        54,
        "variable `GF@ghost` does not exist (instruction 1: WRITE)".to_string()
    )
);

check_program!(
    test_missing_frame,
    source = "missing_frame.xml",
    result = TestResult::ErrorRegex(55, r"local frame does not exist \(instruction 3: POPFRAME\)".to_string())
);

check_program!(
    test_uninitialized_variable,
    source = "uninitialized.xml",
    result = TestResult::ErrorRegex(56, r"`GF@x` is uninitialized".to_string())
);

check_program!(
    test_empty_data_stack,
    source = "empty_stack.xml",
    result = TestResult::ErrorRegex(56, r"data stack is empty".to_string())
);

check_program!(
    test_division_by_zero,
    source = "div_zero.xml",
    result = TestResult::ErrorRegex(57, r"division by zero".to_string())
);

check_program!(
    test_string_index_out_of_bounds,
    source = "string_index.xml",
    result = TestResult::ErrorRegex(58, r"index 5 is out of bounds".to_string())
);

#[test]
fn test_output_precedes_error() {
    let outcome = common::run_program(&common::input_path("undefined_var.xml"), "");
    assert_eq!(outcome.code, 54);
    assert_eq!(outcome.stdout, "partial");
}

#[test]
fn test_diagnostics_are_separate() {
    let outcome = common::run_program(&common::input_path("diagnostics.xml"), "");
    assert_eq!(outcome.code, 0);
    assert_eq!(outcome.stdout, "visible");
    let pattern = regex::Regex::new(
        r"(?s)^1\nposition: 4\ninstruction: BREAK\nexecuted instructions: 4\nglobal frame: \{x: int@1\}\ntemporary frame: <absent>\n",
    )
    .unwrap();
    assert!(pattern.is_match(&outcome.stderr), "{}", outcome.stderr);
}
