//! Library entry points: loading, checking and running a program.

use crate::checker::{self, LabelTable};
use crate::error::{Fault, LoadError};
use crate::instruction::{Instruction, Operand};
use crate::interpreter::Interpreter;
use crate::loader;
use crate::value::Value;
use smallvec::SmallVec;
use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::info;

/// A program that passed the loader and the static checks.
///
/// Programs are immutable; running one never changes it, so a program can
/// be executed any number of times.
#[derive(Debug, Clone)]
pub struct Program {
    instructions: Vec<Instruction>,
    labels: LabelTable,
    /// Literal operands converted to values, parallel to `instructions`.
    constants: Vec<Constants>,
}

/// Converted literal operands of one instruction, `None` for other operands.
type Constants = SmallVec<[Option<Value>; 3]>;

/// Why a program could not be prepared for execution.
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Check(#[from] Fault),
}

impl ProgramError {
    pub fn code(&self) -> u8 {
        match self {
            ProgramError::Load(err) => err.code(),
            ProgramError::Check(fault) => fault.code(),
        }
    }
}

impl Program {
    /// Loads a program from its XML representation and checks it.
    ///
    /// A document that is not valid UTF-8 is malformed XML.
    pub fn load(xml: impl AsRef<[u8]>) -> Result<Self, ProgramError> {
        let xml = std::str::from_utf8(xml.as_ref()).map_err(LoadError::from)?;
        let instructions = loader::load(xml)?;
        Ok(Self::from_instructions(instructions)?)
    }

    /// Checks an already decoded instruction list.
    pub fn from_instructions(instructions: Vec<Instruction>) -> Result<Self, Fault> {
        let labels = checker::check(&instructions)?;
        let constants: Vec<Constants> = instructions
            .iter()
            .enumerate()
            .map(|(position, instruction)| {
                instruction
                    .operands
                    .iter()
                    .map(|operand| match operand {
                        Operand::Constant(literal) => Value::from_literal(literal).map(Some),
                        _ => Ok(None),
                    })
                    .collect::<Result<Constants, _>>()
                    .map_err(|error| Fault::new(error, position, instruction.opcode))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            instructions,
            labels,
            constants,
        })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Label name to the index of its `LABEL` instruction.
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// The value of the literal operand `idx` of the instruction at `position`.
    pub fn constant(&self, position: usize, idx: usize) -> Option<&Value> {
        self.constants.get(position)?.get(idx)?.as_ref()
    }
}

/// Loads, checks and runs the XML program in `source`.
///
/// Returns the process exit code: 0 on normal termination, the `EXIT`
/// operand, or the code of the first error. Error messages are written to
/// `diagnostics`.
pub fn execute(
    source: impl AsRef<[u8]>,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    diagnostics: &mut dyn Write,
) -> u8 {
    let result = match Program::load(source) {
        Ok(program) => {
            info!("Program loaded, {} instruction(s)", program.instructions().len());
            Interpreter::new(&program)
                .run(input, output, diagnostics)
                .map_err(ProgramError::from)
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            info!("Execution failed with code {}", err.code());
            // Diagnostics must not overtake output written before the failure.
            let _ = output.flush();
            let _ = writeln!(diagnostics, "error: {err}");
            let _ = diagnostics.flush();
            err.code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str, input: &str) -> (u8, String, String) {
        let mut input = input.as_bytes();
        let (mut stdout, mut stderr) = (Vec::<u8>::new(), Vec::<u8>::new());
        let code = execute(source, &mut input, &mut stdout, &mut stderr);
        (
            code,
            String::from_utf8(stdout).unwrap(),
            String::from_utf8(stderr).unwrap(),
        )
    }

    const BAD_ORDER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<program language="IPPcode23">
  <instruction order="1" opcode="READ">
    <arg1 type="var">GF@name</arg1>
    <arg2 type="type">string</arg2>
  </instruction>
  <instruction order="0x" opcode="BREAK"/>
</program>"#;

    #[test]
    fn test_loader_error_is_reported() {
        let (code, stdout, stderr) = run(BAD_ORDER, "");
        assert_eq!(code, 32);
        assert!(stdout.is_empty());
        assert!(stderr.starts_with("error: XML document has wrong structure"));
    }

    #[test]
    fn test_hello() {
        let source = r#"<program language="IPPcode23">
  <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@name</arg1></instruction>
  <instruction order="2" opcode="READ">
    <arg1 type="var">GF@name</arg1>
    <arg2 type="type">string</arg2>
  </instruction>
  <instruction order="3" opcode="WRITE"><arg1 type="string">Hello,\032</arg1></instruction>
  <instruction order="4" opcode="WRITE"><arg1 type="var">GF@name</arg1></instruction>
</program>"#;
        let (code, stdout, stderr) = run(source, "world\n");
        assert_eq!(code, 0);
        assert_eq!(stdout, "Hello, world");
        assert!(stderr.is_empty());
    }

    #[test]
    fn test_runtime_fault_is_reported() {
        let source = r#"<program language="IPPcode23">
  <instruction order="1" opcode="WRITE"><arg1 type="int">1</arg1></instruction>
  <instruction order="2" opcode="WRITE"><arg1 type="var">GF@x</arg1></instruction>
</program>"#;
        let (code, stdout, stderr) = run(source, "");
        assert_eq!(code, 54);
        assert_eq!(stdout, "1");
        assert_eq!(
            stderr,
            "error: variable `GF@x` does not exist (instruction 1: WRITE)\n"
        );
    }

    #[test]
    fn test_check_fault_is_reported() {
        let source = r#"<program language="IPPcode23">
  <instruction order="1" opcode="JUMP"><arg1 type="label">nowhere</arg1></instruction>
</program>"#;
        let (code, _, stderr) = run(source, "");
        assert_eq!(code, 52);
        assert_eq!(stderr, "error: undefined label(s): nowhere\n");
    }

    #[test]
    fn test_program_is_reusable() {
        let program = Program::load(
            r#"<program language="IPPcode23">
  <instruction order="1" opcode="LABEL"><arg1 type="label">top</arg1></instruction>
  <instruction order="2" opcode="EXIT"><arg1 type="int">3</arg1></instruction>
</program>"#,
        )
        .unwrap();
        assert_eq!(program.labels().get("top"), Some(&0));
        assert_eq!(program.constant(1, 0), Some(&Value::Int(3)));
        assert_eq!(program.constant(0, 0), None);
        for _ in 0..2 {
            let mut input: &[u8] = b"";
            let (mut stdout, mut stderr) = (Vec::<u8>::new(), Vec::<u8>::new());
            let code = Interpreter::new(&program).run(&mut input, &mut stdout, &mut stderr);
            assert_eq!(code, Ok(3));
        }
    }

    #[test]
    fn test_literals_are_converted_once() {
        let program = Program::load(
            r#"<program language="IPPcode23">
  <instruction order="1" opcode="WRITE"><arg1 type="string">a\032b</arg1></instruction>
</program>"#,
        )
        .unwrap();
        assert_eq!(program.constant(0, 0), Some(&Value::Str("a b".into())));
        assert_eq!(program.constant(0, 1), None);
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let source = b"<program language=\"IPPcode23\">\xff\xfe</program>";
        let err = Program::load(source).unwrap_err();
        assert_eq!(err.code(), 31);

        let mut stderr = Vec::<u8>::new();
        let code = execute(source, &mut &b""[..], &mut std::io::sink(), &mut stderr);
        assert_eq!(code, 31);
        let stderr = String::from_utf8(stderr).unwrap();
        assert!(stderr.starts_with("error: XML document is not valid UTF-8"), "{stderr}");
    }
}
