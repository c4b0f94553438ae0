//! Error taxonomy of the interpreter.
//!
//! Every failure maps to the numeric code the process exits with. Loader
//! failures (31, 32) are reported by [`LoadError`], static and runtime
//! failures by [`ExecError`], which a [`Fault`] ties to the instruction that
//! raised it.

use crate::instruction::Opcode;
use crate::ty::Type;
use thiserror::Error;

/// Result type used by the memory model, value model and engine.
pub type Result<T, E = ExecError> = std::result::Result<T, E>;

/// Errors raised while turning the XML representation into instructions.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("XML document is not well-formed: {0}")]
    NotWellFormed(#[from] roxmltree::Error),

    #[error("XML document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("XML document has wrong structure: {0}")]
    Structure(String),
}

impl LoadError {
    pub fn code(&self) -> u8 {
        match self {
            LoadError::NotWellFormed(_) | LoadError::Encoding(_) => 31,
            LoadError::Structure(_) => 32,
        }
    }
}

/// Semantic and runtime failures, both detected statically and dynamically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("invalid program structure: {0}")]
    Structure(String),

    #[error("label `{label}` is already defined at instruction {first}")]
    DuplicateLabel { label: String, first: usize },

    #[error("undefined label(s): {}", .0.join(", "))]
    UndefinedLabel(Vec<String>),

    #[error("variable `{0}` is already defined")]
    Redefinition(String),

    #[error("invalid operand type(s): {0}")]
    OperandType(String),

    #[error("variable `{0}` does not exist")]
    NoSuchVariable(String),

    #[error("{0} does not exist")]
    NoSuchFrame(&'static str),

    #[error("missing value: {0}")]
    MissingValue(String),

    #[error("invalid operand value: {0}")]
    OperandValue(String),

    #[error("string operation failed: {0}")]
    String(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl ExecError {
    pub fn code(&self) -> u8 {
        match self {
            ExecError::Structure(_) => 32,
            ExecError::DuplicateLabel { .. }
            | ExecError::UndefinedLabel(_)
            | ExecError::Redefinition(_) => 52,
            ExecError::OperandType(_) => 53,
            ExecError::NoSuchVariable(_) => 54,
            ExecError::NoSuchFrame(_) => 55,
            ExecError::MissingValue(_) => 56,
            ExecError::OperandValue(_) => 57,
            ExecError::String(_) => 58,
            ExecError::Io(_) => 99,
        }
    }

    /// Shorthand for an operand type error listing the offending types.
    pub(crate) fn types(opcode: Opcode, found: &[Type]) -> Self {
        let found: Vec<_> = found.iter().map(|ty| ty.name()).collect();
        ExecError::OperandType(format!("{opcode} cannot operate on ({})", found.join(", ")))
    }
}

impl From<std::io::Error> for ExecError {
    fn from(err: std::io::Error) -> Self {
        ExecError::Io(err.to_string())
    }
}

/// An [`ExecError`] attributed to a position in the instruction list.
///
/// The position is absent for failures that concern the program as a whole,
/// such as labels that are never defined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}{}", location(.at))]
pub struct Fault {
    #[source]
    pub error: ExecError,
    pub at: Option<(usize, Opcode)>,
}

impl Fault {
    pub fn new(error: ExecError, position: usize, opcode: Opcode) -> Self {
        Self {
            error,
            at: Some((position, opcode)),
        }
    }

    pub fn code(&self) -> u8 {
        self.error.code()
    }
}

fn location(at: &Option<(usize, Opcode)>) -> String {
    match at {
        Some((position, opcode)) => format!(" (instruction {position}: {opcode})"),
        None => String::new(),
    }
}

impl From<ExecError> for Fault {
    fn from(error: ExecError) -> Self {
        Self { error, at: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_error_codes() {
        assert_eq!(ExecError::Structure(String::new()).code(), 32);
        assert_eq!(ExecError::UndefinedLabel(vec!["end".into()]).code(), 52);
        assert_eq!(ExecError::Redefinition("GF@x".into()).code(), 52);
        assert_eq!(ExecError::OperandType(String::new()).code(), 53);
        assert_eq!(ExecError::NoSuchVariable("GF@x".into()).code(), 54);
        assert_eq!(ExecError::NoSuchFrame("temporary frame").code(), 55);
        assert_eq!(ExecError::MissingValue(String::new()).code(), 56);
        assert_eq!(ExecError::OperandValue(String::new()).code(), 57);
        assert_eq!(ExecError::String(String::new()).code(), 58);
        assert_eq!(ExecError::Io(String::new()).code(), 99);
    }

    #[test]
    fn test_fault_message_has_location() {
        let fault = Fault::new(ExecError::NoSuchVariable("GF@x".into()), 3, Opcode::Write);
        assert_eq!(
            fault.to_string(),
            "variable `GF@x` does not exist (instruction 3: WRITE)"
        );
        assert_eq!(fault.code(), 54);

        let fault = Fault::from(ExecError::UndefinedLabel(vec!["a".into(), "b".into()]));
        assert_eq!(fault.to_string(), "undefined label(s): a, b");
    }
}
