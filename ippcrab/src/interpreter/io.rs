//! The streams a running program talks to.
//!
//! `READ` consumes the input line by line, `WRITE` goes to the output and
//! `DPRINT`/`BREAK` go to the diagnostic stream. The output is flushed
//! before every diagnostic write so that both appear in program order when
//! they share a terminal.

use crate::error::{ExecError, Result};
use crate::ty::Type;
use crate::value::{Value, parse_int};
use std::io::{BufRead, ErrorKind, Write};
use tracing::trace;

pub(crate) struct Io<'a> {
    input: &'a mut dyn BufRead,
    output: &'a mut dyn Write,
    diagnostics: &'a mut dyn Write,
}

impl<'a> Io<'a> {
    pub(crate) fn new(
        input: &'a mut dyn BufRead,
        output: &'a mut dyn Write,
        diagnostics: &'a mut dyn Write,
    ) -> Self {
        Self {
            input,
            output,
            diagnostics,
        }
    }

    /// Reads one line and converts it to a value of type `ty`.
    ///
    /// End of input and undecodable input both produce `nil`.
    pub(crate) fn read_value(&mut self, ty: Type) -> Result<Value> {
        let mut line = String::new();
        let line = match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                trace!("Input line is not valid UTF-8: {err}");
                return Ok(Value::Nil);
            }
            Err(err) => return Err(err.into()),
        };
        Ok(parse_input(line.as_deref(), ty))
    }

    pub(crate) fn write_value(&mut self, value: &Value) -> Result<()> {
        write!(self.output, "{value}")?;
        Ok(())
    }

    /// Writes `text` to the diagnostic stream after flushing the output.
    pub(crate) fn diagnostic(&mut self, text: &str) -> Result<()> {
        self.output.flush()?;
        self.diagnostics.write_all(text.as_bytes())?;
        self.diagnostics.flush()?;
        Ok(())
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        self.output.flush().map_err(ExecError::from)
    }
}

/// Converts one input line into a value. `None` means end of input.
fn parse_input(line: Option<&str>, ty: Type) -> Value {
    let Some(line) = line else {
        return Value::Nil;
    };
    let line = line
        .strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line);
    match ty {
        Type::String => Value::Str(line.to_string()),
        Type::Int => parse_int(line.trim()).map_or(Value::Nil, Value::Int),
        Type::Bool => Value::Bool(line.trim().eq_ignore_ascii_case("true")),
        Type::Nil => Value::Nil,
    }
}
