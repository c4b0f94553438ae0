//! Operand handling for instruction execution.
//!
//! This module resolves instruction operands into runtime values, writes
//! results back to their target variables, and maps label operands onto
//! positions in the instruction list.

use super::engine::Interpreter;
use crate::error::{ExecError, Result};
use crate::instruction::{Instruction, Operand, Variable};
use crate::ty::Type;
use crate::value::Value;
use std::borrow::Cow;

/// Returns the operand at `idx`, or a structure error if it is missing.
pub(super) fn operand(instr: &Instruction, idx: usize) -> Result<&Operand> {
    instr.operands.get(idx).ok_or_else(|| {
        ExecError::Structure(format!("{} is missing operand {}", instr.opcode, idx + 1))
    })
}

pub(super) fn variable(instr: &Instruction, idx: usize) -> Result<&Variable> {
    match operand(instr, idx)? {
        Operand::Variable(var) => Ok(var),
        other => Err(unexpected(instr, idx, other)),
    }
}

pub(super) fn type_keyword(instr: &Instruction, idx: usize) -> Result<Type> {
    match operand(instr, idx)? {
        Operand::Type(ty) => Ok(*ty),
        other => Err(unexpected(instr, idx, other)),
    }
}

pub(super) fn label_name(instr: &Instruction, idx: usize) -> Result<&str> {
    match operand(instr, idx)? {
        Operand::Label(name) => Ok(name),
        other => Err(unexpected(instr, idx, other)),
    }
}

fn unexpected(instr: &Instruction, idx: usize, found: &Operand) -> ExecError {
    ExecError::Structure(format!(
        "operand {} of {} cannot be `{found}`",
        idx + 1,
        instr.opcode
    ))
}

impl Interpreter<'_> {
    /// Evaluates a symbol operand. Reading an uninitialized variable fails.
    pub(super) fn symbol(&self, instr: &Instruction, idx: usize) -> Result<Cow<'_, Value>> {
        match self.symbol_slot(instr, idx)? {
            Some(value) => Ok(value),
            None => Err(ExecError::MissingValue(format!(
                "variable `{}` is uninitialized",
                operand(instr, idx)?
            ))),
        }
    }

    /// Evaluates a symbol operand, yielding `None` for an uninitialized variable.
    pub(super) fn symbol_slot(
        &self,
        instr: &Instruction,
        idx: usize,
    ) -> Result<Option<Cow<'_, Value>>> {
        match operand(instr, idx)? {
            Operand::Variable(var) => Ok(self.memory.slot(var)?.map(Cow::Borrowed)),
            // Literals were converted when the program was built.
            constant @ Operand::Constant(_) => self
                .program
                .constant(self.position, idx)
                .map(|value| Some(Cow::Borrowed(value)))
                .ok_or_else(|| unexpected(instr, idx, constant)),
            other => Err(unexpected(instr, idx, other)),
        }
    }

    /// Stores `value` into the variable named by the first operand.
    pub(super) fn assign(&mut self, instr: &Instruction, value: Value) -> Result<()> {
        let var = variable(instr, 0)?;
        self.memory.write(var, Some(value))
    }

    /// Looks up the position of the label named by the first operand.
    pub(super) fn jump_target(&self, instr: &Instruction) -> Result<usize> {
        let name = label_name(instr, 0)?;
        self.program
            .labels()
            .get(name)
            .copied()
            .ok_or_else(|| ExecError::UndefinedLabel(vec![name.to_string()]))
    }
}
