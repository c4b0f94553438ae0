//! Static semantic checks performed before execution.
//!
//! A single pass over the instruction list validates operand shapes against
//! the opcode signatures, type-checks literal operands, and builds the label
//! table. Jump and call targets may refer to labels defined later on; any
//! target still undefined at the end of the pass is an error.

use crate::error::{ExecError, Fault, Result};
use crate::instruction::{Instruction, Opcode, Operand, Pairing, Slot};
use crate::value::Value;
use std::collections::HashMap;
use tracing::debug;

/// Maps each label name to the index of its `LABEL` instruction.
pub type LabelTable = HashMap<String, usize>;

/// Checks the program and returns its label table.
///
/// Reports the first violation in instruction order.
pub fn check(instructions: &[Instruction]) -> Result<LabelTable, Fault> {
    let mut labels = LabelTable::new();
    let mut expected: Vec<&str> = Vec::new();

    for (position, instruction) in instructions.iter().enumerate() {
        let fault = |error: ExecError| Fault::new(error, position, instruction.opcode);
        check_shape(instruction).map_err(fault)?;
        check_literals(instruction).map_err(fault)?;

        match (instruction.opcode, instruction.operands.first()) {
            (Opcode::Label, Some(Operand::Label(name))) => {
                if let Some(&first) = labels.get(name) {
                    return Err(fault(ExecError::DuplicateLabel {
                        label: name.clone(),
                        first,
                    }));
                }
                labels.insert(name.clone(), position);
            }
            (op, Some(Operand::Label(name))) if op.targets_label() => {
                if !expected.contains(&name.as_str()) {
                    expected.push(name);
                }
            }
            _ => {}
        }
    }

    let undefined: Vec<String> = expected
        .into_iter()
        .filter(|name| !labels.contains_key(*name))
        .map(str::to_string)
        .collect();
    if !undefined.is_empty() {
        return Err(ExecError::UndefinedLabel(undefined).into());
    }

    debug!("Static checks passed, {} label(s) defined", labels.len());
    Ok(labels)
}

/// Validates the operand count and kinds against the opcode signature.
fn check_shape(instruction: &Instruction) -> Result<()> {
    let opcode = instruction.opcode;
    let signature = opcode.signature();
    if instruction.operands.len() != signature.len() {
        return Err(ExecError::Structure(format!(
            "{opcode} expects {} operand(s), found {}",
            signature.len(),
            instruction.operands.len()
        )));
    }

    for (idx, (slot, operand)) in signature.iter().zip(&instruction.operands).enumerate() {
        let matches = matches!(
            (slot, operand),
            (Slot::Var, Operand::Variable(_))
                | (Slot::Symb(_), Operand::Variable(_) | Operand::Constant(_))
                | (Slot::Label, Operand::Label(_))
                | (Slot::Type, Operand::Type(_))
        );
        if !matches {
            return Err(ExecError::Structure(format!(
                "operand {} of {opcode} cannot be `{operand}`",
                idx + 1
            )));
        }
    }
    Ok(())
}

/// Type-checks the literal constants of an instruction.
///
/// Operands held in variables are left to the engine, their types are only
/// known at runtime.
fn check_literals(instruction: &Instruction) -> Result<()> {
    let opcode = instruction.opcode;
    let mut symbols: Vec<Option<Value>> = Vec::with_capacity(2);

    for (slot, operand) in opcode.signature().iter().zip(&instruction.operands) {
        let Slot::Symb(allowed) = slot else {
            continue;
        };
        let value = match operand {
            Operand::Constant(literal) => {
                let value = Value::from_literal(literal)?;
                if !allowed.contains(&value.ty()) {
                    return Err(ExecError::types(opcode, &[value.ty()]));
                }
                Some(value)
            }
            _ => None,
        };
        symbols.push(value);
    }

    if let [Some(left), Some(right)] = symbols.as_slice() {
        let compatible = match opcode.pairing() {
            Pairing::Independent => true,
            Pairing::SameType => left.ty() == right.ty(),
            Pairing::SameTypeOrNil => left.equals(right).is_some(),
        };
        if !compatible {
            return Err(ExecError::types(opcode, &[left.ty(), right.ty()]));
        }
    }

    match (opcode, symbols.as_slice()) {
        (Opcode::IDiv, [_, Some(Value::Int(0))]) => Err(ExecError::OperandValue(
            "division by zero".to_string(),
        )),
        (Opcode::Exit, [Some(Value::Int(code))]) if !(0..=49).contains(code) => Err(
            ExecError::OperandValue(format!("exit code {code} is outside of 0..=49")),
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::listing;

    fn check_src(src: &str) -> Result<LabelTable, Fault> {
        check(&listing(src))
    }

    fn code(src: &str) -> u8 {
        check_src(src).unwrap_err().code()
    }

    #[test]
    fn test_label_table() {
        let labels = check_src(
            "LABEL start
             DEFVAR GF@x
             LABEL end",
        )
        .unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels["start"], 0);
        assert_eq!(labels["end"], 2);
    }

    #[test]
    fn test_forward_reference() {
        let labels = check_src(
            "JUMP end
             CALL fn
             LABEL fn
             RETURN
             LABEL end",
        )
        .unwrap();
        assert_eq!(labels["fn"], 2);
        assert_eq!(labels["end"], 4);
    }

    #[test]
    fn test_duplicate_label() {
        let fault = check_src(
            "LABEL a
             LABEL a",
        )
        .unwrap_err();
        assert_eq!(fault.code(), 52);
        assert_eq!(fault.at, Some((1, Opcode::Label)));
    }

    #[test]
    fn test_undefined_label() {
        let fault = check_src(
            "JUMPIFEQ missing int@1 int@1
             LABEL other
             CALL gone",
        )
        .unwrap_err();
        assert_eq!(fault.code(), 52);
        assert_eq!(
            fault.error,
            ExecError::UndefinedLabel(vec!["missing".into(), "gone".into()])
        );
    }

    #[test]
    fn test_shape_errors() {
        let mut instr = listing("ADD GF@x int@1 int@2").remove(0);
        instr.operands.pop();
        assert_eq!(check(&[instr]).unwrap_err().code(), 32);

        // Constant where a variable is written.
        assert_eq!(code("MOVE int@1 int@2"), 32);
        assert_eq!(code("MOVE GF@x int@x1"), 32);
    }

    #[test]
    fn test_read_any_type_keyword() {
        check_src("READ GF@x nil\nREAD GF@x int").unwrap();
    }

    #[test]
    fn test_literal_types() {
        assert_eq!(code("ADD GF@x int@1 string@a"), 53);
        assert_eq!(code("NOT GF@x int@1"), 53);
        assert_eq!(code("LT GF@x nil@nil GF@y"), 53);
        assert_eq!(code("LT GF@x int@1 bool@true"), 53);
        assert_eq!(code("EQ GF@x int@1 string@1"), 53);
        assert_eq!(code("JUMPIFNEQ l bool@true int@1"), 53);
        assert_eq!(code("SETCHAR GF@s int@0 int@1"), 53);
        assert_eq!(code("EXIT string@1"), 53);
    }

    #[test]
    fn test_literal_types_accepted() {
        check_src(
            "EQ GF@x nil@nil int@5
             EQ GF@x string@a GF@y
             LT GF@x string@a string@b
             STRI2INT GF@x string@abc int@1
             MOVE GF@x nil@nil
             EXIT int@49",
        )
        .unwrap();
    }

    #[test]
    fn test_literal_values() {
        assert_eq!(code("IDIV GF@x GF@y int@0"), 57);
        assert_eq!(code("EXIT int@50"), 57);
        assert_eq!(code("EXIT int@-1"), 57);
        check_src("IDIV GF@x int@0 int@3").unwrap();
    }

    #[test]
    fn test_first_violation_wins() {
        let fault = check_src(
            "ADD GF@x int@1 bool@true
             LABEL a
             LABEL a",
        )
        .unwrap_err();
        assert_eq!(fault.code(), 53);
        assert_eq!(fault.at, Some((0, Opcode::Add)));
    }
}
