use crate::error::{ExecError, Result};
use crate::instruction::Opcode;
use crate::value::{Int, Value};
use num_traits::{CheckedAdd, CheckedMul, CheckedSub, PrimInt, Signed, Zero};

/// Trait for evaluating binary operations on values.
pub trait BinaryEval {
    /// Evaluates a binary operation on two values.
    ///
    /// # Arguments
    /// * `left` - Left operand value
    /// * `right` - Right operand value
    ///
    /// # Returns
    /// * `Ok(Value)` - Result of the operation
    /// * `Err(ExecError)` - If the operand types or values are invalid
    fn eval(&self, left: &Value, right: &Value) -> Result<Value>;
}

/// Trait for evaluating unary operations on values.
pub trait UnaryEval {
    /// Evaluates a unary operation on a value.
    ///
    /// # Arguments
    /// * `operand` - The value to operate on
    ///
    /// # Returns
    /// * `Ok(Value)` - Result of the operation
    /// * `Err(ExecError)` - If the operand type is invalid
    fn eval_unary(&self, operand: &Value) -> Result<Value>;
}

impl BinaryEval for Opcode {
    fn eval(&self, left: &Value, right: &Value) -> Result<Value> {
        let mismatch = || ExecError::types(*self, &[left.ty(), right.ty()]);
        match self {
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::IDiv => match (left, right) {
                (Value::Int(l), Value::Int(r)) => eval_int_binop(*self, *l, *r),
                _ => Err(mismatch()),
            },
            Opcode::Lt | Opcode::Gt => {
                let ordering = left.compare(right).ok_or_else(mismatch)?;
                Ok(Value::Bool(if *self == Opcode::Lt {
                    ordering.is_lt()
                } else {
                    ordering.is_gt()
                }))
            }
            Opcode::Eq => left.equals(right).map(Value::Bool).ok_or_else(mismatch),
            Opcode::And | Opcode::Or => match (left, right) {
                (Value::Bool(l), Value::Bool(r)) => Ok(Value::Bool(if *self == Opcode::And {
                    *l && *r
                } else {
                    *l || *r
                })),
                _ => Err(mismatch()),
            },
            _ => Err(ExecError::Structure(format!("{self} is not a binary operation"))),
        }
    }
}

impl UnaryEval for Opcode {
    fn eval_unary(&self, operand: &Value) -> Result<Value> {
        match (self, operand) {
            (Opcode::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            (Opcode::Not, other) => Err(ExecError::types(*self, &[other.ty()])),
            _ => Err(ExecError::Structure(format!("{self} is not a unary operation"))),
        }
    }
}

/// Evaluates an arithmetic operation on integers.
fn eval_int_binop(op: Opcode, left: Int, right: Int) -> Result<Value> {
    let result = match op {
        Opcode::Add => CheckedAdd::checked_add(&left, &right),
        Opcode::Sub => CheckedSub::checked_sub(&left, &right),
        Opcode::Mul => CheckedMul::checked_mul(&left, &right),
        Opcode::IDiv => {
            if right.is_zero() {
                return Err(ExecError::OperandValue("division by zero".to_string()));
            }
            floor_div(left, right)
        }
        _ => return Err(ExecError::Structure(format!("{op} is not an arithmetic operation"))),
    };
    result
        .map(Value::Int)
        .ok_or_else(|| ExecError::OperandValue(format!("integer overflow in {op}")))
}

/// Integer division rounding towards negative infinity.
///
/// Returns `None` on overflow or division by zero.
fn floor_div<T: PrimInt + Signed>(left: T, right: T) -> Option<T> {
    let quotient = left.checked_div(&right)?;
    let remainder = left % right;
    if !remainder.is_zero() && (remainder.is_negative() != right.is_negative()) {
        Some(quotient - T::one())
    } else {
        Some(quotient)
    }
}
