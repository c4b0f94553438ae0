//! String instructions.
//!
//! Strings are indexed by Unicode scalar value, not by byte.

use crate::error::{ExecError, Result};
use crate::instruction::Opcode;
use crate::value::{Int, Value};

fn mismatch(opcode: Opcode, values: &[&Value]) -> ExecError {
    let types: Vec<_> = values.iter().map(|v| v.ty()).collect();
    ExecError::types(opcode, &types)
}

/// Converts a character index into a `usize`, rejecting negative indices
/// and indices past the end of a string with `len` characters.
fn char_index(index: Int, len: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|idx| *idx < len)
        .ok_or_else(|| {
            ExecError::String(format!(
                "index {index} is out of bounds for a string of length {len}"
            ))
        })
}

/// `INT2CHAR`: the character with the given codepoint.
pub fn int2char(code: &Value) -> Result<Value> {
    let Value::Int(code) = code else {
        return Err(mismatch(Opcode::Int2Char, &[code]));
    };
    u32::try_from(*code)
        .ok()
        .and_then(char::from_u32)
        .map(|c| Value::Str(c.to_string()))
        .ok_or_else(|| ExecError::String(format!("{code} is not a valid Unicode codepoint")))
}

/// `STRI2INT`: the codepoint of the character at `index`.
pub fn stri2int(string: &Value, index: &Value) -> Result<Value> {
    let (Value::Str(s), Value::Int(index)) = (string, index) else {
        return Err(mismatch(Opcode::Stri2Int, &[string, index]));
    };
    let idx = char_index(*index, s.chars().count())?;
    let c = s.chars().nth(idx).ok_or_else(|| {
        ExecError::String(format!("index {index} is out of bounds"))
    })?;
    Ok(Value::Int(Int::from(u32::from(c))))
}

pub fn concat(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Str(l), Value::Str(r)) => Ok(Value::Str(format!("{l}{r}"))),
        _ => Err(mismatch(Opcode::Concat, &[left, right])),
    }
}

/// `STRLEN`: the number of characters.
pub fn strlen(string: &Value) -> Result<Value> {
    let Value::Str(s) = string else {
        return Err(mismatch(Opcode::StrLen, &[string]));
    };
    Int::try_from(s.chars().count())
        .map(Value::Int)
        .map_err(|_| ExecError::OperandValue("string length does not fit an integer".into()))
}

/// `GETCHAR`: the one-character string at `index`.
pub fn getchar(string: &Value, index: &Value) -> Result<Value> {
    let (Value::Str(s), Value::Int(index)) = (string, index) else {
        return Err(mismatch(Opcode::GetChar, &[string, index]));
    };
    let idx = char_index(*index, s.chars().count())?;
    Ok(Value::Str(s.chars().skip(idx).take(1).collect()))
}

/// `SETCHAR`: replaces the character of `target` at `index` with the first
/// character of `replacement`.
pub fn setchar(target: &Value, index: &Value, replacement: &Value) -> Result<Value> {
    let (Value::Str(s), Value::Int(index), Value::Str(replacement)) = (target, index, replacement)
    else {
        return Err(mismatch(Opcode::SetChar, &[target, index, replacement]));
    };
    let idx = char_index(*index, s.chars().count())?;
    let new = replacement
        .chars()
        .next()
        .ok_or_else(|| ExecError::String("replacement string is empty".to_string()))?;
    let updated = s
        .chars()
        .enumerate()
        .map(|(pos, c)| if pos == idx { new } else { c })
        .collect();
    Ok(Value::Str(updated))
}
