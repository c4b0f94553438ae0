use crate::error::{ExecError, Result};
use crate::instruction::Literal;
use crate::ty::Type;
use num_traits::Num;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

/// Integer type used by the interpreter.
///
/// Arithmetic is checked; a result that does not fit is an operand value error.
pub type Int = i64;

/// Runtime value held by a variable or pushed onto the data stack.
///
/// A declared variable that was never assigned holds no `Value` at all, which
/// is different from holding [`Value::Nil`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(Int),
    Str(String),
    Bool(bool),
    Nil,
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Str(_) => Type::String,
            Value::Bool(_) => Type::Bool,
            Value::Nil => Type::Nil,
        }
    }

    /// Converts a literal constant into a value.
    pub fn from_literal(literal: &Literal) -> Result<Self> {
        let text = literal.text.as_str();
        match literal.ty {
            Type::Int => parse_int(text).map(Value::Int).ok_or_else(|| {
                ExecError::Structure(format!("`{text}` is not a valid integer literal"))
            }),
            Type::String => Ok(Value::Str(decode_escapes(text).into_owned())),
            Type::Bool => Ok(Value::Bool(text.eq_ignore_ascii_case("true"))),
            Type::Nil if text == "nil" => Ok(Value::Nil),
            Type::Nil => Err(ExecError::Structure(format!(
                "`{text}` is not a valid nil literal"
            ))),
        }
    }

    /// Equality as used by `EQ`, `JUMPIFEQ` and `JUMPIFNEQ`.
    ///
    /// `nil` may be compared with anything, other values only with a value of
    /// the same type.
    pub fn equals(&self, other: &Value) -> Option<bool> {
        match (self, other) {
            (Value::Nil, _) | (_, Value::Nil) => Some(self == other),
            _ if self.ty() == other.ty() => Some(self == other),
            _ => None,
        }
    }

    /// Ordering as used by `LT` and `GT`. `None` if the values can't be ordered.
    pub fn compare(&self, other: &Value) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Value::Int(l), Value::Int(r)) => Some(l.cmp(r)),
            (Value::Str(l), Value::Str(r)) => Some(l.cmp(r)),
            (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
            _ => None,
        }
    }

    /// Renders the value the way it is written in source, e.g. `string@a\032b`.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Str(s) => format!("string@{}", encode_escapes(s)),
            Value::Nil => "nil@nil".to_string(),
            other => format!("{}@{}", other.ty(), other),
        }
    }
}

/// Program output representation, as printed by `WRITE`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Nil => Ok(()),
        }
    }
}

/// Parses an integer in decimal, hexadecimal (`0x`) or octal (`0o`) notation
/// with an optional sign.
pub fn parse_int(text: &str) -> Option<Int> {
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = match unsigned.get(..2) {
        Some("0x" | "0X") => (16, &unsigned[2..]),
        Some("0o" | "0O") => (8, &unsigned[2..]),
        _ => (10, unsigned),
    };
    if digits.is_empty() || !digits.bytes().all(|b| (b as char).is_digit(radix)) {
        return None;
    }
    // Parse with the sign attached so that `Int::MIN` is representable.
    let signed = if negative {
        Cow::Owned(format!("-{digits}"))
    } else {
        Cow::Borrowed(digits)
    };
    <Int as Num>::from_str_radix(&signed, radix).ok()
}

static ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([0-9]{3})").expect("escape pattern is valid"));

/// Replaces every `\DDD` escape sequence with the character at codepoint `DDD`.
pub fn decode_escapes(text: &str) -> Cow<'_, str> {
    ESCAPE.replace_all(text, |caps: &Captures<'_>| {
        caps[1]
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    })
}

/// Inverse of [`decode_escapes`] for whitespace, `#` and `\`, which can't
/// appear verbatim in string literals.
fn encode_escapes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            c if (c as u32) < 1000
                && (c.is_whitespace() || c.is_control() || c == '#' || c == '\\') =>
            {
                format!("\\{:03}", c as u32)
            }
            c => c.to_string(),
        })
        .collect()
}
