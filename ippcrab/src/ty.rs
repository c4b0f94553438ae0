//! Module with the runtime type tags of IPPcode23 values.
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Type tag of a value, a literal constant, or a `READ` type keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// Signed integer
    Int,
    /// Sequence of Unicode scalar values
    String,
    /// Boolean
    Bool,
    /// The `nil` singleton
    Nil,
}

impl Type {
    /// All type tags, in the order they are listed in messages.
    pub const ALL: &'static [Type] = &[Type::Int, Type::String, Type::Bool, Type::Nil];

    /// The keyword used for this type in source programs and by `TYPE`.
    pub fn name(self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::String => "string",
            Type::Bool => "bool",
            Type::Nil => "nil",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a type keyword is not one of `int`, `string`, `bool`, `nil`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown type `{0}`")]
pub struct UnknownType(pub String);

impl FromStr for Type {
    type Err = UnknownType;

    /// Type keywords are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Type::ALL
            .iter()
            .copied()
            .find(|ty| ty.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownType(s.to_string()))
    }
}
