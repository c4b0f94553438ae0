//! Instruction representation.
//!
//! An [`Instruction`] is an [`Opcode`] together with up to three positional
//! [`Operand`]s. Each opcode has a fixed signature describing which operand
//! kinds it accepts and which literal types are valid for its symbol operands.

use crate::ty::Type;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// The frame a variable operand lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// `GF`
    Global,
    /// `LF`, the top of the local frame stack
    Local,
    /// `TF`
    Temporary,
}

impl FrameKind {
    pub fn prefix(self) -> &'static str {
        match self {
            FrameKind::Global => "GF",
            FrameKind::Local => "LF",
            FrameKind::Temporary => "TF",
        }
    }

    /// Human readable name used in error messages.
    pub fn description(self) -> &'static str {
        match self {
            FrameKind::Global => "global frame",
            FrameKind::Local => "local frame",
            FrameKind::Temporary => "temporary frame",
        }
    }
}

/// Reference to a variable, e.g. `LF@counter`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    pub frame: FrameKind,
    pub name: String,
}

impl Variable {
    pub fn new(frame: FrameKind, name: impl Into<String>) -> Self {
        Self {
            frame,
            name: name.into(),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame.prefix(), self.name)
    }
}

impl FromStr for Variable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, name) = s
            .split_once('@')
            .ok_or_else(|| format!("variable `{s}` is missing its frame prefix"))?;
        let frame = match prefix {
            "GF" => FrameKind::Global,
            "LF" => FrameKind::Local,
            "TF" => FrameKind::Temporary,
            _ => return Err(format!("unknown frame `{prefix}` in variable `{s}`")),
        };
        if name.is_empty() {
            return Err(format!("variable `{s}` has an empty name"));
        }
        Ok(Self::new(frame, name))
    }
}

/// A typed constant exactly as written in the program, e.g. `int@0x1F`.
///
/// Conversion into a runtime value is deferred to the value model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub ty: Type,
    pub text: String,
}

impl Literal {
    pub fn new(ty: Type, text: impl Into<String>) -> Self {
        Self {
            ty,
            text: text.into(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.ty, self.text)
    }
}

/// One positional argument of an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Variable(Variable),
    Constant(Literal),
    Label(String),
    /// Type keyword, only used by `READ`.
    Type(Type),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Variable(var) => var.fmt(f),
            Operand::Constant(literal) => literal.fmt(f),
            Operand::Label(label) => f.write_str(label),
            Operand::Type(ty) => ty.fmt(f),
        }
    }
}

/// Operand kind accepted at one position of an opcode signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// A variable that is written (or, for `SETCHAR`, updated in place).
    Var,
    /// A variable or a constant; constants must have one of the listed types.
    Symb(&'static [Type]),
    Label,
    Type,
}

/// How the symbol operands of a relational opcode must relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    Independent,
    /// Both operands share a type.
    SameType,
    /// Both operands share a type, unless either of them is `nil`.
    SameTypeOrNil,
}

const ANY: &[Type] = Type::ALL;
const INT: &[Type] = &[Type::Int];
const STRING: &[Type] = &[Type::String];
const BOOL: &[Type] = &[Type::Bool];
const ORDERED: &[Type] = &[Type::Int, Type::String, Type::Bool];

macro_rules! opcodes {
    ($($variant:ident => $mnemonic:literal [$($slot:expr),*] $pairing:ident;)*) => {
        /// The IPPcode23 instruction set.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Opcode {
            $($variant,)*
        }

        impl Opcode {
            /// Every opcode, in declaration order.
            pub const ALL: &'static [Opcode] = &[$(Opcode::$variant,)*];

            /// The upper-case mnemonic used in source programs.
            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(Opcode::$variant => $mnemonic,)*
                }
            }

            /// Operand kinds expected by this opcode, in order.
            pub fn signature(self) -> &'static [Slot] {
                match self {
                    $(Opcode::$variant => &[$($slot),*],)*
                }
            }

            pub fn pairing(self) -> Pairing {
                match self {
                    $(Opcode::$variant => Pairing::$pairing,)*
                }
            }
        }
    };
}

opcodes! {
    Move => "MOVE" [Slot::Var, Slot::Symb(ANY)] Independent;
    CreateFrame => "CREATEFRAME" [] Independent;
    PushFrame => "PUSHFRAME" [] Independent;
    PopFrame => "POPFRAME" [] Independent;
    DefVar => "DEFVAR" [Slot::Var] Independent;
    Call => "CALL" [Slot::Label] Independent;
    Return => "RETURN" [] Independent;
    PushS => "PUSHS" [Slot::Symb(ANY)] Independent;
    PopS => "POPS" [Slot::Var] Independent;
    Add => "ADD" [Slot::Var, Slot::Symb(INT), Slot::Symb(INT)] Independent;
    Sub => "SUB" [Slot::Var, Slot::Symb(INT), Slot::Symb(INT)] Independent;
    Mul => "MUL" [Slot::Var, Slot::Symb(INT), Slot::Symb(INT)] Independent;
    IDiv => "IDIV" [Slot::Var, Slot::Symb(INT), Slot::Symb(INT)] Independent;
    Lt => "LT" [Slot::Var, Slot::Symb(ORDERED), Slot::Symb(ORDERED)] SameType;
    Gt => "GT" [Slot::Var, Slot::Symb(ORDERED), Slot::Symb(ORDERED)] SameType;
    Eq => "EQ" [Slot::Var, Slot::Symb(ANY), Slot::Symb(ANY)] SameTypeOrNil;
    And => "AND" [Slot::Var, Slot::Symb(BOOL), Slot::Symb(BOOL)] Independent;
    Or => "OR" [Slot::Var, Slot::Symb(BOOL), Slot::Symb(BOOL)] Independent;
    Not => "NOT" [Slot::Var, Slot::Symb(BOOL)] Independent;
    Int2Char => "INT2CHAR" [Slot::Var, Slot::Symb(INT)] Independent;
    Stri2Int => "STRI2INT" [Slot::Var, Slot::Symb(STRING), Slot::Symb(INT)] Independent;
    Read => "READ" [Slot::Var, Slot::Type] Independent;
    Write => "WRITE" [Slot::Symb(ANY)] Independent;
    Concat => "CONCAT" [Slot::Var, Slot::Symb(STRING), Slot::Symb(STRING)] Independent;
    StrLen => "STRLEN" [Slot::Var, Slot::Symb(STRING)] Independent;
    GetChar => "GETCHAR" [Slot::Var, Slot::Symb(STRING), Slot::Symb(INT)] Independent;
    SetChar => "SETCHAR" [Slot::Var, Slot::Symb(INT), Slot::Symb(STRING)] Independent;
    Type => "TYPE" [Slot::Var, Slot::Symb(ANY)] Independent;
    Label => "LABEL" [Slot::Label] Independent;
    Jump => "JUMP" [Slot::Label] Independent;
    JumpIfEq => "JUMPIFEQ" [Slot::Label, Slot::Symb(ANY), Slot::Symb(ANY)] SameTypeOrNil;
    JumpIfNeq => "JUMPIFNEQ" [Slot::Label, Slot::Symb(ANY), Slot::Symb(ANY)] SameTypeOrNil;
    Exit => "EXIT" [Slot::Symb(INT)] Independent;
    DPrint => "DPRINT" [Slot::Symb(ANY)] Independent;
    Break => "BREAK" [] Independent;
}

impl Opcode {
    /// Whether the first operand names a jump or call target.
    pub fn targets_label(self) -> bool {
        matches!(
            self,
            Opcode::Call | Opcode::Jump | Opcode::JumpIfEq | Opcode::JumpIfNeq
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl FromStr for Opcode {
    type Err = String;

    /// Mnemonics are case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown opcode `{s}`"))
    }
}

/// Operand list of one instruction; never longer than three.
pub type Operands = SmallVec<[Operand; 3]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Operands,
}

impl Instruction {
    pub fn new(opcode: Opcode, operands: impl IntoIterator<Item = Operand>) -> Self {
        Self {
            opcode,
            operands: operands.into_iter().collect(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.mnemonic())?;
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

/// Builds instructions from a textual listing, one instruction per line.
///
/// Operands follow the opcode signature: `GF@x`, `int@1`, plain label names
/// and type keywords. Panics on malformed input.
#[cfg(test)]
pub(crate) fn listing(src: &str) -> Vec<Instruction> {
    src.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut words = line.split_whitespace();
            let opcode: Opcode = words.next().unwrap().parse().unwrap();
            let slots = opcode.signature();
            let operands = words.enumerate().map(|(idx, word)| {
                match slots.get(idx) {
                    Some(Slot::Label) => return Operand::Label(word.to_string()),
                    Some(Slot::Type) => return Operand::Type(word.parse().unwrap()),
                    _ => {}
                }
                let (prefix, text) = word.split_once('@').unwrap();
                match prefix.parse::<Type>() {
                    Ok(ty) => Operand::Constant(Literal::new(ty, text)),
                    Err(_) => Operand::Variable(word.parse().unwrap()),
                }
            });
            Instruction::new(opcode, operands)
        })
        .collect()
}
