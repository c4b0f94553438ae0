//! Variable frame.
//!
//! A frame maps variable names to their slots. A slot is `None` between the
//! variable's `DEFVAR` and its first assignment.

use crate::error::{ExecError, Result};
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Frame {
    /// Ordered by name so that diagnostic dumps are deterministic.
    slots: BTreeMap<String, Option<Value>>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an uninitialized variable.
    pub fn declare(&mut self, name: &str) -> Result<()> {
        if self.slots.contains_key(name) {
            return Err(ExecError::Redefinition(name.to_string()));
        }
        self.slots.insert(name.to_string(), None);
        Ok(())
    }

    /// Returns the slot of a declared variable.
    pub fn slot(&self, name: &str) -> Option<&Option<Value>> {
        self.slots.get(name)
    }

    /// Stores into a declared variable. Returns `false` if it is undeclared.
    pub fn store(&mut self, name: &str, value: Option<Value>) -> bool {
        match self.slots.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Renders as `{a: int@1, b: <uninitialized>}`.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, (name, slot)) in self.slots.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            match slot {
                Some(value) => write!(f, "{name}: {}", value.to_literal())?,
                None => write!(f, "{name}: <uninitialized>")?,
            }
        }
        f.write_str("}")
    }
}
