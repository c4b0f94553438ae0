//! Memory model of the interpreter.
//!
//! Holds the global frame, the local frame stack, the temporary frame slot,
//! the data stack and the call stack. Every variable access resolves its
//! frame again, so frame changes are immediately visible.

pub mod frame;
pub mod stack;

use crate::error::{ExecError, Result};
use crate::instruction::{FrameKind, Variable};
use crate::value::Value;
use frame::Frame;
use stack::Stack;
use std::fmt::Write as _;
use tracing::{debug, trace};

/// All mutable state of one program run.
#[derive(Debug, Default)]
pub struct Memory {
    global: Frame,
    locals: Stack<Frame>,
    temporary: Option<Frame>,
    data: Stack<Value>,
    calls: Stack<usize>,
}

impl Memory {
    /// Creates a clean memory: empty GF, no LF, no TF, empty stacks.
    pub fn new() -> Self {
        Self::default()
    }

    fn frame(&self, kind: FrameKind) -> Result<&Frame> {
        match kind {
            FrameKind::Global => Ok(&self.global),
            FrameKind::Local => self.locals.top().ok_or_else(|| no_frame(FrameKind::Local)),
            FrameKind::Temporary => self
                .temporary
                .as_ref()
                .ok_or_else(|| no_frame(FrameKind::Temporary)),
        }
    }

    fn frame_mut(&mut self, kind: FrameKind) -> Result<&mut Frame> {
        match kind {
            FrameKind::Global => Ok(&mut self.global),
            FrameKind::Local => self
                .locals
                .top_mut()
                .ok_or_else(|| no_frame(FrameKind::Local)),
            FrameKind::Temporary => self
                .temporary
                .as_mut()
                .ok_or_else(|| no_frame(FrameKind::Temporary)),
        }
    }

    /// Returns the slot of a variable; `None` inside means uninitialized.
    pub fn slot(&self, var: &Variable) -> Result<Option<&Value>> {
        trace!("Resolving {var}");
        self.frame(var.frame)?
            .slot(&var.name)
            .map(Option::as_ref)
            .ok_or_else(|| ExecError::NoSuchVariable(var.to_string()))
    }

    /// Reads the value of an initialized variable.
    pub fn read(&self, var: &Variable) -> Result<&Value> {
        self.slot(var)?
            .ok_or_else(|| ExecError::MissingValue(format!("variable `{var}` is uninitialized")))
    }

    /// Stores into a declared variable.
    pub fn write(&mut self, var: &Variable, value: Option<Value>) -> Result<()> {
        trace!("Writing {value:?} to {var}");
        if self.frame_mut(var.frame)?.store(&var.name, value) {
            Ok(())
        } else {
            Err(ExecError::NoSuchVariable(var.to_string()))
        }
    }

    /// Declares an uninitialized variable in its frame.
    pub fn declare(&mut self, var: &Variable) -> Result<()> {
        self.frame_mut(var.frame)?
            .declare(&var.name)
            .map_err(|_| ExecError::Redefinition(var.to_string()))
    }

    /// Replaces the temporary frame with a new empty one.
    pub fn create_temp_frame(&mut self) {
        debug!("Creating temporary frame");
        self.temporary = Some(Frame::new());
    }

    /// Moves the temporary frame on top of the local frame stack.
    pub fn push_temp_frame(&mut self) -> Result<()> {
        let frame = self
            .temporary
            .take()
            .ok_or_else(|| no_frame(FrameKind::Temporary))?;
        self.locals.push(frame);
        debug!("Pushed frame, local frame depth is {}", self.locals.len());
        Ok(())
    }

    /// Moves the top of the local frame stack into the temporary frame.
    pub fn pop_local_frame(&mut self) -> Result<()> {
        let frame = self
            .locals
            .pop()
            .ok_or_else(|| no_frame(FrameKind::Local))?;
        self.temporary = Some(frame);
        debug!("Popped frame, local frame depth is {}", self.locals.len());
        Ok(())
    }

    pub fn push_value(&mut self, value: Value) {
        self.data.push(value);
    }

    pub fn pop_value(&mut self) -> Result<Value> {
        self.data
            .pop()
            .ok_or_else(|| ExecError::MissingValue("data stack is empty".to_string()))
    }

    /// Records the position execution resumes at on `RETURN`.
    pub fn push_call(&mut self, return_to: usize) {
        self.calls.push(return_to);
    }

    pub fn pop_call(&mut self) -> Result<usize> {
        self.calls
            .pop()
            .ok_or_else(|| ExecError::MissingValue("call stack is empty".to_string()))
    }

    /// Multi-line dump of all frames and stacks, used by `BREAK`.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "global frame: {}", self.global);
        match &self.temporary {
            Some(frame) => {
                let _ = writeln!(out, "temporary frame: {frame}");
            }
            None => {
                let _ = writeln!(out, "temporary frame: <absent>");
            }
        }
        let _ = writeln!(
            out,
            "local frames (bottom to top): {}",
            self.locals.display_with(Frame::to_string)
        );
        let _ = writeln!(
            out,
            "call stack (bottom to top): {}",
            self.calls.display_with(usize::to_string)
        );
        let _ = writeln!(
            out,
            "data stack (bottom to top): {}",
            self.data.display_with(Value::to_literal)
        );
        out
    }
}

fn no_frame(kind: FrameKind) -> ExecError {
    ExecError::NoSuchFrame(kind.description())
}
