//! This module provides the execution engine of the interpreter.
//!
//! The engine runs a checked [`Program`](crate::runner::Program) one
//! instruction at a time, mutating a fresh [`Memory`](crate::memory::Memory)
//! until the program falls off its end, executes `EXIT`, or fails.

mod arith;
pub mod engine;
mod io;
mod operand;
mod strings;

pub use engine::Interpreter;
