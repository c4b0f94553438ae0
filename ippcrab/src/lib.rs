//! IPPcrab Interpreter Library
//!
//! An interpreter for IPPcode23, a three-address code with typed values,
//! three kinds of variable frames, a data stack and a call stack.
//!
//! Programs arrive as XML documents. They are decoded by the loader,
//! validated by a static checker, and finally executed by the
//! [`Interpreter`], which reports either the program's exit code or the
//! first error.
//!
//! # Examples
//! ```
//! let source = r#"<program language="IPPcode23">
//!   <instruction order="1" opcode="WRITE"><arg1 type="int">42</arg1></instruction>
//! </program>"#;
//! let mut output = Vec::<u8>::new();
//! let code = ippcrab::execute(source, &mut &b""[..], &mut output, &mut std::io::sink());
//! assert_eq!(code, 0);
//! assert_eq!(output, b"42");
//! ```

pub mod checker;
pub mod error;
pub mod instruction;
pub mod interpreter;
pub mod loader;
pub mod memory;
pub mod runner;
pub mod ty;
pub mod value;

pub use error::{ExecError, Fault, LoadError};
pub use interpreter::Interpreter;
pub use runner::{Program, ProgramError, execute};
