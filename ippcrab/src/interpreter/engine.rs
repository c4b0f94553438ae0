use super::arith::{BinaryEval, UnaryEval};
use super::io::Io;
use super::operand::{type_keyword, variable};
use super::strings;
use crate::error::{ExecError, Fault, Result};
use crate::instruction::{Instruction, Opcode};
use crate::memory::Memory;
use crate::runner::Program;
use crate::value::Value;
use std::io::{BufRead, Write};
use tracing::{debug, info};

/// Where execution continues after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlFlow {
    Next,
    Jump(usize),
    Exit(u8),
}

/// Executes a [`Program`].
///
/// The interpreter borrows the program, which is never modified, and owns
/// the memory of the current run. Every call to [`Interpreter::run`] starts
/// from a clean memory, so one interpreter may run its program repeatedly.
#[derive(Debug)]
pub struct Interpreter<'p> {
    pub(super) program: &'p Program,
    pub(super) memory: Memory,
    /// Index of the instruction being executed.
    pub(super) position: usize,
    executed: usize,
}

impl<'p> Interpreter<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            memory: Memory::new(),
            position: 0,
            executed: 0,
        }
    }

    /// Runs the program to completion.
    ///
    /// # Returns
    /// * `Ok(code)` - 0 when execution falls off the end, or the `EXIT` code
    /// * `Err(Fault)` - The first runtime error and where it happened
    pub fn run(
        &mut self,
        input: &mut dyn BufRead,
        output: &mut dyn Write,
        diagnostics: &mut dyn Write,
    ) -> Result<u8, Fault> {
        self.memory = Memory::new();
        self.position = 0;
        self.executed = 0;

        let mut io = Io::new(input, output, diagnostics);
        let program = self.program;
        info!(
            "Starting execution of {} instruction(s)",
            program.instructions().len()
        );

        while let Some(instr) = program.instructions().get(self.position) {
            let position = self.position;
            debug!("Executing {position}: {instr}");
            let flow = self
                .execute(instr, &mut io)
                .map_err(|error| Fault::new(error, position, instr.opcode))?;
            self.executed += 1;

            match flow {
                ControlFlow::Next => self.position += 1,
                ControlFlow::Jump(target) => self.position = target,
                ControlFlow::Exit(code) => {
                    io.flush()?;
                    info!("Program exited with code {code} after {} step(s)", self.executed);
                    return Ok(code);
                }
            }
        }

        io.flush()?;
        info!("Program finished after {} step(s)", self.executed);
        Ok(0)
    }

    fn execute(&mut self, instr: &Instruction, io: &mut Io<'_>) -> Result<ControlFlow> {
        match instr.opcode {
            Opcode::Move => {
                let value = self.symbol(instr, 1)?.into_owned();
                self.assign(instr, value)?;
            }
            Opcode::CreateFrame => self.memory.create_temp_frame(),
            Opcode::PushFrame => self.memory.push_temp_frame()?,
            Opcode::PopFrame => self.memory.pop_local_frame()?,
            Opcode::DefVar => self.memory.declare(variable(instr, 0)?)?,
            Opcode::Call => {
                let target = self.jump_target(instr)?;
                self.memory.push_call(self.position + 1);
                return Ok(ControlFlow::Jump(target));
            }
            Opcode::Return => return Ok(ControlFlow::Jump(self.memory.pop_call()?)),
            Opcode::PushS => {
                let value = self.symbol(instr, 0)?.into_owned();
                self.memory.push_value(value);
            }
            Opcode::PopS => {
                let value = self.memory.pop_value()?;
                self.assign(instr, value)?;
            }
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::IDiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or => {
                let result = instr
                    .opcode
                    .eval(&*self.symbol(instr, 1)?, &*self.symbol(instr, 2)?)?;
                self.assign(instr, result)?;
            }
            Opcode::Not => {
                let result = instr.opcode.eval_unary(&*self.symbol(instr, 1)?)?;
                self.assign(instr, result)?;
            }
            Opcode::Int2Char => {
                let result = strings::int2char(&*self.symbol(instr, 1)?)?;
                self.assign(instr, result)?;
            }
            Opcode::Stri2Int => {
                let (left, right) = (self.symbol(instr, 1)?, self.symbol(instr, 2)?);
                let result = strings::stri2int(&left, &right)?;
                self.assign(instr, result)?;
            }
            Opcode::Concat => {
                let (left, right) = (self.symbol(instr, 1)?, self.symbol(instr, 2)?);
                let result = strings::concat(&left, &right)?;
                self.assign(instr, result)?;
            }
            Opcode::StrLen => {
                let result = strings::strlen(&*self.symbol(instr, 1)?)?;
                self.assign(instr, result)?;
            }
            Opcode::GetChar => {
                let (left, right) = (self.symbol(instr, 1)?, self.symbol(instr, 2)?);
                let result = strings::getchar(&left, &right)?;
                self.assign(instr, result)?;
            }
            Opcode::SetChar => {
                // The target is both read and written.
                let target = self.memory.read(variable(instr, 0)?)?;
                let (index, replacement) = (self.symbol(instr, 1)?, self.symbol(instr, 2)?);
                let result = strings::setchar(target, &index, &replacement)?;
                self.assign(instr, result)?;
            }
            Opcode::Type => {
                // An uninitialized variable has the empty type name.
                let name = self
                    .symbol_slot(instr, 1)?
                    .map_or("", |value| value.ty().name());
                self.assign(instr, Value::Str(name.to_string()))?;
            }
            Opcode::Read => {
                let value = io.read_value(type_keyword(instr, 1)?)?;
                self.assign(instr, value)?;
            }
            Opcode::Write => io.write_value(&*self.symbol(instr, 0)?)?,
            Opcode::Label => {}
            Opcode::Jump => return Ok(ControlFlow::Jump(self.jump_target(instr)?)),
            Opcode::JumpIfEq | Opcode::JumpIfNeq => {
                let left = self.symbol(instr, 1)?;
                let right = self.symbol(instr, 2)?;
                let equal = left
                    .equals(&right)
                    .ok_or_else(|| ExecError::types(instr.opcode, &[left.ty(), right.ty()]))?;
                if equal == (instr.opcode == Opcode::JumpIfEq) {
                    return Ok(ControlFlow::Jump(self.jump_target(instr)?));
                }
            }
            Opcode::Exit => return self.exit_code(instr).map(ControlFlow::Exit),
            Opcode::DPrint => {
                let text = format!("{}\n", self.symbol(instr, 0)?);
                io.diagnostic(&text)?;
            }
            Opcode::Break => {
                let text = self.dump(instr);
                io.diagnostic(&text)?;
            }
        }
        Ok(ControlFlow::Next)
    }

    fn exit_code(&self, instr: &Instruction) -> Result<u8> {
        match &*self.symbol(instr, 0)? {
            Value::Int(code) => u8::try_from(*code)
                .ok()
                .filter(|code| *code <= 49)
                .ok_or_else(|| {
                    ExecError::OperandValue(format!("exit code {code} is outside of 0..=49"))
                }),
            other => Err(ExecError::types(instr.opcode, &[other.ty()])),
        }
    }

    /// State dump written by `BREAK`.
    fn dump(&self, instr: &Instruction) -> String {
        format!(
            "position: {}\ninstruction: {instr}\nexecuted instructions: {}\n{}",
            self.position,
            self.executed,
            self.memory.dump()
        )
    }
}
