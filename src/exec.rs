use std::io::{self, Write};

use static_assertions::const_assert;
use thiserror::Error;
use tracing::{debug, trace};

use tinypvmlib::{read_i32, read_opcode, ByteCode, ByteCodes, DEFAULT_STACK_CAPACITY};


/// Reason a run was aborted.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    #[error("truncated PUSH operand")]
    TruncatedOperand,
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("division by zero")]
    DivisionByZero,
    #[error("unknown opcode 0x{0:02x}")]
    UnknownOpcode(u8),
    #[error("could not write output: {0}")]
    Output(io::ErrorKind),
}


/// A fatal run-time error together with the offset of the instruction that raised it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at ic={cursor}")]
pub struct Fault {
    pub kind: FaultKind,
    pub cursor: usize,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
    Faulted(FaultKind),
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// A `Halt` instruction was executed.
    Halt,
    /// The code ran out before the next opcode. Same as an implicit `Halt`.
    EndOfStream,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub reason: HaltReason,
    /// Number of instructions that completed.
    pub instructions: usize,
    /// Cursor value when execution stopped.
    pub cursor: usize,
}


const_assert!(DEFAULT_STACK_CAPACITY > 0);


/// Operand stack with a hard capacity.
pub struct Stack {
    values: Vec<i32>,
    capacity: usize,
}

impl Stack {

    /// Storage grows on demand past `DEFAULT_STACK_CAPACITY`; `capacity` only bounds `push`.
    pub fn new(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity.min(DEFAULT_STACK_CAPACITY)),
            capacity,
        }
    }


    pub fn push(&mut self, value: i32) -> Result<(), FaultKind> {
        if self.values.len() >= self.capacity {
            return Err(FaultKind::StackOverflow);
        }
        self.values.push(value);
        Ok(())
    }


    pub fn pop(&mut self) -> Result<i32, FaultKind> {
        self.values.pop().ok_or(FaultKind::StackUnderflow)
    }


    pub fn peek(&self) -> Result<i32, FaultKind> {
        self.values.last().copied().ok_or(FaultKind::StackUnderflow)
    }


    /// Pop the right operand, then the left one.
    fn pop_operands(&mut self) -> Result<(i32, i32), FaultKind> {
        if self.values.len() < 2 {
            return Err(FaultKind::StackUnderflow);
        }
        let b = self.pop()?;
        let a = self.pop()?;
        Ok((a, b))
    }


    pub fn len(&self) -> usize {
        self.values.len()
    }


    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }


    pub fn capacity(&self) -> usize {
        self.capacity
    }


    /// Values from bottom to top.
    pub fn as_slice(&self) -> &[i32] {
        &self.values
    }


    fn clear(&mut self) {
        self.values.clear();
    }

}


struct Program<'a> {

    code: ByteCode<'a>,
    // Index of the next instruction/byte in the code.
    program_counter: usize,

}

impl<'a> Program<'a> {

    pub fn new(code: ByteCode<'a>) -> Self {
        Self {
            program_counter: 0,
            code,
        }
    }


    /// Returns `None` once the code is exhausted.
    pub fn fetch_instruction(&mut self) -> Option<u8> {
        let (byte, next) = read_opcode(self.code, self.program_counter).ok()?;
        self.program_counter = next;
        Some(byte)
    }


    pub fn fetch_operand(&mut self) -> Result<i32, FaultKind> {
        let (value, next) = read_i32(self.code, self.program_counter)
            .map_err(|_| FaultKind::TruncatedOperand)?;
        self.program_counter = next;
        Ok(value)
    }

}


pub struct VM {

    /// Operation stack. Stores the operands and results of operations.
    opstack: Stack,
    state: State,

}

impl VM {

    /// Instantiate a new VM with a given stack capacity, in values.
    pub fn new(stack_capacity: Option<usize>) -> Self {
        Self {
            opstack: Stack::new(stack_capacity.unwrap_or(DEFAULT_STACK_CAPACITY)),
            state: State::Running,
        }
    }


    pub fn state(&self) -> State {
        self.state
    }


    pub fn stack(&self) -> &Stack {
        &self.opstack
    }


    /// Execute `code` until it halts, runs out, or faults. Every `Print` is written to `out`.
    ///
    /// The stack is emptied at the start of each run, so a VM can be reused.
    pub fn run<W: Write>(&mut self, code: ByteCode<'_>, out: &mut W) -> Result<RunSummary, Fault> {

        self.opstack.clear();
        self.state = State::Running;

        let mut program = Program::new(code);
        let mut instructions = 0;

        debug!(code_len = code.len(), stack_capacity = self.opstack.capacity(), "run started");

        loop {

            let cursor = program.program_counter;

            let Some(byte) = program.fetch_instruction() else {
                return Ok(self.finish(HaltReason::EndOfStream, instructions, cursor));
            };

            let step = ByteCodes::try_from(byte)
                .map_err(|err| FaultKind::UnknownOpcode(err.0))
                .and_then(|instruction| {
                    trace!(cursor, %instruction, operand_bytes = instruction.operand_size(), depth = self.opstack.len(), "execute");
                    self.execute(instruction, &mut program, out)
                });

            match step {
                Ok(true) => {},
                Ok(false) => {
                    instructions += 1;
                    return Ok(self.finish(HaltReason::Halt, instructions, program.program_counter));
                },
                Err(kind) => {
                    self.state = State::Faulted(kind);
                    debug!(cursor, %kind, instructions, "run faulted");
                    return Err(Fault { kind, cursor });
                }
            }

            instructions += 1;
        }
    }


    fn finish(&mut self, reason: HaltReason, instructions: usize, cursor: usize) -> RunSummary {
        self.state = State::Halted;
        debug!(?reason, instructions, cursor, depth = self.opstack.len(), "run halted");
        RunSummary { reason, instructions, cursor }
    }


    /// Returns whether execution should continue.
    fn execute<W: Write>(&mut self, instruction: ByteCodes, program: &mut Program, out: &mut W) -> Result<bool, FaultKind> {

        match instruction {

            ByteCodes::Halt => return Ok(false),

            ByteCodes::Push => {
                let value = program.fetch_operand()?;
                self.opstack.push(value)?;
            },

            ByteCodes::Add => {
                let (a, b) = self.opstack.pop_operands()?;
                self.opstack.push(a.wrapping_add(b))?;
            },
            ByteCodes::Sub => {
                let (a, b) = self.opstack.pop_operands()?;
                self.opstack.push(a.wrapping_sub(b))?;
            },
            ByteCodes::Mul => {
                let (a, b) = self.opstack.pop_operands()?;
                self.opstack.push(a.wrapping_mul(b))?;
            },
            ByteCodes::Div => {
                let (a, b) = self.opstack.pop_operands()?;
                if b == 0 {
                    return Err(FaultKind::DivisionByZero);
                }
                // i32::MIN / -1 wraps back to i32::MIN
                self.opstack.push(a.wrapping_div(b))?;
            },

            ByteCodes::Print => {
                let value = self.opstack.pop()?;
                writeln!(out, "{value}")
                    .and_then(|_| out.flush())
                    .map_err(|err| FaultKind::Output(err.kind()))?;
            },

            ByteCodes::Dup => {
                let value = self.opstack.peek()?;
                self.opstack.push(value)?;
            },

            ByteCodes::Pop => {
                self.opstack.pop()?;
            },

        }

        Ok(true)
    }

}
