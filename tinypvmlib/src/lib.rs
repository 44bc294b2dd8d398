use std::fmt;
use std::mem;

use static_assertions::{const_assert, const_assert_eq};
use thiserror::Error;

pub mod decoder;
pub mod writer;

pub use decoder::{read_i32, read_opcode, EndOfStream};
pub use writer::{BytecodeWriter, EXAMPLE_PROGRAM};


pub const INSTRUCTION_SIZE: usize = 1;
pub const OPERAND_SIZE: usize = mem::size_of::<i32>();
pub const EXIT_CODE_SIZE: usize = mem::size_of::<i32>();

/// Number of values the operand stack holds before a push overflows it.
pub const DEFAULT_STACK_CAPACITY: usize = 1024;

pub type ByteCode<'a> = &'a [u8];


/// A byte that does not name any instruction.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("unknown opcode 0x{0:02x}")]
pub struct UnknownOpcode(pub u8);


macro_rules! declare_instructions {
    ($($(#[$doc:meta])* $name:ident $asm_name:ident = $value:literal),+) => {

/// Instructions of the VM. Each instruction is represented by one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ByteCodes {
    $($(#[$doc])* $name = $value),+
}

impl TryFrom<u8> for ByteCodes {
    type Error = UnknownOpcode;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            $($value => Ok(Self::$name),)+
            other => Err(UnknownOpcode(other))
        }
    }
}

impl ByteCodes {

    /// Look up an instruction by its mnemonic, ignoring case.
    pub fn from_string(string: &str) -> Option<Self> {
        match string.to_ascii_lowercase().as_str() {
            $(stringify!($asm_name) => Some(Self::$name),)+
            _ => None
        }
    }


    pub fn name(self) -> &'static str {
        match self {
            $(Self::$name => stringify!($name),)+
        }
    }

}

    };
}

declare_instructions! {

    /// Stop execution.
    Halt halt = 0x00,
    /// Push the 4-byte little-endian operand that follows the opcode.
    Push push = 0x01,
    Add add = 0x02,
    Sub sub = 0x03,
    Mul mul = 0x04,
    /// Integer division, truncating toward zero.
    Div div = 0x05,
    /// Pop the top value and write it to the output as a decimal line.
    Print print = 0x06,
    Dup dup = 0x07,
    Pop pop = 0x08

}

const_assert!(mem::size_of::<ByteCodes>() == INSTRUCTION_SIZE);

impl ByteCodes {

    /// Number of inline operand bytes following the opcode.
    pub fn operand_size(self) -> usize {
        match self {
            ByteCodes::Push => OPERAND_SIZE,
            _ => 0
        }
    }

}

impl fmt::Display for ByteCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name().to_ascii_uppercase())
    }
}


macro_rules! declare_exit_codes {
    ($($name:ident $value:literal),+) => {

/// Process exit status reported by the VM binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCodes {
    $($name = $value),+
}

impl fmt::Display for ExitCodes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            $(
                ExitCodes::$name => write!(f, "{} ({})", stringify!($name), ExitCodes::$name as i32)
            ),+
        }
    }
}

impl From<ExitCodes> for i32 {
    fn from(code: ExitCodes) -> Self {
        code as i32
    }
}

const_assert_eq!(mem::size_of::<ExitCodes>(), EXIT_CODE_SIZE);

    };
}

declare_exit_codes! {
    Success 0,
    Fault 1,
    LoadError 2
}


#[cfg(test)]
mod tests {

    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;


    #[rstest]
    #[case(0x00, ByteCodes::Halt)]
    #[case(0x01, ByteCodes::Push)]
    #[case(0x02, ByteCodes::Add)]
    #[case(0x03, ByteCodes::Sub)]
    #[case(0x04, ByteCodes::Mul)]
    #[case(0x05, ByteCodes::Div)]
    #[case(0x06, ByteCodes::Print)]
    #[case(0x07, ByteCodes::Dup)]
    #[case(0x08, ByteCodes::Pop)]
    fn opcode_values_are_fixed(#[case] byte: u8, #[case] instruction: ByteCodes) {
        assert_eq!(ByteCodes::try_from(byte), Ok(instruction));
        assert_eq!(instruction as u8, byte);
    }


    #[test]
    fn unknown_bytes_are_rejected() {
        for byte in 0x09..=u8::MAX {
            assert_eq!(ByteCodes::try_from(byte), Err(UnknownOpcode(byte)));
        }
    }


    #[test]
    fn mnemonics() {
        assert_eq!(ByteCodes::from_string("PUSH"), Some(ByteCodes::Push));
        assert_eq!(ByteCodes::from_string("dup"), Some(ByteCodes::Dup));
        assert_eq!(ByteCodes::from_string("jmp"), None);
        assert_eq!(ByteCodes::Print.to_string(), "PRINT");
    }


    #[test]
    fn only_push_carries_an_operand() {
        assert_eq!(ByteCodes::Push.operand_size(), 4);
        assert_eq!(ByteCodes::Add.operand_size(), 0);
        assert_eq!(ByteCodes::Halt.operand_size(), 0);
    }


    #[test]
    fn exit_code_display() {
        assert_eq!(ExitCodes::Fault.to_string(), "Fault (1)");
        assert_eq!(i32::from(ExitCodes::Success), 0);
        assert_eq!(i32::from(ExitCodes::LoadError), 2);
    }

}
