use crate::ByteCodes;


/// `(10 + 20) * 2`, printed. Run when no program file is given.
pub static EXAMPLE_PROGRAM: [u8; 19] = [
    ByteCodes::Push as u8, 0x0a, 0x00, 0x00, 0x00,
    ByteCodes::Push as u8, 0x14, 0x00, 0x00, 0x00,
    ByteCodes::Add as u8,
    ByteCodes::Push as u8, 0x02, 0x00, 0x00, 0x00,
    ByteCodes::Mul as u8,
    ByteCodes::Print as u8,
    ByteCodes::Halt as u8,
];


/// Builds bytecode one instruction at a time.
#[derive(Debug, Default, Clone)]
pub struct BytecodeWriter {
    code: Vec<u8>,
}

impl BytecodeWriter {

    pub fn new() -> Self {
        Self::default()
    }


    /// Append a bare opcode. `Push` written this way has no operand, which is how truncated
    /// programs are produced.
    pub fn op(mut self, instruction: ByteCodes) -> Self {
        self.code.push(instruction as u8);
        self
    }


    pub fn push(mut self, value: i32) -> Self {
        self.code.push(ByteCodes::Push as u8);
        self.code.extend_from_slice(&value.to_le_bytes());
        self
    }


    /// Append raw bytes, valid or not.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.code.extend_from_slice(bytes);
        self
    }


    pub fn add(self) -> Self { self.op(ByteCodes::Add) }
    pub fn sub(self) -> Self { self.op(ByteCodes::Sub) }
    pub fn mul(self) -> Self { self.op(ByteCodes::Mul) }
    pub fn div(self) -> Self { self.op(ByteCodes::Div) }
    pub fn print(self) -> Self { self.op(ByteCodes::Print) }
    pub fn dup(self) -> Self { self.op(ByteCodes::Dup) }
    pub fn pop(self) -> Self { self.op(ByteCodes::Pop) }
    pub fn halt(self) -> Self { self.op(ByteCodes::Halt) }


    pub fn finish(self) -> Vec<u8> {
        self.code
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use pretty_assertions::assert_eq;


    #[test]
    fn example_program_matches_writer() {
        let code = BytecodeWriter::new()
            .push(10)
            .push(20)
            .add()
            .push(2)
            .mul()
            .print()
            .halt()
            .finish();

        assert_eq!(code, EXAMPLE_PROGRAM.to_vec());
    }


    #[test]
    fn push_writes_opcode_then_operand() {
        let code = BytecodeWriter::new().push(-1).finish();
        assert_eq!(code, vec![0x01, 0xff, 0xff, 0xff, 0xff]);
    }

}
