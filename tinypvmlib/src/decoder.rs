//! Stateless decoding rules for a bytecode stream.
//!
//! Every read takes the current cursor and returns the decoded value together with the
//! advanced cursor. A read never moves the cursor past the end of the code.

use thiserror::Error;

use crate::{ByteCode, INSTRUCTION_SIZE, OPERAND_SIZE};


/// The code ended before a read could be completed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("end of stream at offset {cursor}: needed {needed} bytes, {available} available")]
pub struct EndOfStream {
    pub cursor: usize,
    pub needed: usize,
    pub available: usize,
}


fn take<const N: usize>(code: ByteCode, cursor: usize) -> Result<[u8; N], EndOfStream> {
    let available = code.len().saturating_sub(cursor);
    code.get(cursor..)
        .and_then(|rest| rest.get(..N))
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(EndOfStream { cursor, needed: N, available })
}


/// Read the opcode byte at `cursor`.
pub fn read_opcode(code: ByteCode, cursor: usize) -> Result<(u8, usize), EndOfStream> {
    let bytes = take::<INSTRUCTION_SIZE>(code, cursor)?;
    Ok((bytes[0], cursor + INSTRUCTION_SIZE))
}


/// Read a little-endian two's-complement 32-bit integer starting at `cursor`.
pub fn read_i32(code: ByteCode, cursor: usize) -> Result<(i32, usize), EndOfStream> {
    let bytes = take::<OPERAND_SIZE>(code, cursor)?;
    Ok((i32::from_le_bytes(bytes), cursor + OPERAND_SIZE))
}


#[cfg(test)]
mod tests {

    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;


    #[test]
    fn opcode_advances_by_one() {
        let code = [0x01, 0x07];
        assert_eq!(read_opcode(&code, 0), Ok((0x01, 1)));
        assert_eq!(read_opcode(&code, 1), Ok((0x07, 2)));
    }


    #[test]
    fn opcode_at_end_of_code() {
        assert_eq!(
            read_opcode(&[], 0),
            Err(EndOfStream { cursor: 0, needed: 1, available: 0 })
        );
        assert_eq!(
            read_opcode(&[0x00], 1),
            Err(EndOfStream { cursor: 1, needed: 1, available: 0 })
        );
    }


    #[test]
    fn i32_is_little_endian() {
        let code = [0x00, 0x0a, 0x00, 0x00, 0x00];
        assert_eq!(read_i32(&code, 1), Ok((10, 5)));

        let code = [0xfe, 0xff, 0xff, 0xff];
        assert_eq!(read_i32(&code, 0), Ok((-2, 4)));
    }


    #[test]
    fn i32_needs_four_bytes() {
        let code = [0x01, 0x0a, 0x00, 0x00];
        assert_eq!(
            read_i32(&code, 1),
            Err(EndOfStream { cursor: 1, needed: 4, available: 3 })
        );
    }


    #[test]
    fn cursor_past_end_is_not_a_panic() {
        assert!(read_opcode(&[0x00], 5).is_err());
        assert!(read_i32(&[0x00], 5).is_err());
    }


    #[test]
    fn boundaries() {
        assert_eq!(read_i32(&i32::MIN.to_le_bytes(), 0), Ok((i32::MIN, 4)));
        assert_eq!(read_i32(&i32::MAX.to_le_bytes(), 0), Ok((i32::MAX, 4)));
    }


    proptest! {

        #[test]
        fn decodes_what_was_encoded(value: i32, prefix in 0usize..8) {
            let mut code = vec![0u8; prefix];
            code.extend_from_slice(&value.to_le_bytes());
            prop_assert_eq!(read_i32(&code, prefix), Ok((value, prefix + 4)));
        }

    }

}
