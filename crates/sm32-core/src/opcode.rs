//! The closed SM32 instruction set.
//!
//! An instruction word is a 4-byte little-endian dword. Bits 0-7 hold the
//! opcode; for [`Opcode::Pushr`] and [`Opcode::Popr`] bits 24-31 additionally
//! hold a register id. `PUSHI`, `JMP`, and `IF` take an inline dword operand
//! occupying the next memory dword; every other operand travels on the data
//! stack.

/// One decoded SM32 opcode (the low byte of an instruction word).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum Opcode {
    /// No effect.
    Nop = 0x00,
    /// Push the inline immediate dword.
    Pushi = 0x01,
    /// Pop two operands, push their wraparound sum.
    Addi = 0x02,
    /// Set the stop flag.
    Halt = 0x03,
    /// Pop two operands, push their wraparound difference.
    Subi = 0x04,
    /// Pop the return address into `pc`.
    Ret = 0x05,
    /// Pop an address, pop a value, store the value at the address.
    Stri = 0x06,
    /// Pop an address, push the dword read from it.
    Fchi = 0x07,
    /// Pop and discard the top of stack.
    Dropi = 0x08,
    /// Pop two operands, push their bitwise AND.
    Andi = 0x09,
    /// Pop two operands, push their bitwise OR.
    Ori = 0x0a,
    /// Pop two operands, push their bitwise XOR.
    Xori = 0x0b,
    /// Push a copy of the top of stack.
    Dupi = 0x0c,
    /// Push a copy of the second-from-top stack entry.
    Overi = 0x0d,
    /// Swap the two top stack entries.
    Swapi = 0x0e,
    /// Unconditional jump to the inline address.
    Jmp = 0x0f,
    /// Pop a condition; branch to the inline address when it is zero.
    If = 0x10,
    /// Pop a target address, push the return address, jump to the target.
    Call = 0x11,
    /// Push the value of the register named in the instruction word.
    Pushr = 0x12,
    /// Pop into the register named in the instruction word.
    Popr = 0x13,
}

impl Opcode {
    /// Decodes an opcode byte against the closed instruction table.
    #[must_use]
    pub const fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Nop),
            0x01 => Some(Self::Pushi),
            0x02 => Some(Self::Addi),
            0x03 => Some(Self::Halt),
            0x04 => Some(Self::Subi),
            0x05 => Some(Self::Ret),
            0x06 => Some(Self::Stri),
            0x07 => Some(Self::Fchi),
            0x08 => Some(Self::Dropi),
            0x09 => Some(Self::Andi),
            0x0a => Some(Self::Ori),
            0x0b => Some(Self::Xori),
            0x0c => Some(Self::Dupi),
            0x0d => Some(Self::Overi),
            0x0e => Some(Self::Swapi),
            0x0f => Some(Self::Jmp),
            0x10 => Some(Self::If),
            0x11 => Some(Self::Call),
            0x12 => Some(Self::Pushr),
            0x13 => Some(Self::Popr),
            _ => None,
        }
    }

    /// Returns the encoding byte for this opcode.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}
