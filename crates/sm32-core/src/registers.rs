//! Machine register file: stack pointer, base pointer, program counter.

use crate::arith::DWORD;

/// Identifier of one machine register, as encoded in the high byte of
/// register-indexed instruction words.
///
/// The id map is closed: `0 -> sp`, `1 -> bp`, `2 -> pc`. It is not
/// extensible at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum Register {
    /// Data-stack pointer.
    Sp = 0,
    /// Base pointer.
    Bp = 1,
    /// Program counter.
    Pc = 2,
}

impl Register {
    /// Decodes a numeric register id from an instruction word.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Sp),
            1 => Some(Self::Bp),
            2 => Some(Self::Pc),
            _ => None,
        }
    }

    /// Returns the id this register is encoded as.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }
}

/// The three named 32-bit machine registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    /// Data-stack pointer; starts at `mem_size - 4` (stack empty) and grows
    /// downward on push.
    pub sp: u32,
    /// Base pointer for manual stack-frame bookkeeping; nothing but explicit
    /// register transfer touches it.
    pub bp: u32,
    /// Program counter; address of the next instruction word.
    pub pc: u32,
}

impl RegisterFile {
    /// Reset register state for an address space of `mem_size` bytes.
    #[must_use]
    pub const fn reset(mem_size: u32) -> Self {
        Self {
            sp: mem_size - DWORD,
            bp: 0,
            pc: 0,
        }
    }

    /// Reads a register by id.
    #[must_use]
    pub const fn get(&self, reg: Register) -> u32 {
        match reg {
            Register::Sp => self.sp,
            Register::Bp => self.bp,
            Register::Pc => self.pc,
        }
    }

    /// Writes a register by id.
    pub const fn set(&mut self, reg: Register, value: u32) {
        match reg {
            Register::Sp => self.sp = value,
            Register::Bp => self.bp = value,
            Register::Pc => self.pc = value,
        }
    }
}
