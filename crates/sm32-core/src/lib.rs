//! Core virtual machine crate for SM32.
//!
//! SM32 is a 32-bit stack-oriented bytecode machine: a flat byte-addressable
//! memory image loaded once from a sequential byte source, three named
//! registers (`sp`, `bp`, `pc`), a four-flag status register, and a closed
//! 20-opcode instruction set executed by a fetch/decode/dispatch loop.

/// Fixed-width wraparound arithmetic engine.
pub mod arith;
pub use arith::{top_bit_mask, DWORD};

/// Fault taxonomy for unrecoverable machine conditions.
pub mod fault;
pub use fault::Fault;

/// Processor flag register with masked partial updates.
pub mod flags;
pub use flags::{FlagUpdate, Flags, ALL_FLAGS, CARRY, NEGATIVE, OVERFLOW, VALUE_FLAGS, ZERO};

/// Sequential byte sources for the one-time image load.
pub mod source;
pub use source::{ByteSource, ReaderSource, SliceSource};

/// Flat byte-addressable memory and the little-endian dword codec.
pub mod memory;
pub use memory::{Memory, DEFAULT_MEM_SIZE};

/// Machine register file and register-id decoding.
pub mod registers;
pub use registers::{Register, RegisterFile};

/// The closed instruction set.
pub mod opcode;
pub use opcode::Opcode;

/// The execution engine.
pub mod machine;
pub use machine::Machine;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
