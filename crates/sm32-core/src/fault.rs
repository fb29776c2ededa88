//! Fault taxonomy for unrecoverable machine conditions.

use thiserror::Error;

/// An unrecoverable run-time condition that aborts execution.
///
/// Faults are surfaced as error values from [`crate::Machine::tick`] and
/// [`crate::Machine::run`]; there is no recovery path inside the machine, and
/// a faulted machine must not be stepped further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Fault {
    /// The low byte of a fetched instruction word matched no opcode, or a
    /// register-indexed instruction carried a register id outside the closed
    /// `0..=2` map. `offset` is the byte address of the faulting instruction
    /// word.
    #[error("invalid opcode [{opcode:#04x}] at location {offset:#x}")]
    InvalidOpcode {
        /// Raw opcode byte that failed to decode.
        opcode: u8,
        /// Byte offset of the instruction that triggered the fault.
        offset: u32,
    },
    /// A dword access touched a cell outside `[0, mem_size)`.
    #[error("memory access out of range at address {address:#x}")]
    OutOfRangeAccess {
        /// First byte address of the offending dword access.
        address: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::Fault;

    #[test]
    fn messages_carry_diagnostic_context() {
        let invalid = Fault::InvalidOpcode {
            opcode: 0xee,
            offset: 0x10,
        };
        assert_eq!(invalid.to_string(), "invalid opcode [0xee] at location 0x10");

        let range = Fault::OutOfRangeAccess { address: 0x1_0000 };
        assert_eq!(
            range.to_string(),
            "memory access out of range at address 0x10000"
        );
    }
}
