//! Flat byte-addressable memory and the little-endian dword codec.

use crate::arith::DWORD;
use crate::fault::Fault;
use crate::source::ByteSource;

/// Default size in bytes of the flat address space (64 KiB).
pub const DEFAULT_MEM_SIZE: usize = 0x10000;

const DWORD_BYTES: usize = DWORD as usize;

/// Fixed-size, zero-initialized byte memory, populated once at construction.
///
/// Multi-byte values are stored as 4-byte little-endian dwords with no
/// alignment requirement. Any access touching a cell outside
/// `[0, mem_size)` is a fault, not a recoverable error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Box<[u8]>,
}

impl Memory {
    /// Allocates `mem_size` zeroed cells and fills them from `source` until
    /// either the source is exhausted or memory is full.
    ///
    /// A short image leaves the remainder zero-filled; a long image stops
    /// being read once memory is full.
    pub fn load(source: &mut dyn ByteSource, mem_size: usize) -> Self {
        let mut cells = vec![0; mem_size].into_boxed_slice();
        for cell in &mut cells {
            match source.next_byte() {
                Some(byte) => *cell = byte,
                None => break,
            }
        }
        Self { cells }
    }

    /// Total number of addressable cells.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` for a zero-sized address space.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reads the little-endian dword occupying `addr..addr + 3`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::OutOfRangeAccess`] when any touched cell lies
    /// outside memory.
    pub fn read_dword(&self, addr: u32) -> Result<u32, Fault> {
        let start = self.dword_span(addr)?;
        let mut bytes = [0u8; DWORD_BYTES];
        bytes.copy_from_slice(&self.cells[start..start + DWORD_BYTES]);
        Ok(u32::from_le_bytes(bytes))
    }

    /// Writes `value` as a little-endian dword at `addr..addr + 3`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::OutOfRangeAccess`] when any touched cell lies
    /// outside memory.
    pub fn write_dword(&mut self, addr: u32, value: u32) -> Result<(), Fault> {
        let start = self.dword_span(addr)?;
        self.cells[start..start + DWORD_BYTES].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Raw view of the underlying cells, for inspection of final state.
    #[must_use]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    #[allow(clippy::cast_possible_truncation)]
    fn dword_span(&self, addr: u32) -> Result<usize, Fault> {
        let start = addr as usize;
        match start.checked_add(DWORD_BYTES) {
            Some(end) if end <= self.cells.len() => Ok(start),
            _ => Err(Fault::OutOfRangeAccess { address: addr }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Memory, DEFAULT_MEM_SIZE};
    use crate::fault::Fault;
    use crate::source::{ByteSource, SliceSource};

    fn memory_of(image: &[u8], mem_size: usize) -> Memory {
        Memory::load(&mut SliceSource::new(image), mem_size)
    }

    #[test]
    fn short_image_leaves_remainder_zero_filled() {
        let memory = memory_of(&[0xaa, 0xbb], 8);

        assert_eq!(memory.len(), 8);
        assert_eq!(memory.cells(), &[0xaa, 0xbb, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn long_image_is_truncated_at_mem_size() {
        let mut source = SliceSource::new(&[1, 2, 3, 4, 5, 6]);
        let memory = Memory::load(&mut source, 4);

        assert_eq!(memory.cells(), &[1, 2, 3, 4]);
        // The source is left unread past the truncation point.
        assert_eq!(source.next_byte(), Some(5));
    }

    #[test]
    fn default_mem_size_is_64kib() {
        let memory = memory_of(&[], DEFAULT_MEM_SIZE);
        assert_eq!(memory.len(), 0x10000);
        assert!(!memory.is_empty());
    }

    #[test]
    fn dword_codec_is_little_endian_and_unaligned() {
        let mut memory = memory_of(&[], 16);

        memory.write_dword(1, 0x1122_3344).unwrap();
        assert_eq!(&memory.cells()[1..5], &[0x44, 0x33, 0x22, 0x11]);
        assert_eq!(memory.read_dword(1).unwrap(), 0x1122_3344);
    }

    #[test]
    fn out_of_range_access_reports_the_offending_address() {
        let mut memory = memory_of(&[], 8);

        assert_eq!(
            memory.read_dword(5),
            Err(Fault::OutOfRangeAccess { address: 5 })
        );
        assert_eq!(
            memory.write_dword(6, 1),
            Err(Fault::OutOfRangeAccess { address: 6 })
        );
        assert_eq!(
            memory.read_dword(u32::MAX),
            Err(Fault::OutOfRangeAccess { address: u32::MAX })
        );
        assert!(memory.read_dword(4).is_ok());
    }
}
