//! Sequential byte sources feeding the one-time memory image load.
//!
//! A [`ByteSource`] is drained exactly once while the machine is constructed
//! and never consulted again. Nothing richer than "next byte or exhausted"
//! is required: no length query, no seeking.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// A one-shot sequential provider of memory-image bytes.
pub trait ByteSource {
    /// Returns the next byte, or `None` once the source is exhausted.
    fn next_byte(&mut self) -> Option<u8>;
}

/// Byte source over an in-memory image.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Creates a source yielding `data` from its first byte.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl ByteSource for SliceSource<'_> {
    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.data.get(self.pos).copied();
        if byte.is_some() {
            self.pos += 1;
        }
        byte
    }
}

/// Byte source over any [`Read`] stream, one byte at a time.
///
/// A read error ends the stream the same way exhaustion does; the image load
/// has no error channel beyond end-of-input.
#[derive(Debug)]
pub struct ReaderSource<R> {
    inner: R,
    done: bool,
}

impl<R: Read> ReaderSource<R> {
    /// Wraps an open stream.
    pub const fn new(inner: R) -> Self {
        Self { inner, done: false }
    }
}

impl ReaderSource<BufReader<File>> {
    /// Opens a file-backed source for a binary memory image on disk.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn next_byte(&mut self) -> Option<u8> {
        if self.done {
            return None;
        }
        let mut buf = [0u8; 1];
        match self.inner.read(&mut buf) {
            Ok(1) => Some(buf[0]),
            _ => {
                self.done = true;
                None
            }
        }
    }
}
