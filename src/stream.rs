//! Streaming byte source.
//!
//! [`StreamSource`] adapts any `std::io::Read` to [`ByteSource`], so a
//! specification can decode a file handle or socket without loading it
//! into memory first.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::fs::File;
//! use binspec::stream::StreamSource;
//! use binspec::types::Int;
//! use binspec::{Result, Specification};
//!
//! fn main() -> Result<()> {
//!     let file = File::open("header.bin")?;
//!     let mut spec = Specification::new(StreamSource::new(file));
//!     let version = spec.expect(&Int::u16())?;
//!     println!("version {}", version);
//!     Ok(())
//! }
//! ```

use std::io::{BufReader, ErrorKind, Read};

use crate::error::{Error, Result};
use crate::source::ByteSource;

/// Default buffer capacity for stream sources.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8192;

/// StreamSource reads bytes from a byte stream through a buffer.
///
/// Bytes read before an I/O error are held back and delivered first by
/// the next call, so a failed read never loses input.
pub struct StreamSource<R: Read> {
    inner: BufReader<R>,
    pending: Vec<u8>,
    consumed: u64,
}

impl<R: Read> StreamSource<R> {
    /// Creates a new StreamSource wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY, reader)
    }

    /// Creates a new StreamSource with the specified buffer capacity.
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Self {
            inner: BufReader::with_capacity(capacity, reader),
            pending: Vec::new(),
            consumed: 0,
        }
    }

    /// Returns the number of bytes handed out so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }

    /// Returns a mutable reference to the underlying reader.
    ///
    /// Reading from it directly desynchronizes any cursor built on top.
    pub fn get_mut(&mut self) -> &mut R {
        self.inner.get_mut()
    }

    /// Consumes this StreamSource, returning the underlying reader.
    ///
    /// Bytes already buffered but not handed out, including any held back
    /// after an error, are lost.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: Read> ByteSource for StreamSource<R> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = self.pending.len().min(buf.len());
        buf[..filled].copy_from_slice(&self.pending[..filled]);
        self.pending.drain(..filled);

        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.pending.splice(0..0, buf[..filled].iter().copied());
                    return Err(Error::from(e));
                }
            }
        }

        self.consumed += filled as u64;
        Ok(filled)
    }
}
