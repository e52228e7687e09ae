//! Byte sources consumed by the bit cursor.

use crate::error::Result;

/// A forward-only sequence of bytes.
///
/// Implementors hand out bytes strictly in source order. A short read is
/// only allowed at true end of data; callers detect it from the returned
/// count. Sources never seek backward and hold no cursor state.
pub trait ByteSource {
    /// Fills `buf` with the next bytes of the source.
    ///
    /// Returns the number of bytes written, which is less than `buf.len()`
    /// only when the source is exhausted. An `Err` delivers no bytes; any
    /// read before the failure must come back on the next call.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read_bytes(buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read_bytes(buf)
    }
}

/// BufferSource serves bytes from a resident buffer.
///
/// Works with anything that derefs to a byte slice: `&[u8]`, `Vec<u8>`,
/// arrays, boxed slices.
pub struct BufferSource<B> {
    buffer: B,
    pos: usize,
}

impl<B: AsRef<[u8]>> BufferSource<B> {
    /// Creates a new source positioned at the first byte.
    pub fn new(buffer: B) -> Self {
        Self { buffer, pos: 0 }
    }

    /// Returns the current position in the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of bytes not yet handed out.
    pub fn remaining(&self) -> usize {
        self.buffer.as_ref().len() - self.pos
    }

    /// Returns true if there is more data to read.
    pub fn has_more(&self) -> bool {
        self.remaining() > 0
    }

    /// Consumes the source, returning the underlying buffer.
    pub fn into_inner(self) -> B {
        self.buffer
    }
}

impl<B: AsRef<[u8]>> ByteSource for BufferSource<B> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        let data = self.buffer.as_ref();
        let count = buf.len().min(data.len() - self.pos);
        buf[..count].copy_from_slice(&data[self.pos..self.pos + count]);
        self.pos += count;
        Ok(count)
    }
}

impl<'a> From<&'a [u8]> for BufferSource<&'a [u8]> {
    fn from(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}

impl From<Vec<u8>> for BufferSource<Vec<u8>> {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_reads_preserve_order() {
        let mut source = BufferSource::new(&[1u8, 2, 3, 4, 5][..]);
        let mut first = [0u8; 2];
        let mut second = [0u8; 3];

        assert_eq!(source.read_bytes(&mut first).unwrap(), 2);
        assert_eq!(source.read_bytes(&mut second).unwrap(), 3);
        assert_eq!(first, [1, 2]);
        assert_eq!(second, [3, 4, 5]);
        assert!(!source.has_more());
    }

    #[test]
    fn test_short_read_at_end() {
        let mut source = BufferSource::new(vec![0xAA]);
        let mut buf = [0u8; 4];

        assert_eq!(source.read_bytes(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 0xAA);
        assert_eq!(source.position(), 1);
        assert_eq!(source.read_bytes(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_through_mut_reference() {
        fn first_byte<S: ByteSource>(mut source: S) -> u8 {
            let mut buf = [0u8; 1];
            source.read_bytes(&mut buf).unwrap();
            buf[0]
        }

        let mut source = BufferSource::new([7u8, 8]);
        assert_eq!(first_byte(&mut source), 7);
        assert_eq!(source.remaining(), 1);
        assert_eq!(first_byte(Box::new(source)), 8);
    }
}
