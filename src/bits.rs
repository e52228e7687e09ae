//! Raw bit strings handed from the cursor to spec types.
//!
//! Bits are addressed MSB-first: bit 0 is the high bit of the first byte.

use std::fmt;

use byteorder::{BigEndian, ByteOrder};

/// An owned string of bits, packed MSB-first and left-aligned.
///
/// Padding bits in the last byte are always zero, so two `Bits` with the
/// same content compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Bits {
    packed: Vec<u8>,
    len: usize,
}

impl Bits {
    /// Returns an empty bit string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bit string from the first `len` bits of `packed`.
    ///
    /// Extra bytes are dropped and trailing bits are cleared.
    pub fn from_packed(mut packed: Vec<u8>, len: usize) -> Self {
        let len = len.min(packed.len() * 8);
        packed.truncate(len.div_ceil(8));

        let tail = len % 8;
        if tail != 0 {
            if let Some(last) = packed.last_mut() {
                *last &= 0xFFu8 << (8 - tail);
            }
        }

        Self { packed, len }
    }

    /// Wraps whole bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            packed: bytes.to_vec(),
            len: bytes.len() * 8,
        }
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true when the string covers a whole number of bytes.
    pub fn is_byte_aligned(&self) -> bool {
        self.len % 8 == 0
    }

    /// Packed representation; the final byte may carry zero padding.
    pub fn as_packed(&self) -> &[u8] {
        &self.packed
    }

    /// Returns the bytes if the string is a whole number of bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.is_byte_aligned().then_some(self.packed.as_slice())
    }

    /// Consumes the string, returning the packed bytes.
    pub fn into_packed(self) -> Vec<u8> {
        self.packed
    }

    /// Returns bit `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        Some((self.packed[index / 8] >> (7 - index % 8)) & 1 == 1)
    }

    /// Iterates over the bits in stream order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| (self.packed[i / 8] >> (7 - i % 8)) & 1 == 1)
    }

    /// Interprets the bits as an unsigned big-endian integer.
    ///
    /// Returns `None` for strings longer than 64 bits. An empty string is 0.
    pub fn to_u64(&self) -> Option<u64> {
        match self.packed.len() {
            0 => Some(0),
            n @ 1..=8 => {
                let value = BigEndian::read_uint(&self.packed, n);
                Some(value >> (n * 8 - self.len))
            }
            _ => None,
        }
    }
}

impl FromIterator<bool> for Bits {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut packed = Vec::new();
        let mut len = 0;

        for bit in iter {
            if len % 8 == 0 {
                packed.push(0);
            }
            if bit {
                let last = packed.len() - 1;
                packed[last] |= 0x80u8 >> (len % 8);
            }
            len += 1;
        }

        Self { packed, len }
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Copies `n_bits` starting `skip` bits into `bytes`.
///
/// The span is treated as one big-endian integer across every touched
/// byte. `bytes` must hold at least `(skip + n_bits).div_ceil(8)` bytes and
/// `skip < 8`.
pub(crate) fn window(bytes: &[u8], skip: u32, n_bits: usize) -> Bits {
    let out_len = n_bits.div_ceil(8);

    if skip == 0 {
        return Bits::from_packed(bytes[..out_len].to_vec(), n_bits);
    }

    let packed = (0..out_len)
        .map(|i| {
            let hi = bytes[i] << skip;
            let lo = bytes.get(i + 1).map_or(0, |b| b >> (8 - skip));
            hi | lo
        })
        .collect();

    Bits::from_packed(packed, n_bits)
}

/// Reverses the low `n` bits of `x` (LSB becomes MSB of the result).
pub fn reverse_bits_n(x: u64, n: usize) -> u64 {
    if n == 0 {
        return 0;
    }
    x.reverse_bits() >> (64 - n)
}
