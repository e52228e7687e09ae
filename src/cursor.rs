//! Bit-addressable cursor over a [`ByteSource`].

use crate::bits::{self, Bits};
use crate::error::{Error, Result};
use crate::source::ByteSource;

/// Largest single request made to the source while filling.
const READ_CHUNK: usize = 8192;

/// BitCursor delivers arbitrary bit spans from a forward-only byte source.
///
/// Bytes pulled from the source live in a look-ahead buffer until every
/// bit in them has been delivered. Between successful extractions the
/// buffer holds at most the partially consumed last byte; a failed request
/// may leave extra whole bytes behind, which later requests reuse.
pub struct BitCursor<S> {
    source: S,
    bit_offset: u64,
    lookahead: Vec<u8>,
    /// Bits of `lookahead[0]` already delivered, always below 8.
    head_bits: u32,
    tracked: Option<Vec<u8>>,
}

impl<S: ByteSource> BitCursor<S> {
    /// Creates a cursor at bit 0 of `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            bit_offset: 0,
            lookahead: Vec::new(),
            head_bits: 0,
            tracked: None,
        }
    }

    /// Turns recording of delivered bytes on or off.
    ///
    /// Turning it off drops what was recorded.
    pub fn set_track_bytes(&mut self, enabled: bool) {
        match (enabled, self.tracked.is_some()) {
            (true, false) => self.tracked = Some(Vec::new()),
            (false, true) => self.tracked = None,
            _ => {}
        }
    }

    /// Bytes delivered at least in part since tracking was turned on.
    pub fn tracked_bytes(&self) -> &[u8] {
        self.tracked.as_deref().unwrap_or(&[])
    }

    /// Returns the number of bits delivered so far.
    pub fn bit_offset(&self) -> u64 {
        self.bit_offset
    }

    /// Returns true when the offset sits on a byte boundary.
    pub fn is_byte_aligned(&self) -> bool {
        self.head_bits == 0
    }

    /// Bits already buffered and not yet delivered.
    pub fn buffered_bits(&self) -> u64 {
        (self.lookahead.len() as u64 * 8).saturating_sub(u64::from(self.head_bits))
    }

    /// Reads exactly `n_bits` and advances past them.
    pub fn extract(&mut self, n_bits: usize) -> Result<Bits> {
        let bits = self.peek(n_bits)?;
        self.advance(n_bits);
        Ok(bits)
    }

    /// Returns the next `n_bits` without advancing.
    ///
    /// Fails with [`Error::TruncatedInput`] if the source ends first; the
    /// offset is unchanged either way.
    pub fn peek(&mut self, n_bits: usize) -> Result<Bits> {
        if n_bits == 0 {
            return Ok(Bits::new());
        }

        let needed = self.fill(n_bits)?;
        Ok(bits::window(&self.lookahead[..needed], self.head_bits, n_bits))
    }

    /// Returns true if at least one more bit is available.
    pub fn has_more(&mut self) -> Result<bool> {
        match self.fill(1) {
            Ok(_) => Ok(true),
            Err(Error::TruncatedInput { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Moves past `n_bits` that a previous [`BitCursor::peek`] buffered.
    pub(crate) fn advance(&mut self, n_bits: usize) {
        let end = self.head_bits as usize + n_bits;
        debug_assert!(end <= self.lookahead.len() * 8, "advance past buffered bits");

        if let Some(tracked) = self.tracked.as_mut() {
            // The head byte was recorded when its first bit went out.
            let first_new = usize::from(self.head_bits > 0);
            let touched = end.div_ceil(8);
            if touched > first_new {
                tracked.extend_from_slice(&self.lookahead[first_new..touched]);
            }
        }

        self.lookahead.drain(..end / 8);
        self.head_bits = (end % 8) as u32;
        self.bit_offset += n_bits as u64;
    }

    /// Buffers enough bytes to cover `n_bits` past the offset.
    ///
    /// Returns the number of buffered bytes the span touches.
    fn fill(&mut self, n_bits: usize) -> Result<usize> {
        let needed = (self.head_bits as usize)
            .checked_add(n_bits)
            .map(|end| end.div_ceil(8))
            .ok_or_else(|| {
                Error::truncated("bits", self.bit_offset, n_bits as u64, self.buffered_bits())
            })?;

        while self.lookahead.len() < needed {
            let have = self.lookahead.len();
            let chunk = (needed - have).min(READ_CHUNK);

            self.lookahead.resize(have + chunk, 0);
            let got = match self.source.read_bytes(&mut self.lookahead[have..]) {
                Ok(got) => got,
                Err(e) => {
                    self.lookahead.truncate(have);
                    return Err(e);
                }
            };
            self.lookahead.truncate(have + got);

            if got < chunk {
                return Err(Error::truncated(
                    "bits",
                    self.bit_offset,
                    n_bits as u64,
                    self.buffered_bits(),
                ));
            }
        }

        Ok(needed)
    }

    /// Consumes the cursor, returning the source.
    ///
    /// Buffered bytes that were not fully delivered are dropped.
    pub fn into_source(self) -> S {
        self.source
    }
}
