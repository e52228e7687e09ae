//! The decoding session.

use std::io::Read;

use log::{debug, trace};

use crate::cursor::BitCursor;
use crate::error::{Error, Result};
use crate::source::{BufferSource, ByteSource};
use crate::spec_type::SpecType;
use crate::stream::StreamSource;

/// Largest field a session accepts by default (64 MB worth of bits).
pub const DEFAULT_MAX_FIELD_BITS: usize = 64 * 1024 * 1024 * 8;

/// One successfully decoded field, kept when history tracking is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    pub type_name: &'static str,
    pub label: Option<String>,
    pub bit_offset: u64,
    pub bit_length: usize,
}

/// Specification drives [`SpecType`]s against a bit cursor.
///
/// Each [`Specification::expect`] extracts exactly the bits the type
/// declares and returns the parsed value. A failed call leaves the cursor
/// where it was.
pub struct Specification<S> {
    cursor: BitCursor<S>,
    max_field_bits: usize,
    history: Option<Vec<FieldRecord>>,
}

impl<'a> Specification<BufferSource<&'a [u8]>> {
    /// Creates a session over an in-memory buffer.
    pub fn from_bytes(data: &'a [u8]) -> Self {
        Self::new(BufferSource::new(data))
    }
}

impl<R: Read> Specification<StreamSource<R>> {
    /// Creates a session over a byte stream.
    pub fn from_reader(reader: R) -> Self {
        Self::new(StreamSource::new(reader))
    }
}

impl<S: ByteSource> Specification<S> {
    /// Creates a session positioned at the start of `source`.
    pub fn new(source: S) -> Self {
        Self {
            cursor: BitCursor::new(source),
            max_field_bits: DEFAULT_MAX_FIELD_BITS,
            history: None,
        }
    }

    /// Sets the widest field this session will extract.
    pub fn set_max_field_bits(&mut self, bits: usize) {
        self.max_field_bits = bits;
    }

    /// Turns field history on or off. Turning it off drops recorded fields.
    pub fn set_track_history(&mut self, enabled: bool) {
        match (enabled, self.history.is_some()) {
            (true, false) => self.history = Some(Vec::new()),
            (false, true) => self.history = None,
            _ => {}
        }
    }

    /// Fields decoded so far; empty unless history tracking is on.
    pub fn history(&self) -> &[FieldRecord] {
        self.history.as_deref().unwrap_or(&[])
    }

    /// Turns recording of consumed bytes on or off.
    ///
    /// A byte is recorded once any of its bits is consumed. Turning it off
    /// drops what was recorded.
    pub fn set_track_bytes(&mut self, enabled: bool) {
        self.cursor.set_track_bytes(enabled);
    }

    /// Bytes consumed since byte tracking was turned on.
    pub fn tracked_bytes(&self) -> &[u8] {
        self.cursor.tracked_bytes()
    }

    /// Returns the number of bits consumed so far.
    pub fn bit_offset(&self) -> u64 {
        self.cursor.bit_offset()
    }

    /// Decodes the next field with `spec_type`.
    pub fn expect<T: SpecType>(&mut self, spec_type: &T) -> Result<T::Output> {
        self.decode(spec_type, None)
    }

    /// Like [`Specification::expect`], recording `label` in the history.
    pub fn expect_labeled<T: SpecType>(
        &mut self,
        spec_type: &T,
        label: impl Into<String>,
    ) -> Result<T::Output> {
        self.decode(spec_type, Some(label.into()))
    }

    /// Like [`Specification::expect`], but returns `Ok(None)` when the
    /// input ends before the field does.
    pub fn try_expect<T: SpecType>(&mut self, spec_type: &T) -> Result<Option<T::Output>> {
        match self.decode(spec_type, None) {
            Ok(value) => Ok(Some(value)),
            Err(Error::TruncatedInput { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fails with [`Error::Validation`] at the current offset.
    ///
    /// For checks the type system cannot express, such as a magic number.
    pub fn fail<T>(&self, message: impl Into<String>) -> Result<T> {
        let message = message.into();
        let offset = self.cursor.bit_offset();
        debug!("validation failed at bit {}: {}", offset, message);
        Err(Error::Validation { offset, message })
    }

    /// Fails with [`Error::TrailingData`] if any input is left.
    ///
    /// Unread bits of a partially consumed byte count as input.
    pub fn assert_eof(&mut self) -> Result<()> {
        if self.cursor.has_more()? {
            let offset = self.cursor.bit_offset();
            debug!("trailing data at bit {}", offset);
            return Err(Error::TrailingData { offset });
        }
        Ok(())
    }

    /// Ends the session, returning the source.
    pub fn into_source(self) -> S {
        self.cursor.into_source()
    }

    fn decode<T: SpecType>(&mut self, spec_type: &T, label: Option<String>) -> Result<T::Output> {
        let type_name = spec_type.type_name();
        let bit_length = spec_type.bit_length();
        let offset = self.cursor.bit_offset();

        if bit_length > self.max_field_bits {
            return Err(Error::FieldTooLarge {
                type_name,
                bits: bit_length,
                max: self.max_field_bits,
            });
        }

        let raw = self.cursor.peek(bit_length).map_err(|e| {
            let e = e.with_type_name(type_name);
            debug!("{} at bit {}: {}", type_name, offset, e);
            e
        })?;
        let value = spec_type.parse(&raw).map_err(|e| e.offset_by(offset))?;
        self.cursor.advance(bit_length);

        trace!(
            "{} ({} bits) at bit {}{}",
            type_name,
            bit_length,
            offset,
            label.as_deref().map(|l| format!(" [{l}]")).unwrap_or_default()
        );

        if let Some(history) = self.history.as_mut() {
            history.push(FieldRecord {
                type_name,
                label,
                bit_offset: offset,
                bit_length,
            });
        }

        Ok(value)
    }
}
