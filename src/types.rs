//! Built-in field types.

use std::str::FromStr;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::bits::{reverse_bits_n, Bits};
use crate::cursor::BitCursor;
use crate::error::{Error, Result};
use crate::source::BufferSource;
use crate::spec_type::SpecType;

/// Widest integer [`Int`] can produce.
pub const MAX_INT_BITS: usize = 64;

/// Most elements an [`Array`] of zero-width elements may repeat.
pub const MAX_ZERO_WIDTH_ELEMENTS: usize = 1 << 16;

/// Byte order used when an [`Int`] spans whole bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Big,
    /// First byte is least significant. Only valid for whole-byte widths.
    Little,
}

/// Bit order of the extracted span.
///
/// For [`Str`] and [`Bytes`], `LsbFirst` reverses the span before it is
/// split into bytes, so the last stream byte comes first, bit-reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitOrder {
    #[default]
    MsbFirst,
    /// The whole span is reversed before it is read as a number.
    LsbFirst,
}

/// Unsigned integer of an arbitrary width up to 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Int {
    width: usize,
    endian: Endian,
    bit_order: BitOrder,
}

impl Int {
    /// Integer `bytes * 8 + bits` bits wide.
    pub fn new(bytes: usize, bits: usize) -> Self {
        Self {
            width: bytes * 8 + bits,
            endian: Endian::Big,
            bit_order: BitOrder::MsbFirst,
        }
    }

    pub fn bits(bits: usize) -> Self {
        Self::new(0, bits)
    }

    pub fn bytes(bytes: usize) -> Self {
        Self::new(bytes, 0)
    }

    pub fn u8() -> Self {
        Self::bytes(1)
    }

    pub fn u16() -> Self {
        Self::bytes(2)
    }

    pub fn u32() -> Self {
        Self::bytes(4)
    }

    pub fn u64() -> Self {
        Self::bytes(8)
    }

    /// Reads whole bytes least significant first.
    pub fn little_endian(mut self) -> Self {
        self.endian = Endian::Little;
        self
    }

    /// Reverses the extracted bits before interpreting them.
    pub fn lsb_first(mut self) -> Self {
        self.bit_order = BitOrder::LsbFirst;
        self
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn bit_order(&self) -> BitOrder {
        self.bit_order
    }
}

impl SpecType for Int {
    type Output = u64;

    fn bit_length(&self) -> usize {
        self.width
    }

    fn parse(&self, bits: &Bits) -> Result<u64> {
        if self.width > MAX_INT_BITS {
            return Err(Error::invalid_spec_type(
                "Int",
                format!("width {} exceeds {} bits", self.width, MAX_INT_BITS),
            ));
        }

        let value = match self.endian {
            Endian::Big => bits.to_u64().unwrap_or_default(),
            Endian::Little => {
                let bytes = bits.as_bytes().ok_or_else(|| {
                    Error::invalid_spec_type(
                        "Int",
                        format!("little endian needs whole bytes, width is {}", self.width),
                    )
                })?;
                if bytes.is_empty() {
                    0
                } else {
                    LittleEndian::read_uint(bytes, bytes.len())
                }
            }
        };

        Ok(match self.bit_order {
            BitOrder::MsbFirst => value,
            BitOrder::LsbFirst => reverse_bits_n(value, self.width),
        })
    }

    fn type_name(&self) -> &'static str {
        "Int"
    }
}

/// Text encodings understood by [`Str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Ascii,
    Latin1,
    Utf16Be,
    Utf16Le,
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(Encoding::Latin1),
            "utf-16be" | "utf16be" | "utf-16" => Ok(Encoding::Utf16Be),
            "utf-16le" | "utf16le" => Ok(Encoding::Utf16Le),
            _ => Err(Error::invalid_spec_type(
                "Str",
                format!("unknown encoding: {name}"),
            )),
        }
    }
}

impl Encoding {
    fn decode(self, bytes: &[u8]) -> Result<String> {
        match self {
            Encoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| Error::Decode {
                    type_name: "Str",
                    offset: (e.valid_up_to() * 8) as u64,
                    reason: format!("invalid utf-8: {e}"),
                }),
            Encoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(i) => Err(Error::Decode {
                    type_name: "Str",
                    offset: (i * 8) as u64,
                    reason: format!("byte {:#04x} is not ascii", bytes[i]),
                }),
                None => Ok(bytes.iter().map(|&b| b as char).collect()),
            },
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            Encoding::Utf16Be | Encoding::Utf16Le => {
                if bytes.len() % 2 != 0 {
                    return Err(Error::decode(
                        "Str",
                        format!("utf-16 needs an even byte count, got {}", bytes.len()),
                    ));
                }
                let mut units = vec![0u16; bytes.len() / 2];
                if self == Encoding::Utf16Be {
                    BigEndian::read_u16_into(bytes, &mut units);
                } else {
                    LittleEndian::read_u16_into(bytes, &mut units);
                }
                String::from_utf16(&units)
                    .map_err(|e| Error::decode("Str", format!("invalid utf-16: {e}")))
            }
        }
    }
}

/// Fixed-length text field; `length` counts bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Str {
    length: usize,
    encoding: Encoding,
    bit_order: BitOrder,
}

impl Str {
    pub fn new(length: usize, encoding: Encoding) -> Self {
        Self {
            length,
            encoding,
            bit_order: BitOrder::MsbFirst,
        }
    }

    pub fn utf8(length: usize) -> Self {
        Self::new(length, Encoding::Utf8)
    }

    /// Builds a string type from an encoding name such as `"utf8"`.
    pub fn with_encoding_name(length: usize, encoding: &str) -> Result<Self> {
        Ok(Self::new(length, encoding.parse()?))
    }

    /// Reverses the extracted bits before decoding the text.
    pub fn lsb_first(mut self) -> Self {
        self.bit_order = BitOrder::LsbFirst;
        self
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

impl SpecType for Str {
    type Output = String;

    fn bit_length(&self) -> usize {
        self.length * 8
    }

    fn parse(&self, bits: &Bits) -> Result<String> {
        match self.bit_order {
            BitOrder::MsbFirst => self.encoding.decode(bits.as_packed()),
            BitOrder::LsbFirst => self.encoding.decode(&reverse_span(bits.as_packed())),
        }
    }

    fn type_name(&self) -> &'static str {
        "Str"
    }
}

/// Raw bytes, returned unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bytes {
    count: usize,
    bit_order: BitOrder,
}

impl Bytes {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            bit_order: BitOrder::MsbFirst,
        }
    }

    /// Reverses the extracted bits, last byte first.
    pub fn lsb_first(mut self) -> Self {
        self.bit_order = BitOrder::LsbFirst;
        self
    }
}

impl SpecType for Bytes {
    type Output = Vec<u8>;

    fn bit_length(&self) -> usize {
        self.count * 8
    }

    fn parse(&self, bits: &Bits) -> Result<Vec<u8>> {
        Ok(match self.bit_order {
            BitOrder::MsbFirst => bits.as_packed().to_vec(),
            BitOrder::LsbFirst => reverse_span(bits.as_packed()),
        })
    }

    fn type_name(&self) -> &'static str {
        "Bytes"
    }
}

/// Reverses a whole-byte span bit for bit.
fn reverse_span(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().rev().map(|b| b.reverse_bits()).collect()
}

/// Boolean that is true when any of its bits is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bool {
    single_bit: bool,
}

impl Bool {
    /// A whole byte.
    pub fn byte() -> Self {
        Self { single_bit: false }
    }

    /// A single bit.
    pub fn bit() -> Self {
        Self { single_bit: true }
    }
}

impl SpecType for Bool {
    type Output = bool;

    fn bit_length(&self) -> usize {
        if self.single_bit {
            1
        } else {
            8
        }
    }

    fn parse(&self, bits: &Bits) -> Result<bool> {
        Ok(bits.iter().any(|bit| bit))
    }

    fn type_name(&self) -> &'static str {
        "Bool"
    }
}

/// A run of bits returned as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBits {
    count: usize,
}

impl RawBits {
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl SpecType for RawBits {
    type Output = Bits;

    fn bit_length(&self) -> usize {
        self.count
    }

    fn parse(&self, bits: &Bits) -> Result<Bits> {
        Ok(bits.clone())
    }

    fn type_name(&self) -> &'static str {
        "RawBits"
    }
}

/// Fixed-length array of one element type.
///
/// Elements are decoded in stream order, each from its own slice of the
/// extracted bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Array<T> {
    element: T,
    length: usize,
}

impl<T: SpecType> Array<T> {
    pub fn new(element: T, length: usize) -> Self {
        Self { element, length }
    }

    pub fn element(&self) -> &T {
        &self.element
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl<T: SpecType> SpecType for Array<T> {
    type Output = Vec<T::Output>;

    fn bit_length(&self) -> usize {
        self.element.bit_length().saturating_mul(self.length)
    }

    fn parse(&self, bits: &Bits) -> Result<Vec<T::Output>> {
        let item_bits = self.element.bit_length();
        if item_bits == 0 && self.length > MAX_ZERO_WIDTH_ELEMENTS {
            return Err(Error::invalid_spec_type(
                "Array",
                format!(
                    "{} zero-width elements exceeds {}",
                    self.length, MAX_ZERO_WIDTH_ELEMENTS
                ),
            ));
        }

        let mut cursor = BitCursor::new(BufferSource::new(bits.as_packed()));
        // Never reserve more elements than the bits can hold.
        let fit = bits.len() / item_bits.max(1);
        let mut values = Vec::with_capacity(self.length.min(fit));

        for _ in 0..self.length {
            let start = cursor.bit_offset();
            let raw = cursor.extract(item_bits)?;
            let value = self
                .element
                .parse(&raw)
                .map_err(|e| e.offset_by(start))?;
            values.push(value);
        }

        Ok(values)
    }

    fn type_name(&self) -> &'static str {
        "Array"
    }
}
