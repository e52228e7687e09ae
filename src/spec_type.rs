//! The contract between the driver and decodable field descriptions.

use crate::bits::Bits;
use crate::error::Result;

/// A decodable field description.
///
/// The driver asks for [`SpecType::bit_length`], extracts exactly that many
/// bits, and hands them to [`SpecType::parse`]. Both methods must be pure:
/// the width comes from the instance's own parameters, never from stream
/// contents, and `parse` sees nothing but the bits it is given.
///
/// # Example
///
/// ```rust
/// use binspec::{Bits, Result, SpecType, Specification};
///
/// /// Renders bytes as a string of `0` and `1`.
/// struct BitString {
///     byte_count: usize,
/// }
///
/// impl SpecType for BitString {
///     type Output = String;
///
///     fn bit_length(&self) -> usize {
///         self.byte_count * 8
///     }
///
///     fn parse(&self, bits: &Bits) -> Result<String> {
///         Ok(bits.to_string())
///     }
/// }
///
/// let data = [0b1111_0000, 0b1010_1010];
/// let mut spec = Specification::from_bytes(&data);
/// assert_eq!(spec.expect(&BitString { byte_count: 2 })?, "1111000010101010");
/// # Ok::<(), binspec::Error>(())
/// ```
pub trait SpecType {
    /// Value produced by a successful decode.
    type Output;

    /// Number of bits the next decode consumes.
    fn bit_length(&self) -> usize;

    /// Turns exactly [`SpecType::bit_length`] raw bits into a value.
    ///
    /// Errors should be positioned relative to the start of `bits`.
    fn parse(&self, bits: &Bits) -> Result<Self::Output>;

    /// Short name used in diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<T: SpecType + ?Sized> SpecType for &T {
    type Output = T::Output;

    fn bit_length(&self) -> usize {
        (**self).bit_length()
    }

    fn parse(&self, bits: &Bits) -> Result<Self::Output> {
        (**self).parse(bits)
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

impl<T: SpecType + ?Sized> SpecType for Box<T> {
    type Output = T::Output;

    fn bit_length(&self) -> usize {
        (**self).bit_length()
    }

    fn parse(&self, bits: &Bits) -> Result<Self::Output> {
        (**self).parse(bits)
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}
