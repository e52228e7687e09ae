//! BinSpec - Declarative bit-level decoding of binary streams
//!
//! A [`Specification`] walks a byte source one field at a time. Each field is
//! described by a [`SpecType`], which declares how many bits it occupies and
//! how to turn those bits into a value. Fields need not be byte aligned.
//!
//! # Example
//!
//! ```rust
//! use binspec::types::{Array, Int, Str};
//! use binspec::{Result, Specification};
//!
//! fn main() -> Result<()> {
//!     let data = b"MAGIC\x76\xcc";
//!     let mut spec = Specification::from_bytes(data);
//!
//!     let magic = spec.expect(&Str::utf8(5))?;
//!     if magic != "MAGIC" {
//!         return spec.fail("magic value mismatch");
//!     }
//!     assert_eq!(spec.expect(&Int::u8())?, 118);
//!     assert_eq!(spec.expect(&Array::new(Int::bits(2), 4))?, vec![3, 0, 3, 0]);
//!     spec.assert_eof()?;
//!     Ok(())
//! }
//! ```

mod bits;
mod cursor;
mod error;
mod source;
mod spec;
mod spec_type;
pub mod stream;
pub mod types;
mod value;

pub use bits::{reverse_bits_n, Bits};
pub use cursor::BitCursor;
pub use error::{Error, Result};
pub use source::{BufferSource, ByteSource};
pub use spec::{FieldRecord, Specification, DEFAULT_MAX_FIELD_BITS};
pub use spec_type::SpecType;
pub use stream::StreamSource;
pub use value::{DynSpecType, IntoValue, Packed, Value};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Decodes an in-memory buffer with a closure driving a [`Specification`].
pub fn decode<'a, T, F>(data: &'a [u8], decoder: F) -> Result<T>
where
    F: FnOnce(&mut Specification<BufferSource<&'a [u8]>>) -> Result<T>,
{
    let mut spec = Specification::from_bytes(data);
    decoder(&mut spec)
}
