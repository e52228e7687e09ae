//! End-to-end decoding tests over in-memory and streaming sources.

use std::io::{Cursor, ErrorKind, Read};

use binspec::types::{Array, Bool, Bytes, Int, RawBits, Str};
use binspec::{decode, DynSpecType, Error, Packed, SpecType, Specification, StreamSource, Value};

fn magic_header() -> Vec<u8> {
    let mut data = b"MAGIC".to_vec();
    data.push(0b0111_0110);
    data.push(0b1100_1100);
    data
}

#[test]
fn test_magic_header_end_to_end() {
    let data = magic_header();
    let mut spec = Specification::from_bytes(&data);

    assert_eq!(spec.expect(&Str::utf8(5)).unwrap(), "MAGIC");
    assert_eq!(spec.expect(&Int::bytes(1)).unwrap(), 118);
    assert_eq!(
        spec.expect(&Array::new(Int::bits(2), 4)).unwrap(),
        vec![3, 0, 3, 0]
    );

    let err = spec.expect(&Int::bits(1)).unwrap_err();
    assert!(err.is_truncated());
    assert_eq!(err.offset(), Some(56));
}

#[test]
fn test_magic_header_from_stream() {
    let mut spec = Specification::from_reader(Cursor::new(magic_header()));

    assert_eq!(spec.expect(&Str::utf8(5)).unwrap(), "MAGIC");
    assert_eq!(spec.expect(&Int::u8()).unwrap(), 118);
    assert_eq!(
        spec.expect(&Array::new(Int::bits(2), 4)).unwrap(),
        vec![3, 0, 3, 0]
    );
    spec.assert_eof().unwrap();
}

#[test]
fn test_truncation_leaves_offset_at_zero() {
    let data = [0xAB];
    let mut spec = Specification::from_bytes(&data);

    let err = spec.expect(&Int::bytes(2)).unwrap_err();
    match err {
        Error::TruncatedInput {
            type_name,
            offset,
            needed,
            available,
        } => {
            assert_eq!(type_name, "Int");
            assert_eq!(offset, 0);
            assert_eq!(needed, 16);
            assert_eq!(available, 8);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(spec.bit_offset(), 0);
    assert_eq!(spec.expect(&Int::u8()).unwrap(), 0xAB);
}

#[test]
fn test_fail_carries_message_and_offset() {
    let data = hex::decode("cafe").unwrap();
    let result: binspec::Result<()> = decode(&data, |spec| {
        let magic = spec.expect(&Int::u8())?;
        if magic != 0xCA {
            return spec.fail("unexpected magic");
        }
        spec.fail("x")
    });

    match result.unwrap_err() {
        Error::Validation { offset, message } => {
            assert_eq!(offset, 8);
            assert_eq!(message, "x");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_bit_length_is_stable_across_decodes() {
    let data = hex::decode("0102030405060708").unwrap();
    let mut spec = Specification::from_bytes(&data);
    let wide = Int::u16();
    let arr = Array::new(Int::bits(4), 3);

    let before = (wide.bit_length(), arr.bit_length());
    spec.expect(&wide).unwrap();
    spec.expect(&arr).unwrap();
    spec.expect(&Int::bits(4)).unwrap();
    spec.expect(&wide).unwrap();

    assert_eq!((wide.bit_length(), arr.bit_length()), before);
    assert_eq!(before, (16, 12));
}

#[test]
fn test_unaligned_span_is_big_endian_over_whole_span() {
    // 0001 0010 0011 0100 0101 0110
    let data = hex::decode("123456").unwrap();
    let mut spec = Specification::from_bytes(&data);

    assert_eq!(spec.expect(&Int::bits(4)).unwrap(), 0x1);
    assert_eq!(spec.expect(&Int::bits(16)).unwrap(), 0x2345);
    assert_eq!(spec.expect(&Int::bits(4)).unwrap(), 0x6);
}

#[test]
fn test_bytes_and_strings_after_unaligned_field() {
    let data = hex::decode("f4142430").unwrap();
    let mut spec = Specification::from_bytes(&data);

    assert_eq!(spec.expect(&Int::bits(4)).unwrap(), 0xF);
    assert_eq!(spec.expect(&Str::utf8(3)).unwrap(), "ABC");
    assert_eq!(spec.expect(&Int::bits(4)).unwrap(), 0);
}

#[test]
fn test_packed_record() {
    let data = [0b1100_1100, 0xDE, 0xAD];
    let mut spec = Specification::from_bytes(&data);
    let header = Packed::named([
        ("a", Box::new(Int::bits(2)) as Box<dyn DynSpecType>),
        ("b", Box::new(Int::bits(4)) as Box<dyn DynSpecType>),
        ("c", Box::new(Array::new(Bool::bit(), 2)) as Box<dyn DynSpecType>),
        ("tail", Box::new(Bytes::new(2)) as Box<dyn DynSpecType>),
    ]);

    let value = spec.expect(&header).unwrap();
    assert_eq!(value.get("a"), Some(&Value::Int(3)));
    assert_eq!(value.get("b"), Some(&Value::Int(3)));
    assert_eq!(
        value.get("c"),
        Some(&Value::List(vec![Value::Bool(false), Value::Bool(false)]))
    );
    assert_eq!(value.get("tail"), Some(&Value::Bytes(vec![0xDE, 0xAD])));
}

#[test]
fn test_raw_bits_nibble() {
    let data = [0b1100_0011];
    let mut spec = Specification::from_bytes(&data);
    let bits = spec.expect(&RawBits::new(4)).unwrap();
    assert_eq!(bits.iter().collect::<Vec<_>>(), vec![true, true, false, false]);
}

#[test]
fn test_try_expect_returns_none_at_eof() {
    let data = [0b1111_0000];
    let mut spec = Specification::from_bytes(&data);
    spec.expect(&Int::u8()).unwrap();

    assert_eq!(spec.try_expect(&RawBits::new(10)).unwrap(), None);
}

/// Reader that counts bytes handed out and never returns more than one per call.
struct CountingReader {
    data: Vec<u8>,
    pos: usize,
}

impl Read for CountingReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.pos >= self.data.len() || buf.is_empty() {
            return Ok(0);
        }
        buf[0] = self.data[self.pos];
        self.pos += 1;
        Ok(1)
    }
}

#[test]
fn test_stream_bytes_are_fetched_once() {
    let reader = CountingReader {
        data: vec![0b1011_0110, 0b0101_1111, 0xFF],
        pos: 0,
    };
    let mut spec = Specification::new(StreamSource::with_capacity(1, reader));

    assert_eq!(spec.expect(&Int::bits(3)).unwrap(), 0b101);
    assert_eq!(spec.expect(&Int::bits(7)).unwrap(), 0b1_0110_01);
    assert_eq!(spec.expect(&Int::bits(6)).unwrap(), 0b01_1111);

    let source = spec.into_source();
    assert_eq!(source.consumed(), 2);
    assert_eq!(source.into_inner().pos, 2);
}

#[test]
fn test_stream_truncation_then_retry_with_smaller_type() {
    let mut spec = Specification::from_reader(Cursor::new(vec![0x12, 0x34]));
    spec.expect(&Int::bits(4)).unwrap();

    assert!(spec.expect(&Int::u16()).unwrap_err().is_truncated());
    assert_eq!(spec.bit_offset(), 4);
    assert_eq!(spec.expect(&Int::bits(12)).unwrap(), 0x234);
    spec.assert_eof().unwrap();
}

/// Reader that times out once after handing out its first byte.
struct StallOnce {
    data: Cursor<Vec<u8>>,
    stalled: bool,
}

impl Read for StallOnce {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.data.position() == 1 && !self.stalled {
            self.stalled = true;
            return Err(std::io::Error::new(ErrorKind::TimedOut, "stalled"));
        }
        let n = buf.len().min(1);
        self.data.read(&mut buf[..n])
    }
}

#[test]
fn test_stream_error_mid_field_then_retry() {
    let reader = StallOnce {
        data: Cursor::new(vec![0x12, 0x34, 0x56]),
        stalled: false,
    };
    let mut spec = Specification::from_reader(reader);

    let err = spec.expect(&Int::u16()).unwrap_err();
    assert!(matches!(err, Error::Io(ref e) if e.kind() == ErrorKind::TimedOut));
    assert_eq!(spec.bit_offset(), 0);

    assert_eq!(spec.expect(&Int::u16()).unwrap(), 0x1234);
    assert_eq!(spec.expect(&Int::u8()).unwrap(), 0x56);
    spec.assert_eof().unwrap();
}

#[test]
fn test_huge_zero_width_array_is_rejected_without_moving() {
    let data = [0x7F];
    let mut spec = Specification::from_bytes(&data);

    let err = spec
        .expect(&Array::new(Int::bits(0), usize::MAX / 2))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSpecType { type_name: "Array", .. }));
    assert_eq!(spec.bit_offset(), 0);
    assert_eq!(spec.expect(&Int::u8()).unwrap(), 0x7F);
}

#[test]
fn test_lsb_first_text_and_tracked_bytes() {
    let data = [0x82, 0b0000_0011, 0x80];
    let mut spec = Specification::from_bytes(&data);
    spec.set_track_bytes(true);

    assert_eq!(spec.expect(&Str::utf8(1).lsb_first()).unwrap(), "A");
    assert_eq!(
        spec.expect(&Bytes::new(2).lsb_first()).unwrap(),
        vec![0x01, 0b1100_0000]
    );
    assert_eq!(spec.tracked_bytes(), &data[..]);
}
