//! Per-type encode/decode primitives and the successor transform.
//!
//! Every encoding here is monotonic under raw byte comparison:
//! - `Int32`/`Int64`: sign-bit flip, then big-endian
//! - `UInt64`: big-endian
//! - `Float64`: IEEE-754 sortable transform (error on NaN)
//! - `String`/`Binary`: raw bytes when last in the key; otherwise 0x00 is
//!   escaped as `0x00 0x01` and the value is terminated by `0x00 0x00`, so a
//!   shorter value can never byte-compare above a longer one that extends it.
//!
//! Dispatch is a plain match over [`KeyType`]/[`KeyValue`]; adding a key type
//! means adding an arm to `encode_value` and `decode_value`.

use bumpalo::Bump;
use bytes::{BufMut, BytesMut};
use uuid::Uuid;

use crate::error::{KeyError, Result};
use crate::schema::{KeyType, KeyValue};

const SIGN32: u32 = 0x8000_0000;
const SIGN64: u64 = 0x8000_0000_0000_0000;

/// Append the order-preserving encoding of `value` to `dst`.
///
/// `is_last` tells variable-width types whether they need their escape and
/// terminator bytes; the last key column encodes minimally because nothing is
/// concatenated after it.
///
/// Returns the number of bytes written. Panics on `Float64(NaN)`, which has no
/// place in a total order.
pub fn encode_value(value: &KeyValue<'_>, is_last: bool, dst: &mut BytesMut) -> usize {
    let start = dst.len();
    match *value {
        KeyValue::Bool(b) => dst.put_u8(b as u8),
        KeyValue::Int32(n) => dst.put_u32((n as u32) ^ SIGN32),
        KeyValue::Int64(n) => dst.put_u64((n as u64) ^ SIGN64),
        KeyValue::UInt64(n) => dst.put_u64(n),
        KeyValue::Float64(x) => {
            if x.is_nan() {
                panic!("NaN is not encodable in a key column");
            }
            let b = x.to_bits();
            let mask = ((b as i64) >> 63) as u64; // all 1s for negative, 0 for non-negative
            let enc = (!b & mask) | ((b ^ SIGN64) & !mask);
            dst.put_u64(enc);
        }
        KeyValue::Uuid(u) => dst.extend_from_slice(u.as_bytes()),
        KeyValue::String(s) => encode_var_bytes(s.as_bytes(), is_last, dst),
        KeyValue::Binary(b) => encode_var_bytes(b, is_last, dst),
    }
    dst.len() - start
}

fn encode_var_bytes(bytes: &[u8], is_last: bool, dst: &mut BytesMut) {
    if is_last {
        dst.extend_from_slice(bytes);
        return;
    }
    dst.reserve(bytes.len() + 2);
    for &b in bytes {
        if b == 0x00 {
            dst.put_u8(0x00);
            dst.put_u8(0x01);
        } else {
            dst.put_u8(b);
        }
    }
    // terminator
    dst.put_u8(0x00);
    dst.put_u8(0x00);
}

/// Decode one column value of type `ty` from the front of `input`.
///
/// Variable-width payloads are copied into `arena` and the returned value
/// borrows from it. Returns the value and the number of input bytes consumed.
pub fn decode_value<'a>(
    ty: KeyType,
    input: &[u8],
    is_last: bool,
    arena: &'a Bump,
) -> Result<(KeyValue<'a>, usize)> {
    match ty {
        KeyType::Bool => {
            let [b] = take::<1>(input, "boolean")?;
            match b {
                0x00 => Ok((KeyValue::Bool(false), 1)),
                0x01 => Ok((KeyValue::Bool(true), 1)),
                other => Err(KeyError::Decode(format!("invalid boolean byte 0x{other:02x}"))),
            }
        }
        KeyType::Int32 => {
            let raw = take::<4>(input, "int32")?;
            let n = (u32::from_be_bytes(raw) ^ SIGN32) as i32;
            Ok((KeyValue::Int32(n), 4))
        }
        KeyType::Int64 => {
            let raw = take::<8>(input, "int64")?;
            let n = (u64::from_be_bytes(raw) ^ SIGN64) as i64;
            Ok((KeyValue::Int64(n), 8))
        }
        KeyType::UInt64 => {
            let raw = take::<8>(input, "uint64")?;
            Ok((KeyValue::UInt64(u64::from_be_bytes(raw)), 8))
        }
        KeyType::Float64 => {
            let raw = take::<8>(input, "float64")?;
            let enc = u64::from_be_bytes(raw);
            let bits = if enc & SIGN64 != 0 { enc ^ SIGN64 } else { !enc };
            Ok((KeyValue::Float64(f64::from_bits(bits)), 8))
        }
        KeyType::Uuid => {
            let raw = take::<16>(input, "uuid")?;
            Ok((KeyValue::Uuid(Uuid::from_bytes(raw)), 16))
        }
        KeyType::String => {
            let (payload, used) = decode_var_bytes(input, is_last, arena)?;
            let s = std::str::from_utf8(payload)
                .map_err(|_| KeyError::Decode("invalid UTF-8 in string column".to_string()))?;
            Ok((KeyValue::String(s), used))
        }
        KeyType::Binary => {
            let (payload, used) = decode_var_bytes(input, is_last, arena)?;
            Ok((KeyValue::Binary(payload), used))
        }
    }
}

fn take<const N: usize>(input: &[u8], what: &str) -> Result<[u8; N]> {
    if input.len() < N {
        return Err(KeyError::Decode(format!(
            "truncated {what}: need {N} bytes, have {}",
            input.len()
        )));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&input[..N]);
    Ok(out)
}

fn decode_var_bytes<'a>(input: &[u8], is_last: bool, arena: &'a Bump) -> Result<(&'a [u8], usize)> {
    if is_last {
        let stored = arena
            .try_alloc_slice_copy(input)
            .map_err(|_| KeyError::OutOfMemory)?;
        return Ok((stored, input.len()));
    }

    let mut unescaped = Vec::new();
    let mut i = 0;
    loop {
        let Some(&b) = input.get(i) else {
            return Err(KeyError::Decode(
                "unterminated variable-length value".to_string(),
            ));
        };
        if b != 0x00 {
            unescaped.push(b);
            i += 1;
            continue;
        }
        match input.get(i + 1) {
            Some(0x00) => break,
            Some(0x01) => {
                unescaped.push(0x00);
                i += 2;
            }
            Some(other) => {
                return Err(KeyError::Decode(format!(
                    "invalid escape byte 0x{other:02x} after 0x00"
                )));
            }
            None => {
                return Err(KeyError::Decode(
                    "truncated escape sequence at end of input".to_string(),
                ));
            }
        }
    }
    let stored = arena
        .try_alloc_slice_copy(&unescaped)
        .map_err(|_| KeyError::OutOfMemory)?;
    Ok((stored, i + 2))
}

/// Advance an encoded key buffer to its immediate lexicographic successor.
///
/// Below `max_len` the minimal strictly-greater byte string is the buffer with
/// a 0x00 appended. At (or beyond) `max_len` the buffer length is pinned:
/// increment the last byte, carrying leftward past 0xFF bytes, which become
/// 0x00. Returns `false` and leaves `buf` untouched when every byte is already
/// 0xFF, meaning no successor exists.
pub fn advance_to_successor(buf: &mut BytesMut, max_len: usize) -> bool {
    if buf.len() < max_len {
        buf.put_u8(0x00);
        return true;
    }
    let Some(pivot) = buf.iter().rposition(|&b| b != 0xFF) else {
        return false;
    };
    buf[pivot] += 1;
    for b in &mut buf[pivot + 1..] {
        *b = 0x00;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &KeyValue<'_>, is_last: bool) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_value(value, is_last, &mut buf);
        buf.to_vec()
    }

    #[test]
    fn should_flip_sign_bit_for_int64() {
        assert_eq!(hex::encode(encode(&KeyValue::Int64(42), true)), "800000000000002a");
        assert_eq!(hex::encode(encode(&KeyValue::Int64(i64::MIN), true)), "0000000000000000");
        assert_eq!(hex::encode(encode(&KeyValue::Int64(i64::MAX), true)), "ffffffffffffffff");
    }

    #[test]
    fn should_order_int32_encodings_numerically() {
        let neg = encode(&KeyValue::Int32(-5), true);
        let zero = encode(&KeyValue::Int32(0), true);
        let pos = encode(&KeyValue::Int32(5), true);
        assert!(neg < zero);
        assert!(zero < pos);
    }

    #[test]
    fn should_order_float_encodings_numerically() {
        // Arrange
        let ordered = [
            f64::NEG_INFINITY,
            -1e308,
            -0.0,
            0.0,
            1.25,
            f64::INFINITY,
        ];

        // Act
        let encoded: Vec<_> = ordered
            .iter()
            .map(|&x| encode(&KeyValue::Float64(x), true))
            .collect();

        // Assert
        for pair in encoded.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn should_escape_interior_zero_bytes_when_not_last() {
        let out = encode(&KeyValue::Binary(&[0x61, 0x00, 0x62]), false);
        assert_eq!(out, vec![0x61, 0x00, 0x01, 0x62, 0x00, 0x00]);
    }

    #[test]
    fn should_encode_last_column_string_without_terminator() {
        let out = encode(&KeyValue::String("x"), true);
        assert_eq!(out, b"x");
    }

    #[test]
    fn should_round_trip_escaped_string() {
        // Arrange
        let arena = Bump::new();
        let encoded = encode(&KeyValue::String("a\0b"), false);

        // Act
        let (value, used) = decode_value(KeyType::String, &encoded, false, &arena).unwrap();

        // Assert
        assert_eq!(value, KeyValue::String("a\0b"));
        assert_eq!(used, encoded.len());
    }

    #[test]
    fn should_reject_invalid_escape_byte() {
        let arena = Bump::new();
        let err = decode_value(KeyType::String, &[0x61, 0x00, 0x7F], false, &arena).unwrap_err();
        assert!(matches!(err, KeyError::Decode(_)));
    }

    #[test]
    fn should_reject_truncated_fixed_width_value() {
        let arena = Bump::new();
        let err = decode_value(KeyType::Int64, &[0x80, 0x00], true, &arena).unwrap_err();
        assert!(matches!(err, KeyError::Decode(_)));
    }

    #[test]
    fn should_reject_invalid_boolean_byte() {
        let arena = Bump::new();
        let err = decode_value(KeyType::Bool, &[0x02], true, &arena).unwrap_err();
        assert!(matches!(err, KeyError::Decode(_)));
    }

    #[test]
    #[should_panic]
    fn should_panic_when_encoding_nan() {
        let mut buf = BytesMut::new();
        let _ = encode_value(&KeyValue::Float64(f64::NAN), true, &mut buf);
    }

    #[test]
    fn should_append_minimum_byte_below_budget() {
        // Arrange
        let mut buf = BytesMut::from(&[0x61u8, 0x62][..]);

        // Act
        let advanced = advance_to_successor(&mut buf, 8);

        // Assert
        assert!(advanced);
        assert_eq!(&buf[..], &[0x61, 0x62, 0x00]);
    }

    #[test]
    fn should_carry_through_max_bytes_at_budget() {
        // Arrange
        let mut buf = BytesMut::from(&[0x61, 0xFF, 0xFF][..]);

        // Act
        let advanced = advance_to_successor(&mut buf, 3);

        // Assert
        assert!(advanced);
        assert_eq!(&buf[..], &[0x62, 0x00, 0x00]);
    }

    #[test]
    fn should_fail_without_mutation_when_all_bytes_are_max() {
        // Arrange
        let mut buf = BytesMut::from(&[0xFFu8; 4][..]);

        // Act
        let advanced = advance_to_successor(&mut buf, 4);

        // Assert
        assert!(!advanced);
        assert_eq!(&buf[..], &[0xFF; 4]);
    }
}
