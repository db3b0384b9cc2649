//! The kJSONB binary encoding.
//!
//! Every value is one type-tag byte followed by a type-specific payload.
//! Lengths and counts are unsigned LEB128 varints; fixed-width payloads
//! are little-endian. The format is the at-rest representation for hosts
//! that store encoded values, so the tag assignments and payload layouts
//! below are frozen.
//!
//! [`encode`] is total; [`decode`] fails closed on truncated input,
//! unknown tags, oversized varints, and payloads that violate a type's
//! invariant. Bytes after the top-level value are ignored.

use uuid::Uuid;

use crate::{
    error::DecodeError,
    value::{BigInt, Decimal128, Duration, Instant, Value},
};

const TAG_NULL: u8 = 0x00;
const TAG_TRUE: u8 = 0x01;
const TAG_FALSE: u8 = 0x02;
// 0x03..=0x06 are reserved for fixed-width integers; the encoder never
// emits them and the decoder rejects them.
const TAG_FLOAT64: u8 = 0x07;
const TAG_STRING: u8 = 0x08;
const TAG_ARRAY: u8 = 0x09;
const TAG_OBJECT: u8 = 0x0A;
const TAG_BIGINT: u8 = 0x0B;
const TAG_DECIMAL128: u8 = 0x0C;
const TAG_UUID: u8 = 0x0D;
const TAG_DATE: u8 = 0x0E;
const TAG_DURATION: u8 = 0x0F;

/// Encodes a value into kJSONB bytes. Total over well-formed values.
#[must_use]
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(&mut out, value);
    out
}

fn encode_into(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => out.push(TAG_NULL),
        Value::Bool(true) => out.push(TAG_TRUE),
        Value::Bool(false) => out.push(TAG_FALSE),
        Value::Number(number) => {
            out.push(TAG_FLOAT64);
            out.extend_from_slice(&number.to_le_bytes());
        }
        Value::String(string) => {
            out.push(TAG_STRING);
            write_varint(out, string.len() as u64);
            out.extend_from_slice(string.as_bytes());
        }
        Value::BigInt(bigint) => {
            out.push(TAG_BIGINT);
            out.push(u8::from(bigint.is_negative()));
            write_varint(out, bigint.digits().len() as u64);
            out.extend_from_slice(bigint.digits().as_bytes());
        }
        Value::Decimal128(decimal) => {
            out.push(TAG_DECIMAL128);
            out.push(u8::from(decimal.is_negative()));
            write_varint(out, zigzag(decimal.exponent()));
            write_varint(out, decimal.digits().len() as u64);
            out.extend_from_slice(decimal.digits().as_bytes());
        }
        Value::Uuid(uuid) => {
            out.push(TAG_UUID);
            out.extend_from_slice(uuid.as_bytes());
        }
        Value::Instant(instant) => {
            out.push(TAG_DATE);
            out.extend_from_slice(&instant.epoch_nanos().to_le_bytes());
            out.extend_from_slice(&instant.tz_offset_minutes().to_le_bytes());
        }
        Value::Duration(duration) => {
            out.push(TAG_DURATION);
            out.extend_from_slice(&duration.years.to_le_bytes());
            out.extend_from_slice(&duration.months.to_le_bytes());
            out.extend_from_slice(&duration.days.to_le_bytes());
            out.extend_from_slice(&duration.hours.to_le_bytes());
            out.extend_from_slice(&duration.minutes.to_le_bytes());
            out.extend_from_slice(&duration.nanoseconds.to_le_bytes());
            out.push(u8::from(duration.negative));
        }
        Value::Array(items) => {
            out.push(TAG_ARRAY);
            write_varint(out, items.len() as u64);
            for item in items {
                encode_into(out, item);
            }
        }
        Value::Object(members) => {
            out.push(TAG_OBJECT);
            write_varint(out, members.len() as u64);
            for (key, value) in members {
                write_varint(out, key.len() as u64);
                out.extend_from_slice(key.as_bytes());
                encode_into(out, value);
            }
        }
    }
}

fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        #[allow(clippy::cast_possible_truncation)]
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Zig-zag maps the exponent so small magnitudes of either sign stay
/// small on the wire.
fn zigzag(exponent: i32) -> u64 {
    let wide = i64::from(exponent);
    if wide < 0 {
        (((-wide) as u64) << 1) | 1
    } else {
        (wide as u64) << 1
    }
}

fn unzigzag(raw: u64) -> Result<i32, DecodeError> {
    let wide = if raw & 1 == 1 {
        -i64::try_from(raw >> 1).map_err(|_| DecodeError::InvalidPayload)?
    } else {
        i64::try_from(raw >> 1).map_err(|_| DecodeError::InvalidPayload)?
    };
    i32::try_from(wide).map_err(|_| DecodeError::InvalidPayload)
}

/// Decodes one value from the front of `bytes`, ignoring anything after
/// it.
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    let mut reader = Reader { bytes, pos: 0 };
    reader.decode_value()
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let byte = *self.bytes.get(self.pos).ok_or(DecodeError::Truncated)?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_slice(&mut self, len: usize) -> Result<&[u8], DecodeError> {
        let end = self.pos.checked_add(len).ok_or(DecodeError::Truncated)?;
        let slice = self.bytes.get(self.pos..end).ok_or(DecodeError::Truncated)?;
        self.pos = end;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let slice = self.read_slice(N)?;
        Ok(slice.try_into().expect("slice length is checked"))
    }

    fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let mut result: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let byte = self.read_byte()?;
            // At shift 63 only the lowest payload bit still fits.
            if shift == 63 && (byte & 0x7f) > 1 {
                return Err(DecodeError::MalformedVarint);
            }
            result |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
            if shift > 63 {
                return Err(DecodeError::MalformedVarint);
            }
        }
    }

    fn read_length(&mut self) -> Result<usize, DecodeError> {
        usize::try_from(self.read_varint()?).map_err(|_| DecodeError::Truncated)
    }

    fn read_string(&mut self) -> Result<String, DecodeError> {
        let len = self.read_length()?;
        let bytes = self.read_slice(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidPayload)
    }

    fn read_sign(&mut self) -> Result<bool, DecodeError> {
        match self.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(DecodeError::InvalidPayload),
        }
    }

    fn read_digits(&mut self) -> Result<&str, DecodeError> {
        let len = self.read_length()?;
        let bytes = self.read_slice(len)?;
        if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(DecodeError::InvalidPayload);
        }
        Ok(std::str::from_utf8(bytes).expect("ASCII digits are valid UTF-8"))
    }

    fn decode_value(&mut self) -> Result<Value, DecodeError> {
        match self.read_byte()? {
            TAG_NULL => Ok(Value::Null),
            TAG_TRUE => Ok(Value::Bool(true)),
            TAG_FALSE => Ok(Value::Bool(false)),
            TAG_FLOAT64 => Ok(Value::Number(f64::from_le_bytes(self.read_array()?))),
            TAG_STRING => Ok(Value::String(self.read_string()?)),
            TAG_BIGINT => {
                let negative = self.read_sign()?;
                let digits = self.read_digits()?;
                Ok(Value::BigInt(BigInt::new(negative, digits)))
            }
            TAG_DECIMAL128 => {
                let negative = self.read_sign()?;
                let exponent = unzigzag(self.read_varint()?)?;
                let digits = self.read_digits()?;
                Ok(Value::Decimal128(Decimal128::new(
                    negative, exponent, digits,
                )))
            }
            TAG_UUID => Ok(Value::Uuid(Uuid::from_bytes(self.read_array()?))),
            TAG_DATE => {
                let nanoseconds = i64::from_le_bytes(self.read_array()?);
                let tz_offset = i16::from_le_bytes(self.read_array()?);
                Ok(Value::Instant(Instant::with_tz_offset(
                    nanoseconds,
                    tz_offset,
                )))
            }
            TAG_DURATION => {
                let years = i32::from_le_bytes(self.read_array()?);
                let months = i32::from_le_bytes(self.read_array()?);
                let days = i32::from_le_bytes(self.read_array()?);
                let hours = i32::from_le_bytes(self.read_array()?);
                let minutes = i32::from_le_bytes(self.read_array()?);
                let nanoseconds = i64::from_le_bytes(self.read_array()?);
                let negative = self.read_byte()? != 0;
                // Components are magnitudes; the sign lives in the flag
                // byte, like BigInt's sign byte.
                if years < 0 || months < 0 || days < 0 || hours < 0 || minutes < 0
                    || nanoseconds < 0
                {
                    return Err(DecodeError::InvalidPayload);
                }
                Ok(Value::Duration(Duration {
                    years,
                    months,
                    days,
                    hours,
                    minutes,
                    nanoseconds,
                    negative,
                }))
            }
            TAG_ARRAY => {
                let count = self.read_length()?;
                // Count comes from untrusted input, so capacity is grown
                // by pushing rather than reserved up front.
                let mut items = Vec::new();
                for _ in 0..count {
                    items.push(self.decode_value()?);
                }
                Ok(Value::Array(items))
            }
            TAG_OBJECT => {
                let count = self.read_length()?;
                let mut members = Vec::new();
                for _ in 0..count {
                    let key = self.read_string()?;
                    let value = self.decode_value()?;
                    members.push((key, value));
                }
                Ok(Value::Object(members))
            }
            tag => Err(DecodeError::InvalidTag(tag)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use test_case::test_case;

    #[test_case("null")]
    #[test_case("true")]
    #[test_case("false")]
    #[test_case("42.5")]
    #[test_case("\"hello\"")]
    #[test_case("123456789012345678901234567890n")]
    #[test_case("-99.99m")]
    #[test_case("550e8400-e29b-41d4-a716-446655440000")]
    #[test_case("2025-01-15T10:30:00.123456789Z")]
    #[test_case("-P1Y2M3DT4H5M6.5S")]
    #[test_case("[1,\"x\",null]")]
    #[test_case("{a:1,b:[true,{c:2n}]}")]
    fn roundtrip(text: &str) {
        let value = parse(text).unwrap();
        assert_eq!(decode(&encode(&value)).unwrap(), value);
    }

    #[test]
    fn roundtrip_preserves_tz_offset() {
        let value = parse("2025-01-15T10:30:00+05:30").unwrap();
        let decoded = decode(&encode(&value)).unwrap();
        assert_eq!(decoded.as_instant().unwrap().tz_offset_minutes(), 330);
    }

    #[test]
    fn deep_nesting_roundtrips() {
        let mut value = Value::Number(1.0);
        for _ in 0..12 {
            value = Value::Array(vec![value]);
        }
        assert_eq!(decode(&encode(&value)).unwrap(), value);
    }

    #[test]
    fn empty_input_is_truncated() {
        assert_eq!(decode(&[]), Err(DecodeError::Truncated));
    }

    #[test]
    fn truncated_payload() {
        let mut bytes = encode(&parse("\"hello\"").unwrap());
        bytes.truncate(bytes.len() - 1);
        assert_eq!(decode(&bytes), Err(DecodeError::Truncated));
    }

    #[test]
    fn truncated_varint() {
        // String tag followed by an unterminated varint.
        assert_eq!(decode(&[TAG_STRING, 0x80]), Err(DecodeError::Truncated));
    }

    #[test]
    fn varint_overflow_is_rejected() {
        let mut bytes = vec![TAG_STRING];
        bytes.extend_from_slice(&[0xFF; 10]);
        bytes.push(0x01);
        assert_eq!(decode(&bytes), Err(DecodeError::MalformedVarint));
    }

    #[test]
    fn varint_max_value_decodes() {
        let mut bytes = Vec::new();
        write_varint(&mut bytes, u64::MAX);
        let mut reader = Reader {
            bytes: &bytes,
            pos: 0,
        };
        assert_eq!(reader.read_varint(), Ok(u64::MAX));
    }

    #[test_case(0x03)]
    #[test_case(0x04)]
    #[test_case(0x05)]
    #[test_case(0x06)]
    #[test_case(0x10)]
    #[test_case(0xFF)]
    fn unknown_and_reserved_tags_are_rejected(tag: u8) {
        assert_eq!(decode(&[tag]), Err(DecodeError::InvalidTag(tag)));
    }

    #[test]
    fn invalid_utf8_string_payload() {
        let bytes = [TAG_STRING, 0x02, 0xFF, 0xFE];
        assert_eq!(decode(&bytes), Err(DecodeError::InvalidPayload));
    }

    #[test]
    fn negative_duration_components_are_rejected() {
        // Minutes of -5 next to the separate sign flag would stringify as
        // `PT-5M`, which the parser does not accept.
        let mut bytes = vec![TAG_DURATION];
        for component in [0_i32, 0, 0, 0, -5] {
            bytes.extend_from_slice(&component.to_le_bytes());
        }
        bytes.extend_from_slice(&0_i64.to_le_bytes());
        bytes.push(0);
        assert_eq!(decode(&bytes), Err(DecodeError::InvalidPayload));
    }

    #[test]
    fn negative_duration_nanoseconds_are_rejected() {
        let mut bytes = vec![TAG_DURATION];
        bytes.extend_from_slice(&[0; 20]);
        bytes.extend_from_slice(&(-1_i64).to_le_bytes());
        bytes.push(1);
        assert_eq!(decode(&bytes), Err(DecodeError::InvalidPayload));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut bytes = encode(&Value::Bool(true));
        bytes.extend_from_slice(b"junk");
        assert_eq!(decode(&bytes).unwrap(), Value::Bool(true));
    }

    #[test_case(0, 0)]
    #[test_case(-1, 3)]
    #[test_case(1, 2)]
    #[test_case(-2, 5)]
    #[test_case(i32::MIN, 4_294_967_297)]
    fn zigzag_mapping(exponent: i32, expected: u64) {
        assert_eq!(zigzag(exponent), expected);
        assert_eq!(unzigzag(expected), Ok(exponent));
    }
}
