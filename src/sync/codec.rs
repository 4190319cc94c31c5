//! Wire format of the weather document.
//!
//! ```text
//! ┌───────┬─────────┬──────┬─────┬───────┬─────┐
//! │ COUNT │ KEY LEN │ KEY  │ TAG │ VALUE │ ... │
//! │ 1B    │ 1B      │ n B  │ 1B  │ var   │     │
//! └───────┴─────────┴──────┴─────┴───────┴─────┘
//! ```
//!
//! Values are little-endian. Strings carry their own one-byte length.
//! Floats travel as raw bits so a round-trip is exact.

use heapless::Vec;

use super::{
    location_from, SyncDocument, KEY_DATETIME, KEY_FORECAST, KEY_LOCATION, KEY_MAXTEMP,
    KEY_MINTEMP,
};
use crate::error::{CodecError, Result};

pub const TAG_STRING: u8 = 0x01;
pub const TAG_INT: u8 = 0x02;
pub const TAG_LONG: u8 = 0x03;
pub const TAG_FLOAT: u8 = 0x04;

/// Upper bound of an encoded document with all five keys.
pub const MAX_DOCUMENT_SIZE: usize = 128;

/// Encoded document bytes.
pub type Encoded = Vec<u8, MAX_DOCUMENT_SIZE>;

/// A decoded value before it is matched against its key.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Value<'a> {
    Str(&'a str),
    Int(i32),
    Long(i64),
    Float(f32),
}

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self.pos + bytes.len();
        let dst = self
            .buf
            .get_mut(self.pos..end)
            .ok_or(CodecError::BufferTooSmall)?;
        dst.copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    fn short_str(&mut self, s: &str) -> Result<()> {
        let len = u8::try_from(s.len()).map_err(|_| CodecError::FieldTooLong)?;
        self.put(&[len])?;
        self.put(s.as_bytes())
    }

    fn entry(&mut self, key: &str, value: Value<'_>) -> Result<()> {
        self.short_str(key)?;
        match value {
            Value::Str(s) => {
                self.put(&[TAG_STRING])?;
                self.short_str(s)
            }
            Value::Int(v) => {
                self.put(&[TAG_INT])?;
                self.put(&v.to_le_bytes())
            }
            Value::Long(v) => {
                self.put(&[TAG_LONG])?;
                self.put(&v.to_le_bytes())
            }
            Value::Float(v) => {
                self.put(&[TAG_FLOAT])?;
                self.put(&v.to_bits().to_le_bytes())
            }
        }
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let bytes = self
            .buf
            .get(self.pos..self.pos + n)
            .ok_or(CodecError::Truncated)?;
        self.pos += n;
        Ok(bytes)
    }

    fn byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn short_str(&mut self) -> Result<&'a str> {
        let len = self.byte()? as usize;
        let bytes = self.take(len)?;
        Ok(core::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?)
    }

    fn value(&mut self) -> Result<Value<'a>> {
        match self.byte()? {
            TAG_STRING => Ok(Value::Str(self.short_str()?)),
            TAG_INT => Ok(Value::Int(i32::from_le_bytes(self.array()?))),
            TAG_LONG => Ok(Value::Long(i64::from_le_bytes(self.array()?))),
            TAG_FLOAT => Ok(Value::Float(f32::from_bits(u32::from_le_bytes(
                self.array()?,
            )))),
            tag => Err(CodecError::UnknownTag(tag).into()),
        }
    }
}

/// Encode `doc` into `buf`, returning the number of bytes written.
pub fn encode_into(doc: &SyncDocument, buf: &mut [u8]) -> Result<usize> {
    let mut w = Writer { buf, pos: 0 };
    w.put(&[doc.len() as u8])?;

    if let Some(location) = &doc.location {
        w.entry(KEY_LOCATION, Value::Str(location.as_str()))?;
    }
    if let Some(datetime) = doc.datetime {
        w.entry(KEY_DATETIME, Value::Long(datetime))?;
    }
    if let Some(forecast) = doc.forecast {
        w.entry(KEY_FORECAST, Value::Int(forecast))?;
    }
    if let Some(max) = doc.max_temp {
        w.entry(KEY_MAXTEMP, Value::Float(max))?;
    }
    if let Some(min) = doc.min_temp {
        w.entry(KEY_MINTEMP, Value::Float(min))?;
    }
    Ok(w.pos)
}

/// Encode `doc` into an owned buffer.
pub fn encode(doc: &SyncDocument) -> Result<Encoded> {
    let mut buf = [0u8; MAX_DOCUMENT_SIZE];
    let len = encode_into(doc, &mut buf)?;
    Ok(Vec::from_slice(&buf[..len]).map_err(|_| CodecError::BufferTooSmall)?)
}

/// Decode a document.
///
/// Unknown keys are skipped. A known key carrying an unexpected type is
/// skipped too, leaving that field absent.
pub fn decode(bytes: &[u8]) -> Result<SyncDocument> {
    let mut r = Reader { buf: bytes, pos: 0 };
    let count = r.byte()?;
    let mut doc = SyncDocument::default();

    for _ in 0..count {
        let key = r.short_str()?;
        let value = r.value()?;
        match (key, value) {
            (KEY_LOCATION, Value::Str(s)) => doc.location = Some(location_from(s)?),
            (KEY_DATETIME, Value::Long(v)) => doc.datetime = Some(v),
            (KEY_FORECAST, Value::Int(v)) => doc.forecast = Some(v),
            (KEY_MAXTEMP, Value::Float(v)) => doc.max_temp = Some(v),
            (KEY_MINTEMP, Value::Float(v)) => doc.min_temp = Some(v),
            (KEY_LOCATION | KEY_DATETIME | KEY_FORECAST | KEY_MAXTEMP | KEY_MINTEMP, _) => {
                warn!("sync document: unexpected value type for {}", key);
            }
            _ => trace!("sync document: skipping unknown key {}", key),
        }
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn full_document_round_trip() {
        let doc = SyncDocument::full("94043", 1000, 800, 25.0, 16.0).unwrap();
        let bytes = encode(&doc).unwrap();
        let back = decode(&bytes).unwrap();

        assert_eq!(back, doc);
        assert_eq!(back.location.as_deref(), Some("94043"));
        assert_eq!(back.datetime, Some(1000));
        assert_eq!(back.forecast, Some(800));
        assert_eq!(back.max_temp.map(f32::to_bits), Some(25.0f32.to_bits()));
        assert_eq!(back.min_temp.map(f32::to_bits), Some(16.0f32.to_bits()));
    }

    #[test]
    fn partial_document_keeps_only_present_keys() {
        let doc = SyncDocument {
            max_temp: Some(30.0),
            ..Default::default()
        };
        let bytes = encode(&doc).unwrap();
        assert_eq!(bytes[0], 1);

        let back = decode(&bytes).unwrap();
        assert_eq!(back.max_temp, Some(30.0));
        assert_eq!(back.forecast, None);
        assert_eq!(back.min_temp, None);
    }

    #[test]
    fn wire_layout_of_single_int() {
        let doc = SyncDocument {
            forecast: Some(800),
            ..Default::default()
        };
        let bytes = encode(&doc).unwrap();
        let mut expected = vec![1u8, 8];
        expected.extend_from_slice(b"FORECAST");
        expected.push(TAG_INT);
        expected.extend_from_slice(&800i32.to_le_bytes());
        assert_eq!(bytes.as_slice(), expected.as_slice());
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let mut bytes = vec![2u8, 4];
        bytes.extend_from_slice(b"WIND");
        bytes.push(TAG_FLOAT);
        bytes.extend_from_slice(&3.5f32.to_bits().to_le_bytes());
        bytes.push(7);
        bytes.extend_from_slice(b"MINTEMP");
        bytes.push(TAG_FLOAT);
        bytes.extend_from_slice(&(-2.0f32).to_bits().to_le_bytes());

        let doc = decode(&bytes).unwrap();
        assert_eq!(doc.min_temp, Some(-2.0));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn mistyped_known_key_is_ignored() {
        // DATETIME sent as a string is dropped rather than misread
        let mut bytes = vec![1u8, 8];
        bytes.extend_from_slice(b"DATETIME");
        bytes.push(TAG_STRING);
        bytes.push(4);
        bytes.extend_from_slice(b"1000");

        let doc = decode(&bytes).unwrap();
        assert_eq!(doc.datetime, None);
    }

    #[test]
    fn truncated_input_is_an_error() {
        let doc = SyncDocument::full("94043", 1000, 800, 25.0, 16.0).unwrap();
        let bytes = encode(&doc).unwrap();
        for cut in [0, 1, 5, bytes.len() - 1] {
            assert_eq!(
                decode(&bytes[..cut]),
                Err(Error::Codec(CodecError::Truncated)),
                "cut at {cut}"
            );
        }
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let mut bytes = vec![1u8, 7];
        bytes.extend_from_slice(b"MAXTEMP");
        bytes.push(0x09);
        assert_eq!(
            decode(&bytes),
            Err(Error::Codec(CodecError::UnknownTag(0x09)))
        );
    }

    #[test]
    fn small_buffer_is_reported() {
        let doc = SyncDocument::full("94043", 1000, 800, 25.0, 16.0).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(
            encode_into(&doc, &mut buf),
            Err(Error::Codec(CodecError::BufferTooSmall))
        );
    }

    #[test]
    fn longest_location_fits() {
        let location = "x".repeat(crate::sync::LOCATION_CAPACITY);
        let doc = SyncDocument::full(&location, i64::MAX, i32::MIN, f32::MAX, f32::MIN).unwrap();
        let bytes = encode(&doc).unwrap();
        assert!(bytes.len() <= MAX_DOCUMENT_SIZE);
        assert_eq!(decode(&bytes).unwrap(), doc);
    }
}
