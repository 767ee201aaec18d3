use serde_json::{Map, Value};
use tracing::debug;

use super::{
    constants::SPKI_HASH_LENGTH,
    cursor::ByteCursor,
    errors::{DecodeError, DecodeResult},
    types::{Certificates, CrlSet, Serial, SpkiHash},
};

/// Header length is stored as two separate bytes, low byte first.
fn read_header_length(cursor: &mut ByteCursor<'_>) -> DecodeResult<usize> {
    let missing =
        |_: DecodeError| DecodeError::MalformedHeader("missing header length".to_string());

    let lo = cursor.take_u8().map_err(missing)? as usize;
    let hi = cursor.take_u8().map_err(missing)? as usize;

    Ok(lo + (hi << 8))
}

fn parse_header(blob: &[u8]) -> DecodeResult<Map<String, Value>> {
    match serde_json::from_slice::<Value>(blob) {
        Ok(Value::Object(header)) => Ok(header),
        Ok(other) => Err(DecodeError::MalformedHeader(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
        Err(err) => Err(DecodeError::MalformedHeader(err.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The serial count is four single bytes, least significant first.
fn read_serial_count(cursor: &mut ByteCursor<'_>) -> DecodeResult<usize> {
    let mut count = 0usize;
    for shift in [0, 8, 16, 24] {
        count += (cursor.take_u8()? as usize) << shift;
    }

    Ok(count)
}

/// Decodes the contents of the `crl-set` archive entry.
///
/// The stream is a little-endian u16 header length, a JSON header of that
/// many bytes, then records of `SPKI hash (32 bytes) | serial count (u32) |
/// serial count x (length u8 | serial)` up to the last byte.
pub fn decode_crl_set(data: &[u8]) -> DecodeResult<CrlSet> {
    let mut cursor = ByteCursor::new(data);

    let header_length = read_header_length(&mut cursor)?;
    if header_length == 0 {
        return Err(DecodeError::MalformedHeader("empty header".to_string()));
    }
    let header = parse_header(cursor.take(header_length)?)?;

    let mut certificates = Certificates::default();
    while cursor.has_more() {
        let spki = SpkiHash::new(cursor.take_array::<SPKI_HASH_LENGTH>()?);
        let serial_count = read_serial_count(&mut cursor)?;

        // Every serial takes at least its length byte.
        let mut serials = Vec::with_capacity(serial_count.min(cursor.remaining()));
        for _ in 0..serial_count {
            let serial_length = cursor.take_u8()? as usize;
            serials.push(Serial::new(cursor.take(serial_length)?));
        }

        certificates.insert(spki, serials);
    }

    debug!(
        header_length,
        spkis = certificates.len(),
        serials = certificates.serial_count(),
        "decoded CRLSet records"
    );

    Ok(CrlSet::new(header, certificates))
}
