//! Capability wrapper framing.
//!
//! A capability value travels as a two-field envelope: field 1 carries the
//! type identifier string, field 2 the encoded payload bytes. The envelope
//! is itself an ordinary length-delimited message, so writers that know
//! nothing about the capability can still carry the bytes around intact.

use tagwire_error::{Result, WireError};
use tagwire_types::limits::MAX_VARINT_LEN;
use tagwire_types::varint::{read_varint, varint_len, write_varint};
use tagwire_types::{AnyRecord, Tag, WireType};

use crate::decode::read_length_delimited;
use crate::encode::encode;
use crate::skip::skip_value;

/// Packed tag of the type identifier field: field 1, length-delimited.
pub(crate) const TYPE_ID_TAG: u64 = 0x0A;
/// Packed tag of the payload field: field 2, length-delimited.
pub(crate) const VALUE_TAG: u64 = 0x12;

/// Build wrapper bytes from a type identifier and an already-encoded
/// payload. Empty components are omitted, matching what [`unpack_any`]
/// defaults them to.
#[must_use]
pub fn pack_any(type_id: &str, value: &[u8]) -> Vec<u8> {
    let mut size = 0;
    if !type_id.is_empty() {
        size += 1 + varint_len(type_id.len() as u64) + type_id.len();
    }
    if !value.is_empty() {
        size += 1 + varint_len(value.len() as u64) + value.len();
    }
    let mut buf = Vec::with_capacity(size);
    if !type_id.is_empty() {
        push_varint(&mut buf, TYPE_ID_TAG);
        push_varint(&mut buf, type_id.len() as u64);
        buf.extend_from_slice(type_id.as_bytes());
    }
    if !value.is_empty() {
        push_varint(&mut buf, VALUE_TAG);
        push_varint(&mut buf, value.len() as u64);
        buf.extend_from_slice(value);
    }
    buf
}

/// Encode a capability value: the record's bytes inside wrapper framing.
#[must_use]
pub fn encode_any(wrapped: &AnyRecord) -> Vec<u8> {
    pack_any(&wrapped.type_id, &encode(&wrapped.record))
}

/// Split wrapper bytes back into the type identifier and payload.
///
/// Tolerant on the way in: unknown fields are skipped, duplicate fields
/// keep the last occurrence, missing fields come back empty. Fields 1 and
/// 2 arriving with a wire type other than length-delimited are corruption
/// and fail with [`WireError::WireTypeMismatch`].
pub fn unpack_any(buf: &[u8]) -> Result<(String, Vec<u8>)> {
    let mut type_id = String::new();
    let mut value = Vec::new();
    let mut pos = 0;
    while pos < buf.len() {
        let (raw, n) = read_varint(&buf[pos..])?;
        pos += n;
        let tag = Tag::unpack(raw)?;
        match (tag.number().get(), tag.wire_type()) {
            (1, WireType::LengthDelimited) => {
                let (payload, n) = read_length_delimited(&buf[pos..])?;
                pos += n;
                type_id = std::str::from_utf8(payload)
                    .map_err(|_| WireError::InvalidUtf8 { field: 1 })?
                    .to_owned();
            }
            (2, WireType::LengthDelimited) => {
                let (payload, n) = read_length_delimited(&buf[pos..])?;
                pos += n;
                value = payload.to_vec();
            }
            (number @ (1 | 2), found) => {
                return Err(WireError::WireTypeMismatch {
                    field: number,
                    expected: WireType::LengthDelimited.name(),
                    found: found.name(),
                });
            }
            (_, WireType::EndGroup) => return Err(WireError::UnmatchedEndGroup),
            (number, found) => {
                pos = skip_value(buf, pos, found).map_err(|e| e.at_field(number))?;
            }
        }
    }
    Ok((type_id, value))
}

fn push_varint(buf: &mut Vec<u8>, value: u64) {
    let mut scratch = [0u8; MAX_VARINT_LEN];
    let n = write_varint(&mut scratch, value);
    buf.extend_from_slice(&scratch[..n]);
}
