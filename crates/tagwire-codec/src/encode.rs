//! Record-to-wire encoding.
//!
//! Encoding runs in two passes: a sizing pass computes the exact byte count,
//! then a single allocation is filled back to front. Writing tail-first
//! means every nested record's length is already known when its prefix is
//! written, so nothing is memoized and nothing reallocates. The filled
//! buffer reads front to back in ascending field-number order with repeated
//! occurrences in insertion order.

use tagwire_types::fixed::{write_u32_le, write_u64_le};
use tagwire_types::varint::{varint_len, write_varint, zigzag_encode};
use tagwire_types::{AnyRecord, Record, Tag, Value};

use crate::any;

/// Exact encoded size of a record, without encoding it.
#[must_use]
pub fn encoded_size(record: &Record) -> usize {
    record
        .iter()
        .map(|(descriptor, values)| {
            let tag_len =
                Tag::new(descriptor.number(), descriptor.kind().wire_type()).encoded_len();
            values
                .iter()
                .map(|value| tag_len + value_size(value))
                .sum::<usize>()
        })
        .sum()
}

/// Encode a record into freshly allocated bytes.
///
/// Set fields always encode, zero values included, so presence survives a
/// roundtrip. Record mutation already validated every value against the
/// schema, which is why encoding cannot fail.
#[must_use]
pub fn encode(record: &Record) -> Vec<u8> {
    let mut buf = vec![0u8; encoded_size(record)];
    let start = write_record(&mut buf, record);
    debug_assert_eq!(start, 0, "sizing pass and write pass disagree");
    buf
}

fn value_size(value: &Value) -> usize {
    match value {
        Value::Uint64(v) => varint_len(*v),
        Value::Sint64(v) => varint_len(zigzag_encode(*v)),
        Value::Bool(_) => 1,
        Value::Fixed64(_) => 8,
        Value::Fixed32(_) => 4,
        Value::Str(s) => delimited_size(s.len()),
        Value::Bytes(b) => delimited_size(b.len()),
        Value::Record(nested) => delimited_size(encoded_size(nested)),
        Value::Any(wrapped) => delimited_size(any_size(wrapped)),
    }
}

/// Size of a length-delimited payload including its length prefix.
fn delimited_size(len: usize) -> usize {
    varint_len(len as u64) + len
}

fn any_size(wrapped: &AnyRecord) -> usize {
    let mut size = 0;
    if !wrapped.type_id.is_empty() {
        size += 1 + delimited_size(wrapped.type_id.len());
    }
    let body = encoded_size(&wrapped.record);
    if body > 0 {
        size += 1 + delimited_size(body);
    }
    size
}

/// Write `record` into the tail of `buf`, returning the start index of the
/// written bytes. Fields go down in descending number order, occurrences in
/// reverse, so the finished buffer reads ascending.
fn write_record(buf: &mut [u8], record: &Record) -> usize {
    let mut pos = buf.len();
    for (descriptor, values) in record.iter().rev() {
        let tag = Tag::new(descriptor.number(), descriptor.kind().wire_type()).pack();
        for value in values.iter().rev() {
            pos = write_value(buf, pos, value);
            pos = put_varint(buf, pos, tag);
        }
    }
    pos
}

fn write_value(buf: &mut [u8], pos: usize, value: &Value) -> usize {
    match value {
        Value::Uint64(v) => put_varint(buf, pos, *v),
        Value::Sint64(v) => put_varint(buf, pos, zigzag_encode(*v)),
        Value::Bool(v) => put_varint(buf, pos, u64::from(*v)),
        Value::Fixed64(v) => {
            let pos = pos - 8;
            write_u64_le(&mut buf[pos..], *v);
            pos
        }
        Value::Fixed32(v) => {
            let pos = pos - 4;
            write_u32_le(&mut buf[pos..], *v);
            pos
        }
        Value::Str(s) => put_delimited(buf, pos, s.as_bytes()),
        Value::Bytes(b) => put_delimited(buf, pos, b),
        Value::Record(nested) => {
            let end = pos;
            let start = write_record(&mut buf[..end], nested);
            put_varint(buf, start, (end - start) as u64)
        }
        Value::Any(wrapped) => write_any(buf, pos, wrapped),
    }
}

/// Write a varint ending at `pos`, returning its start.
fn put_varint(buf: &mut [u8], pos: usize, value: u64) -> usize {
    let pos = pos - varint_len(value);
    write_varint(&mut buf[pos..], value);
    pos
}

/// Write a length-prefixed payload ending at `pos`, returning its start.
fn put_delimited(buf: &mut [u8], pos: usize, payload: &[u8]) -> usize {
    let pos = pos - payload.len();
    buf[pos..pos + payload.len()].copy_from_slice(payload);
    put_varint(buf, pos, payload.len() as u64)
}

/// Write a capability wrapper ending at `pos`, its own length prefix
/// included. Empty components are omitted, mirroring [`any::pack_any`].
fn write_any(buf: &mut [u8], pos: usize, wrapped: &AnyRecord) -> usize {
    let end = pos;
    let body_start = write_record(&mut buf[..end], &wrapped.record);
    let mut pos = body_start;
    if body_start < end {
        pos = put_varint(buf, body_start, (end - body_start) as u64);
        pos = put_varint(buf, pos, any::VALUE_TAG);
    }
    if !wrapped.type_id.is_empty() {
        pos = put_delimited(buf, pos, wrapped.type_id.as_bytes());
        pos = put_varint(buf, pos, any::TYPE_ID_TAG);
    }
    put_varint(buf, pos, (end - pos) as u64)
}
