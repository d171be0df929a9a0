//! Wire-to-record decoding.
//!
//! Decoding is schema-directed. Each tag read from the buffer is matched
//! against the record's schema: known fields parse by their declared kind,
//! unknown fields are skipped whole. A singular field seen twice keeps the
//! last occurrence; repeated fields accumulate in wire order. Errors carry
//! the innermost offending field number where one is known.

use std::sync::Arc;

use tagwire_error::{Result, WireError};
use tagwire_types::fixed::{read_u32_le, read_u64_le};
use tagwire_types::limits::RECURSION_LIMIT;
use tagwire_types::varint::{read_varint, zigzag_decode};
use tagwire_types::{AnyRecord, FieldKind, Label, MessageSchema, Record, Tag, Value, WireType};

use crate::any::unpack_any;
use crate::skip::skip_value;

/// Resolves a capability's type identifier to a concrete message schema.
///
/// Capability fields name an interface, not a message, so their payload
/// travels with a type identifier and the decoder needs a lookup the codec
/// itself cannot provide. Registries implement this trait; [`NoResolver`]
/// serves buffers known to be capability-free.
pub trait SchemaResolver {
    /// Look up the schema registered for `type_id` under `capability`.
    fn resolve_schema(&self, capability: &str, type_id: &str) -> Result<Arc<MessageSchema>>;
}

/// A [`SchemaResolver`] for decoding without a registry. Every capability
/// lookup fails with [`WireError::UnknownImplementation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl SchemaResolver for NoResolver {
    fn resolve_schema(&self, capability: &str, type_id: &str) -> Result<Arc<MessageSchema>> {
        Err(WireError::unknown_implementation(capability, type_id))
    }
}

/// Read one length-delimited payload: a varint length followed by that many
/// bytes. Returns the payload and the total bytes consumed.
///
/// A length with the sign bit set is corruption from a writer counting in
/// signed 64-bit, reported as [`WireError::NegativeLength`] rather than as
/// truncation.
pub fn read_length_delimited(buf: &[u8]) -> Result<(&[u8], usize)> {
    let (len, prefix) = read_varint(buf)?;
    if len > i64::MAX as u64 {
        return Err(WireError::NegativeLength { length: len });
    }
    let remaining = buf.len() - prefix;
    if len > remaining as u64 {
        return Err(WireError::Truncated {
            needed: len,
            remaining,
        });
    }
    #[allow(clippy::cast_possible_truncation)]
    let len = len as usize;
    Ok((&buf[prefix..prefix + len], prefix + len))
}

/// Decode `buf` as one record of `schema`.
///
/// The buffer must hold exactly one record; trailing garbage that parses as
/// tags is treated as fields. Capability fields resolve their concrete
/// schema through `resolver`. Nesting deeper than
/// [`RECURSION_LIMIT`] levels fails rather than recursing further.
pub fn decode(
    schema: &Arc<MessageSchema>,
    buf: &[u8],
    resolver: &dyn SchemaResolver,
) -> Result<Record> {
    decode_message(schema, buf, resolver, 0)
}

fn decode_message(
    schema: &Arc<MessageSchema>,
    buf: &[u8],
    resolver: &dyn SchemaResolver,
    depth: usize,
) -> Result<Record> {
    if depth >= RECURSION_LIMIT {
        return Err(WireError::RecursionLimitExceeded {
            limit: RECURSION_LIMIT,
        });
    }
    let mut record = Record::new(Arc::clone(schema));
    let mut pos = 0;
    while pos < buf.len() {
        let (raw, n) = read_varint(&buf[pos..])?;
        pos += n;
        let tag = Tag::unpack(raw)?;
        if tag.wire_type() == WireType::EndGroup {
            return Err(WireError::UnmatchedEndGroup);
        }
        let number = tag.number().get();
        let Some(descriptor) = schema.field(number) else {
            pos = skip_value(buf, pos, tag.wire_type()).map_err(|e| e.at_field(number))?;
            continue;
        };
        let expected = descriptor.kind().wire_type();
        if tag.wire_type() != expected {
            return Err(WireError::WireTypeMismatch {
                field: number,
                expected: expected.name(),
                found: tag.wire_type().name(),
            });
        }
        let (value, consumed) =
            decode_value(descriptor.kind(), number, &buf[pos..], resolver, depth)
                .map_err(|e| e.at_field(number))?;
        pos += consumed;
        match descriptor.label() {
            Label::Singular => record.set(number, value)?,
            Label::Repeated => record.push(number, value)?,
        }
    }
    Ok(record)
}

/// Parse one payload of `kind` from the front of `buf`. The tag has already
/// been consumed and its wire type checked against the kind.
fn decode_value(
    kind: &FieldKind,
    number: u32,
    buf: &[u8],
    resolver: &dyn SchemaResolver,
    depth: usize,
) -> Result<(Value, usize)> {
    match kind {
        FieldKind::Uint64 => {
            let (v, n) = read_varint(buf)?;
            Ok((Value::Uint64(v), n))
        }
        FieldKind::Sint64 => {
            let (v, n) = read_varint(buf)?;
            Ok((Value::Sint64(zigzag_decode(v)), n))
        }
        FieldKind::Bool => {
            // Any nonzero varint reads as true.
            let (v, n) = read_varint(buf)?;
            Ok((Value::Bool(v != 0), n))
        }
        FieldKind::Fixed64 => Ok((Value::Fixed64(read_u64_le(buf)?), 8)),
        FieldKind::Fixed32 => Ok((Value::Fixed32(read_u32_le(buf)?), 4)),
        FieldKind::String => {
            let (payload, n) = read_length_delimited(buf)?;
            let text = std::str::from_utf8(payload)
                .map_err(|_| WireError::InvalidUtf8 { field: number })?;
            Ok((Value::Str(text.to_owned()), n))
        }
        FieldKind::Bytes => {
            let (payload, n) = read_length_delimited(buf)?;
            Ok((Value::Bytes(payload.to_vec()), n))
        }
        FieldKind::Message(nested) => {
            let (payload, n) = read_length_delimited(buf)?;
            let record = decode_message(nested, payload, resolver, depth + 1)?;
            Ok((Value::Record(record), n))
        }
        FieldKind::Capability(capability) => {
            let (payload, n) = read_length_delimited(buf)?;
            let (type_id, body) = unpack_any(payload)?;
            let schema = resolver.resolve_schema(capability, &type_id)?;
            let record = decode_message(&schema, &body, resolver, depth + 1)?;
            Ok((Value::Any(AnyRecord::new(type_id, record)), n))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tagwire_types::FieldDescriptor;
    use tagwire_types::varint::write_varint;

    use super::*;
    use crate::encode::encode;

    fn account_schema() -> Arc<MessageSchema> {
        MessageSchema::builder("bank.Account")
            .field(1, "addresses", Label::Repeated, FieldKind::String)
            .field(2, "sequence", Label::Singular, FieldKind::Uint64)
            .field(3, "frozen", Label::Singular, FieldKind::Bool)
            .field(4, "delta", Label::Singular, FieldKind::Sint64)
            .field(5, "checksum", Label::Singular, FieldKind::Fixed32)
            .build()
            .expect("valid schema")
    }

    fn envelope_schema() -> Arc<MessageSchema> {
        MessageSchema::builder("bank.Envelope")
            .field(1, "account", Label::Singular, FieldKind::Message(account_schema()))
            .field(2, "note", Label::Singular, FieldKind::String)
            .build()
            .expect("valid schema")
    }

    /// Resolver over a fixed capability table, for tests that decode
    /// capability fields without a full registry.
    struct MapResolver(HashMap<(String, String), Arc<MessageSchema>>);

    impl MapResolver {
        fn with(capability: &str, type_id: &str, schema: Arc<MessageSchema>) -> Self {
            let mut table = HashMap::new();
            table.insert((capability.to_owned(), type_id.to_owned()), schema);
            Self(table)
        }
    }

    impl SchemaResolver for MapResolver {
        fn resolve_schema(&self, capability: &str, type_id: &str) -> Result<Arc<MessageSchema>> {
            self.0
                .get(&(capability.to_owned(), type_id.to_owned()))
                .cloned()
                .ok_or_else(|| WireError::unknown_implementation(capability, type_id))
        }
    }

    #[test]
    fn decodes_scalar_fields() {
        // field 2 = 300, field 3 = true.
        let buf = [0x10, 0xAC, 0x02, 0x18, 0x01];
        let record = decode(&account_schema(), &buf, &NoResolver).expect("decode");
        assert_eq!(record.get(2), Some(&Value::Uint64(300)));
        assert_eq!(record.get(3), Some(&Value::Bool(true)));
        assert!(!record.has(1));
    }

    #[test]
    fn empty_buffer_decodes_to_empty_record() {
        let record = decode(&account_schema(), &[], &NoResolver).expect("decode");
        assert!(record.is_empty());
    }

    #[test]
    fn repeated_field_accumulates_in_wire_order() {
        let buf = [
            0x0A, 0x05, b'a', b'd', b'd', b'r', b'1', // addresses[0]
            0x0A, 0x05, b'a', b'd', b'd', b'r', b'2', // addresses[1]
        ];
        let record = decode(&account_schema(), &buf, &NoResolver).expect("decode");
        assert_eq!(
            record.get_repeated(1),
            &[Value::from("addr1"), Value::from("addr2")]
        );
    }

    #[test]
    fn duplicate_singular_field_keeps_last() {
        // field 2 = 1, then field 2 = 2. Replacement, not merge.
        let buf = [0x10, 0x01, 0x10, 0x02];
        let record = decode(&account_schema(), &buf, &NoResolver).expect("decode");
        assert_eq!(record.get(2), Some(&Value::Uint64(2)));
    }

    #[test]
    fn zero_values_are_present_after_decode() {
        let buf = [0x10, 0x00, 0x18, 0x00];
        let record = decode(&account_schema(), &buf, &NoResolver).expect("decode");
        assert_eq!(record.get(2), Some(&Value::Uint64(0)));
        assert_eq!(record.get(3), Some(&Value::Bool(false)));
    }

    #[test]
    fn nonzero_bool_is_true() {
        let buf = [0x18, 0x2A];
        let record = decode(&account_schema(), &buf, &NoResolver).expect("decode");
        assert_eq!(record.get(3), Some(&Value::Bool(true)));
    }

    #[test]
    fn sint_field_zigzag_decodes() {
        // zigzag(-3) = 5.
        let buf = [0x20, 0x05];
        let record = decode(&account_schema(), &buf, &NoResolver).expect("decode");
        assert_eq!(record.get(4), Some(&Value::Sint64(-3)));
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let buf = [
            0x50, 0x96, 0x01, // field 10, varint
            0x5A, 0x02, 0xAB, 0xCD, // field 11, length-delimited
            0x65, 0x01, 0x00, 0x00, 0x00, // field 12, fixed32
            0x10, 0x07, // known field 2 = 7
        ];
        let record = decode(&account_schema(), &buf, &NoResolver).expect("decode");
        assert_eq!(record.get(2), Some(&Value::Uint64(7)));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn unknown_group_is_skipped() {
        let buf = [
            0x53, // field 10, start-group
            0x08, 0x05, // interior field 1, varint
            0x54, // field 10, end-group
            0x10, 0x09, // known field 2 = 9
        ];
        let record = decode(&account_schema(), &buf, &NoResolver).expect("decode");
        assert_eq!(record.get(2), Some(&Value::Uint64(9)));
    }

    #[test]
    fn nested_message_decodes() {
        let mut inner = Record::new(account_schema());
        inner.set(2, Value::Uint64(12)).expect("set");
        let mut outer = Record::new(envelope_schema());
        outer.set(1, Value::Record(inner.clone())).expect("set");
        outer.set(2, Value::from("hello")).expect("set");

        let buf = encode(&outer);
        let decoded = decode(&envelope_schema(), &buf, &NoResolver).expect("decode");
        assert_eq!(decoded, outer);
        let nested = decoded.get(1).and_then(Value::as_record).expect("nested");
        assert_eq!(nested.get(2), Some(&Value::Uint64(12)));
    }

    #[test]
    fn wire_type_mismatch_is_rejected() {
        // field 2 declared varint, arrives length-delimited. This is also
        // what a packed repeated encoding looks like, and it is refused.
        let buf = [0x12, 0x01, 0x00];
        let err = decode(&account_schema(), &buf, &NoResolver).expect_err("mismatch");
        assert!(matches!(
            err,
            WireError::WireTypeMismatch {
                field: 2,
                expected: "varint",
                found: "length-delimited",
            }
        ));
    }

    #[test]
    fn end_group_at_record_level_is_rejected() {
        let buf = [0x0C];
        assert!(matches!(
            decode(&account_schema(), &buf, &NoResolver),
            Err(WireError::UnmatchedEndGroup)
        ));
    }

    #[test]
    fn invalid_utf8_reports_field() {
        let buf = [0x0A, 0x02, 0xC3, 0x28];
        let err = decode(&account_schema(), &buf, &NoResolver).expect_err("bad utf-8");
        assert!(matches!(err, WireError::InvalidUtf8 { field: 1 }));
    }

    #[test]
    fn truncated_payload_reports_field() {
        // field 2's varint payload is missing entirely.
        let buf = [0x10];
        let err = decode(&account_schema(), &buf, &NoResolver).expect_err("truncated");
        assert_eq!(err.field(), Some(2));
        assert!(err.is_malformed_input());
    }

    #[test]
    fn oversized_length_reports_needed_and_remaining() {
        // note claims 100 bytes, only 1 follows.
        let buf = [0x12, 0x64, 0x00];
        let err = decode(&envelope_schema(), &buf, &NoResolver).expect_err("truncated");
        match err {
            WireError::InField { field, source } => {
                assert_eq!(field, 2);
                assert!(matches!(
                    *source,
                    WireError::Truncated {
                        needed: 100,
                        remaining: 1,
                    }
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_length_is_rejected() {
        // Length varint with the sign bit set: 0xFF x9 + 0x01 = u64::MAX.
        let buf = [
            0x12, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01,
        ];
        let err = decode(&envelope_schema(), &buf, &NoResolver).expect_err("negative");
        assert_eq!(err.field(), Some(2));
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(
            source.to_string(),
            format!("length prefix {} overflows the signed range", u64::MAX)
        );
    }

    #[test]
    fn recursion_limit_caps_nesting() {
        // A chain of single-field message schemas, each wrapping the next.
        let mut schema = MessageSchema::builder("test.Node")
            .field(1, "next", Label::Singular, FieldKind::Uint64)
            .build()
            .expect("valid schema");
        for _ in 0..RECURSION_LIMIT {
            schema = MessageSchema::builder("test.Node")
                .field(1, "next", Label::Singular, FieldKind::Message(schema))
                .build()
                .expect("valid schema");
        }

        // Bytes nested just as deep: the innermost payload is entered at
        // depth RECURSION_LIMIT, which is one level too many.
        let mut buf: Vec<u8> = Vec::new();
        for _ in 0..RECURSION_LIMIT {
            let mut wrapped = Vec::with_capacity(buf.len() + 3);
            wrapped.push(0x0A);
            let mut scratch = [0u8; 10];
            let n = write_varint(&mut scratch, buf.len() as u64);
            wrapped.extend_from_slice(&scratch[..n]);
            wrapped.extend_from_slice(&buf);
            buf = wrapped;
        }

        let err = decode(&schema, &buf, &NoResolver).expect_err("too deep");
        assert_eq!(err.field(), Some(1));
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "message nesting exceeds depth limit 100");

        // One level shallower decodes fine.
        let (inner, _) = read_length_delimited(&buf[1..]).expect("outer payload");
        let inner_schema = match schema.field(1).map(FieldDescriptor::kind) {
            Some(FieldKind::Message(next)) => Arc::clone(next),
            _ => panic!("chain schema has a message field"),
        };
        assert!(decode(&inner_schema, inner, &NoResolver).is_ok());
    }

    #[test]
    fn capability_field_resolves_through_resolver() {
        let nft = MessageSchema::builder("nft.BaseNFT")
            .field(1, "id", Label::Singular, FieldKind::String)
            .build()
            .expect("valid schema");
        let holder = MessageSchema::builder("nft.Holder")
            .field(1, "token", Label::Singular, FieldKind::Capability("NFT".into()))
            .build()
            .expect("valid schema");

        let mut token = Record::new(Arc::clone(&nft));
        token.set(1, Value::from("id1")).expect("set");
        let mut outer = Record::new(Arc::clone(&holder));
        outer
            .set(1, Value::Any(AnyRecord::new("/nft.BaseNFT", token.clone())))
            .expect("set");

        let buf = encode(&outer);
        let resolver = MapResolver::with("NFT", "/nft.BaseNFT", Arc::clone(&nft));
        let decoded = decode(&holder, &buf, &resolver).expect("decode");
        assert_eq!(decoded, outer);
        let any = decoded.get(1).and_then(Value::as_any).expect("any");
        assert_eq!(any.type_id, "/nft.BaseNFT");
        assert_eq!(any.record.get(1), Some(&Value::from("id1")));
    }

    #[test]
    fn capability_field_without_resolver_fails() {
        let nft = MessageSchema::builder("nft.BaseNFT")
            .field(1, "id", Label::Singular, FieldKind::String)
            .build()
            .expect("valid schema");
        let holder = MessageSchema::builder("nft.Holder")
            .field(1, "token", Label::Singular, FieldKind::Capability("NFT".into()))
            .build()
            .expect("valid schema");

        let mut token = Record::new(nft);
        token.set(1, Value::from("id1")).expect("set");
        let mut outer = Record::new(Arc::clone(&holder));
        outer
            .set(1, Value::Any(AnyRecord::new("/nft.BaseNFT", token)))
            .expect("set");

        let buf = encode(&outer);
        let err = decode(&holder, &buf, &NoResolver).expect_err("no resolver");
        assert_eq!(err.field(), Some(1));
        let source = std::error::Error::source(&err).expect("source");
        assert!(source.to_string().contains("/nft.BaseNFT"));
    }

    #[test]
    fn trailing_truncated_tag_fails_cleanly() {
        let mut buf = encode(&{
            let mut r = Record::new(account_schema());
            r.set(2, Value::Uint64(300)).expect("set");
            r
        });
        buf.push(0x80); // dangling continuation byte
        assert!(matches!(
            decode(&account_schema(), &buf, &NoResolver),
            Err(WireError::UnexpectedEnd)
        ));
    }
}
