//! Unknown-field skipping.
//!
//! A decoder that meets a field it does not recognize must still walk past
//! the payload, so buffers written against a newer schema stay readable.
//! The skipper handles every wire type, including the legacy group framing
//! that modern schemas never declare but old writers may still emit.

use tagwire_error::{Result, WireError};
use tagwire_types::varint::read_varint;
use tagwire_types::{Tag, WireType};

use crate::decode::read_length_delimited;

/// Skip one value of the given wire type starting at `offset`.
///
/// `wire_type` comes from the already-consumed tag; the return value is the
/// offset of the first byte past the skipped payload. Groups are walked
/// iteratively with a depth counter, validating every interior tag. A bare
/// end-group marker fails with [`WireError::UnmatchedEndGroup`].
///
/// `offset` must be within `buf` (at most its length).
pub fn skip_value(buf: &[u8], offset: usize, wire_type: WireType) -> Result<usize> {
    let mut pos = offset;
    let mut depth = 0usize;
    let mut pending = wire_type;
    loop {
        match pending {
            WireType::Varint => {
                let (_, n) = read_varint(&buf[pos..])?;
                pos += n;
            }
            WireType::Fixed64 => {
                if buf.len() - pos < 8 {
                    return Err(WireError::UnexpectedEnd);
                }
                pos += 8;
            }
            WireType::Fixed32 => {
                if buf.len() - pos < 4 {
                    return Err(WireError::UnexpectedEnd);
                }
                pos += 4;
            }
            WireType::LengthDelimited => {
                let (_, n) = read_length_delimited(&buf[pos..])?;
                pos += n;
            }
            WireType::StartGroup => depth += 1,
            WireType::EndGroup => {
                if depth == 0 {
                    return Err(WireError::UnmatchedEndGroup);
                }
                depth -= 1;
            }
        }
        if depth == 0 {
            return Ok(pos);
        }
        let (raw, n) = read_varint(&buf[pos..])?;
        pos += n;
        pending = Tag::unpack(raw)?.wire_type();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_varint() {
        // 300 takes two bytes; the 0xFF after it must not be touched.
        let buf = [0xAC, 0x02, 0xFF];
        assert_eq!(skip_value(&buf, 0, WireType::Varint).expect("skip"), 2);
    }

    #[test]
    fn skips_fixed_widths() {
        let buf = [0u8; 12];
        assert_eq!(skip_value(&buf, 0, WireType::Fixed64).expect("skip"), 8);
        assert_eq!(skip_value(&buf, 0, WireType::Fixed32).expect("skip"), 4);
        assert_eq!(skip_value(&buf, 8, WireType::Fixed32).expect("skip"), 12);
    }

    #[test]
    fn skips_length_delimited() {
        let buf = [0x03, b'a', b'b', b'c', 0x55];
        assert_eq!(
            skip_value(&buf, 0, WireType::LengthDelimited).expect("skip"),
            4
        );
    }

    #[test]
    fn skips_group_with_interior_fields() {
        // field 1 varint 5, then end-group for field 1 (1 << 3 | 4 = 0x0c).
        let buf = [0x08, 0x05, 0x0C];
        assert_eq!(skip_value(&buf, 0, WireType::StartGroup).expect("skip"), 3);
    }

    #[test]
    fn skips_nested_groups() {
        // start-group field 1 (0x0b), then two end-groups.
        let buf = [0x0B, 0x0C, 0x0C];
        assert_eq!(skip_value(&buf, 0, WireType::StartGroup).expect("skip"), 3);
    }

    #[test]
    fn bare_end_group_is_rejected() {
        let buf = [0x00];
        assert!(matches!(
            skip_value(&buf, 0, WireType::EndGroup),
            Err(WireError::UnmatchedEndGroup)
        ));
    }

    #[test]
    fn unterminated_group_is_truncation() {
        // Group opens, one interior varint field, no end marker.
        let buf = [0x08, 0x05];
        assert!(matches!(
            skip_value(&buf, 0, WireType::StartGroup),
            Err(WireError::UnexpectedEnd)
        ));
    }

    #[test]
    fn truncated_fixed_is_rejected() {
        let buf = [0u8; 5];
        assert!(matches!(
            skip_value(&buf, 0, WireType::Fixed64),
            Err(WireError::UnexpectedEnd)
        ));
        assert!(matches!(
            skip_value(&buf, 3, WireType::Fixed32),
            Err(WireError::UnexpectedEnd)
        ));
    }

    #[test]
    fn oversized_length_is_rejected() {
        let buf = [0x7F, 0x00];
        assert!(matches!(
            skip_value(&buf, 0, WireType::LengthDelimited),
            Err(WireError::Truncated { needed: 127, .. })
        ));
    }

    #[test]
    fn invalid_tag_inside_group_is_rejected() {
        // Interior tag with reserved wire type 6 (1 << 3 | 6 = 0x0e).
        let buf = [0x0E];
        assert!(matches!(
            skip_value(&buf, 0, WireType::StartGroup),
            Err(WireError::InvalidTag { raw: 0x0E })
        ));
    }
}
