pub mod fixed;
pub mod limits;
pub mod record;
pub mod schema;
pub mod value;
pub mod varint;

pub use record::Record;
pub use schema::{FieldDescriptor, FieldKind, Label, MessageSchema, SchemaBuilder};
pub use value::{AnyRecord, Value, ValueKind};

use std::fmt;
use std::num::NonZeroU32;

use tagwire_error::{Result, WireError};

use crate::limits::MAX_FIELD_NUMBER;
use crate::varint::varint_len;

/// The wire type carried in the low three bits of every tag.
///
/// Wire types describe how to frame a value on the stream, not what it
/// means: the schema supplies meaning, the wire type alone is enough to
/// skip a value whose field number is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Base-128 varint, terminated by a byte without the continuation bit.
    Varint = 0,
    /// Eight bytes, little-endian.
    Fixed64 = 1,
    /// Varint byte count followed by that many payload bytes.
    LengthDelimited = 2,
    /// Opens a deprecated group; closed by a matching `EndGroup`.
    StartGroup = 3,
    /// Closes a group opened by `StartGroup`.
    EndGroup = 4,
    /// Four bytes, little-endian.
    Fixed32 = 5,
}

impl WireType {
    /// Decode a wire type from the low three bits of a tag.
    ///
    /// Returns `None` for the unassigned values 6 and 7.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::LengthDelimited),
            3 => Some(Self::StartGroup),
            4 => Some(Self::EndGroup),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }

    /// The three-bit encoding of this wire type.
    #[inline]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Lowercase name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Varint => "varint",
            Self::Fixed64 => "fixed64",
            Self::LengthDelimited => "length-delimited",
            Self::StartGroup => "start-group",
            Self::EndGroup => "end-group",
            Self::Fixed32 => "fixed32",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field number within a message schema.
///
/// Field numbers are 1-based and capped at 2^29 - 1 so that
/// `number << 3 | wire_type` packs into the tag varint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct FieldNumber(NonZeroU32);

impl FieldNumber {
    /// The smallest valid field number.
    pub const MIN: Self = Self(NonZeroU32::MIN);

    /// Create a new field number from a raw u32.
    ///
    /// Returns `None` for 0 and for numbers above [`MAX_FIELD_NUMBER`].
    #[inline]
    pub const fn new(n: u32) -> Option<Self> {
        if n > MAX_FIELD_NUMBER {
            return None;
        }
        match NonZeroU32::new(n) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for FieldNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for FieldNumber {
    type Error = FieldNumberOutOfRange;

    fn try_from(value: u32) -> std::result::Result<Self, Self::Error> {
        Self::new(value).ok_or(FieldNumberOutOfRange)
    }
}

/// Error returned when creating a `FieldNumber` from 0 or from a value above
/// the packing limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldNumberOutOfRange;

impl fmt::Display for FieldNumberOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("field number must be between 1 and 2^29 - 1")
    }
}

impl std::error::Error for FieldNumberOutOfRange {}

/// A decoded field tag: the field number plus the framing wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    number: FieldNumber,
    wire_type: WireType,
}

impl Tag {
    /// Pair a field number with a wire type.
    #[inline]
    pub const fn new(number: FieldNumber, wire_type: WireType) -> Self {
        Self { number, wire_type }
    }

    /// The packed on-wire representation: `number << 3 | wire_type`.
    #[inline]
    pub const fn pack(self) -> u64 {
        ((self.number.get() as u64) << 3) | self.wire_type.raw() as u64
    }

    /// Split a packed tag back into field number and wire type.
    ///
    /// Fails with [`WireError::InvalidTag`] for wire types 6 and 7, field
    /// number 0, and field numbers above the packing limit.
    pub fn unpack(raw: u64) -> Result<Self> {
        #[allow(clippy::cast_possible_truncation)]
        let Some(wire_type) = WireType::from_raw((raw & 0x7) as u8) else {
            return Err(WireError::InvalidTag { raw });
        };
        let number_raw = raw >> 3;
        if number_raw == 0 || number_raw > u64::from(MAX_FIELD_NUMBER) {
            return Err(WireError::InvalidTag { raw });
        }
        #[allow(clippy::cast_possible_truncation)]
        let Some(number) = FieldNumber::new(number_raw as u32) else {
            return Err(WireError::InvalidTag { raw });
        };
        Ok(Self { number, wire_type })
    }

    /// Encoded length of this tag's varint.
    #[inline]
    pub const fn encoded_len(self) -> usize {
        varint_len(self.pack())
    }

    /// The field number.
    #[inline]
    pub const fn number(self) -> FieldNumber {
        self.number
    }

    /// The wire type.
    #[inline]
    pub const fn wire_type(self) -> WireType {
        self.wire_type
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field {} ({})", self.number, self.wire_type)
    }
}
