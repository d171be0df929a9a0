//! Hard limits shared by the encoder, decoder, and schema builder.

/// Maximum encoded length of a 64-bit varint: ten 7-bit groups.
pub const MAX_VARINT_LEN: usize = 10;

/// Highest representable field number. Tags pack the field number into the
/// bits above the 3-bit wire type, and the reference format caps numbers at
/// 2^29 - 1.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Maximum message nesting depth the decoder will follow.
pub const RECURSION_LIMIT: usize = 100;
