//! Base-128 varint encoding.
//!
//! Values are stored little-endian in 7-bit groups, one group per byte, with
//! the high bit of each byte flagging a continuation. A 64-bit value never
//! needs more than ten bytes; the tenth byte of a maximal value carries a
//! single payload bit:
//!
//! | Value range            | Encoded length |
//! |------------------------|----------------|
//! | 0 ..= 127              | 1 byte         |
//! | 128 ..= 16383          | 2 bytes        |
//! | 16384 ..= 2097151      | 3 bytes        |
//! | ...                    | ...            |
//! | 2^56 ..= 2^63 - 1      | 9 bytes        |
//! | 2^63 ..= u64::MAX      | 10 bytes       |

use tagwire_error::{Result, WireError};

/// Read a varint from the front of a byte slice, returning
/// `(value, bytes_consumed)`.
///
/// Fails with [`WireError::VarintOverflow`] if the continuation bit is still
/// set after ten groups, and [`WireError::UnexpectedEnd`] if the buffer ends
/// before a terminating byte. Payload bits above bit 63 in the tenth group
/// are discarded, matching the reference decoders.
pub fn read_varint(buf: &[u8]) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;
    for (i, &byte) in buf.iter().enumerate() {
        if shift >= 64 {
            return Err(WireError::VarintOverflow);
        }
        value |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
    }
    if shift >= 64 {
        return Err(WireError::VarintOverflow);
    }
    Err(WireError::UnexpectedEnd)
}

/// Compute the number of bytes needed to encode a value as a varint.
///
/// Closed form: one byte per started 7-bit group of the value's bit length,
/// with zero occupying one byte.
pub const fn varint_len(value: u64) -> usize {
    (((64 - (value | 1).leading_zeros()) as usize) + 6) / 7
}

/// Write a varint to the front of a byte buffer, returning the number of
/// bytes written.
///
/// The buffer must have at least `varint_len(value)` bytes available.
#[allow(clippy::cast_possible_truncation)]
pub fn write_varint(buf: &mut [u8], value: u64) -> usize {
    let mut v = value;
    let mut i = 0;
    while v >= 0x80 {
        buf[i] = (v as u8 & 0x7F) | 0x80;
        v >>= 7;
        i += 1;
    }
    buf[i] = v as u8;
    i + 1
}

/// Map a signed value onto the unsigned varint space so that small
/// magnitudes of either sign encode short: 0 => 0, -1 => 1, 1 => 2, -2 => 3.
#[allow(clippy::cast_sign_loss)]
pub const fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
#[allow(clippy::cast_possible_wrap)]
pub const fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
