//! Little-endian fixed-width value encoding for the fixed32 and fixed64
//! wire types.

use tagwire_error::{Result, WireError};

/// Read a little-endian `u32` from the front of a byte slice.
pub fn read_u32_le(buf: &[u8]) -> Result<u32> {
    match buf.first_chunk::<4>() {
        Some(bytes) => Ok(u32::from_le_bytes(*bytes)),
        None => Err(WireError::UnexpectedEnd),
    }
}

/// Read a little-endian `u64` from the front of a byte slice.
pub fn read_u64_le(buf: &[u8]) -> Result<u64> {
    match buf.first_chunk::<8>() {
        Some(bytes) => Ok(u64::from_le_bytes(*bytes)),
        None => Err(WireError::UnexpectedEnd),
    }
}

/// Write a little-endian `u32` to the front of a byte buffer, returning the
/// number of bytes written. The buffer must have at least 4 bytes available.
pub fn write_u32_le(buf: &mut [u8], value: u32) -> usize {
    buf[..4].copy_from_slice(&value.to_le_bytes());
    4
}

/// Write a little-endian `u64` to the front of a byte buffer, returning the
/// number of bytes written. The buffer must have at least 8 bytes available.
pub fn write_u64_le(buf: &mut [u8], value: u64) -> usize {
    buf[..8].copy_from_slice(&value.to_le_bytes());
    8
}
