//! Bounds-checked little-endian field readers.
//!
//! Every reader takes the full stream buffer plus an absolute offset, so callers never have to
//! slice ahead of time and error messages always carry stream-relative offsets.

use encoding_rs::Encoding;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("truncated data: reading {width} bytes at offset {offset:#x} exceeds buffer of {len} bytes")]
pub struct TruncatedDataError {
    pub offset: usize,
    pub width: usize,
    pub len: usize,
}

/// Round `size` up to the next multiple of 4.
pub fn align_to_4(size: usize) -> usize {
    size + ((4 - size % 4) % 4)
}

pub fn read_fixed_bytes(
    data: &[u8],
    offset: usize,
    length: usize,
) -> Result<&[u8], TruncatedDataError> {
    offset
        .checked_add(length)
        .and_then(|end| data.get(offset..end))
        .ok_or(TruncatedDataError {
            offset,
            width: length,
            len: data.len(),
        })
}

pub fn read_u16_le(data: &[u8], offset: usize) -> Result<u16, TruncatedDataError> {
    let bytes = read_fixed_bytes(data, offset, 2)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

pub fn read_u32_le(data: &[u8], offset: usize) -> Result<u32, TruncatedDataError> {
    let bytes = read_fixed_bytes(data, offset, 4)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Read a 16-byte GUID stored in the Windows mixed-endian layout.
pub fn read_guid(data: &[u8], offset: usize) -> Result<Uuid, TruncatedDataError> {
    let bytes = read_fixed_bytes(data, offset, 16)?;
    let mut raw = [0u8; 16];
    raw.copy_from_slice(bytes);
    Ok(Uuid::from_bytes_le(raw))
}

/// Read a NUL-terminated string starting at `offset`.
///
/// Returns the decoded text and the number of bytes consumed, including the terminator. A string
/// without a terminator before the end of the buffer is treated as truncated.
pub fn read_cstring(
    data: &[u8],
    offset: usize,
    encoding: &'static Encoding,
) -> Result<(String, usize), TruncatedDataError> {
    let truncated = TruncatedDataError {
        offset,
        width: data.len().saturating_sub(offset).saturating_add(1),
        len: data.len(),
    };
    let rest = data.get(offset..).ok_or(truncated)?;
    let nul = rest.iter().position(|&b| b == 0).ok_or(truncated)?;
    let (text, _, _) = encoding.decode(&rest[..nul]);
    Ok((text.into_owned(), nul + 1))
}
