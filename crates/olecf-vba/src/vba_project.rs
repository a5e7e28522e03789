//! Decoder for the `VBA/_VBA_PROJECT` stream (the performance cache).
//!
//! Only the header and the string table that follows it are interpreted. The number of strings
//! comes from the header and is trusted: running out of data before the table is complete means
//! the stream is not laid out the way we expect, so it is reported as an error rather than
//! silently truncated.

use encoding_rs::UTF_16LE;
use serde::Serialize;

use crate::debug::DebugSink;
use crate::reader::{read_fixed_bytes, read_u16_le, read_u32_le, TruncatedDataError};
use crate::ParseError;

pub const VBA_PROJECT_HEADER_SIZE: usize = 34;

/// Size of the fixed fields around each string: the `u16` size plus three trailing `u32`s.
pub const PROJECT_STRING_FIXED_SIZE: usize = 14;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VbaProjectHeader {
    pub unknown1: u32,
    pub unknown2: u16,
    pub unknown3: u16,
    pub unknown4: u32,
    pub unknown5: u32,
    pub unknown6: u32,
    pub unknown7: u32,
    pub unknown8: u32,
    pub unknown9: u16,
    pub number_of_strings: u16,
    pub unknown11: u16,
}

impl VbaProjectHeader {
    pub fn parse(data: &[u8]) -> Result<Self, TruncatedDataError> {
        read_fixed_bytes(data, 0, VBA_PROJECT_HEADER_SIZE)?;
        Ok(Self {
            unknown1: read_u32_le(data, 0)?,
            unknown2: read_u16_le(data, 4)?,
            unknown3: read_u16_le(data, 6)?,
            unknown4: read_u32_le(data, 8)?,
            unknown5: read_u32_le(data, 12)?,
            unknown6: read_u32_le(data, 16)?,
            unknown7: read_u32_le(data, 20)?,
            unknown8: read_u32_le(data, 24)?,
            unknown9: read_u16_le(data, 28)?,
            number_of_strings: read_u16_le(data, 30)?,
            unknown11: read_u16_le(data, 32)?,
        })
    }

    fn debug_print(&self, sink: &mut DebugSink<'_>) {
        sink.hex32("Unknown1", self.unknown1);
        sink.hex16("Unknown2", self.unknown2);
        sink.hex16("Unknown3", self.unknown3);
        sink.hex32("Unknown4", self.unknown4);
        sink.hex32("Unknown5", self.unknown5);
        sink.hex32("Unknown6", self.unknown6);
        sink.hex32("Unknown7", self.unknown7);
        sink.hex32("Unknown8", self.unknown8);
        sink.value("Unknown9", self.unknown9);
        sink.value("Number of strings", self.number_of_strings);
        sink.value("Unknown11", self.unknown11);
        sink.blank_line();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectString {
    pub offset: usize,
    /// Size in bytes of the UTF-16LE text, without a terminator.
    pub size: u16,
    pub text: String,
    pub unknown1: u32,
    pub unknown2: u32,
    pub unknown3: u32,
}

impl ProjectString {
    pub fn parse(data: &[u8], offset: usize) -> Result<(Self, usize), TruncatedDataError> {
        let size = read_u16_le(data, offset)?;
        let len = usize::from(size);
        let raw = read_fixed_bytes(data, offset + 2, len)?;
        let unknown1 = read_u32_le(data, offset + 2 + len)?;
        let unknown2 = read_u32_le(data, offset + 6 + len)?;
        let unknown3 = read_u32_le(data, offset + 10 + len)?;

        let (text, had_errors) = UTF_16LE.decode_without_bom_handling(raw);
        if had_errors {
            log::warn!(
                "_VBA_PROJECT: string at offset {offset:#x} is not valid UTF-16LE; \
                 invalid code units were replaced"
            );
        }

        let string = Self {
            offset,
            size,
            text: text.into_owned(),
            unknown1,
            unknown2,
            unknown3,
        };
        Ok((string, PROJECT_STRING_FIXED_SIZE + len))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VbaProjectStream {
    pub header: VbaProjectHeader,
    pub strings: Vec<ProjectString>,
}

/// Decode a `_VBA_PROJECT` stream. Any short read, in the header or in the string table, is an
/// error.
pub fn decode_vba_project_stream(
    data: &[u8],
    sink: &mut DebugSink<'_>,
) -> Result<VbaProjectStream, ParseError> {
    sink.data("_VBA_PROJECT stream data", data);

    let header = VbaProjectHeader::parse(data).map_err(|source| ParseError::TruncatedHeader {
        stream: "_VBA_PROJECT",
        source,
    })?;
    header.debug_print(sink);

    let count = header.number_of_strings;
    // The count is untrusted; never reserve more entries than the data could hold.
    let mut strings =
        Vec::with_capacity(usize::from(count).min(data.len() / PROJECT_STRING_FIXED_SIZE));
    let mut offset = VBA_PROJECT_HEADER_SIZE;
    for index in 0..count {
        let (string, consumed) = ProjectString::parse(data, offset)
            .map_err(|source| ParseError::TruncatedString {
                index,
                count,
                source,
            })?;

        if sink.is_enabled() {
            sink.value(&format!("String: {index} size"), string.size);
            sink.value(&format!("String: {index}"), &string.text);
            sink.hex32("Unknown1", string.unknown1);
            sink.hex32("Unknown2", string.unknown2);
            sink.hex32("Unknown3", string.unknown3);
        }

        strings.push(string);
        offset += consumed;
    }
    sink.blank_line();

    Ok(VbaProjectStream { header, strings })
}
