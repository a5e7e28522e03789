//! Decoder for the designer `o` stream (OLE control site data).
//!
//! Entries are pairs of parts. Each part is a block of `u32` fields followed by a NUL-terminated
//! string, and each part is padded to a 4-byte boundary on its own.

use encoding_rs::Encoding;
use serde::Serialize;

use crate::debug::DebugSink;
use crate::reader::{align_to_4, read_cstring, read_u32_le, TruncatedDataError};

const PART1_FIXED_SIZE: usize = 7 * 4;
const PART2_FIXED_SIZE: usize = 5 * 4;

/// Top bit of `data_size`; its meaning is unknown.
pub const DATA_SIZE_FLAG: u32 = 0x8000_0000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OStreamEntryPart1 {
    pub unknown1: u32,
    pub unknown2: u32,
    pub unknown3: u32,
    pub unknown4: u32,
    pub data_size: u32,
    pub unknown6: u32,
    pub unknown7: u32,
    pub data: String,
}

impl OStreamEntryPart1 {
    /// `data_size` without the flag bit.
    pub fn data_size_value(&self) -> u32 {
        self.data_size & !DATA_SIZE_FLAG
    }

    pub fn parse(
        data: &[u8],
        offset: usize,
        encoding: &'static Encoding,
    ) -> Result<(Self, usize), TruncatedDataError> {
        let unknown1 = read_u32_le(data, offset)?;
        let unknown2 = read_u32_le(data, offset + 4)?;
        let unknown3 = read_u32_le(data, offset + 8)?;
        let unknown4 = read_u32_le(data, offset + 12)?;
        let data_size = read_u32_le(data, offset + 16)?;
        let unknown6 = read_u32_le(data, offset + 20)?;
        let unknown7 = read_u32_le(data, offset + 24)?;
        let (text, consumed) = read_cstring(data, offset + PART1_FIXED_SIZE, encoding)?;

        let part = Self {
            unknown1,
            unknown2,
            unknown3,
            unknown4,
            data_size,
            unknown6,
            unknown7,
            data: text,
        };
        Ok((part, align_to_4(PART1_FIXED_SIZE + consumed)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OStreamEntryPart2 {
    pub unknown8: u32,
    pub unknown9: u32,
    pub unknown10: u32,
    pub unknown11: u32,
    pub unknown12: u32,
    pub font_name: String,
}

impl OStreamEntryPart2 {
    pub fn parse(
        data: &[u8],
        offset: usize,
        encoding: &'static Encoding,
    ) -> Result<(Self, usize), TruncatedDataError> {
        let unknown8 = read_u32_le(data, offset)?;
        let unknown9 = read_u32_le(data, offset + 4)?;
        let unknown10 = read_u32_le(data, offset + 8)?;
        let unknown11 = read_u32_le(data, offset + 12)?;
        let unknown12 = read_u32_le(data, offset + 16)?;
        let (font_name, consumed) = read_cstring(data, offset + PART2_FIXED_SIZE, encoding)?;

        let part = Self {
            unknown8,
            unknown9,
            unknown10,
            unknown11,
            unknown12,
            font_name,
        };
        Ok((part, align_to_4(PART2_FIXED_SIZE + consumed)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OStreamEntryPair {
    pub offset: usize,
    pub part1: OStreamEntryPart1,
    pub part2: OStreamEntryPart2,
}

impl OStreamEntryPair {
    /// Parse both parts of the entry at `offset`. The returned size includes the padding of
    /// both parts.
    pub fn parse(
        data: &[u8],
        offset: usize,
        encoding: &'static Encoding,
    ) -> Result<(Self, usize), TruncatedDataError> {
        let (part1, part1_size) = OStreamEntryPart1::parse(data, offset, encoding)?;
        let (part2, part2_size) = OStreamEntryPart2::parse(data, offset + part1_size, encoding)?;
        let entry = Self {
            offset,
            part1,
            part2,
        };
        Ok((entry, part1_size + part2_size))
    }

    fn debug_print(&self, sink: &mut DebugSink<'_>) {
        let part1 = &self.part1;
        sink.hex32("Unknown1", part1.unknown1);
        sink.hex32("Unknown2", part1.unknown2);
        sink.hex32("Unknown3", part1.unknown3);
        sink.hex32("Unknown4", part1.unknown4);
        sink.value(
            "Data size",
            format_args!("{} (0x{:08x})", part1.data_size_value(), part1.data_size),
        );
        sink.hex32("Unknown6", part1.unknown6);
        sink.hex32("Unknown7", part1.unknown7);
        sink.value("Data", &part1.data);

        let part2 = &self.part2;
        sink.hex32("Unknown8", part2.unknown8);
        sink.hex32("Unknown9", part2.unknown9);
        sink.hex32("Unknown10", part2.unknown10);
        sink.hex32("Unknown11", part2.unknown11);
        sink.hex32("Unknown12", part2.unknown12);
        sink.value("Font name", &part2.font_name);
        sink.blank_line();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OStream {
    pub entries: Vec<OStreamEntryPair>,
    pub truncated_at: Option<usize>,
}

/// Decode an `o` stream. The stream has no header, so decoding never fails: a truncated entry
/// ends the walk and the complete entries before it are returned.
pub fn decode_o_stream(
    data: &[u8],
    encoding: &'static Encoding,
    sink: &mut DebugSink<'_>,
) -> OStream {
    let mut entries = Vec::new();
    let mut truncated_at = None;
    let mut offset = 0usize;
    while offset < data.len() {
        let (entry, consumed) = match OStreamEntryPair::parse(data, offset, encoding) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!("o stream: stopping at entry offset {offset:#x}: {err}");
                truncated_at = Some(offset);
                break;
            }
        };

        if sink.is_enabled() {
            let end = (offset + consumed).min(data.len());
            sink.data("o stream entry data", &data[offset..end]);
            entry.debug_print(sink);
        }

        entries.push(entry);
        offset += consumed;
    }

    OStream {
        entries,
        truncated_at,
    }
}
