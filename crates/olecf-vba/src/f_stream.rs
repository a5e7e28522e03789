//! Decoder for the designer `f` stream (form control layout).
//!
//! The stream starts with a fixed header followed by self-sized entries. Each entry begins with a
//! `u16` size that excludes the size field itself and a trailing `u16`, so an entry occupies
//! `2 + size + 2` bytes. The control's variable name fills whatever the fixed fields leave over.

use encoding_rs::Encoding;
use serde::Serialize;
use uuid::Uuid;

use crate::debug::DebugSink;
use crate::reader::{read_fixed_bytes, read_guid, read_u16_le, read_u32_le, TruncatedDataError};
use crate::ParseError;

pub const F_STREAM_HEADER_SIZE: usize = 75;

/// Bytes of an entry counted by its size field before the variable name starts.
pub const F_STREAM_ENTRY_FIXED_SIZE: usize = 28;

const RESERVED_SIZE: usize = 23;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FStreamHeader {
    pub unknown1: u16,
    pub unknown2: u16,
    pub unknown3: u32,
    pub unknown4: u32,
    pub unknown5: u32,
    pub unknown6: u32,
    pub unknown7: u16,
    pub unknown8: u16,
    pub unknown9: u32,
    pub unknown10: u32,
    pub unknown11: u32,
    /// Commonly the StdFont CLSID `0be35203-8f91-11ce-9de3-00aa004bb851`.
    pub clsid: Uuid,
    pub reserved: Vec<u8>,
}

impl FStreamHeader {
    pub fn parse(data: &[u8]) -> Result<Self, TruncatedDataError> {
        // Fail on the full width up front so a short header never yields a partial value.
        read_fixed_bytes(data, 0, F_STREAM_HEADER_SIZE)?;
        Ok(Self {
            unknown1: read_u16_le(data, 0)?,
            unknown2: read_u16_le(data, 2)?,
            unknown3: read_u32_le(data, 4)?,
            unknown4: read_u32_le(data, 8)?,
            unknown5: read_u32_le(data, 12)?,
            unknown6: read_u32_le(data, 16)?,
            unknown7: read_u16_le(data, 20)?,
            unknown8: read_u16_le(data, 22)?,
            unknown9: read_u32_le(data, 24)?,
            unknown10: read_u32_le(data, 28)?,
            unknown11: read_u32_le(data, 32)?,
            clsid: read_guid(data, 36)?,
            reserved: read_fixed_bytes(data, 52, RESERVED_SIZE)?.to_vec(),
        })
    }

    fn debug_print(&self, sink: &mut DebugSink<'_>) {
        sink.hex16("Unknown1", self.unknown1);
        sink.hex16("Unknown2", self.unknown2);
        sink.hex32("Unknown3", self.unknown3);
        sink.hex32("Unknown4", self.unknown4);
        sink.hex32("Unknown5", self.unknown5);
        sink.hex32("Unknown6", self.unknown6);
        sink.hex16("Unknown7", self.unknown7);
        sink.hex16("Unknown8", self.unknown8);
        sink.hex32("Unknown9", self.unknown9);
        sink.hex32("Unknown10", self.unknown10);
        sink.hex32("Unknown11", self.unknown11);
        sink.value("Class identifier", self.clsid);
        sink.blank_line();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryAnomaly {
    /// The size field is smaller than the fixed fields it must cover; the name length was
    /// clamped to zero. Observed on the final entry of some streams.
    NameLengthUnderflow { declared_size: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FStreamEntry {
    pub offset: usize,
    pub declared_size: u16,
    pub unknown1: u32,
    pub unknown2: u32,
    pub unknown3: u32,
    pub o_stream_entry_size: u32,
    pub o_stream_entry_index: u16,
    pub unknown6: u16,
    pub unknown7: u32,
    pub unknown8: u32,
    pub variable_name: Vec<u8>,
    /// `None` when the name is not valid in the project code page.
    pub variable_name_text: Option<String>,
    pub trailer: u16,
    pub anomaly: Option<EntryAnomaly>,
}

impl FStreamEntry {
    /// Parse one entry at `offset`, returning it with the number of bytes it occupies.
    pub fn parse(
        data: &[u8],
        offset: usize,
        encoding: &'static Encoding,
    ) -> Result<(Self, usize), TruncatedDataError> {
        let declared_size = read_u16_le(data, offset)?;
        let body = offset + 2;

        let unknown1 = read_u32_le(data, body)?;
        let unknown2 = read_u32_le(data, body + 4)?;
        let unknown3 = read_u32_le(data, body + 8)?;
        let o_stream_entry_size = read_u32_le(data, body + 12)?;
        let o_stream_entry_index = read_u16_le(data, body + 16)?;
        let unknown6 = read_u16_le(data, body + 18)?;
        let unknown7 = read_u32_le(data, body + 20)?;
        let unknown8 = read_u32_le(data, body + 24)?;

        let declared = usize::from(declared_size);
        let (name_length, anomaly) = match declared.checked_sub(F_STREAM_ENTRY_FIXED_SIZE) {
            Some(len) => (len, None),
            None => (0, Some(EntryAnomaly::NameLengthUnderflow { declared_size })),
        };

        let variable_name =
            read_fixed_bytes(data, body + F_STREAM_ENTRY_FIXED_SIZE, name_length)?.to_vec();
        let trailer = read_u16_le(data, body + declared)?;

        let variable_name_text = encoding
            .decode_without_bom_handling_and_without_replacement(&variable_name)
            .map(|text| text.into_owned());

        let entry = Self {
            offset,
            declared_size,
            unknown1,
            unknown2,
            unknown3,
            o_stream_entry_size,
            o_stream_entry_index,
            unknown6,
            unknown7,
            unknown8,
            variable_name,
            variable_name_text,
            trailer,
            anomaly,
        };
        Ok((entry, 2 + declared + 2))
    }

    fn debug_print(&self, sink: &mut DebugSink<'_>) {
        sink.value("Size", self.declared_size);
        sink.hex32("Unknown1", self.unknown1);
        sink.hex32("Unknown2", self.unknown2);
        sink.value("Unknown3", self.unknown3);
        sink.value("O stream entry size", self.o_stream_entry_size);
        sink.value("O stream entry index", self.o_stream_entry_index);
        sink.hex16("Unknown6", self.unknown6);
        sink.hex32("Unknown7", self.unknown7);
        sink.hex32("Unknown8", self.unknown8);
        if let Some(name) = &self.variable_name_text {
            sink.value("Variable name", name);
        }
        sink.hex16("Trailer", self.trailer);
        if let Some(anomaly) = self.anomaly {
            sink.value("Anomaly", format_args!("{anomaly:?}"));
        }
        sink.blank_line();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FStream {
    pub header: FStreamHeader,
    pub entries: Vec<FStreamEntry>,
    /// Offset of the entry that could not be read completely, if the walk stopped early.
    pub truncated_at: Option<usize>,
}

/// Decode an `f` stream.
///
/// A short header is fatal. A truncated entry ends the walk and the entries before it are
/// returned.
pub fn decode_f_stream(
    data: &[u8],
    encoding: &'static Encoding,
    sink: &mut DebugSink<'_>,
) -> Result<FStream, ParseError> {
    let header = FStreamHeader::parse(data).map_err(|source| ParseError::TruncatedHeader {
        stream: "f",
        source,
    })?;

    if sink.is_enabled() {
        sink.data("f stream header data", &data[..F_STREAM_HEADER_SIZE]);
        header.debug_print(sink);
    }

    let mut entries = Vec::new();
    let mut truncated_at = None;
    let mut offset = F_STREAM_HEADER_SIZE;
    while offset < data.len() {
        let (entry, consumed) = match FStreamEntry::parse(data, offset, encoding) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!("f stream: stopping at entry offset {offset:#x}: {err}");
                truncated_at = Some(offset);
                break;
            }
        };

        if let Some(anomaly) = entry.anomaly {
            log::warn!("f stream: entry at offset {offset:#x}: {anomaly:?}");
        }
        if sink.is_enabled() {
            sink.data("f stream entry data", &data[offset..offset + consumed]);
            entry.debug_print(sink);
        }

        entries.push(entry);
        offset += consumed;
    }

    Ok(FStream {
        header,
        entries,
        truncated_at,
    })
}
