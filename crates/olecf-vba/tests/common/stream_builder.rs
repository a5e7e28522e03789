#![allow(dead_code)]

use std::io::{Cursor, Write};

// Byte-level builders for the designer and performance cache streams. Field values are arbitrary
// but distinct so assertions can tell fields apart.

/// StdFont CLSID `0be35203-8f91-11ce-9de3-00aa004bb851` in its on-disk byte order.
pub const STD_FONT_CLSID: [u8; 16] = [
    0x03, 0x52, 0xe3, 0x0b, 0x91, 0x8f, 0xce, 0x11, 0x9d, 0xe3, 0x00, 0xaa, 0x00, 0x4b, 0xb8, 0x51,
];

pub const F_HEADER_SIZE: usize = 75;
pub const VBA_PROJECT_HEADER_SIZE: usize = 34;

pub fn f_stream_header() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0x0400u16.to_le_bytes()); // unknown1
    out.extend_from_slice(&0x0018u16.to_le_bytes()); // unknown2
    out.extend_from_slice(&0x0000_0001u32.to_le_bytes()); // unknown3
    out.extend_from_slice(&0x0000_0002u32.to_le_bytes()); // unknown4
    out.extend_from_slice(&0x0000_0003u32.to_le_bytes()); // unknown5
    out.extend_from_slice(&0x0000_0004u32.to_le_bytes()); // unknown6
    out.extend_from_slice(&0x0005u16.to_le_bytes()); // unknown7
    out.extend_from_slice(&0x0006u16.to_le_bytes()); // unknown8
    out.extend_from_slice(&0x0000_0007u32.to_le_bytes()); // unknown9
    out.extend_from_slice(&0x0000_0008u32.to_le_bytes()); // unknown10
    out.extend_from_slice(&0x0000_0009u32.to_le_bytes()); // unknown11
    out.extend_from_slice(&STD_FONT_CLSID);
    out.extend_from_slice(&[0u8; 23]);
    assert_eq!(out.len(), F_HEADER_SIZE);
    out
}

/// One `f` stream entry whose size field covers exactly the fixed fields plus `name`.
pub fn f_stream_entry(o_stream_entry_size: u32, o_stream_entry_index: u16, name: &[u8]) -> Vec<u8> {
    let declared = u16::try_from(28 + name.len()).expect("name fits");
    f_stream_entry_with_size(declared, o_stream_entry_size, o_stream_entry_index, name)
}

pub fn f_stream_entry_with_size(
    declared_size: u16,
    o_stream_entry_size: u32,
    o_stream_entry_index: u16,
    name: &[u8],
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&declared_size.to_le_bytes());
    out.extend_from_slice(&0x0000_0011u32.to_le_bytes()); // unknown1
    out.extend_from_slice(&0x0000_0012u32.to_le_bytes()); // unknown2
    out.extend_from_slice(&0x0000_0013u32.to_le_bytes()); // unknown3
    out.extend_from_slice(&o_stream_entry_size.to_le_bytes());
    out.extend_from_slice(&o_stream_entry_index.to_le_bytes());
    out.extend_from_slice(&0x0016u16.to_le_bytes()); // unknown6
    out.extend_from_slice(&0x0000_0017u32.to_le_bytes()); // unknown7
    out.extend_from_slice(&0x0000_0018u32.to_le_bytes()); // unknown8
    out.extend_from_slice(name);
    out.extend_from_slice(&0xbeefu16.to_le_bytes()); // trailer
    out
}

fn pad_to_4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

/// One `o` stream entry pair, each part padded to 4 bytes.
pub fn o_stream_entry(data: &str, data_size: u32, font_name: &str) -> Vec<u8> {
    let mut part1 = Vec::new();
    for value in [0x21u32, 0x22, 0x23, 0x24, data_size, 0x26, 0x27] {
        part1.extend_from_slice(&value.to_le_bytes());
    }
    part1.extend_from_slice(data.as_bytes());
    part1.push(0);
    pad_to_4(&mut part1);

    let mut part2 = Vec::new();
    for value in [0x31u32, 0x32, 0x33, 0x34, 0x35] {
        part2.extend_from_slice(&value.to_le_bytes());
    }
    part2.extend_from_slice(font_name.as_bytes());
    part2.push(0);
    pad_to_4(&mut part2);

    part1.extend_from_slice(&part2);
    part1
}

pub fn utf16le(s: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for unit in s.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

pub fn vba_project_header(number_of_strings: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0x0061_cccau32.to_le_bytes()); // unknown1
    out.extend_from_slice(&0x00b2u16.to_le_bytes()); // unknown2
    out.extend_from_slice(&0x0001u16.to_le_bytes()); // unknown3
    for value in [4u32, 5, 6, 7, 8] {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out.extend_from_slice(&9u16.to_le_bytes()); // unknown9
    out.extend_from_slice(&number_of_strings.to_le_bytes());
    out.extend_from_slice(&11u16.to_le_bytes()); // unknown11
    assert_eq!(out.len(), VBA_PROJECT_HEADER_SIZE);
    out
}

pub fn vba_project_string(text: &str) -> Vec<u8> {
    let bytes = utf16le(text);
    let mut out = Vec::new();
    out.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
    out.extend_from_slice(&bytes);
    for value in [0x41u32, 0x42, 0x43] {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

pub fn vba_project_stream(strings: &[&str]) -> Vec<u8> {
    let mut out = vba_project_header(strings.len() as u16);
    for s in strings {
        out.extend_from_slice(&vba_project_string(s));
    }
    out
}

/// Build an OLE compound file containing `streams`, creating parent storages as needed.
/// Paths use `/` separators relative to the root storage.
pub fn build_ole(streams: &[(&str, &[u8])]) -> Vec<u8> {
    let cursor = Cursor::new(Vec::new());
    let mut ole = cfb::CompoundFile::create(cursor).expect("create cfb");
    for (path, data) in streams {
        if let Some((parent, _)) = path.rsplit_once('/') {
            ole.create_storage_all(parent).expect("create parent storage");
        }
        let mut s = ole.create_stream(path).expect("create stream");
        s.write_all(data).expect("write stream");
    }
    ole.into_inner().into_inner()
}

/// A `PROJECT` stream naming `base_class` as the designer.
pub fn project_text(base_class: &str) -> Vec<u8> {
    format!(
        "ID=\"{{00000000-0000-0000-0000-000000000000}}\"\r\n\
         Document=ThisDocument/&H00000000\r\n\
         BaseClass={base_class}\r\n\
         Name=\"Project\"\r\n\
         HelpContextID=\"0\"\r\n"
    )
    .into_bytes()
}
