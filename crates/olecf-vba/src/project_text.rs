//! Scanning of the plain-text `PROJECT` stream.
//!
//! A typical stream looks like:
//!
//! ```text
//! ID="{00000000-0000-0000-0000-000000000000}"
//! Document=ThisDocument/&H00000000
//! BaseClass=UserForm1
//! Name="Project"
//! CodePage=1252
//! ```

use encoding_rs::{Encoding, BIG5, EUC_KR, GBK, SHIFT_JIS, UTF_8, WINDOWS_874};

const BASE_CLASS_KEY: &[u8] = b"BaseClass=";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Return the value of the last `BaseClass=` line, decoded with `encoding`, or `None` when there
/// is no such line or the last one carries an empty value.
pub fn find_base_class(project_stream: &[u8], encoding: &'static Encoding) -> Option<String> {
    let mut base_class: Option<&[u8]> = None;
    for line in strip_utf8_bom(project_stream).split(|&b| b == b'\n') {
        let line = line.trim_ascii();
        if !line.starts_with(BASE_CLASS_KEY) {
            continue;
        }
        // Everything after the last `=`, matching how the value is written by Office.
        let start = line.iter().rposition(|&b| b == b'=').map_or(0, |i| i + 1);
        base_class = Some(&line[start..]);
    }

    let value = base_class?;
    if value.is_empty() {
        return None;
    }
    let (text, _) = encoding.decode_without_bom_handling(value);
    Some(text.into_owned())
}

fn strip_utf8_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Detect the project code page from a `CodePage=<n>` line.
///
/// Only the `ProjectProperties` section is scanned: the search stops at the first `[section]`
/// header.
pub fn detect_codepage(project_stream: &[u8]) -> Option<u32> {
    const KEY: &[u8] = b"CodePage";

    for line in strip_utf8_bom(project_stream).split(|&b| b == b'\n' || b == b'\r') {
        let line = line.trim_ascii();
        if line.is_empty() {
            continue;
        }
        if line.starts_with(b"[") && line.ends_with(b"]") {
            break;
        }

        let Some(prefix) = line.get(..KEY.len()) else {
            continue;
        };
        if !prefix.eq_ignore_ascii_case(KEY) {
            continue;
        }
        let Some(value) = line[KEY.len()..].trim_ascii_start().strip_prefix(b"=") else {
            continue;
        };
        let value = value.trim_ascii();
        let digits = value
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map_or(value, |end| &value[..end]);
        let Some(codepage) = std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
        else {
            continue;
        };
        return Some(codepage);
    }

    None
}

/// The `encoding_rs` encoding for a Windows code page, for the code pages VBA projects are
/// saved with. `None` for anything else; callers pick their own fallback.
pub fn encoding_for_codepage(codepage: u32) -> Option<&'static Encoding> {
    let encoding = match codepage {
        874 => WINDOWS_874,
        932 => SHIFT_JIS,
        936 => GBK,
        949 => EUC_KR,
        950 => BIG5,
        1250..=1258 => windows_codepage(codepage)?,
        65001 => UTF_8,
        _ => return None,
    };
    Some(encoding)
}

fn windows_codepage(codepage: u32) -> Option<&'static Encoding> {
    Encoding::for_label(format!("windows-{codepage}").as_bytes())
}
