//! Canonical hex + ASCII dump used by the diagnostic output.

use std::fmt::Write as _;

const BYTES_PER_LINE: usize = 16;

fn printable(byte: u8) -> char {
    if (0x20..=0x7e).contains(&byte) {
        byte as char
    } else {
        '.'
    }
}

fn hex_group(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (idx, byte) in bytes.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Format `data` as 16 bytes per line.
///
/// Runs of identical full lines are collapsed into a single `...` marker; the final line is
/// always printed so the dump shows where the data ends. The output ends with a newline.
pub fn hexdump(data: &[u8]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut previous: Option<String> = None;
    let mut in_group = false;

    for (line_index, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        let block_offset = line_index * BYTES_PER_LINE;
        let (low, high) = chunk.split_at(chunk.len().min(8));

        let remaining = BYTES_PER_LINE - chunk.len();
        let padding = match remaining {
            0 => 0,
            r if r >= 8 => 3 * r - 1,
            r => 3 * r,
        };
        let hex = format!(
            "{}  {}{}",
            hex_group(low),
            hex_group(high),
            " ".repeat(padding)
        );

        let is_last = block_offset + BYTES_PER_LINE >= data.len();
        if !is_last && previous.as_deref() == Some(hex.as_str()) {
            if !in_group {
                in_group = true;
                lines.push("...".to_owned());
            }
            continue;
        }

        let ascii: String = chunk.iter().copied().map(printable).collect();
        lines.push(format!("0x{block_offset:08x}  {hex}  {ascii}"));
        in_group = false;
        previous = Some(hex);
    }

    lines.push(String::new());
    lines.join("\n")
}
