use std::fmt::{self, Display, Write};

use crate::hexdump::hexdump;

/// Destination for the line-oriented field dump produced while decoding.
///
/// Decoders take the sink as an explicit argument; a quiet sink discards everything, so decoding
/// is identical with and without diagnostics.
pub struct DebugSink<'a> {
    out: Option<&'a mut dyn Write>,
}

impl<'a> DebugSink<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self { out: Some(out) }
    }

    pub fn quiet() -> Self {
        Self { out: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.out.is_some()
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        if let Some(out) = self.out.as_mut() {
            // Writing into a `String` cannot fail; other sinks lose the line at worst.
            let _ = out.write_fmt(args);
        }
    }

    /// `label<tabs>: value`
    pub fn value(&mut self, label: &str, value: impl Display) {
        if self.is_enabled() {
            let tabs = label_tabs(label);
            self.emit(format_args!("{label}{tabs}: {value}\n"));
        }
    }

    pub fn hex16(&mut self, label: &str, value: u16) {
        self.value(label, format_args!("0x{value:04x}"));
    }

    pub fn hex32(&mut self, label: &str, value: u32) {
        self.value(label, format_args!("0x{value:08x}"));
    }

    /// Hexdump of `data` under a `description:` heading.
    pub fn data(&mut self, description: &str, data: &[u8]) {
        if self.is_enabled() {
            let dump = hexdump(data);
            self.emit(format_args!("{description}:\n{dump}\n"));
        }
    }

    pub fn text(&mut self, text: &str) {
        self.emit(format_args!("{text}"));
    }

    pub fn blank_line(&mut self) {
        self.emit(format_args!("\n"));
    }
}

impl Default for DebugSink<'_> {
    fn default() -> Self {
        Self::quiet()
    }
}

impl fmt::Debug for DebugSink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugSink")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Values line up at column 64 for labels shorter than 64 characters.
fn label_tabs(label: &str) -> String {
    let count = 8usize.saturating_sub(label.chars().count() / 8).max(1);
    "\t".repeat(count)
}
