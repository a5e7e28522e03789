//! `olecf-vba` decodes the VBA artifacts cached inside an OLE compound document (`.doc`, `.xls`,
//! `.ppt`), for forensic inspection:
//! - the `PROJECT` text stream, to find the designer `BaseClass` and code page;
//! - the designer `f` (control layout) and `o` (control site) streams of that class;
//! - the `VBA/_VBA_PROJECT` performance cache string table.
//!
//! Decoding is tolerant where real-world files are often cut short (designer entry loops) and
//! strict where a short read means the layout assumption is wrong (headers, string table).

pub mod collector;
pub mod debug;
pub mod f_stream;
pub mod hexdump;
pub mod o_stream;
pub mod ole;
pub mod project_text;
pub mod reader;
pub mod vba_project;

pub use collector::{
    collect, collect_path, CollectError, CollectionResult, PROJECT_STREAM_PATH,
    VBA_PROJECT_STREAM_PATH,
};
pub use debug::DebugSink;
pub use f_stream::{
    decode_f_stream, EntryAnomaly, FStream, FStreamEntry, FStreamHeader, F_STREAM_HEADER_SIZE,
};
pub use hexdump::hexdump;
pub use o_stream::{
    decode_o_stream, OStream, OStreamEntryPair, OStreamEntryPart1, OStreamEntryPart2,
};
pub use ole::{Container, OleError, OleFile, RawStream};
pub use project_text::{detect_codepage, encoding_for_codepage, find_base_class};
pub use reader::{align_to_4, TruncatedDataError};
pub use vba_project::{
    decode_vba_project_stream, ProjectString, VbaProjectHeader, VbaProjectStream,
    VBA_PROJECT_HEADER_SIZE,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{stream} stream header is truncated: {source}")]
    TruncatedHeader {
        stream: &'static str,
        #[source]
        source: TruncatedDataError,
    },
    #[error("_VBA_PROJECT string {index} of {count} is truncated: {source}")]
    TruncatedString {
        index: u16,
        count: u16,
        #[source]
        source: TruncatedDataError,
    },
}
