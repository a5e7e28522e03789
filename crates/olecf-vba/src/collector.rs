use std::path::Path;

use encoding_rs::WINDOWS_1252;
use serde::Serialize;
use thiserror::Error;

use crate::debug::DebugSink;
use crate::f_stream::{decode_f_stream, FStream};
use crate::o_stream::{decode_o_stream, OStream};
use crate::ole::{Container, OleError, OleFile, RawStream};
use crate::project_text::{detect_codepage, encoding_for_codepage, find_base_class};
use crate::vba_project::{decode_vba_project_stream, VbaProjectStream};
use crate::ParseError;

pub const PROJECT_STREAM_PATH: &str = "\\Macros\\PROJECT";
pub const VBA_PROJECT_STREAM_PATH: &str = "\\Macros\\VBA\\_VBA_PROJECT";

/// Everything recovered from one container.
///
/// `stream_found` is only set once a `_VBA_PROJECT` stream has been located; a container without
/// macros yields a default result rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionResult {
    pub stream_found: bool,
    pub base_class: Option<String>,
    pub codepage: Option<u32>,
    pub f_stream: Option<FStream>,
    pub o_stream: Option<OStream>,
    pub vba_project: Option<VbaProjectStream>,
    /// Non-fatal problems: designer streams that failed to decode or were cut short.
    pub warnings: Vec<String>,
}

impl CollectionResult {
    fn warn(&mut self, message: String) {
        log::warn!("{message}");
        self.warnings.push(message);
    }
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Ole(#[from] OleError),
    /// The performance cache is present but not decodable. Results from the designer streams
    /// decoded before it are kept in `partial`.
    #[error("failed to decode _VBA_PROJECT stream: {source}")]
    VbaProject {
        #[source]
        source: ParseError,
        partial: Box<CollectionResult>,
    },
}

/// Open the compound file at `path` and collect its VBA artifacts.
pub fn collect_path(
    path: impl AsRef<Path>,
    sink: &mut DebugSink<'_>,
) -> Result<CollectionResult, CollectError> {
    let mut ole = OleFile::open_path(path)?;
    collect(&mut ole, sink)
}

pub fn collect<C: Container + ?Sized>(
    container: &mut C,
    sink: &mut DebugSink<'_>,
) -> Result<CollectionResult, CollectError> {
    let mut result = CollectionResult::default();

    let Some(project) = container.resolve(PROJECT_STREAM_PATH)? else {
        return Ok(result);
    };
    let project_text = project.window();
    if sink.is_enabled() {
        sink.text("PROJECT stream data:\n");
        sink.text(&String::from_utf8_lossy(project_text));
        sink.blank_line();
    }

    result.codepage = detect_codepage(project_text);
    let encoding = result
        .codepage
        .and_then(encoding_for_codepage)
        .unwrap_or(WINDOWS_1252);
    result.base_class = find_base_class(project_text, encoding);

    let Some(vba_project) = container.resolve(VBA_PROJECT_STREAM_PATH)? else {
        return Ok(result);
    };

    let designer = result.base_class.clone().filter(|base_class| {
        let valid = is_storage_name(base_class);
        if !valid {
            result.warn(format!(
                "BaseClass {base_class:?} is not a storage name; designer streams skipped"
            ));
        }
        valid
    });
    if let Some(base_class) = designer {
        let f_path = format!("\\Macros\\{base_class}\\f");
        if let Some(stream) = resolve_designer_stream(container, &f_path, &mut result) {
            match decode_f_stream(stream.window(), encoding, sink) {
                Ok(f_stream) => {
                    if let Some(offset) = f_stream.truncated_at {
                        result.warn(format!("{f_path}: entries truncated at offset {offset:#x}"));
                    }
                    result.f_stream = Some(f_stream);
                }
                Err(err) => result.warn(format!("{f_path}: {err}")),
            }
        }

        let o_path = format!("\\Macros\\{base_class}\\o");
        if let Some(stream) = resolve_designer_stream(container, &o_path, &mut result) {
            let o_stream = decode_o_stream(stream.window(), encoding, sink);
            if let Some(offset) = o_stream.truncated_at {
                result.warn(format!("{o_path}: entries truncated at offset {offset:#x}"));
            }
            result.o_stream = Some(o_stream);
        }
    }

    result.stream_found = true;

    match decode_vba_project_stream(vba_project.window(), sink) {
        Ok(stream) => {
            result.vba_project = Some(stream);
            Ok(result)
        }
        Err(source) => Err(CollectError::VbaProject {
            source,
            partial: Box::new(result),
        }),
    }
}

/// Designer streams are optional: a read failure is recorded and the stream skipped.
fn resolve_designer_stream<C: Container + ?Sized>(
    container: &mut C,
    path: &str,
    result: &mut CollectionResult,
) -> Option<RawStream> {
    match container.resolve(path) {
        Ok(stream) => stream,
        Err(err) => {
            result.warn(format!("{path}: {err}"));
            None
        }
    }
}

/// The designer storage must be a direct child of `\Macros`: a single path component.
fn is_storage_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['\\', '/'])
}
