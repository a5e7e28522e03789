use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OleError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("not an OLE compound file: {0}")]
    Open(#[source] std::io::Error),
    #[error("failed to read OLE stream {path}: {source}")]
    Stream {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The bytes of one named stream together with the size its directory entry declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStream {
    pub path: String,
    pub data: Vec<u8>,
    pub declared_size: u64,
}

impl RawStream {
    /// The part of the buffer decoders may look at: never more than the declared size.
    pub fn window(&self) -> &[u8] {
        let declared = usize::try_from(self.declared_size).unwrap_or(usize::MAX);
        &self.data[..self.data.len().min(declared)]
    }
}

/// Source of named streams, addressed with `\`-separated paths such as `\Macros\PROJECT`.
pub trait Container {
    /// Read the stream at `path` in full, or return `None` when no such stream exists.
    fn resolve(&mut self, path: &str) -> Result<Option<RawStream>, OleError>;
}

/// An OLE compound file held in memory.
pub struct OleFile {
    inner: cfb::CompoundFile<Cursor<Vec<u8>>>,
}

impl OleFile {
    pub fn open(bytes: &[u8]) -> Result<Self, OleError> {
        Self::from_vec(bytes.to_vec())
    }

    /// Take ownership of an already-loaded file without copying it.
    pub fn from_vec(bytes: Vec<u8>) -> Result<Self, OleError> {
        let inner = cfb::CompoundFile::open(Cursor::new(bytes)).map_err(OleError::Open)?;
        Ok(Self { inner })
    }

    pub fn open_path(path: impl AsRef<Path>) -> Result<Self, OleError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| OleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_vec(bytes)
    }
}

impl std::fmt::Debug for OleFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OleFile").finish_non_exhaustive()
    }
}

impl Container for OleFile {
    fn resolve(&mut self, path: &str) -> Result<Option<RawStream>, OleError> {
        let cfb_path = cfb_path(path);
        if !self.inner.is_stream(&cfb_path) {
            log::debug!("OLE stream {path} not present");
            return Ok(None);
        }

        let stream_error = |source| OleError::Stream {
            path: path.to_owned(),
            source,
        };
        let declared_size = self.inner.entry(&cfb_path).map_err(stream_error)?.len();
        let mut stream = self.inner.open_stream(&cfb_path).map_err(stream_error)?;
        let mut data = Vec::new();
        stream.read_to_end(&mut data).map_err(stream_error)?;

        log::debug!("OLE stream {path}: {declared_size} bytes declared, {} read", data.len());
        Ok(Some(RawStream {
            path: path.to_owned(),
            data,
            declared_size,
        }))
    }
}

/// `\Macros\PROJECT` and `Macros/PROJECT` both become `/Macros/PROJECT`.
fn cfb_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for part in path.split(['\\', '/']).filter(|part| !part.is_empty()) {
        out.push('/');
        out.push_str(part);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}
