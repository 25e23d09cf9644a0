use std::io;

use crate::compression::{CompressionType, DecompressError};
use crate::metadata::MetadataError;

/// which part of an archive failed its integrity check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityTarget {
    Footer,
    FilesTable,
    /// compressed payload of a file, as stored on disk
    Compressed(String),
    /// decoded content of a file
    Original(String),
}

impl std::fmt::Display for IntegrityTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityTarget::Footer => f.write_str("footer"),
            IntegrityTarget::FilesTable => f.write_str("files table"),
            IntegrityTarget::Compressed(path) => write!(f, "compressed data of `{path}`"),
            IntegrityTarget::Original(path) => write!(f, "content of `{path}`"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("not a recognized archive, trailing marker is `{}`", .marker.escape_ascii())]
    NotAnArchive { marker: [u8; 4] },
    #[error("archive is truncated, {what} doesn't fit in {size} bytes")]
    Truncated { what: &'static str, size: u64 },
    #[error("crc32 mismatch in {target}, expected {expected:#010x} but got {actual:#010x}")]
    IntegrityMismatch {
        target: IntegrityTarget,
        expected: u32,
        actual: u32,
    },
    #[error("{0} compression is recognized but not supported")]
    UnsupportedCompression(CompressionType),
    #[error("unknown compression type {0}")]
    UnknownCompression(u32),
    #[error("failed to decompress {what}")]
    DecompressionFailed {
        what: String,
        #[source]
        source: DecompressError,
    },
    #[error("number of file names ({names}) doesn't match with files table ({entries})")]
    NameCountMismatch { names: usize, entries: usize },
    #[error("file name {index} is not valid utf-8")]
    InvalidFileName { index: usize },
    #[error("no such file `{0}`")]
    NotFound(String),
    #[error("malformed meta block")]
    MalformedMetadata(#[from] MetadataError),
    #[error("failed to parse archive structure")]
    Parse(#[from] binrw::Error),
}

impl ArchiveError {
    /// map a decompression error, keeping unsupported compression as its own error
    pub(crate) fn decompress(what: impl Into<String>, source: DecompressError) -> Self {
        match source {
            DecompressError::Unsupported(ty) => ArchiveError::UnsupportedCompression(ty),
            source => ArchiveError::DecompressionFailed {
                what: what.into(),
                source,
            },
        }
    }

    /// whatever this error mean the file isn't a usable archive at all
    pub fn is_bad_archive(&self) -> bool {
        matches!(
            self,
            ArchiveError::NotAnArchive { .. }
                | ArchiveError::Truncated { .. }
                | ArchiveError::IntegrityMismatch { .. }
        )
    }
}
