//! compression dispatch shared by both formats

use std::fmt;

/// compression type tag stored with every payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CompressionType {
    /// bytes are stored as is
    Stored = 0,
    Lz4 = 1,
    /// high compression lz4, decoded exactly like [`CompressionType::Lz4`]
    Lz4Hc = 2,
    /// deflate, recognized but there's no decoder for it
    Rfc1951 = 3,
}

impl CompressionType {
    /// short name used in listings
    pub fn name(self) -> &'static str {
        match self {
            CompressionType::Stored => "none",
            CompressionType::Lz4 => "lz4",
            CompressionType::Lz4Hc => "lz4hc",
            CompressionType::Rfc1951 => "deflate",
        }
    }
}

impl TryFrom<u32> for CompressionType {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CompressionType::Stored),
            1 => Ok(CompressionType::Lz4),
            2 => Ok(CompressionType::Lz4Hc),
            3 => Ok(CompressionType::Rfc1951),
            other => Err(other),
        }
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// errors that can happen during decompression
#[derive(Debug, thiserror::Error)]
pub enum DecompressError {
    #[error("failed to decompress using lz4")]
    Lz4(#[from] lz4_flex::block::DecompressError),
    #[error("lz4 produced {actual} bytes but {expected} bytes were expected")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("{0} compression is not supported")]
    Unsupported(CompressionType),
}

/// decode `input` into a buffer of exactly `original_size` bytes
pub fn decompress(
    input: &[u8],
    compression_type: CompressionType,
    original_size: usize,
) -> Result<Vec<u8>, DecompressError> {
    match compression_type {
        CompressionType::Stored => Ok(input.to_vec()),
        CompressionType::Lz4 | CompressionType::Lz4Hc => {
            let (output, written) = lz4_decompress(input, original_size)?;
            if written != original_size {
                return Err(DecompressError::SizeMismatch {
                    expected: original_size,
                    actual: written,
                });
            }
            Ok(output)
        }
        CompressionType::Rfc1951 => Err(DecompressError::Unsupported(compression_type)),
    }
}

/// decode a raw lz4 block into a buffer of `size` bytes.
///
/// return the buffer and the number of bytes that the decoder actually produced,
/// the caller decide how strict it want to be about the difference.
pub fn lz4_decompress(input: &[u8], size: usize) -> Result<(Vec<u8>, usize), DecompressError> {
    let mut output = vec![0_u8; size];
    let written = lz4_flex::block::decompress_into(input, &mut output)?;
    Ok((output, written))
}
