use crate::compression::CompressionType;

/// public info about a file inside an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub(crate) relative_path: String,
    pub(crate) original_size: u32,
    pub(crate) compressed_size: u32,
    pub(crate) compression_type: CompressionType,
    pub(crate) checksum: u32,
}

impl FileRecord {
    /// archive internal path, always separated with `/`
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn original_size(&self) -> u32 {
        self.original_size
    }

    pub fn compressed_size(&self) -> u32 {
        self.compressed_size
    }

    pub fn compression_type(&self) -> CompressionType {
        self.compression_type
    }

    /// crc32 of the compressed bytes as they are stored on disk
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// whatever the file is stored compressed
    pub fn is_compressed(&self) -> bool {
        self.compression_type != CompressionType::Stored
    }
}
