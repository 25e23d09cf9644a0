//! lite (`DVPL`) reader, a container for exactly one file

use std::{
    fmt,
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
};

use binrw::{BinRead, io::BufReader};

use super::entry::FileRecord;
use super::error::{ArchiveError, IntegrityTarget};
use crate::compression::{self, CompressionType};
use crate::structures::checksum;
use crate::structures::dvpl::{FOOTER_SIZE, LiteFooter, MARKER};

const EXTENSION: &str = ".dvpl";

pub struct LiteArchive<R = BufReader<File>> {
    reader: R,
    footer: LiteFooter,
    file: FileRecord,
}

impl LiteArchive {
    /// open a lite archive, the name of the file inside it is derived from the
    /// archive file name (`sound.ogg.dvpl` contain `sound.ogg`)
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        log::debug!("opening lite archive {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), relative_path_for(path))
    }
}

impl<R: Read + Seek> LiteArchive<R> {
    /// parse a lite archive from the given reader, `relative_path` is the name
    /// that the single file inside it will be known by
    pub fn from_reader(mut reader: R, relative_path: String) -> Result<Self, ArchiveError> {
        let total_size = reader.seek(SeekFrom::End(0))?;
        if total_size < FOOTER_SIZE {
            return Err(ArchiveError::Truncated {
                what: "lite footer",
                size: total_size,
            });
        }

        reader.seek(SeekFrom::Start(total_size - FOOTER_SIZE))?;
        let footer = LiteFooter::read(&mut reader)?;

        if footer.marker != MARKER {
            return Err(ArchiveError::NotAnArchive {
                marker: footer.marker,
            });
        }

        if footer.size_compressed as u64 > total_size - FOOTER_SIZE {
            return Err(ArchiveError::Truncated {
                what: "lite payload",
                size: total_size,
            });
        }

        let compression_type =
            CompressionType::try_from(footer.kind).map_err(ArchiveError::UnknownCompression)?;

        if compression_type == CompressionType::Stored
            && footer.size_compressed != footer.size_uncompressed
        {
            log::warn!(
                "stored lite archive `{relative_path}` have different sizes ({} and {})",
                footer.size_compressed,
                footer.size_uncompressed
            );
        }

        log::debug!("lite footer: {footer:?}");

        let file = FileRecord {
            relative_path,
            original_size: footer.size_uncompressed,
            compressed_size: footer.size_compressed,
            compression_type,
            checksum: footer.crc32_compressed,
        };

        Ok(Self {
            reader,
            footer,
            file,
        })
    }

    /// get the content of the file, decompressed if needed
    pub fn extract(&mut self, relative_path: &str) -> Result<Vec<u8>, ArchiveError> {
        self.ensure_name(relative_path)?;

        let compression_type = self.file.compression_type;
        if compression_type == CompressionType::Rfc1951 {
            return Err(ArchiveError::UnsupportedCompression(compression_type));
        }

        let raw = self.read_payload()?;

        match compression_type {
            // stored payload is returned as is, whatever size the footer claim
            CompressionType::Stored => Ok(raw),
            _ => compression::decompress(
                &raw,
                compression_type,
                self.footer.size_uncompressed as usize,
            )
            .map_err(|e| ArchiveError::decompress(relative_path, e)),
        }
    }

    /// validate crc32 of the payload against the one in footer
    pub fn verify(&mut self) -> Result<(), ArchiveError> {
        let raw = self.read_payload()?;
        let actual = checksum::crc32(&raw);
        if actual != self.footer.crc32_compressed {
            return Err(ArchiveError::IntegrityMismatch {
                target: IntegrityTarget::Compressed(self.file.relative_path.clone()),
                expected: self.footer.crc32_compressed,
                actual,
            });
        }

        Ok(())
    }

    /// the payload always start at the beginning of the file
    fn read_payload(&mut self) -> Result<Vec<u8>, ArchiveError> {
        self.reader.seek(SeekFrom::Start(0))?;
        let mut buf = vec![0_u8; self.footer.size_compressed as usize];
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}

impl<R> LiteArchive<R> {
    /// the single file in this archive
    pub fn file(&self) -> &FileRecord {
        &self.file
    }

    pub fn files(&self) -> &[FileRecord] {
        std::slice::from_ref(&self.file)
    }

    pub fn find(&self, relative_path: &str) -> Option<&FileRecord> {
        (self.file.relative_path == relative_path).then_some(&self.file)
    }

    pub fn has_file(&self, relative_path: &str) -> bool {
        self.file.relative_path == relative_path
    }

    /// the raw footer of the archive
    #[cfg(feature = "raw_structure")]
    pub fn raw_footer(&self) -> &LiteFooter {
        &self.footer
    }

    fn ensure_name(&self, relative_path: &str) -> Result<(), ArchiveError> {
        if self.has_file(relative_path) {
            Ok(())
        } else {
            Err(ArchiveError::NotFound(relative_path.to_owned()))
        }
    }
}

impl<R> fmt::Debug for LiteArchive<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiteArchive")
            .field("footer", &self.footer)
            .field("file", &self.file)
            .finish()
    }
}

/// name of the file inside a lite archive: the archive file name without `.dvpl`
pub fn relative_path_for(path: &Path) -> String {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let split = name.len().saturating_sub(EXTENSION.len());
    let has_extension = name.len() > EXTENSION.len()
        && name
            .get(split..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION));

    if has_extension {
        name.truncate(split);
    }

    name
}
