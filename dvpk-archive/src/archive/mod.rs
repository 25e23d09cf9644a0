//! a full abstraction over superpack and lite archives

use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
};

use binrw::io::BufReader;

use crate::metadata::MetaData;
use crate::{Format, read_marker};

pub use describe::Description;
pub use entry::FileRecord;
pub use error::{ArchiveError, IntegrityTarget};
pub use file_helpers::{Header, HeaderWalker, META_ENTRY_NAME};
pub use lite::LiteArchive;
pub use pack::{ArchiveInfo, PackArchive};

mod describe;
pub mod entry;
pub mod error;
pub mod file_helpers;
pub mod lite;
pub mod pack;

/// ## archive abstraction over both formats
///
/// use [`Archive::open`] to detect the format from the trailing marker and load
/// the matching reader.
///
/// every method that read file contents take `&mut self` because it move the
/// underlying file cursor, to extract from several threads open one archive per
/// thread.
pub enum Archive<R = BufReader<File>> {
    Pack(PackArchive<R>),
    Lite(LiteArchive<R>),
}

impl Archive {
    /// open the archive at the given path, the format is detected from the
    /// last four bytes of the file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let format = detect(&mut reader)?;
        log::info!("{} detected as {format:?}", path.display());

        match format {
            Format::Pack => PackArchive::from_reader(reader).map(Archive::Pack),
            Format::Lite => {
                LiteArchive::from_reader(reader, lite::relative_path_for(path)).map(Archive::Lite)
            }
        }
    }
}

impl<R: Read + Seek> Archive<R> {
    /// detect the format and load the archive from a reader. `lite_name` is only
    /// used when the reader turns out to be a lite archive.
    pub fn from_reader(mut reader: R, lite_name: impl Into<String>) -> Result<Self, ArchiveError> {
        match detect(&mut reader)? {
            Format::Pack => PackArchive::from_reader(reader).map(Archive::Pack),
            Format::Lite => LiteArchive::from_reader(reader, lite_name.into()).map(Archive::Lite),
        }
    }

    /// get the content of a file, decompressed if needed
    pub fn extract(&mut self, relative_path: &str) -> Result<Vec<u8>, ArchiveError> {
        match self {
            Archive::Pack(archive) => archive.extract(relative_path),
            Archive::Lite(archive) => archive.extract(relative_path),
        }
    }

    /// extract anything a [`Header`] can name, including the synthetic meta entry
    pub fn extract_header(&mut self, path: &str) -> Result<Vec<u8>, ArchiveError> {
        if path == META_ENTRY_NAME && !self.has_file(path) && self.has_metadata() {
            return Ok(self.describe().into_bytes());
        }

        self.extract(path)
    }

    /// validate the stored crc32 of a single file
    pub fn verify(&mut self, relative_path: &str) -> Result<(), ArchiveError> {
        match self {
            Archive::Pack(archive) => archive.verify(relative_path),
            Archive::Lite(archive) => {
                if !archive.has_file(relative_path) {
                    return Err(ArchiveError::NotFound(relative_path.to_owned()));
                }
                archive.verify()
            }
        }
    }

    /// validate every file, return the files that failed with their error
    pub fn verify_all(&mut self) -> Vec<(String, ArchiveError)> {
        let paths: Vec<String> = self
            .files()
            .iter()
            .map(|file| file.relative_path().to_owned())
            .collect();

        paths
            .into_iter()
            .filter_map(|path| match self.verify(&path) {
                Ok(()) => None,
                Err(e) => {
                    log::warn!("`{path}` failed verification: {e}");
                    Some((path, e))
                }
            })
            .collect()
    }
}

impl<R> Archive<R> {
    pub fn format(&self) -> Format {
        match self {
            Archive::Pack(_) => Format::Pack,
            Archive::Lite(_) => Format::Lite,
        }
    }

    /// all files, in the order they are stored
    pub fn files(&self) -> &[FileRecord] {
        match self {
            Archive::Pack(archive) => archive.files(),
            Archive::Lite(archive) => archive.files(),
        }
    }

    pub fn find(&self, relative_path: &str) -> Option<&FileRecord> {
        match self {
            Archive::Pack(archive) => archive.find(relative_path),
            Archive::Lite(archive) => archive.find(relative_path),
        }
    }

    pub fn has_file(&self, relative_path: &str) -> bool {
        match self {
            Archive::Pack(archive) => archive.has_file(relative_path),
            Archive::Lite(archive) => archive.has_file(relative_path),
        }
    }

    /// lite archives never have meta data
    pub fn has_metadata(&self) -> bool {
        match self {
            Archive::Pack(archive) => archive.has_metadata(),
            Archive::Lite(_) => false,
        }
    }

    pub fn metadata(&self) -> Option<&MetaData> {
        match self {
            Archive::Pack(archive) => archive.metadata(),
            Archive::Lite(_) => None,
        }
    }

    /// text table of everything inside the archive
    pub fn describe(&self) -> String {
        match self {
            Archive::Pack(archive) => archive.describe(),
            Archive::Lite(archive) => {
                let file = archive.file();
                format!(
                    "DVPL info\n{:<18}{}\n{:<18}{}\n{:<18}{}\n{:<18}{}\n{:<18}{:#010x}\n",
                    "file:",
                    file.relative_path(),
                    "compression:",
                    file.compression_type(),
                    "original_size:",
                    file.original_size(),
                    "compressed_size:",
                    file.compressed_size(),
                    "compressed_crc32:",
                    file.checksum(),
                )
            }
        }
    }
}

impl<R> std::fmt::Debug for Archive<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("format", &self.format())
            .field("files", &format!("[FileRecord; {}]", self.files().len()))
            .field("has_metadata", &self.has_metadata())
            .finish()
    }
}

fn detect<R: Read + Seek>(reader: &mut R) -> Result<Format, ArchiveError> {
    let Some(marker) = read_marker(reader)? else {
        let size = reader.seek(SeekFrom::End(0))?;
        return Err(ArchiveError::Truncated {
            what: "marker",
            size,
        });
    };

    Format::from_marker(&marker).ok_or(ArchiveError::NotAnArchive { marker })
}
