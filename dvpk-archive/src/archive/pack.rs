//! superpack (`DVPK`) reader

use std::{
    fmt,
    fs::File,
    io::{Cursor, Read, Seek, SeekFrom},
    path::Path,
};

use binrw::{BinRead, Endian, VecArgs, io::BufReader};

use super::entry::FileRecord;
use super::error::{ArchiveError, IntegrityTarget};
use crate::compression::{self, CompressionType};
use crate::metadata::{MetaData, MetadataError};
use crate::structures::checksum;
use crate::structures::dvpk::{FOOTER_SIZE, FileTableEntry, Footer, MARKER};

/// crc32s and file count stored in the superpack footer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveInfo {
    pub info_crc32: u32,
    pub meta_data_crc32: u32,
    pub total_files: u32,
}

/// ## superpack reader
///
/// the whole footer, files table and meta block are parsed and validated
/// when the archive is opened, file contents are read on demand.
pub struct PackArchive<R = BufReader<File>> {
    reader: R,
    footer: Footer,
    entries: Vec<FileTableEntry>,
    files: Vec<FileRecord>,
    lookup: ahash::HashMap<String, usize>,
    metadata: Option<MetaData>,
}

impl PackArchive {
    /// open and validate the superpack at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        log::debug!("opening superpack {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> PackArchive<R> {
    /// parse a superpack from the given reader
    pub fn from_reader(mut reader: R) -> Result<Self, ArchiveError> {
        let total_size = reader.seek(SeekFrom::End(0))?;
        if total_size < FOOTER_SIZE {
            return Err(ArchiveError::Truncated {
                what: "footer",
                size: total_size,
            });
        }

        reader.seek(SeekFrom::Start(total_size - FOOTER_SIZE))?;
        let footer = Footer::read(&mut reader)?;

        let info_crc32 = footer.compute_info_crc32()?;
        if info_crc32 != footer.info_crc32 {
            return Err(ArchiveError::IntegrityMismatch {
                target: IntegrityTarget::Footer,
                expected: footer.info_crc32,
                actual: info_crc32,
            });
        }

        if footer.info.marker != MARKER {
            return Err(ArchiveError::NotAnArchive {
                marker: footer.info.marker,
            });
        }

        log::debug!("superpack footer: {footer:?}");

        let (entries, names) = if footer.info.num_files == 0 {
            log::info!("superpack doesn't contain any file");
            (Vec::new(), Vec::new())
        } else {
            read_files_table(&mut reader, &footer, total_size)?
        };

        let (files, lookup) = map_files(&entries, names)?;

        let metadata = if footer.meta_data_size > 0 {
            let metadata = read_metadata(&mut reader, &footer, total_size)?;
            if metadata.file_count() != files.len() {
                return Err(MetadataError::FileCountMismatch {
                    meta: metadata.file_count(),
                    archive: files.len(),
                }
                .into());
            }
            Some(metadata)
        } else {
            None
        };

        log::info!(
            "loaded superpack with {} files and {} packs",
            files.len(),
            metadata.as_ref().map_or(0, MetaData::pack_count)
        );

        Ok(Self {
            reader,
            footer,
            entries,
            files,
            lookup,
            metadata,
        })
    }

    /// get the content of a file, decompressed if needed
    pub fn extract(&mut self, relative_path: &str) -> Result<Vec<u8>, ArchiveError> {
        let index = self.index_of(relative_path)?;
        let entry = &self.entries[index];
        let compression_type = self.files[index].compression_type;

        let raw = read_payload(&mut self.reader, entry, compression_type)?;

        compression::decompress(&raw, compression_type, entry.original_size as usize)
            .map_err(|e| ArchiveError::decompress(relative_path, e))
    }

    /// validate the stored crc32 of a file, both the compressed bytes and the
    /// decompressed content (when it can be decompressed)
    pub fn verify(&mut self, relative_path: &str) -> Result<(), ArchiveError> {
        let index = self.index_of(relative_path)?;
        let entry = &self.entries[index];
        let compression_type = self.files[index].compression_type;

        let stored_size = stored_size(entry, compression_type);
        self.reader.seek(SeekFrom::Start(entry.start_position))?;
        let mut raw = vec![0_u8; stored_size];
        self.reader.read_exact(&mut raw)?;

        let actual = checksum::crc32(&raw);
        if actual != entry.compressed_crc32 {
            return Err(ArchiveError::IntegrityMismatch {
                target: IntegrityTarget::Compressed(relative_path.to_owned()),
                expected: entry.compressed_crc32,
                actual,
            });
        }

        if compression_type == CompressionType::Rfc1951 {
            log::debug!("can't check content of `{relative_path}`, deflate isn't supported");
            return Ok(());
        }

        let content = compression::decompress(&raw, compression_type, entry.original_size as usize)
            .map_err(|e| ArchiveError::decompress(relative_path, e))?;

        let actual = checksum::crc32(&content);
        if actual != entry.original_crc32 {
            return Err(ArchiveError::IntegrityMismatch {
                target: IntegrityTarget::Original(relative_path.to_owned()),
                expected: entry.original_crc32,
                actual,
            });
        }

        Ok(())
    }
}

impl<R> PackArchive<R> {
    /// all files in the order of the files table
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn find(&self, relative_path: &str) -> Option<&FileRecord> {
        self.lookup.get(relative_path).map(|&i| &self.files[i])
    }

    pub fn has_file(&self, relative_path: &str) -> bool {
        self.lookup.contains_key(relative_path)
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata.is_some()
    }

    pub fn metadata(&self) -> Option<&MetaData> {
        self.metadata.as_ref()
    }

    /// crc32s and file count from the footer
    pub fn info(&self) -> ArchiveInfo {
        ArchiveInfo {
            info_crc32: self.footer.info_crc32,
            meta_data_crc32: self.footer.meta_data_crc32,
            total_files: self.footer.info.num_files,
        }
    }

    /// raw files table entries, in the same order as [`Self::files`]
    pub(crate) fn entries(&self) -> &[FileTableEntry] {
        &self.entries
    }

    /// the raw footer of the archive
    #[cfg(feature = "raw_structure")]
    pub fn raw_footer(&self) -> &Footer {
        &self.footer
    }

    /// the raw files table entries
    #[cfg(feature = "raw_structure")]
    pub fn raw_entries(&self) -> &[FileTableEntry] {
        &self.entries
    }

    fn index_of(&self, relative_path: &str) -> Result<usize, ArchiveError> {
        self.lookup
            .get(relative_path)
            .copied()
            .ok_or_else(|| ArchiveError::NotFound(relative_path.to_owned()))
    }
}

impl<R> fmt::Debug for PackArchive<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackArchive")
            .field("footer", &self.footer)
            .field("files", &format!("[FileRecord; {}]", self.files.len()))
            .field("has_metadata", &self.metadata.is_some())
            .finish()
    }
}

#[inline]
fn stored_size(entry: &FileTableEntry, compression_type: CompressionType) -> usize {
    match compression_type {
        CompressionType::Stored => entry.original_size as usize,
        _ => entry.compressed_size as usize,
    }
}

fn read_payload<R: Read + Seek>(
    reader: &mut R,
    entry: &FileTableEntry,
    compression_type: CompressionType,
) -> Result<Vec<u8>, ArchiveError> {
    if compression_type == CompressionType::Rfc1951 {
        return Err(ArchiveError::UnsupportedCompression(compression_type));
    }

    reader.seek(SeekFrom::Start(entry.start_position))?;
    let mut buf = vec![0_u8; stored_size(entry, compression_type)];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// read and validate the files table, return the entries and their names
fn read_files_table<R: Read + Seek>(
    reader: &mut R,
    footer: &Footer,
    total_size: u64,
) -> Result<(Vec<FileTableEntry>, Vec<String>), ArchiveError> {
    let info = &footer.info;
    let start = footer
        .files_table_start(total_size)
        .ok_or(ArchiveError::Truncated {
            what: "files table",
            size: total_size,
        })?;

    log::debug!("files table offset: {start}");

    reader.seek(SeekFrom::Start(start))?;
    let mut table = vec![0_u8; info.files_table_size as usize];
    reader.read_exact(&mut table)?;

    let actual = checksum::crc32(&table);
    if actual != info.files_table_crc32 {
        return Err(ArchiveError::IntegrityMismatch {
            target: IntegrityTarget::FilesTable,
            expected: info.files_table_crc32,
            actual,
        });
    }

    let entries_size = info.entries_size();
    if entries_size + info.names_size_compressed as u64 > table.len() as u64 {
        return Err(ArchiveError::Truncated {
            what: "file entries and names",
            size: table.len() as u64,
        });
    }

    let (entries_bytes, names_bytes) = table.split_at(entries_size as usize);

    let entries = Vec::<FileTableEntry>::read_options(
        &mut Cursor::new(entries_bytes),
        Endian::Little,
        VecArgs::builder().count(info.num_files as usize).finalize(),
    )?;

    let names = compression::decompress(
        &names_bytes[..info.names_size_compressed as usize],
        CompressionType::Lz4,
        info.names_size_original as usize,
    )
    .map_err(|e| ArchiveError::decompress("file names", e))?;

    let names = split_names(&names, entries.len())?;

    Ok((entries, names))
}

/// split the `\0` terminated file names
fn split_names(names: &[u8], expected: usize) -> Result<Vec<String>, ArchiveError> {
    let count = names.iter().filter(|&&b| b == 0).count();
    if count != expected {
        return Err(ArchiveError::NameCountMismatch {
            names: count,
            entries: expected,
        });
    }

    names
        .split(|&b| b == 0)
        .take(count)
        .enumerate()
        .map(|(index, name)| {
            String::from_utf8(name.to_vec()).map_err(|_| ArchiveError::InvalidFileName { index })
        })
        .collect()
}

type Files = (Vec<FileRecord>, ahash::HashMap<String, usize>);

/// build the public file list and the path lookup
fn map_files(entries: &[FileTableEntry], names: Vec<String>) -> Result<Files, ArchiveError> {
    let mut files = Vec::with_capacity(entries.len());
    let mut lookup = ahash::HashMap::default();

    for (index, (entry, name)) in entries.iter().zip(names).enumerate() {
        let compression_type =
            CompressionType::try_from(entry.kind).map_err(ArchiveError::UnknownCompression)?;

        if lookup.contains_key(&name) {
            log::warn!("duplicated file `{name}` in files table, keeping the first one");
        } else {
            lookup.insert(name.clone(), index);
        }

        files.push(FileRecord {
            relative_path: name,
            original_size: entry.original_size,
            compressed_size: entry.compressed_size,
            compression_type,
            checksum: entry.compressed_crc32,
        });
    }

    Ok((files, lookup))
}

fn read_metadata<R: Read + Seek>(
    reader: &mut R,
    footer: &Footer,
    total_size: u64,
) -> Result<MetaData, ArchiveError> {
    let start = footer
        .meta_data_start(total_size)
        .ok_or(ArchiveError::Truncated {
            what: "meta block",
            size: total_size,
        })?;

    log::debug!("meta block offset: {start}, size: {}", footer.meta_data_size);

    reader.seek(SeekFrom::Start(start))?;
    let mut block = vec![0_u8; footer.meta_data_size as usize];
    reader.read_exact(&mut block)?;

    let actual = checksum::crc32(&block);
    if actual != footer.meta_data_crc32 {
        log::debug!(
            "meta block crc32 is {actual:#010x}, footer say {:#010x}",
            footer.meta_data_crc32
        );
    }

    Ok(MetaData::from_bytes(&block)?)
}
