//! this module make it easier to walk over files inside archives the way file
//! manager plugins expect it: every file, then one synthetic `meta.meta` entry
//! when the archive have meta data, then an end marker.

use super::Archive;
use super::entry::FileRecord;

/// name of the synthetic entry that hold the archive description
pub const META_ENTRY_NAME: &str = "meta.meta";

/// a single header reported while walking an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header<'a> {
    File(&'a FileRecord),
    /// synthetic entry, its content is [`Archive::describe`]
    Meta { pack_count: usize },
}

impl Header<'_> {
    pub fn path(&self) -> &str {
        match self {
            Header::File(file) => file.relative_path(),
            Header::Meta { .. } => META_ENTRY_NAME,
        }
    }

    /// reported size, for the meta entry this is the number of packs
    pub fn size(&self) -> u64 {
        match self {
            Header::File(file) => file.original_size() as u64,
            Header::Meta { pack_count } => *pack_count as u64,
        }
    }

    pub fn crc32(&self) -> Option<u32> {
        match self {
            Header::File(file) => Some(file.checksum()),
            Header::Meta { .. } => None,
        }
    }
}

/// walks the headers of an archive, returning `None` once at the end and
/// starting over on the next call
#[derive(Debug, Default)]
pub struct HeaderWalker {
    index: usize,
    meta_reported: bool,
}

impl HeaderWalker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_header<'a, R>(&mut self, archive: &'a Archive<R>) -> Option<Header<'a>> {
        if let Some(file) = archive.files().get(self.index) {
            self.index += 1;
            return Some(Header::File(file));
        }

        if !self.meta_reported {
            self.meta_reported = true;
            if let Some(meta) = archive.metadata() {
                return Some(Header::Meta {
                    pack_count: meta.pack_count(),
                });
            }
        }

        log::debug!("end of archive after {} headers", self.index);
        self.reset();
        None
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.meta_reported = false;
    }

    /// collect one full pass of headers
    pub fn collect<'a, R>(archive: &'a Archive<R>) -> Vec<Header<'a>> {
        let mut walker = Self::new();
        std::iter::from_fn(|| walker.next_header(archive)).collect()
    }
}
