//! reader for `DVPK` superpacks and `DVPL` lite archives
//!
//! ```no_run
//! use dvpk_archive::archive::Archive;
//!
//! let mut archive = Archive::open("data.dvpk")?;
//! for file in archive.files().to_vec() {
//!     let bytes = archive.extract(file.relative_path())?;
//!     assert_eq!(bytes.len(), file.original_size() as usize);
//! }
//! # Ok::<(), dvpk_archive::archive::ArchiveError>(())
//! ```

pub use utils::{read_marker, try_detect_format};

pub mod archive;
pub mod compression;
pub mod metadata;

#[cfg(feature = "raw_structure")]
pub mod structures;
#[cfg(not(feature = "raw_structure"))]
mod structures;

mod utils;

/// archive formats, told apart by the last four bytes of the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// multi file superpack, ends with `DVPK`
    Pack,
    /// single file lite archive, ends with `DVPL`
    Lite,
}

impl Format {
    pub fn from_marker(marker: &[u8; 4]) -> Option<Self> {
        match marker {
            b"DVPK" => Some(Format::Pack),
            b"DVPL" => Some(Format::Lite),
            _ => None,
        }
    }
}
