//! lite (`DVPL`) on-disk structures
//!
//! a lite archive is a single payload followed by a [`LiteFooter`]

use binrw::binrw;

pub const MARKER: [u8; 4] = *b"DVPL";

/// fixed size of [`LiteFooter`] on disk
pub const FOOTER_SIZE: u64 = 4 * 4 + 4;

const _: () = assert!(FOOTER_SIZE == 20);

#[binrw]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "raw_structure", derive(serde::Serialize))]
#[brw(little)]
pub struct LiteFooter {
    pub size_uncompressed: u32,
    pub size_compressed: u32,
    pub crc32_compressed: u32,
    /// compression type tag, see [`crate::compression::CompressionType`]
    pub kind: u32,
    pub marker: [u8; 4],
}
