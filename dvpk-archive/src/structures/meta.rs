//! raw superpack meta block
//!
//! ```text
//! (4b) header - "met2"
//! (4b) num_files
//! (4b * num_files) pack index of each file
//! (4b) uncompressed size of the pack table
//! (4b) compressed size of the pack table
//! (compressed size b) lz4 compressed pack table ("<name> <dependency>\n" lines)
//! (4b) num_packs_with_children
//! repeated num_packs_with_children times:
//!     (4b) pack index
//!     (4b) num_children
//!     (4b * num_children) child pack indexes
//! ```

use binrw::binrw;

#[binrw]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "raw_structure", derive(serde::Serialize))]
#[brw(little, magic = b"met2")]
pub struct MetaBlock {
    pub num_files: u32,
    #[br(count = num_files)]
    pub file_to_pack: Vec<u32>,
    pub uncompressed_size: u32,
    pub compressed_size: u32,
    #[br(count = compressed_size)]
    pub packs_compressed: Vec<u8>,
    pub num_packs_with_children: u32,
    #[br(count = num_packs_with_children)]
    pub children: Vec<ChildrenRow>,
}

#[binrw]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "raw_structure", derive(serde::Serialize))]
#[brw(little)]
pub struct ChildrenRow {
    /// writers call this `child_pack_index`, but it's the index of the pack that
    /// owns the `children` that follow
    pub pack_index: u32,
    pub num_children: u32,
    #[br(count = num_children)]
    pub children: Vec<u32>,
}
