//! superpack (`DVPK`) on-disk structures
//!
//! everything is little endian and located from the end of the file backward:
//!
//! ```text
//! [files data][meta block][files table: entries + lz4 names][footer]
//! ```

use binrw::binrw;

use super::common;

pub const MARKER: [u8; 4] = *b"DVPK";

/// fixed size of [`Footer`] on disk
pub const FOOTER_SIZE: u64 = 8 + 4 + 4 + 4 + FOOTER_INFO_SIZE;
/// fixed size of [`FooterInfo`] on disk
pub const FOOTER_INFO_SIZE: u64 = 5 * 4 + 4;
/// fixed size of [`FileTableEntry`] on disk
pub const FILE_TABLE_ENTRY_SIZE: u64 = 8 + 6 * 4;

// any change here breaks every archive that is already out there
const _: () = assert!(FOOTER_SIZE == 44);
const _: () = assert!(FOOTER_INFO_SIZE == 24);
const _: () = assert!(FILE_TABLE_ENTRY_SIZE == 32);

#[binrw]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "raw_structure", derive(serde::Serialize))]
#[brw(little)]
pub struct Footer {
    pub reserved: [u8; 8],
    pub meta_data_crc32: u32,
    pub meta_data_size: u32,
    pub info_crc32: u32,
    pub info: FooterInfo,
}

impl Footer {
    /// crc32 of the info sub-record, as it should be stored in `info_crc32`
    pub fn compute_info_crc32(&self) -> binrw::BinResult<u32> {
        common::generate_crc32(&self.info, binrw::Endian::Little)
    }

    /// offset of the files table, counted from the start of the file
    pub fn files_table_start(&self, total_size: u64) -> Option<u64> {
        total_size.checked_sub(FOOTER_SIZE + self.info.files_table_size as u64)
    }

    /// offset of the meta block, counted from the start of the file
    pub fn meta_data_start(&self, total_size: u64) -> Option<u64> {
        self.files_table_start(total_size)?
            .checked_sub(self.meta_data_size as u64)
    }
}

#[binrw]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "raw_structure", derive(serde::Serialize))]
#[brw(little)]
pub struct FooterInfo {
    pub num_files: u32,
    pub names_size_compressed: u32,
    pub names_size_original: u32,
    pub files_table_size: u32,
    pub files_table_crc32: u32,
    pub marker: [u8; 4],
}

impl FooterInfo {
    /// size of the entries part of the files table
    pub fn entries_size(&self) -> u64 {
        self.num_files as u64 * FILE_TABLE_ENTRY_SIZE
    }
}

#[binrw]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "raw_structure", derive(serde::Serialize))]
#[brw(little)]
pub struct FileTableEntry {
    pub start_position: u64,
    pub compressed_size: u32,
    pub original_size: u32,
    pub compressed_crc32: u32,
    /// compression type tag, see [`crate::compression::CompressionType`]
    pub kind: u32,
    pub original_crc32: u32,
    /// reserved, readers don't use it
    pub meta_index: u32,
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use binrw::BinWrite;

    use super::*;

    fn written_len<T>(value: &T) -> usize
    where
        for<'a> T: BinWrite<Args<'a> = ()> + binrw::meta::WriteEndian,
    {
        let mut cursor = Cursor::new(Vec::new());
        value.write(&mut cursor).unwrap();
        cursor.into_inner().len()
    }

    #[test]
    fn structure_sizes() {
        assert_eq!(written_len(&Footer::default()), FOOTER_SIZE as usize);
        assert_eq!(written_len(&FooterInfo::default()), FOOTER_INFO_SIZE as usize);
        assert_eq!(
            written_len(&FileTableEntry::default()),
            FILE_TABLE_ENTRY_SIZE as usize
        );
    }

    #[test]
    fn info_crc32_covers_only_info() {
        let mut footer = Footer {
            info: FooterInfo {
                num_files: 3,
                marker: MARKER,
                ..Default::default()
            },
            ..Default::default()
        };
        let before = footer.compute_info_crc32().unwrap();

        footer.meta_data_size = 100;
        footer.reserved = [1; 8];
        assert_eq!(footer.compute_info_crc32().unwrap(), before);

        footer.info.num_files = 4;
        assert_ne!(footer.compute_info_crc32().unwrap(), before);
    }

    #[test]
    fn block_offsets() {
        let footer = Footer {
            meta_data_size: 10,
            info: FooterInfo {
                files_table_size: 50,
                ..Default::default()
            },
            ..Default::default()
        };

        assert_eq!(footer.files_table_start(200), Some(200 - 44 - 50));
        assert_eq!(footer.meta_data_start(200), Some(200 - 44 - 50 - 10));
        assert_eq!(footer.files_table_start(60), None);
    }
}
