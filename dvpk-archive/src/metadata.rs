//! decoded superpack meta block: which pack every file belong to, the packs
//! themselves and the dependency graph between them.

use std::{io::Cursor, num::ParseIntError};

use binrw::BinRead;

use crate::compression;
use crate::structures::meta::{ChildrenRow, MetaBlock};

/// errors that can happen while decoding the meta block
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("meta block doesn't start with `met2` header")]
    BadHeader,
    #[error("meta block is truncated or malformed")]
    Parse(#[source] binrw::Error),
    #[error("can't decompress pack table")]
    Decompress(#[from] compression::DecompressError),
    #[error("pack table is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("can't parse pack table line {line}, no space between name and dependencies")]
    PackLine { line: usize },
    #[error("file {file} refer to pack {pack} but there are only {packs} packs")]
    PackIndexOutOfRange { file: usize, pack: u32, packs: usize },
    #[error("children table refer to pack {pack} but there are only {packs} packs")]
    ChildrenIndexOutOfRange { pack: u32, packs: usize },
    #[error("meta block describe {meta} files but the archive have {archive}")]
    FileCountMismatch { meta: usize, archive: usize },
}

impl From<binrw::Error> for MetadataError {
    fn from(value: binrw::Error) -> Self {
        // derived readers may wrap the error with field context
        match value.root_cause() {
            binrw::Error::BadMagic { .. } => MetadataError::BadHeader,
            _ => MetadataError::Parse(value),
        }
    }
}

/// name and dependency text of a pack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackInfo {
    name: String,
    dependencies: String,
}

impl PackInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// free form dependency text, as stored in the archive
    pub fn dependencies(&self) -> &str {
        &self.dependencies
    }

    /// parse dependency text written by the engine tools, a `", "` separated list
    /// of pack indexes. result is sorted and without duplicates.
    pub fn dependency_indexes(&self) -> Result<Vec<u32>, ParseIntError> {
        let mut indexes = self
            .dependencies
            .split(", ")
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<u32>, _>>()?;

        indexes.sort_unstable();
        indexes.dedup();
        Ok(indexes)
    }
}

/// meta data attached to a superpack
#[derive(Debug, Clone)]
pub struct MetaData {
    file_to_pack: Vec<u32>,
    packs: Vec<PackInfo>,
    children: Vec<Vec<u32>>,
    pack_by_name: ahash::HashMap<String, u32>,
}

impl MetaData {
    /// decode a meta block
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MetadataError> {
        let mut reader = Cursor::new(bytes);
        let block = MetaBlock::read(&mut reader)?;

        let trailing = bytes.len() as u64 - reader.position();
        if trailing != 0 {
            log::debug!("ignoring {trailing} trailing bytes after meta block");
        }

        Self::from_block(block)
    }

    fn from_block(block: MetaBlock) -> Result<Self, MetadataError> {
        let expected = block.uncompressed_size as usize;
        let (mut table, written) = compression::lz4_decompress(&block.packs_compressed, expected)?;
        if written != expected {
            // some tools wrote a wrong size here, we can live with it
            log::warn!(
                "pack table size mismatch, header say {expected} bytes but got {written} bytes"
            );
            table.truncate(written);
        }

        let packs = parse_pack_table(String::from_utf8(table)?)?;

        if let Some((file, &pack)) = block
            .file_to_pack
            .iter()
            .enumerate()
            .find(|(_, pack)| **pack as usize >= packs.len())
        {
            return Err(MetadataError::PackIndexOutOfRange {
                file,
                pack,
                packs: packs.len(),
            });
        }

        let mut children = vec![Vec::new(); packs.len()];
        for ChildrenRow {
            pack_index,
            children: row,
            ..
        } in block.children
        {
            let Some(slot) = children.get_mut(pack_index as usize) else {
                return Err(MetadataError::ChildrenIndexOutOfRange {
                    pack: pack_index,
                    packs: packs.len(),
                });
            };

            if let Some(&child) = row.iter().find(|&&child| child as usize >= packs.len()) {
                return Err(MetadataError::ChildrenIndexOutOfRange {
                    pack: child,
                    packs: packs.len(),
                });
            }

            if !slot.is_empty() {
                log::warn!("pack {pack_index} have more than one children row, using the last one");
            }

            *slot = row;
        }

        let mut pack_by_name = ahash::HashMap::default();
        for (index, pack) in packs.iter().enumerate() {
            pack_by_name.entry(pack.name.clone()).or_insert(index as u32);
        }

        Ok(Self {
            file_to_pack: block.file_to_pack,
            packs,
            children,
            pack_by_name,
        })
    }

    /// number of files described by the meta block
    pub fn file_count(&self) -> usize {
        self.file_to_pack.len()
    }

    /// number of packs
    pub fn pack_count(&self) -> usize {
        self.packs.len()
    }

    /// pack index of a file
    pub fn pack_for_file(&self, file_index: usize) -> Option<u32> {
        self.file_to_pack.get(file_index).copied()
    }

    /// pack index of every file, indexed by file
    pub fn file_to_pack(&self) -> &[u32] {
        &self.file_to_pack
    }

    pub fn pack_info(&self, pack_index: u32) -> Option<&PackInfo> {
        self.packs.get(pack_index as usize)
    }

    pub fn packs(&self) -> &[PackInfo] {
        &self.packs
    }

    /// find a pack by its name
    pub fn pack_index(&self, name: &str) -> Option<u32> {
        self.pack_by_name.get(name).copied()
    }

    pub fn has_pack(&self, name: &str) -> bool {
        self.pack_by_name.contains_key(name)
    }

    /// index of every file that belong to the given pack
    pub fn file_indexes(&self, pack_name: &str) -> Vec<u32> {
        let Some(pack) = self.pack_index(pack_name) else {
            return Vec::new();
        };

        self.file_to_pack
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == pack)
            .map(|(file, _)| file as u32)
            .collect()
    }

    /// direct children of a pack, in the order they are stored
    pub fn children(&self, pack_index: u32) -> &[u32] {
        self.children
            .get(pack_index as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// every pack reachable from the given pack through the children table,
    /// sorted and without duplicates
    pub fn dependencies(&self, pack_index: u32) -> Vec<u32> {
        let mut visited = vec![false; self.packs.len()];
        let mut result = Vec::new();
        let mut stack: Vec<u32> = self.children(pack_index).iter().rev().copied().collect();

        while let Some(pack) = stack.pop() {
            let Some(seen) = visited.get_mut(pack as usize) else {
                continue;
            };
            if *seen {
                continue;
            }
            *seen = true;
            result.push(pack);
            stack.extend(self.children(pack).iter().rev());
        }

        result.sort_unstable();
        result
    }

    /// whatever `dependency` is reachable from `pack_index`
    pub fn has_dependency(&self, pack_index: u32, dependency: u32) -> bool {
        self.dependencies(pack_index)
            .binary_search(&dependency)
            .is_ok()
    }
}

/// split the decompressed pack table into packs, one `<name> <dependencies>` per line
fn parse_pack_table(table: String) -> Result<Vec<PackInfo>, MetadataError> {
    let table = table.strip_suffix('\n').unwrap_or(&table);
    if table.is_empty() {
        return Ok(Vec::new());
    }

    table
        .split('\n')
        .enumerate()
        .map(|(line, text)| -> Result<PackInfo, MetadataError> {
            let (name, dependencies) = text
                .split_once(' ')
                .ok_or(MetadataError::PackLine { line })?;

            Ok(PackInfo {
                name: name.to_owned(),
                dependencies: dependencies.to_owned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_table_lines() {
        let packs = parse_pack_table("base \ntanks 0, 2\nmaps some free text\n".to_owned()).unwrap();

        assert_eq!(packs.len(), 3);
        assert_eq!(packs[0].name(), "base");
        assert_eq!(packs[0].dependencies(), "");
        assert_eq!(packs[1].dependencies(), "0, 2");
        assert_eq!(packs[2].name(), "maps");
        assert_eq!(packs[2].dependencies(), "some free text");
    }

    #[test]
    fn pack_table_without_trailing_newline() {
        let packs = parse_pack_table("a \nb 0".to_owned()).unwrap();
        assert_eq!(packs.len(), 2);
        assert_eq!(packs[1].dependencies(), "0");
    }

    #[test]
    fn pack_table_line_without_space() {
        let err = parse_pack_table("a \nbroken\n".to_owned()).unwrap_err();
        assert!(matches!(err, MetadataError::PackLine { line: 1 }));
    }

    #[test]
    fn empty_pack_table() {
        assert!(parse_pack_table(String::new()).unwrap().is_empty());
    }

    #[test]
    fn dependency_indexes() {
        let pack = PackInfo {
            name: "x".to_owned(),
            dependencies: "3, 1, 3, 2".to_owned(),
        };
        assert_eq!(pack.dependency_indexes().unwrap(), vec![1, 2, 3]);

        let pack = PackInfo {
            name: "x".to_owned(),
            dependencies: String::new(),
        };
        assert!(pack.dependency_indexes().unwrap().is_empty());

        let pack = PackInfo {
            name: "x".to_owned(),
            dependencies: "one".to_owned(),
        };
        assert!(pack.dependency_indexes().is_err());
    }
}
