//! builds archives byte by byte, without going through the crate structures
#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const STORED: u32 = 0;
pub const LZ4: u32 = 1;
pub const LZ4HC: u32 = 2;
pub const DEFLATE: u32 = 3;

pub const FOOTER_SIZE: usize = 44;
pub const ENTRY_SIZE: usize = 32;

pub struct TestFile {
    pub path: String,
    pub content: Vec<u8>,
    pub kind: u32,
}

impl TestFile {
    pub fn new(path: &str, content: impl Into<Vec<u8>>, kind: u32) -> Self {
        Self {
            path: path.to_owned(),
            content: content.into(),
            kind,
        }
    }
}

/// where things ended up inside a built superpack
#[derive(Debug, Default)]
pub struct Layout {
    pub files_table_start: usize,
    pub files_table_size: usize,
    pub meta_start: usize,
}

fn push_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn encode(content: &[u8], kind: u32) -> Vec<u8> {
    match kind {
        LZ4 | LZ4HC => lz4_flex::block::compress(content),
        _ => content.to_vec(),
    }
}

pub fn build_pack(files: &[TestFile], meta: Option<&[u8]>) -> Vec<u8> {
    build_pack_with_layout(files, meta).0
}

pub fn build_pack_with_layout(files: &[TestFile], meta: Option<&[u8]>) -> (Vec<u8>, Layout) {
    let mut out = Vec::new();
    let mut entries = Vec::new();
    let mut names = Vec::new();

    for file in files {
        let stored = encode(&file.content, file.kind);
        let start = out.len() as u64;
        out.extend_from_slice(&stored);

        entries.extend_from_slice(&start.to_le_bytes());
        push_u32(&mut entries, stored.len() as u32);
        push_u32(&mut entries, file.content.len() as u32);
        push_u32(&mut entries, crc32fast::hash(&stored));
        push_u32(&mut entries, file.kind);
        push_u32(&mut entries, crc32fast::hash(&file.content));
        push_u32(&mut entries, 0);

        names.extend_from_slice(file.path.as_bytes());
        names.push(0);
    }

    let mut layout = Layout {
        meta_start: out.len(),
        ..Default::default()
    };

    let meta = meta.unwrap_or(&[]);
    out.extend_from_slice(meta);

    let compressed_names = lz4_flex::block::compress(&names);
    let mut table = entries;
    if !files.is_empty() {
        table.extend_from_slice(&compressed_names);
    }

    layout.files_table_start = out.len();
    layout.files_table_size = table.len();
    out.extend_from_slice(&table);

    let mut info = Vec::new();
    push_u32(&mut info, files.len() as u32);
    push_u32(&mut info, if files.is_empty() { 0 } else { compressed_names.len() as u32 });
    push_u32(&mut info, if files.is_empty() { 0 } else { names.len() as u32 });
    push_u32(&mut info, table.len() as u32);
    push_u32(&mut info, crc32fast::hash(&table));
    info.extend_from_slice(b"DVPK");

    out.extend_from_slice(&[0; 8]);
    push_u32(&mut out, crc32fast::hash(meta));
    push_u32(&mut out, meta.len() as u32);
    push_u32(&mut out, crc32fast::hash(&info));
    out.extend_from_slice(&info);

    (out, layout)
}

pub fn build_lite(content: &[u8], kind: u32) -> Vec<u8> {
    let stored = encode(content, kind);
    let mut out = stored.clone();
    push_u32(&mut out, content.len() as u32);
    push_u32(&mut out, stored.len() as u32);
    push_u32(&mut out, crc32fast::hash(&stored));
    push_u32(&mut out, kind);
    out.extend_from_slice(b"DVPL");
    out
}

/// meta block with an explicit uncompressed size for the pack table
pub fn build_meta_with_size(
    file_to_pack: &[u32],
    pack_table: &str,
    declared_size: u32,
    children: &[(u32, Vec<u32>)],
) -> Vec<u8> {
    let compressed = lz4_flex::block::compress(pack_table.as_bytes());

    let mut out = b"met2".to_vec();
    push_u32(&mut out, file_to_pack.len() as u32);
    for pack in file_to_pack {
        push_u32(&mut out, *pack);
    }
    push_u32(&mut out, declared_size);
    push_u32(&mut out, compressed.len() as u32);
    out.extend_from_slice(&compressed);

    push_u32(&mut out, children.len() as u32);
    for (pack, row) in children {
        push_u32(&mut out, *pack);
        push_u32(&mut out, row.len() as u32);
        for child in row {
            push_u32(&mut out, *child);
        }
    }

    out
}

pub fn build_meta(file_to_pack: &[u32], pack_table: &str, children: &[(u32, Vec<u32>)]) -> Vec<u8> {
    build_meta_with_size(file_to_pack, pack_table, pack_table.len() as u32, children)
}

/// write bytes to a file with the given name inside `dir`
pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("failed to write test archive");
    path
}

pub fn sample_files() -> Vec<TestFile> {
    vec![
        TestFile::new("config/settings.yaml", "lang: en\nquality: high\n", STORED),
        TestFile::new(
            "3d/tanks/t34.sc2",
            b"vertex data ".repeat(200),
            LZ4,
        ),
        TestFile::new("ui/atlas.txt", "atlas".repeat(50), LZ4HC),
        TestFile::new("empty.bin", Vec::new(), STORED),
    ]
}
