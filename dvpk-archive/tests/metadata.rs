use std::io::Cursor;

use dvpk_archive::{
    archive::{Archive, ArchiveError, Header, HeaderWalker, META_ENTRY_NAME, PackArchive},
    metadata::MetadataError,
};
use pretty_assertions::assert_eq;

mod common;

use common::{TestFile, build_meta, sample_files};

const PACK_TABLE: &str = "base \ntanks 0\nmaps 0, 1\n";

/// four sample files spread over three packs: `maps` -> `tanks` -> `base`
fn graph_meta() -> Vec<u8> {
    build_meta(
        &[0, 1, 1, 2],
        PACK_TABLE,
        &[(2, vec![1]), (1, vec![0])],
    )
}

fn load_with_meta(files: &[TestFile], meta: &[u8]) -> Result<PackArchive<Cursor<Vec<u8>>>, ArchiveError> {
    PackArchive::from_reader(Cursor::new(common::build_pack(files, Some(meta))))
}

#[test]
fn packs_and_files() {
    let archive = load_with_meta(&sample_files(), &graph_meta()).unwrap();
    let meta = archive.metadata().expect("meta data should be loaded");

    assert_eq!(meta.file_count(), 4);
    assert_eq!(meta.pack_count(), 3);
    assert_eq!(meta.file_to_pack(), &[0, 1, 1, 2]);
    assert_eq!(meta.pack_for_file(2), Some(1));
    assert_eq!(meta.pack_for_file(4), None);

    let names: Vec<_> = meta.packs().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["base", "tanks", "maps"]);
    assert_eq!(meta.pack_info(2).unwrap().dependencies(), "0, 1");
    assert_eq!(meta.pack_info(2).unwrap().dependency_indexes().unwrap(), vec![0, 1]);

    assert_eq!(meta.pack_index("tanks"), Some(1));
    assert!(meta.has_pack("maps"));
    assert!(!meta.has_pack("sounds"));
    assert_eq!(meta.file_indexes("tanks"), vec![1, 2]);
    assert!(meta.file_indexes("sounds").is_empty());
}

#[test]
fn dependency_graph() {
    let archive = load_with_meta(&sample_files(), &graph_meta()).unwrap();
    let meta = archive.metadata().unwrap();

    assert_eq!(meta.children(2), &[1]);
    assert_eq!(meta.children(1), &[0]);
    assert!(meta.children(0).is_empty());
    assert!(meta.children(99).is_empty());

    assert_eq!(meta.dependencies(2), vec![0, 1]);
    assert_eq!(meta.dependencies(1), vec![0]);
    assert!(meta.dependencies(0).is_empty());

    assert!(meta.has_dependency(2, 0));
    assert!(!meta.has_dependency(0, 2));
}

#[test]
fn children_of_a_pack() {
    let files = vec![
        TestFile::new("a.txt", "a", common::STORED),
        TestFile::new("b.txt", "b", common::STORED),
    ];
    let meta = build_meta(&[0, 1], "A \nB 0\n", &[(0, vec![1])]);
    let archive = load_with_meta(&files, &meta).unwrap();
    let meta = archive.metadata().unwrap();

    let a = meta.pack_index("A").unwrap();
    let b = meta.pack_index("B").unwrap();
    assert_eq!(meta.children(a), &[b]);
    assert!(meta.children(b).is_empty());

    for &pack in meta.file_to_pack() {
        assert!(meta.pack_info(pack).is_some());
    }
}

#[test]
fn cyclic_children_terminate() {
    let meta = build_meta(
        &[0, 0, 1, 1],
        "a \nb \n",
        &[(0, vec![1]), (1, vec![0])],
    );
    let archive = load_with_meta(&sample_files(), &meta).unwrap();
    let meta = archive.metadata().unwrap();

    assert_eq!(meta.dependencies(0), vec![0, 1]);
    assert_eq!(meta.dependencies(1), vec![0, 1]);
}

#[test]
fn file_refer_to_missing_pack() {
    let meta = build_meta(&[0, 1, 5, 0], PACK_TABLE, &[]);
    let err = load_with_meta(&sample_files(), &meta).unwrap_err();

    assert!(
        matches!(
            err,
            ArchiveError::MalformedMetadata(MetadataError::PackIndexOutOfRange {
                file: 2,
                pack: 5,
                packs: 3
            })
        ),
        "unexpected error: {err:?}"
    );
}

#[test]
fn children_row_refer_to_missing_pack() {
    let meta = build_meta(&[0, 0, 0, 0], PACK_TABLE, &[(7, vec![0])]);
    let err = load_with_meta(&sample_files(), &meta).unwrap_err();

    assert!(matches!(
        err,
        ArchiveError::MalformedMetadata(MetadataError::ChildrenIndexOutOfRange { pack: 7, .. })
    ));
}

#[test]
fn child_refer_to_missing_pack() {
    let files = vec![TestFile::new("a.txt", "a", common::STORED)];
    let meta = build_meta(&[0], "A \n", &[(0, vec![99])]);
    let err = load_with_meta(&files, &meta).unwrap_err();

    assert!(
        matches!(
            err,
            ArchiveError::MalformedMetadata(MetadataError::ChildrenIndexOutOfRange {
                pack: 99,
                packs: 1
            })
        ),
        "unexpected error: {err:?}"
    );
}

#[test]
fn file_count_must_match() {
    let meta = build_meta(&[0, 0], PACK_TABLE, &[]);
    let err = load_with_meta(&sample_files(), &meta).unwrap_err();

    assert!(matches!(
        err,
        ArchiveError::MalformedMetadata(MetadataError::FileCountMismatch {
            meta: 2,
            archive: 4
        })
    ));
}

#[test]
fn wrong_header() {
    let mut meta = graph_meta();
    meta[..4].copy_from_slice(b"met1");
    let err = load_with_meta(&sample_files(), &meta).unwrap_err();

    assert!(
        matches!(err, ArchiveError::MalformedMetadata(MetadataError::BadHeader)),
        "unexpected error: {err:?}"
    );
}

#[test]
fn truncated_block() {
    let meta = graph_meta();
    let err = load_with_meta(&sample_files(), &meta[..meta.len() - 6]).unwrap_err();

    assert!(
        matches!(err, ArchiveError::MalformedMetadata(MetadataError::Parse(_))),
        "unexpected error: {err:?}"
    );
}

#[test]
fn pack_line_without_space() {
    let meta = build_meta(&[0, 0, 0, 0], "base \nbroken\n", &[]);
    let err = load_with_meta(&sample_files(), &meta).unwrap_err();

    assert!(matches!(
        err,
        ArchiveError::MalformedMetadata(MetadataError::PackLine { line: 1 })
    ));
}

#[test]
fn oversized_pack_table_declaration_is_tolerated() {
    let declared = PACK_TABLE.len() as u32 + 32;
    let meta = common::build_meta_with_size(&[0, 1, 1, 2], PACK_TABLE, declared, &[]);
    let archive = load_with_meta(&sample_files(), &meta).unwrap();

    assert_eq!(archive.metadata().unwrap().pack_count(), 3);
}

#[test]
fn meta_block_crc_is_not_enforced() {
    let mut bytes = common::build_pack(&sample_files(), Some(&graph_meta()));
    let len = bytes.len();
    // meta_data_crc32 sits right after the reserved bytes of the footer
    bytes[len - 36] ^= 0xFF;

    let archive = PackArchive::from_reader(Cursor::new(bytes)).unwrap();
    assert!(archive.has_metadata());
}

#[test]
fn describe_includes_pack_tables() {
    let archive = load_with_meta(&sample_files(), &graph_meta()).unwrap();
    let text = archive.describe();

    assert!(text.contains("PACKS"));
    assert!(text.contains("maps"));
    assert!(text.contains("END-PACKS"));
    assert!(text.contains("START-DEPENDENCY"));
    assert!(text.contains("p2         | 1                   | p1 "));
    assert!(text.contains("-END-DEPENDENCY"));
}

#[test]
fn header_walker_reports_meta_entry() {
    let files = sample_files();
    let bytes = common::build_pack(&files, Some(&graph_meta()));
    let archive = Archive::from_reader(Cursor::new(bytes), "unused").unwrap();

    let mut walker = HeaderWalker::new();
    for file in &files {
        let header = walker.next_header(&archive).expect("missing file header");
        assert_eq!(header.path(), file.path);
        assert!(matches!(header, Header::File(_)));
    }

    let meta = walker.next_header(&archive).expect("missing meta header");
    assert_eq!(meta, Header::Meta { pack_count: 3 });
    assert_eq!(meta.path(), META_ENTRY_NAME);
    assert_eq!(meta.size(), 3);
    assert_eq!(meta.crc32(), None);

    assert!(walker.next_header(&archive).is_none());

    // the walker start over after reporting the end
    let first = walker.next_header(&archive).unwrap();
    assert_eq!(first.path(), "config/settings.yaml");
}

#[test]
fn header_walker_without_meta() {
    let bytes = common::build_pack(&sample_files(), None);
    let archive = Archive::from_reader(Cursor::new(bytes), "unused").unwrap();

    let headers = HeaderWalker::collect(&archive);
    assert_eq!(headers.len(), 4);
    assert!(headers.iter().all(|h| matches!(h, Header::File(_))));
}

#[test]
fn extract_meta_entry() {
    let bytes = common::build_pack(&sample_files(), Some(&graph_meta()));
    let mut archive = Archive::from_reader(Cursor::new(bytes), "unused").unwrap();

    let content = archive.extract_header(META_ENTRY_NAME).unwrap();
    assert_eq!(String::from_utf8(content).unwrap(), archive.describe());

    // regular files still go through the normal path
    let yaml = archive.extract_header("config/settings.yaml").unwrap();
    assert_eq!(yaml, b"lang: en\nquality: high\n");

    let bytes = common::build_pack(&sample_files(), None);
    let mut archive = Archive::from_reader(Cursor::new(bytes), "unused").unwrap();
    assert!(matches!(
        archive.extract_header(META_ENTRY_NAME),
        Err(ArchiveError::NotFound(_))
    ));
}
