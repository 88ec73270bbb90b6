use std::fs;

use lupine::tiny::parse_lines;
use lupine::{map_archive, ArchiveEntry, ArchiveSource, LocalSource};

/// In-memory stand-in for the zip-backed archive collaborator.
struct VecArchive {
    entries: std::vec::IntoIter<ArchiveEntry>,
}

impl VecArchive {
    fn new(entries: Vec<(&str, &[u8])>) -> Self {
        VecArchive {
            entries: entries
                .into_iter()
                .map(|(path, data)| ArchiveEntry {
                    path: path.to_string(),
                    data: data.to_vec(),
                })
                .collect::<Vec<_>>()
                .into_iter(),
        }
    }
}

impl ArchiveSource for VecArchive {
    fn next_entry(&mut self) -> lupine::Result<Option<ArchiveEntry>> {
        Ok(self.entries.next())
    }
}

fn sample_source() -> LocalSource {
    let parsed = parse_lines([
        "CLASS\tabc\tnet/minecraft/class_123\tnet/minecraft/entity/PlayerEntity",
    ]);

    let mut source = LocalSource::new();
    source.insert_mappings(parsed);
    source
}

#[test]
fn java_entries_are_mapped_and_other_entries_copied_verbatim() {
    let source = sample_source();
    let out_dir = tempfile::tempdir().unwrap();

    let data_bytes: &[u8] = &[0u8, 159, 146, 150];
    let mut archive = VecArchive::new(vec![
        ("com/", b"" as &[u8]),
        ("com/example/Foo.java", b"class_123 x; class_999 y;"),
        ("data.txt", data_bytes),
    ]);

    let unresolved = map_archive(&source, &mut archive, out_dir.path()).unwrap();

    let mapped = fs::read_to_string(out_dir.path().join("com/example/Foo.java")).unwrap();
    assert_eq!(mapped, "PlayerEntity x; class_999 y;");

    // Non-java entries come through byte-identical, even when not UTF-8.
    let copied = fs::read(out_dir.path().join("data.txt")).unwrap();
    assert_eq!(copied, data_bytes);

    assert_eq!(unresolved, vec!["class_999".to_string()]);
}

#[test]
fn directory_entries_produce_no_files() {
    let source = sample_source();
    let out_dir = tempfile::tempdir().unwrap();

    let mut archive = VecArchive::new(vec![("com/", b"" as &[u8])]);
    let unresolved = map_archive(&source, &mut archive, out_dir.path()).unwrap();

    assert!(unresolved.is_empty());
    assert!(!out_dir.path().join("com").exists());
}

#[test]
fn nested_output_directories_are_created() {
    let source = sample_source();
    let out_dir = tempfile::tempdir().unwrap();

    let mut archive = VecArchive::new(vec![(
        "a/b/c/Deep.java",
        b"class_123 deep;" as &[u8],
    )]);
    map_archive(&source, &mut archive, out_dir.path()).unwrap();

    let mapped = fs::read_to_string(out_dir.path().join("a/b/c/Deep.java")).unwrap();
    assert_eq!(mapped, "PlayerEntity deep;");
}

#[test]
fn entries_with_parent_segments_are_rejected() {
    let source = sample_source();
    let out_dir = tempfile::tempdir().unwrap();

    let mut archive = VecArchive::new(vec![(
        "../escape.java",
        b"class_123 x;" as &[u8],
    )]);
    let err = map_archive(&source, &mut archive, out_dir.path()).unwrap_err();

    assert!(err.to_string().contains("escape.java"));
    assert!(!out_dir.path().parent().unwrap().join("escape.java").exists());
}

#[test]
fn entries_with_absolute_paths_are_rejected() {
    let source = sample_source();
    let out_dir = tempfile::tempdir().unwrap();

    let mut archive = VecArchive::new(vec![("/tmp/escape.txt", b"x" as &[u8])]);
    assert!(map_archive(&source, &mut archive, out_dir.path()).is_err());
}

#[test]
fn unresolved_tokens_are_aggregated_across_entries() {
    let source = sample_source();
    let out_dir = tempfile::tempdir().unwrap();

    let mut archive = VecArchive::new(vec![
        ("A.java", b"class_111 a;" as &[u8]),
        ("B.java", b"class_222 b;" as &[u8]),
    ]);
    let unresolved = map_archive(&source, &mut archive, out_dir.path()).unwrap();

    assert_eq!(
        unresolved,
        vec!["class_111".to_string(), "class_222".to_string()]
    );
}
