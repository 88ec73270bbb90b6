//! Zip-backed archive input and mod-metadata sniffing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use zip::ZipArchive;

use lupine::{ArchiveEntry, ArchiveSource, Error, Result};

/// Reads a sources jar/zip entry by entry for the remapper.
pub struct ZipSource {
    archive: ZipArchive<File>,
    next: usize,
}

impl ZipSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file).map_err(Error::archive)?;
        Ok(ZipSource { archive, next: 0 })
    }
}

impl ArchiveSource for ZipSource {
    fn next_entry(&mut self) -> Result<Option<ArchiveEntry>> {
        if self.next >= self.archive.len() {
            return Ok(None);
        }

        let mut entry = self.archive.by_index(self.next).map_err(Error::archive)?;
        self.next += 1;

        let path = entry.name().to_string();
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;

        Ok(Some(ArchiveEntry { path, data }))
    }
}

#[derive(Deserialize)]
struct FabricModJson {
    #[serde(rename = "schemaVersion", default)]
    schema_version: i64,
    #[serde(default)]
    depends: Dependencies,
}

#[derive(Deserialize, Default)]
struct Dependencies {
    minecraft: Option<String>,
}

/// Extracts the game version the mod depends on from the `fabric.mod.json`
/// inside the archive, if there is one.
pub fn game_version(path: impl AsRef<Path>) -> Result<Option<String>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(Error::archive)?;

    let metadata = match archive.by_name("fabric.mod.json") {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(Error::archive(err)),
    };

    let meta: FabricModJson = serde_json::from_reader(metadata).map_err(Error::archive)?;

    if meta.schema_version == 1 {
        Ok(meta.depends.minecraft)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use zip::write::{SimpleFileOptions, ZipWriter};

    use lupine::{map_archive, LocalSource};

    use super::*;

    fn write_sample_zip(dir: &Path) -> PathBuf {
        let path = dir.join("sources.zip");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default();

        writer.add_directory("com/", options).unwrap();
        writer.start_file("com/Foo.java", options).unwrap();
        writer.write_all(b"class_123 x; class_999 y;").unwrap();
        writer.start_file("data.txt", options).unwrap();
        writer.write_all(&[0u8, 159, 146, 150]).unwrap();
        writer
            .start_file("fabric.mod.json", options)
            .unwrap();
        writer
            .write_all(br#"{"schemaVersion": 1, "depends": {"minecraft": "1.15.2"}}"#)
            .unwrap();
        writer.finish().unwrap();

        path
    }

    fn sample_source() -> LocalSource {
        let mut source = LocalSource::new();
        source.insert_mappings(lupine::tiny::parse_lines([
            "CLASS\tabc\tnet/minecraft/class_123\tnet/minecraft/entity/PlayerEntity",
        ]));
        source
    }

    #[test]
    fn zip_entries_feed_the_remapper() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = write_sample_zip(dir.path());
        let out_dir = dir.path().join("out");

        let source = sample_source();
        let mut archive = ZipSource::open(&zip_path).unwrap();
        let unresolved = map_archive(&source, &mut archive, &out_dir).unwrap();

        let mapped = std::fs::read_to_string(out_dir.join("com/Foo.java")).unwrap();
        assert_eq!(mapped, "PlayerEntity x; class_999 y;");

        let copied = std::fs::read(out_dir.join("data.txt")).unwrap();
        assert_eq!(copied, [0u8, 159, 146, 150]);

        assert_eq!(unresolved, vec!["class_999".to_string()]);
    }

    #[test]
    fn game_version_comes_from_the_mod_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = write_sample_zip(dir.path());

        assert_eq!(game_version(&zip_path).unwrap().as_deref(), Some("1.15.2"));
    }

    #[test]
    fn archives_without_metadata_have_no_game_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.zip");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        writer
            .start_file("readme.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"nothing here").unwrap();
        writer.finish().unwrap();

        assert_eq!(game_version(&path).unwrap(), None);
    }
}
