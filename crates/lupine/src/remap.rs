//! The substitution engine: scans text for intermediary-name tokens and
//! replaces them with mapped names, collecting every token that has no
//! mapping into a report.

use std::fs;
use std::path::{Component, Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::record::MappingRecord;
use crate::source::MappingSource;
use crate::{Error, Result};

/// File extension of entries that get substituted; everything else is
/// copied through byte-for-byte.
const SOURCE_EXT: &str = ".java";

lazy_static! {
    static ref CLASS_TOKEN: Regex = Regex::new(r"class_\d+").unwrap();
    static ref FIELD_TOKEN: Regex = Regex::new(r"field_\d+").unwrap();
    static ref METHOD_TOKEN: Regex = Regex::new(r"method_\d+").unwrap();
}

/// Output of one [`map_text`] pass: the substituted text plus every token
/// that had no mapping, in pass order (classes, then fields, then methods).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedText {
    pub text: String,
    pub unresolved: Vec<String>,
}

/// One regular-file entry of an input archive: its relative path and raw
/// content.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub path: String,
    pub data: Vec<u8>,
}

/// Collaborator contract for archive input: iterate entries, read content.
/// Directory entries are reported with a trailing `/` and skipped by the
/// remapper.
pub trait ArchiveSource {
    fn next_entry(&mut self) -> Result<Option<ArchiveEntry>>;
}

/// Replaces every `class_N`, `field_N`, and `method_N` token in `text`
/// with the corresponding mapped short name.
///
/// The three token kinds are substituted in three ordered passes, each
/// over the output of the previous one; the patterns are disjoint, so a
/// replacement is never itself re-examined. Tokens with no mapping are
/// left unchanged and reported — an unresolved token never aborts the
/// pass.
pub fn map_text(source: &dyn MappingSource, text: &str) -> Result<MappedText> {
    let mut unresolved = Vec::new();

    let text = apply_pass(&CLASS_TOKEN, text, &mut unresolved, |name| {
        source.class_by_intermediary(name)
    })?;
    let text = apply_pass(&FIELD_TOKEN, &text, &mut unresolved, |name| {
        source.field_by_intermediary(name)
    })?;
    let text = apply_pass(&METHOD_TOKEN, &text, &mut unresolved, |name| {
        source.method_by_intermediary(name)
    })?;

    Ok(MappedText { text, unresolved })
}

fn apply_pass<F>(
    pattern: &Regex,
    text: &str,
    unresolved: &mut Vec<String>,
    lookup: F,
) -> Result<String>
where
    F: Fn(&str) -> Result<Option<MappingRecord>>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for m in pattern.find_iter(text) {
        out.push_str(&text[last..m.start()]);

        match lookup(m.as_str())? {
            Some(record) => {
                debug!(token = m.as_str(), mapping = %record, "resolved");
                out.push_str(record.mapped_short_name());
            }
            None => {
                warn!(token = m.as_str(), "no mapping");
                unresolved.push(m.as_str().to_string());
                out.push_str(m.as_str());
            }
        }

        last = m.end();
    }

    out.push_str(&text[last..]);
    Ok(out)
}

/// Remaps every source-file entry of `archive` into `dest_dir`, mirroring
/// the archive's internal directory layout.
///
/// Entries ending in `.java` go through [`map_text`]; all other regular
/// files are copied unmodified. Returns the unresolved tokens aggregated
/// across all mapped entries — a soft-failure report, not an error.
pub fn map_archive(
    source: &dyn MappingSource,
    archive: &mut dyn ArchiveSource,
    dest_dir: &Path,
) -> Result<Vec<String>> {
    let mut unresolved = Vec::new();

    while let Some(entry) = archive.next_entry()? {
        // Directories are entries too, skip them.
        if entry.path.ends_with('/') {
            continue;
        }

        let dest_file = entry_dest(dest_dir, &entry.path)?;
        if let Some(parent) = dest_file.parent() {
            fs::create_dir_all(parent)?;
        }

        if entry.path.ends_with(SOURCE_EXT) {
            info!(entry = %entry.path, "mapping");
            let mapped = map_text(source, &String::from_utf8_lossy(&entry.data))?;
            unresolved.extend(mapped.unresolved);
            fs::write(&dest_file, mapped.text)?;
        } else {
            fs::write(&dest_file, &entry.data)?;
        }
    }

    Ok(unresolved)
}

/// Resolves an entry name under `dest_dir`, rejecting names that would
/// land outside it. Entry names are untrusted input: a crafted archive can
/// carry `..` segments or an absolute path.
fn entry_dest(dest_dir: &Path, entry_path: &str) -> Result<PathBuf> {
    let relative = Path::new(entry_path);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if escapes {
        return Err(Error::archive(format!(
            "entry \"{entry_path}\" resolves outside the output directory"
        )));
    }

    Ok(dest_dir.join(relative))
}
