use std::path::Path;

use rusqlite::{params, Connection, Row};
use tracing::debug;

use crate::record::MappingRecord;
use crate::source::{nested_class_pattern, LocalSource, MappingSource};
use crate::tiny::{self, ParsedMappings};
use crate::version::MappingVersion;
use crate::{codec, Result};

/// Name of the version index table. Queried before any record table is
/// touched.
const VERSION_TABLE: &str = "yarn_versions";

/// Persistent store of cached mapping sets, one SQLite file.
///
/// Each cached version owns three record tables named
/// `<key>_classes` / `<key>_fields` / `<key>_methods`, where `<key>` is the
/// codec-encoded version string (SQLite accepts the alphabetic-only form
/// unquoted). An index table maps version identifiers to their keys.
///
/// An ad-hoc local file can be activated on top of the store; while active
/// it shadows every persistent lookup.
pub struct MappingStore {
    conn: Connection,
    local: Option<LocalSource>,
}

impl MappingStore {
    /// Opens (creating if needed) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Opens a store that lives only as long as the process. Used by
    /// tests.
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {VERSION_TABLE} (
                    game_version TEXT NOT NULL,
                    separator TEXT NOT NULL,
                    build INTEGER NOT NULL,
                    maven TEXT NOT NULL,
                    version TEXT NOT NULL,
                    stable INTEGER NOT NULL,
                    storage_key TEXT NOT NULL
                )"
            ),
            [],
        )?;

        Ok(MappingStore { conn, local: None })
    }

    /// True while an ad-hoc local file is shadowing the store.
    pub fn is_using_local_file(&self) -> bool {
        self.local.is_some()
    }

    /// True if a source for `version` can be produced without fetching:
    /// either an ad-hoc file is active, or the version has been cached.
    pub fn has_mapping_set(&self, version: &MappingVersion) -> Result<bool> {
        if self.is_using_local_file() {
            return Ok(true);
        }

        Ok(self.storage_key(&version.version)?.is_some())
    }

    /// Opens the mapping set for `version`.
    ///
    /// While an ad-hoc file is active it is returned regardless of
    /// `version`; the override is not versioned. Otherwise `None` means
    /// the version has not been cached.
    pub fn get_mapping_set(
        &self,
        version: &MappingVersion,
    ) -> Result<Option<Box<dyn MappingSource + '_>>> {
        if let Some(local) = &self.local {
            return Ok(Some(Box::new(local)));
        }

        match self.storage_key(&version.version)? {
            Some(key) => {
                let source = StoreSource::open(&self.conn, &key)?;
                Ok(Some(Box::new(source)))
            }
            None => Ok(None),
        }
    }

    /// Caches a new mapping set: assigns a storage key, records it in the
    /// version index, parses `lines`, and bulk-inserts the records.
    ///
    /// Calling this for an already-cached version is a no-op that returns
    /// the existing set; the raw lines are not re-parsed.
    pub fn create_mapping_set(
        &self,
        version: &MappingVersion,
        lines: &[String],
    ) -> Result<Box<dyn MappingSource + '_>> {
        if let Some(key) = self.storage_key(&version.version)? {
            debug!(version = %version.version, "mapping set already cached");
            return Ok(Box::new(StoreSource::open(&self.conn, &key)?));
        }

        let key = codec::encode(&version.version);

        self.conn.execute(
            &format!(
                "INSERT INTO {VERSION_TABLE}
                 (game_version, separator, build, maven, version, stable, storage_key)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
            ),
            params![
                version.game_version,
                version.separator,
                version.build,
                version.maven,
                version.version,
                version.stable,
                key,
            ],
        )?;

        let source = StoreSource::create(&self.conn, &key)?;
        source.insert_mappings(&tiny::parse_lines(lines))?;

        debug!(version = %version.version, key = %key, "cached new mapping set");
        Ok(Box::new(source))
    }

    /// Every version recorded in the index, in insertion order. Queries
    /// the index table directly, ignoring any ad-hoc override.
    pub fn versions(&self) -> Result<Vec<MappingVersion>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT game_version, separator, build, maven, version, stable, storage_key
             FROM {VERSION_TABLE}"
        ))?;

        let rows = stmt.query_map([], |row| {
            Ok(MappingVersion {
                game_version: row.get(0)?,
                separator: row.get(1)?,
                build: row.get(2)?,
                maven: row.get(3)?,
                version: row.get(4)?,
                stable: row.get(5)?,
                storage_key: Some(row.get(6)?),
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Parses the mapping file at `path` and activates it as an ad-hoc
    /// source shadowing all persistent lookups.
    pub fn use_local_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let contents = std::fs::read_to_string(path)?;

        let mut local = LocalSource::new();
        local.insert_mappings(tiny::parse_lines(contents.lines()));
        self.local = Some(local);

        Ok(())
    }

    /// Deactivates the ad-hoc source, restoring persistent lookups.
    pub fn release_local_file(&mut self) {
        self.local = None;
    }

    fn storage_key(&self, version: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT storage_key FROM {VERSION_TABLE} WHERE version = ?1 LIMIT 1"
        ))?;

        let mut rows = stmt.query_map(params![version], |row| row.get::<_, String>(0))?;
        rows.next().transpose().map_err(Into::into)
    }
}

/// Persistent mapping set over one version's three record tables.
pub struct StoreSource<'conn> {
    conn: &'conn Connection,
    classes: String,
    fields: String,
    methods: String,
}

impl<'conn> StoreSource<'conn> {
    /// Opens an existing table triple, making sure the intermediary-name
    /// indices exist.
    fn open(conn: &'conn Connection, key: &str) -> Result<Self> {
        let source = StoreSource {
            conn,
            classes: format!("{key}_classes"),
            fields: format!("{key}_fields"),
            methods: format!("{key}_methods"),
        };

        for table in source.tables() {
            conn.execute(
                &format!(
                    "CREATE INDEX IF NOT EXISTS idx_{table}_intermediary
                     ON {table} (intermediary)"
                ),
                [],
            )?;
        }

        Ok(source)
    }

    /// Creates the table triple for a fresh storage key, then opens it.
    fn create(conn: &'conn Connection, key: &str) -> Result<Self> {
        for table in [
            format!("{key}_classes"),
            format!("{key}_fields"),
            format!("{key}_methods"),
        ] {
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        parent TEXT,
                        official TEXT NOT NULL,
                        intermediary TEXT NOT NULL,
                        mapped TEXT NOT NULL
                    )"
                ),
                [],
            )?;
        }

        Self::open(conn, key)
    }

    /// Bulk-inserts the parsed records. Called exactly once per mapping
    /// set, right after [`StoreSource::create`].
    pub fn insert_mappings(&self, mappings: &ParsedMappings) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        for (table, records) in [
            (&self.classes, &mappings.classes),
            (&self.fields, &mappings.fields),
            (&self.methods, &mappings.methods),
        ] {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {table} (parent, official, intermediary, mapped)
                 VALUES (?1, ?2, ?3, ?4)"
            ))?;

            for rec in records {
                stmt.execute(params![
                    rec.parent_official_name,
                    rec.official_name,
                    rec.intermediary_name,
                    rec.mapped_name,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn tables(&self) -> [&str; 3] {
        [&self.classes, &self.fields, &self.methods]
    }

    fn find_one(&self, table: &str, column: &str, name: &str) -> Result<Option<MappingRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT parent, official, intermediary, mapped FROM {table}
             WHERE {column} = ?1 LIMIT 1"
        ))?;

        let mut rows = stmt.query_map(params![name], record_from_row)?;
        rows.next().transpose().map_err(Into::into)
    }

    fn find_named(
        &self,
        table: &str,
        name: &str,
        include_official: bool,
    ) -> Result<Vec<MappingRecord>> {
        let official_clause = if include_official {
            " OR official = ?1"
        } else {
            ""
        };

        let mut stmt = self.conn.prepare(&format!(
            "SELECT parent, official, intermediary, mapped FROM {table}
             WHERE intermediary = ?1 OR mapped = ?1{official_clause}"
        ))?;

        let rows = stmt.query_map(params![name], record_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl MappingSource for StoreSource<'_> {
    fn class_by_intermediary(&self, name: &str) -> Result<Option<MappingRecord>> {
        // Prefilter to exact and `$`-suffixed candidates; the short-name
        // check runs on the Rust side since it is not expressible as a
        // plain comparison.
        let mut stmt = self.conn.prepare(&format!(
            "SELECT parent, official, intermediary, mapped FROM {}
             WHERE intermediary = ?1 OR intermediary LIKE '%$' || ?1",
            self.classes
        ))?;

        let rows = stmt.query_map(params![name], record_from_row)?;
        for row in rows {
            let rec = row?;
            if rec.intermediary_short_name() == name {
                return Ok(Some(rec));
            }
        }

        Ok(None)
    }

    fn field_by_intermediary(&self, name: &str) -> Result<Option<MappingRecord>> {
        self.find_one(&self.fields, "intermediary", name)
    }

    fn method_by_intermediary(&self, name: &str) -> Result<Option<MappingRecord>> {
        self.find_one(&self.methods, "intermediary", name)
    }

    fn class_by_official(&self, name: &str) -> Result<Option<MappingRecord>> {
        self.find_one(&self.classes, "official", name)
    }

    fn field_by_official(&self, name: &str) -> Result<Option<MappingRecord>> {
        self.find_one(&self.fields, "official", name)
    }

    fn method_by_official(&self, name: &str) -> Result<Option<MappingRecord>> {
        self.find_one(&self.methods, "official", name)
    }

    fn search(&self, name: &str) -> Result<Vec<MappingRecord>> {
        let mut found = self.find_named(&self.classes, name, true)?;
        found.extend(self.find_named(&self.fields, name, false)?);
        found.extend(self.find_named(&self.methods, name, false)?);
        Ok(found)
    }

    fn children(&self, parent: &str) -> Result<Vec<MappingRecord>> {
        let parent_class = match ["intermediary", "mapped", "official"]
            .iter()
            .map(|column| self.find_one(&self.classes, column, parent))
            .find_map(Result::transpose)
            .transpose()?
        {
            Some(rec) => rec,
            None => return Ok(Vec::new()),
        };

        let nested = nested_class_pattern(&parent_class.mapped_name);
        let mut found = Vec::new();

        let mut stmt = self.conn.prepare(&format!(
            "SELECT parent, official, intermediary, mapped FROM {}",
            self.classes
        ))?;
        let rows = stmt.query_map([], record_from_row)?;
        for row in rows {
            let rec = row?;
            if nested.is_match(&rec.mapped_name) {
                found.push(rec);
            }
        }

        for table in [&self.fields, &self.methods] {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT parent, official, intermediary, mapped FROM {table}
                 WHERE parent = ?1"
            ))?;
            let rows = stmt.query_map(params![parent_class.official_name], record_from_row)?;
            found.extend(rows.collect::<rusqlite::Result<Vec<_>>>()?);
        }

        Ok(found)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<MappingRecord> {
    Ok(MappingRecord {
        parent_official_name: row.get(0)?,
        official_name: row.get(1)?,
        intermediary_name: row.get(2)?,
        mapped_name: row.get(3)?,
    })
}
