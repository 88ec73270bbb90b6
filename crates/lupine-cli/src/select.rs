//! Mapping-version discovery and caching decisions.

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, info, warn};

use lupine::{MappingFetch, MappingStore, MappingVersion};

/// True when `version` targets `game_version`.
///
/// Besides exact equality, an `x` in the requested game version acts as a
/// digit-run wildcard, so "1.16.x" accepts any "1.16.<build>" mapping.
pub fn matches_game_version(version: &MappingVersion, game_version: &str) -> bool {
    if version.game_version == game_version {
        return true;
    }

    let pattern = regex::escape(game_version).replace('x', r"\d+");
    Regex::new(&pattern)
        .map(|re| re.is_match(&version.game_version))
        .unwrap_or(false)
}

/// The remote version listing, falling back to cached versions when the
/// remote is unreachable.
pub fn version_listing(
    fetch: &dyn MappingFetch,
    store: &MappingStore,
) -> Result<Vec<MappingVersion>> {
    match fetch.versions() {
        Ok(versions) => Ok(versions),
        Err(err) => {
            warn!("could not retrieve remote versions: {err}");
            warn!("working in offline mode; only cached mappings are available");
            Ok(store.versions()?)
        }
    }
}

/// Switches the store over to `version`, fetching and caching it if
/// needed.
///
/// Any active ad-hoc file is released first: while one is active the store
/// reports every version as present, which would make the cache check
/// below skip the fetch.
pub fn select_version(
    store: &mut MappingStore,
    fetch: &dyn MappingFetch,
    version: &MappingVersion,
) -> Result<()> {
    store.release_local_file();
    ensure_cached(store, fetch, version)
}

/// Makes sure `version` is cached in the store, fetching and inserting its
/// mapping lines if it is not.
pub fn ensure_cached(
    store: &MappingStore,
    fetch: &dyn MappingFetch,
    version: &MappingVersion,
) -> Result<()> {
    if store.has_mapping_set(version)? {
        debug!(version = %version.version, "local database contains required mappings");
        return Ok(());
    }

    info!("fetching mappings from remote");
    let lines = fetch
        .mapping_lines(version)
        .with_context(|| format!("failed to load requested mappings {}", version.version))?;

    info!("updating database");
    store.create_mapping_set(version, &lines)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use lupine::MappingSource;

    fn version(game_version: &str) -> MappingVersion {
        let mut v = MappingVersion::local("test");
        v.game_version = game_version.to_string();
        v
    }

    #[test]
    fn exact_game_version_matches() {
        assert!(matches_game_version(&version("1.15.2"), "1.15.2"));
        assert!(!matches_game_version(&version("1.14.4"), "1.15.2"));
    }

    #[test]
    fn x_is_a_digit_run_wildcard() {
        assert!(matches_game_version(&version("1.16.2"), "1.16.x"));
        assert!(matches_game_version(&version("1.16.10"), "1.16.x"));
        assert!(!matches_game_version(&version("1.17.1"), "1.16.x"));
    }

    struct FakeFetch {
        lines: Vec<String>,
    }

    impl MappingFetch for FakeFetch {
        fn versions(&self) -> lupine::Result<Vec<MappingVersion>> {
            Ok(Vec::new())
        }

        fn mapping_lines(&self, _version: &MappingVersion) -> lupine::Result<Vec<String>> {
            Ok(self.lines.clone())
        }
    }

    #[test]
    fn switching_from_an_adhoc_file_to_a_version_still_caches_it() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let tiny = dir.path().join("local.tiny");
        std::fs::write(
            &tiny,
            "CLASS\tabc\tnet/minecraft/class_1\tnet/minecraft/Local\n",
        )?;

        let mut store = MappingStore::in_memory()?;
        store.use_local_file(&tiny)?;

        let fetch = FakeFetch {
            lines: vec!["CLASS\tdef\tnet/minecraft/class_2\tnet/minecraft/Remote".to_string()],
        };
        let yarn = MappingVersion::local("1.16.2+build.7");

        select_version(&mut store, &fetch, &yarn)?;

        assert!(!store.is_using_local_file());
        let source = store.get_mapping_set(&yarn)?.expect("version was not cached");
        let record = source.class_by_intermediary("class_2")?.unwrap();
        assert_eq!(record.mapped_name, "net/minecraft/Remote");

        Ok(())
    }
}
