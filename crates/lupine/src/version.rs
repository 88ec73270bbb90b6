use std::fmt;

use serde::Deserialize;

/// One entry of the upstream Yarn version listing.
///
/// `version` is the identifier callers use everywhere; `storage_key` is the
/// codec-encoded form that prefixes the per-version record tables. The key
/// is assigned exactly once, when the version is first cached, and reused
/// on every later lookup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingVersion {
    pub game_version: String,
    pub separator: String,
    pub build: i64,
    pub maven: String,
    pub version: String,
    pub stable: bool,
    #[serde(skip)]
    pub storage_key: Option<String>,
}

impl MappingVersion {
    /// A synthetic version describing an ad-hoc local mapping file. Never
    /// persisted; only used to label the active source.
    pub fn local(label: impl Into<String>) -> Self {
        MappingVersion {
            game_version: String::new(),
            separator: String::new(),
            build: 0,
            maven: String::new(),
            version: label.into(),
            stable: false,
            storage_key: None,
        }
    }
}

impl fmt::Display for MappingVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}", self.version, self.maven)?;
        if self.stable {
            f.write_str(", stable")?;
        }
        f.write_str(")")
    }
}
