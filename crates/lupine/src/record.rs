use std::fmt;

/// One class, field, or method mapping: an official (obfuscated) name, the
/// stable tool-generated intermediary name, and the human-readable mapped
/// name.
///
/// Records are immutable once inserted into a mapping set. Short names are
/// always derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRecord {
    /// Official name of the enclosing class. Present for fields and
    /// methods; absent for classes.
    pub parent_official_name: Option<String>,
    pub official_name: String,
    pub intermediary_name: String,
    pub mapped_name: String,
}

impl MappingRecord {
    /// The trailing segment of the `$`-separated intermediary name.
    pub fn intermediary_short_name(&self) -> &str {
        short_name(&self.intermediary_name)
    }

    /// The trailing segment of the `$`-separated mapped name.
    pub fn mapped_short_name(&self) -> &str {
        short_name(&self.mapped_name)
    }
}

impl fmt::Display for MappingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.official_name, self.intermediary_name, self.mapped_name
        )
    }
}

fn short_name(name: &str) -> &str {
    name.rsplit('$').next().unwrap_or(name)
}
