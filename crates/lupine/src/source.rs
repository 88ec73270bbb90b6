use regex::Regex;

use crate::record::MappingRecord;
use crate::tiny::ParsedMappings;
use crate::Result;

/// Query surface shared by every mapping-set variant.
///
/// Both the persistent store-backed variant and the ad-hoc local-file
/// variant expose exactly these operations; the remapper and the
/// interactive surfaces depend only on this trait.
///
/// Lookup misses are `None`/empty results, never errors. The `Result`
/// wrapper carries storage-medium faults only.
pub trait MappingSource {
    /// Finds a class whose *short* intermediary name (text after the last
    /// `$`) equals `name`.
    fn class_by_intermediary(&self, name: &str) -> Result<Option<MappingRecord>>;

    /// Finds a field by its full intermediary name.
    fn field_by_intermediary(&self, name: &str) -> Result<Option<MappingRecord>>;

    /// Finds a method by its full intermediary name.
    fn method_by_intermediary(&self, name: &str) -> Result<Option<MappingRecord>>;

    fn class_by_official(&self, name: &str) -> Result<Option<MappingRecord>>;
    fn field_by_official(&self, name: &str) -> Result<Option<MappingRecord>>;
    fn method_by_official(&self, name: &str) -> Result<Option<MappingRecord>>;

    /// Returns every record named `name`. Classes match on any of the
    /// three name forms; fields and methods match on intermediary or
    /// mapped only, since the obfuscator reuses short official names
    /// across unrelated members.
    fn search(&self, name: &str) -> Result<Vec<MappingRecord>>;

    /// Resolves `parent` to a class (tried as intermediary, mapped, then
    /// official name, first match wins) and returns its nested classes
    /// plus its member fields and methods. Unknown parents yield an empty
    /// list.
    fn children(&self, parent: &str) -> Result<Vec<MappingRecord>>;
}

impl<T: MappingSource + ?Sized> MappingSource for &T {
    fn class_by_intermediary(&self, name: &str) -> Result<Option<MappingRecord>> {
        (**self).class_by_intermediary(name)
    }

    fn field_by_intermediary(&self, name: &str) -> Result<Option<MappingRecord>> {
        (**self).field_by_intermediary(name)
    }

    fn method_by_intermediary(&self, name: &str) -> Result<Option<MappingRecord>> {
        (**self).method_by_intermediary(name)
    }

    fn class_by_official(&self, name: &str) -> Result<Option<MappingRecord>> {
        (**self).class_by_official(name)
    }

    fn field_by_official(&self, name: &str) -> Result<Option<MappingRecord>> {
        (**self).field_by_official(name)
    }

    fn method_by_official(&self, name: &str) -> Result<Option<MappingRecord>> {
        (**self).method_by_official(name)
    }

    fn search(&self, name: &str) -> Result<Vec<MappingRecord>> {
        (**self).search(name)
    }

    fn children(&self, parent: &str) -> Result<Vec<MappingRecord>> {
        (**self).children(parent)
    }
}

/// Matches mapped names of classes nested under `parent_mapped`: the
/// parent's mapped name followed by one or more `$`-separated suffixes.
pub(crate) fn nested_class_pattern(parent_mapped: &str) -> Regex {
    let pattern = format!("^{}(\\$[^$]+)+$", regex::escape(parent_mapped));
    // The only variable part is escaped, so the pattern always compiles.
    Regex::new(&pattern).expect("escaped nested-class pattern")
}

/// Ad-hoc mapping set loaded once from a local file.
///
/// Query semantics are identical to the persistent variant; lookups are
/// linear scans, which is fine for interactively-sized local files.
#[derive(Debug, Default)]
pub struct LocalSource {
    classes: Vec<MappingRecord>,
    fields: Vec<MappingRecord>,
    methods: Vec<MappingRecord>,
}

impl LocalSource {
    pub fn new() -> Self {
        LocalSource::default()
    }

    /// Bulk-loads the three record lists. Called exactly once, when the
    /// local file is activated.
    pub fn insert_mappings(&mut self, mappings: ParsedMappings) {
        self.classes = mappings.classes;
        self.fields = mappings.fields;
        self.methods = mappings.methods;
    }
}

impl MappingSource for LocalSource {
    fn class_by_intermediary(&self, name: &str) -> Result<Option<MappingRecord>> {
        Ok(self
            .classes
            .iter()
            .find(|rec| rec.intermediary_short_name() == name)
            .cloned())
    }

    fn field_by_intermediary(&self, name: &str) -> Result<Option<MappingRecord>> {
        Ok(self
            .fields
            .iter()
            .find(|rec| rec.intermediary_name == name)
            .cloned())
    }

    fn method_by_intermediary(&self, name: &str) -> Result<Option<MappingRecord>> {
        Ok(self
            .methods
            .iter()
            .find(|rec| rec.intermediary_name == name)
            .cloned())
    }

    fn class_by_official(&self, name: &str) -> Result<Option<MappingRecord>> {
        Ok(self
            .classes
            .iter()
            .find(|rec| rec.official_name == name)
            .cloned())
    }

    fn field_by_official(&self, name: &str) -> Result<Option<MappingRecord>> {
        Ok(self
            .fields
            .iter()
            .find(|rec| rec.official_name == name)
            .cloned())
    }

    fn method_by_official(&self, name: &str) -> Result<Option<MappingRecord>> {
        Ok(self
            .methods
            .iter()
            .find(|rec| rec.official_name == name)
            .cloned())
    }

    fn search(&self, name: &str) -> Result<Vec<MappingRecord>> {
        let mut found = Vec::new();

        found.extend(
            self.classes
                .iter()
                .filter(|rec| {
                    rec.intermediary_name == name
                        || rec.mapped_name == name
                        || rec.official_name == name
                })
                .cloned(),
        );
        found.extend(members_named(&self.fields, name).cloned());
        found.extend(members_named(&self.methods, name).cloned());

        Ok(found)
    }

    fn children(&self, parent: &str) -> Result<Vec<MappingRecord>> {
        let parent_class = self
            .classes
            .iter()
            .find(|rec| rec.intermediary_name == parent)
            .or_else(|| self.classes.iter().find(|rec| rec.mapped_name == parent))
            .or_else(|| self.classes.iter().find(|rec| rec.official_name == parent));

        let Some(parent_class) = parent_class else {
            return Ok(Vec::new());
        };

        let nested = nested_class_pattern(&parent_class.mapped_name);
        let mut found = Vec::new();

        found.extend(
            self.classes
                .iter()
                .filter(|rec| nested.is_match(&rec.mapped_name))
                .cloned(),
        );
        found.extend(members_of(&self.fields, &parent_class.official_name).cloned());
        found.extend(members_of(&self.methods, &parent_class.official_name).cloned());

        Ok(found)
    }
}

fn members_named<'a>(
    records: &'a [MappingRecord],
    name: &'a str,
) -> impl Iterator<Item = &'a MappingRecord> {
    records
        .iter()
        .filter(move |rec| rec.intermediary_name == name || rec.mapped_name == name)
}

fn members_of<'a>(
    records: &'a [MappingRecord],
    parent_official: &'a str,
) -> impl Iterator<Item = &'a MappingRecord> {
    records
        .iter()
        .filter(move |rec| rec.parent_official_name.as_deref() == Some(parent_official))
}
