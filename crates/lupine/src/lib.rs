//! Versioned mapping store and identifier remapper.
//!
//! Lupine translates the intermediary identifiers found in decompiled
//! Fabric mod sources (`class_123`, `field_456`, `method_789`) into
//! human-readable Yarn names. Mapping sets are cached per Yarn version in
//! a local SQLite database; a lexical substitution pass rewrites strings
//! or whole archive trees and reports every token it could not resolve.

pub mod codec;
pub mod tiny;

mod error;
pub use error::Error;

mod record;
pub use record::MappingRecord;

mod version;
pub use version::MappingVersion;

mod source;
pub use source::{LocalSource, MappingSource};

mod store;
pub use store::{MappingStore, StoreSource};

mod remap;
pub use remap::{map_archive, map_text, ArchiveEntry, ArchiveSource, MappedText};

mod fetch;
pub use fetch::MappingFetch;

/// A Result type alias that uses Lupine's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
