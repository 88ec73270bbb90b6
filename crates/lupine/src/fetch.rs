use crate::version::MappingVersion;
use crate::Result;

/// Collaborator contract for retrieving mapping data.
///
/// The store never performs network I/O itself; callers hand it lines
/// obtained through an implementation of this trait. The shipped HTTP
/// implementation lives in the CLI crate; tests substitute in-memory
/// fakes.
pub trait MappingFetch {
    /// Retrieves the upstream version listing.
    fn versions(&self) -> Result<Vec<MappingVersion>>;

    /// Retrieves the raw tab-delimited mapping lines for `version`,
    /// without the payload header line.
    fn mapping_lines(&self, version: &MappingVersion) -> Result<Vec<String>>;
}
