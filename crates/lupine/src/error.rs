use std::fmt;

/// An error that can occur in Lupine.
///
/// Expected absences are not errors: an unknown version, a missing mapping,
/// or an unresolvable token surfaces as `None` or an empty collection from
/// the operation that produced it. `Error` is reserved for resource-level
/// faults, chiefly the storage medium and the fetch collaborator.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

#[derive(Debug)]
pub(crate) enum ErrorKind {
    /// The backing SQLite database failed.
    Storage(rusqlite::Error),
    /// Reading or writing local files failed.
    Io(std::io::Error),
    /// An input archive could not be opened or one of its entries read.
    Archive(String),
    /// The fetch collaborator could not deliver versions or mapping lines.
    Fetch(String),
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Error { kind }
    }

    /// Creates an archive-level error from any displayable cause.
    pub fn archive(cause: impl fmt::Display) -> Self {
        Error::new(ErrorKind::Archive(cause.to_string()))
    }

    /// Creates a fetch-level error from any displayable cause.
    pub fn fetch(cause: impl fmt::Display) -> Self {
        Error::new(ErrorKind::Fetch(cause.to_string()))
    }

    /// Returns true if this error came from the storage medium.
    pub fn is_storage(&self) -> bool {
        matches!(self.kind, ErrorKind::Storage(_))
    }

    /// Returns true if this error came from the fetch collaborator.
    pub fn is_fetch(&self) -> bool {
        matches!(self.kind, ErrorKind::Fetch(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Storage(err) => write!(f, "storage error: {err}"),
            ErrorKind::Io(err) => write!(f, "i/o error: {err}"),
            ErrorKind::Archive(msg) => write!(f, "archive error: {msg}"),
            ErrorKind::Fetch(msg) => write!(f, "fetch error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Storage(err) => Some(err),
            ErrorKind::Io(err) => Some(err),
            ErrorKind::Archive(_) | ErrorKind::Fetch(_) => None,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::new(ErrorKind::Storage(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::new(ErrorKind::Io(err))
    }
}
