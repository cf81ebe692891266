//! Unified error type for all driver operations.

/// Things that can go wrong when using the driver.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The record or collection does not exist on disk.
    NotFound(String),
    /// File system problem (mkdir, read, write, rename, remove).
    Io(String),
    /// Failed to encode a value as JSON.
    Serialize(String),
    /// Stored bytes are not valid JSON, or don't fit the requested type.
    Deserialize(String),
    /// A collection or key name that can't be used as a single path component.
    InvalidName(String),
    /// Bad builder configuration.
    Config(String),
}

impl Error {
    /// `true` for [`Error::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotFound(what) => write!(f, "not found: {what}"),
            Error::Io(msg) => write!(f, "i/o error: {msg}"),
            Error::Serialize(msg) => write!(f, "serialization error: {msg}"),
            Error::Deserialize(msg) => write!(f, "deserialization error: {msg}"),
            Error::InvalidName(name) => write!(f, "invalid name: {name:?}"),
            Error::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
