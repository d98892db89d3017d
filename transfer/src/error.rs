use std::fmt;
use thiserror::Error;

/// The error type for transfer operations.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A credential is missing or malformed.
    Credential,

    /// The remote endpoint rejected a signature.
    Authentication,

    /// A locator or option holds invalid values.
    Config,

    /// The source could not produce a chunk's bytes.
    SourceRead,

    /// Staging one chunk failed; carries the chunk's index.
    ChunkUpload {
        /// Index of the chunk that failed.
        index: u32,
    },

    /// The final block-list commit failed.
    Commit,

    /// Everything else.
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

// Convenience constructors
impl Error {
    /// Create a credential error.
    pub fn credential(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Credential, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Create a source read error.
    pub fn source_read(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SourceRead, message)
    }

    /// Create a chunk upload error for the given chunk index.
    pub fn chunk_upload(index: u32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ChunkUpload { index }, message)
    }

    /// Create a commit error.
    pub fn commit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Commit, message)
    }

    /// Create an unexpected error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Credential => write!(f, "invalid credential"),
            ErrorKind::Authentication => write!(f, "authentication rejected"),
            ErrorKind::Config => write!(f, "invalid configuration"),
            ErrorKind::SourceRead => write!(f, "source read failed"),
            ErrorKind::ChunkUpload { index } => write!(f, "chunk {index} upload failed"),
            ErrorKind::Commit => write!(f, "commit failed"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, Error>;

impl From<blobport_core::Error> for Error {
    fn from(err: blobport_core::Error) -> Self {
        let kind = match err.kind() {
            blobport_core::ErrorKind::CredentialInvalid
            | blobport_core::ErrorKind::PermissionInvalid => ErrorKind::Credential,
            blobport_core::ErrorKind::ConfigInvalid => ErrorKind::Config,
            blobport_core::ErrorKind::RequestInvalid | blobport_core::ErrorKind::Unexpected => {
                ErrorKind::Unexpected
            }
        };

        Self::new(kind, err.to_string()).with_source(err)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
