//! Error types for kbase.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using kbase's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
///
/// Callers (the HTTP layer in particular) branch on the kind rather than on
/// individual variants so that new variants do not leak into status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    NameAlreadyTaken,
    ReferentialIntegrityViolation,
    ConversionFailed,
    InvalidArgument,
    Internal,
}

/// Core error type for kbase operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Store round-trip failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Topic not found
    #[error("Topic with ID {0} not found")]
    TopicNotFound(Uuid),

    /// Doc not found (optionally scoped by owner)
    #[error("Doc with ID {0} not found")]
    DocNotFound(Uuid),

    /// Index card not found
    #[error("Index card with ID {0} not found")]
    IndexCardNotFound(Uuid),

    /// Index card exists but carries no answer image
    #[error("Index card with ID {0} has no answer image")]
    AnswerImageNotFound(Uuid),

    /// A topic with this name already exists
    #[error("Topic name '{0}' is already taken")]
    TopicNameAlreadyTaken(String),

    /// A doc with this name already exists for the same owner
    #[error("Doc name '{0}' is already taken")]
    DocNameAlreadyTaken(String),

    /// Deletion blocked by existing dependents
    #[error("{0}")]
    ReferentialIntegrityViolation(String),

    /// External conversion could not be completed or its input could not be read
    #[error("Conversion failed: {0}")]
    ConversionFailed(String),

    /// Caller-supplied value fails a precondition
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::TopicNotFound(_)
            | Error::DocNotFound(_)
            | Error::IndexCardNotFound(_)
            | Error::AnswerImageNotFound(_) => ErrorKind::NotFound,
            Error::TopicNameAlreadyTaken(_) | Error::DocNameAlreadyTaken(_) => {
                ErrorKind::NameAlreadyTaken
            }
            Error::ReferentialIntegrityViolation(_) => ErrorKind::ReferentialIntegrityViolation,
            Error::ConversionFailed(_) => ErrorKind::ConversionFailed,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Database(_)
            | Error::Config(_)
            | Error::Internal(_) => ErrorKind::Internal,
        }
    }
}
