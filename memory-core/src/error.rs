//! Crate-wide error type.
//!
//! Every fallible memory operation returns [`Result<T>`]. Variants mirror the
//! error taxonomy the memory core is specified against: bad input is
//! rejected fast with no side effects, cross-session access never leaks
//! data, and store failures degrade callers gracefully rather than
//! propagating implementation details of the underlying triple store.

/// Result type alias for memory operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the memory core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad type, empty required field, or unknown enumeration value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The referenced session has no known state.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// A query or mutation attempted to touch a memory asserted in another
    /// session.
    #[error("session mismatch: memory does not belong to session {0}")]
    SessionMismatch(String),

    /// The id was not present in the store.
    #[error("not found: {0}")]
    NotFound(String),

    /// The triple store could not be opened, queried, or closed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A caller-supplied timeout elapsed before the operation completed.
    /// State may or may not have been applied; callers must treat this as
    /// unknown state and rely on idempotent retries.
    #[error("operation timed out")]
    Timeout,

    /// Unexpected failure while persisting a promotion candidate. Isolated
    /// per-candidate by the promotion engine; never aborts a whole batch.
    #[error("adapter internal error: {0}")]
    AdapterInternal(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure underneath the store manager.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether a caller can retry this error with backoff.
    ///
    /// Matches the promotion/trigger retry policy (`§7` of the spec): store
    /// and timeout failures are transient, input and ownership errors are
    /// not.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::StoreUnavailable(_) | Error::Timeout | Error::AdapterInternal(_) => true,
            Error::InvalidInput(_)
            | Error::SessionNotFound(_)
            | Error::SessionMismatch(_)
            | Error::NotFound(_)
            | Error::Serialization(_)
            | Error::Io(_) => false,
        }
    }
}
