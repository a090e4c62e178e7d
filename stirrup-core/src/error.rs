//! Error and result types for repository and bootstrap operations.
//!
//! Errors fall into two tiers. Read-path failures (query execution, decode)
//! and bootstrap failures (configuration, registration) are unrecoverable
//! environment or programming defects; write-path failures and
//! zero-rows-affected conditions are ordinary values the caller is expected
//! to inspect. [`StoreError::is_fatal`] reports the tier, and
//! [`ReadFailurePolicy`] controls whether the repository aborts or
//! propagates on the fatal tier.

use bson::error::Error as BsonError;
use thiserror::Error;

/// All errors surfaced by the repository, the storage backends, and the
/// bootstrap shell.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Entity (de)serialization to or from the store's document format failed.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Connection setup or store initialization failed.
    #[error("initialization error: {0}")]
    Initialization(String),
    /// The configuration file could not be loaded or a key lookup failed.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A read-path query failed in the underlying store.
    #[error("query error: {0}")]
    Query(String),
    /// A write-path operation failed in the underlying store.
    #[error("write error: {0}")]
    Write(String),
    /// A write operation matched or affected zero documents.
    /// The argument is the collection name.
    #[error("no documents matched in collection {0}")]
    NoMatch(String),
    /// A constructor was registered twice for the same service type.
    #[error("provider already registered for {0}")]
    DuplicateProvider(String),
    /// A service was resolved without a registered constructor, or its
    /// constructor participates in a dependency cycle.
    #[error("no provider registered for {0}")]
    UnresolvedDependency(String),
}

impl StoreError {
    /// Whether this error belongs to the unrecoverable tier.
    ///
    /// Write failures and [`StoreError::NoMatch`] are recoverable; everything
    /// else indicates a broken environment or a programming defect.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, StoreError::Write(_) | StoreError::NoMatch(_))
    }
}

/// A specialized `Result` for repository operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// What the repository does when a read-path operation fails.
///
/// The recoverable write tier is unaffected by this policy; it only governs
/// query and decode failures on `find_all`, `find_page`, `find_one` and
/// `count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadFailurePolicy {
    /// Panic at the point of failure. Read failures indicate an environment
    /// or programming defect and are not meant to be caught by callers.
    #[default]
    Abort,
    /// Return the error value instead of panicking.
    Propagate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_tier_is_recoverable() {
        assert!(!StoreError::Write("duplicate key".to_string()).is_fatal());
        assert!(!StoreError::NoMatch("order".to_string()).is_fatal());
    }

    #[test]
    fn read_and_bootstrap_tiers_are_fatal() {
        assert!(StoreError::Query("cursor died".to_string()).is_fatal());
        assert!(StoreError::Serialization("bad shape".to_string()).is_fatal());
        assert!(StoreError::Configuration("missing file".to_string()).is_fatal());
        assert!(StoreError::UnresolvedDependency("OrderService".to_string()).is_fatal());
    }
}
