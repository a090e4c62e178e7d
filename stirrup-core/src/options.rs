//! Store-native options for find and count operations.
//!
//! These mirror the option surface of document-store drivers without tying
//! the core to a concrete driver type. Backends translate them into their
//! native equivalents.

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// Sort specification for query results.
#[derive(Debug, Clone)]
pub struct Sort {
    /// The field path to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl Sort {
    /// Creates a sort specification.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self { field: field.into(), direction }
    }
}

/// Options forwarded to the store's find operation.
///
/// # Example
///
/// ```ignore
/// use stirrup_core::options::{FindOptions, SortDirection};
///
/// let options = FindOptions::default()
///     .skip(20)
///     .limit(10)
///     .sort("created_at", SortDirection::Desc);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Number of documents to skip.
    pub skip: Option<u64>,
    /// Maximum number of documents to return.
    pub limit: Option<i64>,
    /// Sort specification for the result sequence.
    pub sort: Option<Sort>,
}

impl FindOptions {
    /// Sets the number of documents to skip.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the sort specification.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(Sort::new(field, direction));
        self
    }
}

/// Options forwarded to the store's count operation.
#[derive(Debug, Clone, Default)]
pub struct CountOptions {
    /// Number of matching documents to skip before counting.
    pub skip: Option<u64>,
    /// Maximum count to report.
    pub limit: Option<u64>,
}

impl CountOptions {
    /// Sets the number of matching documents to skip before counting.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the maximum count to report.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}
