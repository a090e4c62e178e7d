//! Page result type for skip/limit queries.

use serde::{Deserialize, Serialize};

/// One bounded slice of a larger result set plus the total matching count.
///
/// The total is computed by an independent count query and is authoritative
/// even when `data` is empty — a page requested past the end of the result
/// set still reports the real total.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The entities on this page, in store order.
    pub data: Vec<T>,
    /// Total count of matching documents across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// Creates a page from its parts.
    pub fn new(data: Vec<T>, total: u64) -> Self {
        Self { data, total }
    }

    /// An empty page with the given authoritative total.
    pub fn empty(total: u64) -> Self {
        Self { data: Vec::new(), total }
    }

    /// Whether this page carries no entities.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self { data: Vec::new(), total: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_keeps_total() {
        let page = Page::<String>::empty(42);

        assert!(page.is_empty());
        assert_eq!(page.total, 42);
    }

    #[test]
    fn default_page_is_zeroed() {
        let page = Page::<String>::default();

        assert!(page.is_empty());
        assert_eq!(page.total, 0);
    }
}
