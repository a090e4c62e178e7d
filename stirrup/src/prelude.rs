//! Convenient re-exports of commonly used types from stirrup.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use stirrup::prelude::*;
//! ```
//!
//! This provides access to:
//! - The entity trait and serialization helpers
//! - The generic repository and its options
//! - Store backends and builders
//! - Pagination and find/count options
//! - Error types and the bootstrap shell

pub use stirrup_core::{
    backend::{DocumentStream, Filter, StoreBackend, StoreBackendBuilder},
    entity::{Entity, EntityExt},
    error::{ReadFailurePolicy, StoreError, StoreResult},
    options::{CountOptions, FindOptions, Sort, SortDirection},
    page::Page,
    repository::{RepoOptions, Repository},
};

pub use crate::{app::App, config::Settings};
