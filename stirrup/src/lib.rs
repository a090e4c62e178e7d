//! Main stirrup crate: a minimal application bootstrap around a generic
//! document repository.
//!
//! This crate is the primary entry point for users of the stirrup project.
//! It re-exports the core types from the sub-crates, provides access to the
//! storage backends, and adds the two pieces an application shell needs at
//! startup: configuration loading and hand-wired service registration.
//!
//! # Features
//!
//! - **Typed repositories** - Define entities with serde and get CRUD and
//!   query access to one collection per type
//! - **Multiple backends** - In-memory storage out of the box, MongoDB
//!   behind the `mongodb` feature
//! - **Explicit wiring** - Constructor closures composed by hand at
//!   startup, no container magic
//! - **Environment configuration** - JSON files under `./configs`, one per
//!   environment
//!
//! # Quick Start
//!
//! ```ignore
//! use stirrup::{prelude::*, memory::MemoryStore};
//! use serde::{Serialize, Deserialize};
//! use bson::doc;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub id: u64,
//!     pub name: String,
//! }
//!
//! impl Entity for User {}
//!
//! #[tokio::main]
//! async fn main() -> StoreResult<()> {
//!     let mut app = App::new(Settings::load("local")?);
//!     app.attach_store(MemoryStore::new());
//!
//!     // One repository per entity type, bound to the "user" collection.
//!     let users = app.repository::<User>()?;
//!
//!     users.insert(&User { id: 1, name: "Alice".to_string() }).await?;
//!
//!     let alice = users.find_one(doc! { "name": "Alice" }).await?;
//!     println!("found: {alice:?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # MongoDB
//!
//! With the `mongodb` feature enabled, the shell can build the store from
//! configuration:
//!
//! ```ignore
//! let mut app = App::new(Settings::from_env()?);
//! app.connect_mongodb([]).await?;
//! ```
//!
//! reading `database.uri`, `database.name` and the optional credential pair
//! from the active environment's config file.
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires the `mongodb` feature)

pub mod app;
pub mod config;
pub mod prelude;

pub use stirrup_core::{backend, entity, error, options, page, repository};

// Re-export BSON types for convenience
pub use bson;

pub use app::App;
pub use config::Settings;

/// In-memory storage backend implementations.
pub mod memory {
    pub use stirrup_memory::{MemoryStore, MemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use stirrup_mongodb::{ClientOptionsMutator, MongoStore, MongoStoreBuilder};
}
