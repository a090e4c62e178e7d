//! In-memory storage backend for stirrup.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `StoreBackend` trait. It uses async-aware read-write locks for concurrent
//! access and is ideal for development and testing.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Filter evaluation** - A BSON matcher covering the operators the repository relies on
//! - **Find options** - Sorting, skip and limit applied in store order
//!
//! # Quick Start
//!
//! ```ignore
//! use stirrup::{Entity, Repository, memory::MemoryStore};
//! use serde::{Serialize, Deserialize};
//! use std::sync::Arc;
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
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = Arc::new(MemoryStore::new());
//!     let users = Repository::<User>::new(backend);
//!
//!     users.insert(&User { id: 1, name: "Alice".to_string() }).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as stirrup_memory;

pub mod matcher;
pub mod store;

pub use store::{MemoryStore, MemoryStoreBuilder};
