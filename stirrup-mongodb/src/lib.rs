//! MongoDB backend implementation for stirrup.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend`
//! trait, forwarding filters and pipelines verbatim to the server.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! stirrup = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Features
//!
//! - **Persistent storage** - Data is persisted to MongoDB Atlas or self-hosted MongoDB
//! - **Full query support** - Filters, find options and aggregation pipelines run on the server
//! - **Async/await** - Fully asynchronous API built on MongoDB's async driver
//! - **Flexible connection** - URI, credential pair and arbitrary client-option mutators
//!
//! # Connection
//!
//! ```ignore
//! use stirrup::{backend::StoreBackendBuilder, mongodb::MongoStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoStore::builder("mongodb://localhost:27017", "my_database")
//!         .with_credentials("app", "secret")
//!         .with_client_option(|options| options.app_name = Some("orders".to_string()))
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as stirrup_mongodb;

pub mod store;

pub use store::{ClientOptionsMutator, MongoStore, MongoStoreBuilder};
