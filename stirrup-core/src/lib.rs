//! Core of the stirrup project: a generic repository layer over document
//! stores, plus the abstractions it is built from.
//!
//! - **Entity trait** ([`entity`]) - Persisted record types and their
//!   collection bindings
//! - **Store backend abstraction** ([`backend`]) - The seam between the
//!   repository and a concrete document store
//! - **Generic repository** ([`repository`]) - Typed CRUD and query access
//!   to one collection
//! - **Pagination** ([`page`]) - Skip/limit page results with authoritative
//!   totals
//! - **Find/count options** ([`options`]) - Store-native query options
//! - **Error handling** ([`error`]) - Two-tier error types and the
//!   read-failure policy
//!
//! # Example
//!
//! ```ignore
//! use stirrup_core::{entity::Entity, repository::Repository};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub id: u64,
//!     pub name: String,
//! }
//!
//! impl Entity for User {}
//!
//! // Binds to the "user" collection on any attached backend.
//! let users = Repository::<User>::new(backend);
//! ```

#[allow(unused_extern_crates)]
extern crate self as stirrup_core;

pub mod backend;
pub mod entity;
pub mod error;
pub mod options;
pub mod page;
pub mod repository;
