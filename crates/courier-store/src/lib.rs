//! Document collection driver for Courier.
//!
//! The persistence core talks to storage only through the [`Collection`] and
//! [`Database`] traits: find/insert/update/delete over JSON documents
//! selected by a [`Filter`], each call bounded by an [`OpContext`] deadline.
//!
//! # Storage Backends
//!
//! - [`InMemoryDatabase`] / [`InMemoryCollection`] -- insertion-ordered
//!   engine for tests, fixtures and single-process deployments
//!
//! # Driver Rules
//!
//! 1. `_id` is unique per collection.
//! 2. Reads return documents in storage order.
//! 3. No call outlives its context deadline.

pub mod context;
pub mod document;
pub mod error;
pub mod memory;
pub mod traits;

pub use context::OpContext;
pub use document::{Document, Filter, UpdateSpec, ID_FIELD};
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryCollection, InMemoryDatabase};
pub use traits::{Collection, Database, UpdateOutcome};
