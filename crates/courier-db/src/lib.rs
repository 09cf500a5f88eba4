//! Generic document persistence for Courier.
//!
//! Each domain entity has a storage record implementing [`ModelAdapter`].
//! [`DocumentStore`] is a CRUD engine generic over that contract, and
//! [`ConsistencyCoordinator`] runs the concurrent lookups that keep
//! cross-entity references valid and assemble composite views.
//!
//! # Layers
//!
//! - [`models`] -- one record type per entity (`UserRecord`, `MessageRecord`, ...)
//! - [`DocumentStore`] -- insert/find/update/delete over a
//!   [`courier_store::Collection`], every call bounded by
//!   [`StoreConfig::op_timeout`]
//! - [`services`] -- per-entity validation and relationship checks, bundled
//!   as [`Services`]
//!
//! # Rules
//!
//! 1. Filters derive from populated identifying fields in a fixed priority.
//! 2. Timestamps are stamped by the store, never by callers.
//! 3. Soft-deleted documents are invisible to reads and mutations.
//! 4. The primary dependency's error wins when both lookups fail.

pub mod adapter;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use adapter::ModelAdapter;
pub use config::{StoreConfig, DEFAULT_OP_TIMEOUT};
pub use coordinator::{ConsistencyCoordinator, PairFailure, Side};
pub use error::{DbError, DbResult};
pub use models::Timestamps;
pub use services::{
    ContactService, ConversationService, GroupDetail, GroupMembershipService, GroupService,
    MessageService, Services, UserService,
};
pub use store::DocumentStore;
