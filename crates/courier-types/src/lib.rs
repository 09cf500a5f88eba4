//! Foundation types for the Courier messaging backend.
//!
//! Every other Courier crate depends on `courier-types`.
//!
//! # Key Types
//!
//! - [`EntityId`] -- 12-byte identifier; "unset" is `Option::None`, never a
//!   zero value
//! - [`User`], [`Group`], [`Message`], [`Conversation`], [`Contact`],
//!   [`GroupMembership`] -- the domain entities
//! - [`Validate`] / [`ValidationCase`] -- required-field checks per operation

pub mod contact;
pub mod conversation;
pub mod error;
pub mod group;
pub mod id;
pub mod membership;
pub mod message;
pub mod user;
pub mod validation;

pub use contact::{Contact, ContactStatus};
pub use conversation::Conversation;
pub use error::TypeError;
pub use group::Group;
pub use id::{EntityId, SENTINEL_HEX};
pub use membership::GroupMembership;
pub use message::Message;
pub use user::User;
pub use validation::{Validate, ValidationCase};
