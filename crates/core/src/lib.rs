//! Card bus domain core.
//!
//! Pure domain logic shared by the storage, event and HTTP crates:
//!
//! - [`card`]: the card data model and its construction helpers.
//! - [`config`]: environment-variable configuration helpers.
//! - [`codec`]: the single JSON encode/decode capability.
//! - [`schema`]: the adapter between [`card::Card`] and the external wire
//!   contract.
//! - [`gateway`]: the persistence seam implemented by `cardbus-db`.
//! - [`topics`]: lifecycle event topic names.
//! - [`error`]: the error taxonomy.
//! - [`types`]: shared type aliases.

pub mod card;
pub mod codec;
pub mod config;
pub mod error;
pub mod gateway;
pub mod schema;
pub mod topics;
pub mod types;
