//! Authoritative entity store for the CutRoom backend.
//!
//! Everything the system persists (accounts, invites, videos) goes through
//! the [`Store`] trait. Status changes are compare-and-set operations guarded
//! on the expected prior status, so racing writers resolve to exactly one
//! winner; the loser observes [`StoreError::PreconditionFailed`].
//!
//! Two implementations:
//! - [`PgStore`]: Postgres via sqlx, the production store
//! - [`MemStore`]: in-memory, for tests and local development

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemStore;
pub use postgres::PgStore;
pub use store::Store;
