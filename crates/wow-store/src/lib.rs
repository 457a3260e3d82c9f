//! Relational storage for the Wall of Wishes.
//!
//! The store is the single source of truth for users, wishes, and donations.
//! Nothing above it caches wish state; every snapshot is re-read from here.
//!
//! # Backends
//!
//! All backends implement the [`WishStore`] trait:
//!
//! - [`InMemoryWishStore`] -- lock-guarded maps for tests and embedding
//! - [`SqliteWishStore`] -- pooled SQLite, durable across restarts
//!
//! # Design Rules
//!
//! 1. Rows are never deleted; wishes and donations only move forward.
//! 2. `total_donations` changes only through [`WishStore::increment_wish_donations`].
//! 3. Conflicting writes to the same wish row are serialized by the backend.
//! 4. Reads may run concurrently with writes.
//! 5. Missing rows are `Ok(None)`, never an error.

pub mod error;
pub mod memory;
pub mod migrations;
pub mod sqlite;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryWishStore;
pub use sqlite::SqliteWishStore;
pub use traits::WishStore;
