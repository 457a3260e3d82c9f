//! Mutation engine for the Wall of Wishes.
//!
//! Orchestrates the create-wish and create-donation use cases: ledger call,
//! store write, snapshot re-read, broadcast. This is the only component that
//! writes to the store on behalf of clients.

pub mod engine;
pub mod error;
pub mod locks;
pub mod requests;

pub use engine::MutationEngine;
pub use error::{EngineError, EngineResult, ErrorKind};
pub use locks::WishLocks;
pub use requests::{DonationReceipt, DonationRequest, WishReceipt};

// Re-export the types callers need alongside the engine.
pub use wow_hub::{ObserverId, Subscription};
pub use wow_types::{Donation, NewUser, Snapshot, TransferStatus, User, Wish};
