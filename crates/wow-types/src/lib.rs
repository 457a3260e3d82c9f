//! Foundation types for the Wall of Wishes.
//!
//! Every other `wow-*` crate depends on this one. It holds the persisted
//! records, the display shape pushed to observers, and the pre-flight input
//! checks that run before any side effect.
//!
//! # Key Types
//!
//! - [`Wish`] -- a stored wish with its donation counter
//! - [`Donation`] -- a confirmed value transfer towards a wish
//! - [`User`] -- a registered identity, optionally bound to a wallet
//! - [`WishDisplay`] / [`Snapshot`] -- the whole-state view sent to observers
//! - [`TransferStatus`] -- lifecycle of wishes and donations

pub mod donation;
pub mod error;
pub mod status;
pub mod user;
pub mod validation;
pub mod wish;

pub use donation::{Donation, NewDonation};
pub use error::TypeError;
pub use status::TransferStatus;
pub use user::{NewUser, User};
pub use validation::{
    validate_address, validate_amount, validate_title, validate_wish_id, FieldError,
    MAX_AMOUNT, MAX_TITLE_LEN, MIN_ADDRESS_LEN,
};
pub use wish::{NewWish, Snapshot, Wish, WishDisplay};

/// Store-assigned row identifier.
pub type RowId = i64;
