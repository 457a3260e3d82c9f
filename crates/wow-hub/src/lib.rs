//! Broadcast hub for the Wall of Wishes.
//!
//! Keeps the set of live observers and pushes whole-state snapshots to them.
//! Delivery is best-effort and at-most-once per broadcast: an observer that
//! is not ready to receive is skipped, never waited on, and never replayed.
//! Since every message is a full snapshot, a skipped observer catches up on
//! the next one.

pub mod error;
pub mod hub;
pub mod message;

pub use error::{HubError, HubResult};
pub use hub::{BroadcastHub, BroadcastReport, HubConfig, ObserverId, Subscription};
pub use message::{Frame, PushMessage};
