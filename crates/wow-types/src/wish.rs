use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::TransferStatus;
use crate::RowId;

/// A stored wish.
///
/// `total_donations` only ever grows: it is bumped once per confirmed
/// [`Donation`](crate::Donation) and never written any other way.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wish {
    pub id: RowId,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    /// Ledger-assigned address, or an empty string when none was assigned.
    pub pubkey: String,
    pub wallet_address: Option<String>,
    pub signature: Option<String>,
    pub status: TransferStatus,
    pub total_donations: u64,
    /// Weak back-reference to the creating [`User`](crate::User).
    pub user_id: Option<RowId>,
}

/// Insert shape for [`Wish`]. The store assigns `id` and `timestamp` and
/// starts `total_donations` at zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewWish {
    pub title: String,
    pub pubkey: String,
    pub wallet_address: Option<String>,
    pub signature: Option<String>,
    pub status: TransferStatus,
    pub user_id: Option<RowId>,
}

impl NewWish {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pubkey: String::new(),
            wallet_address: None,
            signature: None,
            status: TransferStatus::Pending,
            user_id: None,
        }
    }

    pub fn pubkey(mut self, pubkey: impl Into<String>) -> Self {
        self.pubkey = pubkey.into();
        self
    }

    pub fn wallet_address(mut self, address: impl Into<String>) -> Self {
        self.wallet_address = Some(address.into());
        self
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn status(mut self, status: TransferStatus) -> Self {
        self.status = status;
        self
    }

    pub fn user_id(mut self, user_id: Option<RowId>) -> Self {
        self.user_id = user_id;
        self
    }
}

/// One row of the wall as clients render it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishDisplay {
    pub id: RowId,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub pubkey: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub total_donations: u64,
}

impl From<&Wish> for WishDisplay {
    fn from(wish: &Wish) -> Self {
        Self {
            id: wish.id,
            title: wish.title.clone(),
            timestamp: wish.timestamp,
            pubkey: wish.pubkey.clone(),
            wallet_address: wish.wallet_address.clone(),
            signature: wish.signature.clone(),
            total_donations: wish.total_donations,
        }
    }
}

impl From<Wish> for WishDisplay {
    fn from(wish: Wish) -> Self {
        Self {
            id: wish.id,
            title: wish.title,
            timestamp: wish.timestamp,
            pubkey: wish.pubkey,
            wallet_address: wish.wallet_address,
            signature: wish.signature,
            total_donations: wish.total_donations,
        }
    }
}

/// Newest first; ids break ties so equal timestamps still order stably.
fn newest_first(a: &WishDisplay, b: &WishDisplay) -> Ordering {
    b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id))
}

/// The whole current wall, ordered newest-timestamp-first.
///
/// Snapshots are always complete state, never deltas. They serialize as a
/// bare JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    wishes: Vec<WishDisplay>,
}

impl Snapshot {
    /// Build a snapshot, enforcing newest-first order.
    pub fn new(mut wishes: Vec<WishDisplay>) -> Self {
        wishes.sort_by(newest_first);
        Self { wishes }
    }

    pub fn wishes(&self) -> &[WishDisplay] {
        &self.wishes
    }

    pub fn into_wishes(self) -> Vec<WishDisplay> {
        self.wishes
    }

    pub fn find(&self, id: RowId) -> Option<&WishDisplay> {
        self.wishes.iter().find(|w| w.id == id)
    }

    pub fn len(&self) -> usize {
        self.wishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wishes.is_empty()
    }

    /// Returns `true` if the wishes are ordered newest-first.
    pub fn is_ordered(&self) -> bool {
        self.wishes
            .windows(2)
            .all(|pair| newest_first(&pair[0], &pair[1]) != Ordering::Greater)
    }
}
