use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::TransferStatus;
use crate::RowId;

/// A value transfer towards a wish, recorded after the ledger accepted it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: RowId,
    pub wish_id: RowId,
    pub sender_wallet_address: String,
    /// Smallest transfer unit.
    pub amount: u64,
    pub signature: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: TransferStatus,
}

/// Insert shape for [`Donation`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewDonation {
    pub wish_id: RowId,
    pub sender_wallet_address: String,
    pub amount: u64,
    pub signature: Option<String>,
    pub status: TransferStatus,
}

impl NewDonation {
    pub fn new(wish_id: RowId, sender_wallet_address: impl Into<String>, amount: u64) -> Self {
        Self {
            wish_id,
            sender_wallet_address: sender_wallet_address.into(),
            amount,
            signature: None,
            status: TransferStatus::Pending,
        }
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn status(mut self, status: TransferStatus) -> Self {
        self.status = status;
        self
    }
}
