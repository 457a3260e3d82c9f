use serde::Serialize;
use wow_ledger::TransferReceipt;
use wow_types::{
    validate_address, validate_amount, validate_wish_id, Donation, RowId,
};

use crate::error::{collect_field_errors, EngineResult};

/// Outcome of a wish submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishReceipt {
    /// Ledger transaction reference, real or synthetic.
    pub signature: String,
    /// Ledger-assigned address, real or synthetic.
    pub pubkey: String,
    /// Set when the ledger was unavailable and a placeholder entry was used.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

/// A donation as submitted by a client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DonationRequest {
    pub wish_id: RowId,
    pub sender_wallet_address: String,
    pub amount: u64,
    pub recipient_wallet_address: String,
}

impl DonationRequest {
    pub fn validate(&self) -> EngineResult<()> {
        collect_field_errors([
            validate_wish_id(self.wish_id),
            validate_address("walletPublicKey", &self.sender_wallet_address),
            validate_amount(self.amount),
            validate_address("recipientWalletAddress", &self.recipient_wallet_address),
        ])
    }
}

/// Outcome of a confirmed donation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DonationReceipt {
    pub donation: Donation,
    pub transaction: TransferReceipt,
}
