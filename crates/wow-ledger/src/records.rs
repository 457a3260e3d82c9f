use serde::{Deserialize, Serialize};

use crate::address::{random_reference, AddressDeriver, FALLBACK_PREFIX};

/// A recorded wish entry on the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Transaction reference (signature).
    pub reference: String,
    /// Address of the entry account.
    pub address: String,
}

impl LedgerEntry {
    /// Locally generated placeholder used when the ledger could not record
    /// the entry. Both fields carry [`FALLBACK_PREFIX`].
    pub fn fallback(title: &str, author: &str) -> Self {
        Self {
            reference: random_reference(&format!("{FALLBACK_PREFIX}sig_")),
            address: format!(
                "{FALLBACK_PREFIX}{}",
                AddressDeriver::FALLBACK.entry_address(author, title)
            ),
        }
    }

    /// Returns `true` if this entry was produced by [`LedgerEntry::fallback`].
    pub fn is_fallback(&self) -> bool {
        self.reference.starts_with(FALLBACK_PREFIX)
    }
}

/// Outcome of a successful value transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub reference: String,
}
