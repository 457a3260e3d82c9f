use std::fmt;

use async_trait::async_trait;

use crate::error::LedgerResult;
use crate::records::{LedgerEntry, TransferReceipt};

/// Which ledger variant is in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerMode {
    Simulated,
    Rpc,
}

impl fmt::Display for LedgerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulated => f.write_str("simulated"),
            Self::Rpc => f.write_str("rpc"),
        }
    }
}

/// Boundary to the external ledger.
///
/// Inputs are validated before they reach the client; implementations only
/// fail for external reasons. A call either returns a complete result or an
/// error; there is no partial success.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Record a wish entry and return its transaction reference and address.
    async fn record_entry(&self, title: &str, author: &str) -> LedgerResult<LedgerEntry>;

    /// Move `amount` smallest units from `sender` to `recipient`.
    async fn transfer(
        &self,
        sender: &str,
        recipient: &str,
        amount: u64,
    ) -> LedgerResult<TransferReceipt>;

    fn mode(&self) -> LedgerMode;
}
