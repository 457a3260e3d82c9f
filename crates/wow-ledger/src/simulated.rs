use async_trait::async_trait;
use tracing::info;

use crate::address::{random_reference, AddressDeriver, SIMULATED_PREFIX, SIMULATED_TRANSFER_PREFIX};
use crate::error::LedgerResult;
use crate::records::{LedgerEntry, TransferReceipt};
use crate::traits::{LedgerClient, LedgerMode};

/// Local ledger that never touches the network.
///
/// Entry addresses are derived the same way a real deployment derives them;
/// references are random and prefixed with [`SIMULATED_PREFIX`].
#[derive(Clone, Debug, Default)]
pub struct SimulatedLedger;

impl SimulatedLedger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LedgerClient for SimulatedLedger {
    async fn record_entry(&self, title: &str, author: &str) -> LedgerResult<LedgerEntry> {
        let entry = LedgerEntry {
            reference: random_reference(SIMULATED_PREFIX),
            address: AddressDeriver::ENTRY.entry_address(author, title),
        };
        info!(address = %entry.address, "simulated ledger entry");
        Ok(entry)
    }

    async fn transfer(
        &self,
        sender: &str,
        recipient: &str,
        amount: u64,
    ) -> LedgerResult<TransferReceipt> {
        let reference = random_reference(SIMULATED_TRANSFER_PREFIX);
        info!(%sender, %recipient, amount, %reference, "simulated transfer");
        Ok(TransferReceipt { reference })
    }

    fn mode(&self) -> LedgerMode {
        LedgerMode::Simulated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHOR: &str = "Ab12Cd34Ef56Gh78Ij90Kl12Mn34Op56";
    const RECIPIENT: &str = "Zz98Yy76Xx54Ww32Vv10Uu98Tt76Ss54";

    #[tokio::test]
    async fn entry_address_matches_derivation() {
        let ledger = SimulatedLedger::new();
        let entry = ledger.record_entry("Peace", AUTHOR).await.unwrap();
        assert_eq!(entry.address, AddressDeriver::ENTRY.entry_address(AUTHOR, "Peace"));
        assert!(entry.reference.starts_with(SIMULATED_PREFIX));
        assert!(!entry.is_fallback());
    }

    #[tokio::test]
    async fn transfer_reference_is_prefixed() {
        let ledger = SimulatedLedger::new();
        let receipt = ledger.transfer(AUTHOR, RECIPIENT, 500_000).await.unwrap();
        assert!(receipt.reference.starts_with(SIMULATED_TRANSFER_PREFIX));
        assert_eq!(ledger.mode(), LedgerMode::Simulated);
    }
}
