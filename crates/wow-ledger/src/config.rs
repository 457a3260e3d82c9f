use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::LedgerResult;
use crate::rpc::RpcLedger;
use crate::simulated::SimulatedLedger;
use crate::traits::LedgerClient;

/// Which ledger to talk to. Selected once, at construction.
///
/// In TOML:
///
/// ```toml
/// [ledger]
/// mode = "rpc"
/// endpoint = "http://127.0.0.1:8899"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum LedgerConfig {
    #[default]
    Simulated,
    Rpc {
        endpoint: String,
    },
}

impl LedgerConfig {
    /// Build the configured client.
    pub fn build(&self) -> LedgerResult<Arc<dyn LedgerClient>> {
        match self {
            Self::Simulated => Ok(Arc::new(SimulatedLedger::new())),
            Self::Rpc { endpoint } => Ok(Arc::new(RpcLedger::new(endpoint.clone())?)),
        }
    }
}
