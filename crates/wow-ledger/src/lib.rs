//! Ledger client boundary for the Wall of Wishes.
//!
//! The ledger is an external, untrusted, best-effort service. This crate
//! wraps it behind the [`LedgerClient`] trait with two variants chosen once
//! from configuration:
//!
//! - [`SimulatedLedger`] -- local, never touches the network
//! - [`RpcLedger`] -- talks JSON to a ledger gateway over HTTP
//!
//! References produced locally carry a recognizable prefix so they can never
//! be mistaken for on-chain ones (see [`address`]).

pub mod address;
pub mod config;
pub mod error;
pub mod records;
pub mod rpc;
pub mod simulated;
pub mod traits;

pub use address::{AddressDeriver, FALLBACK_PREFIX, SIMULATED_PREFIX, SIMULATED_TRANSFER_PREFIX};
pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};
pub use records::{LedgerEntry, TransferReceipt};
pub use rpc::RpcLedger;
pub use simulated::SimulatedLedger;
pub use traits::{LedgerClient, LedgerMode};
