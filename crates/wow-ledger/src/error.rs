/// Errors produced by ledger calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger unreachable: {0}")]
    Network(String),

    #[error("ledger rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid ledger response: {0}")]
    InvalidResponse(String),

    #[error("invalid ledger configuration: {0}")]
    Config(String),
}

/// Result alias for ledger calls.
pub type LedgerResult<T> = Result<T, LedgerError>;
