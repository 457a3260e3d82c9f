use wow_types::TypeError;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A foreign key points at a row that does not exist.
    #[error("referenced {entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: i64 },

    /// Error from the SQLite driver.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Could not check a connection out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// The on-disk schema cannot be used by this build.
    #[error("schema error: {0}")]
    Schema(String),

    /// A stored value could not be decoded.
    #[error("corrupt row: {0}")]
    Corrupt(#[from] TypeError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
