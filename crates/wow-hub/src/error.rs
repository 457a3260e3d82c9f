/// Errors produced by the broadcast hub.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// A snapshot could not be encoded; nothing was sent.
    #[error("encode error: {0}")]
    Encode(String),

    /// A push frame could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Convenience alias used throughout the hub crate.
pub type HubResult<T> = Result<T, HubError>;
