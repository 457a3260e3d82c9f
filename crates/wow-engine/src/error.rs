use wow_hub::HubError;
use wow_ledger::LedgerError;
use wow_store::StoreError;
use wow_types::{FieldError, RowId};

/// Coarse error taxonomy surfaced to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; detected before any side effect.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// The ledger refused or failed a transfer; nothing was recorded.
    Transfer,
    /// Anything else.
    Unexpected,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: RowId },

    #[error("transfer failed: {0}")]
    Transfer(LedgerError),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Transfer(_) => ErrorKind::Transfer,
            Self::Store(_) | Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    pub fn wish_not_found(id: RowId) -> Self {
        Self::NotFound { entity: "wish", id }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingReference { entity, id } => Self::NotFound { entity, id },
            StoreError::Conflict(message) => Self::Validation(vec![FieldError::new("user", message)]),
            other => Self::Store(other),
        }
    }
}

impl From<HubError> for EngineError {
    fn from(err: HubError) -> Self {
        Self::Unexpected(err.to_string())
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Turn a batch of field checks into one validation error.
pub(crate) fn collect_field_errors<I>(checks: I) -> EngineResult<()>
where
    I: IntoIterator<Item = Result<(), FieldError>>,
{
    let errors: Vec<FieldError> = checks.into_iter().filter_map(Result::err).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(EngineError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(EngineError::wish_not_found(1).kind(), ErrorKind::NotFound);
        assert_eq!(
            EngineError::Transfer(LedgerError::Network("down".into())).kind(),
            ErrorKind::Transfer
        );
        assert_eq!(
            EngineError::Unexpected("boom".into()).kind(),
            ErrorKind::Unexpected
        );
    }

    #[test]
    fn missing_reference_becomes_not_found() {
        let err: EngineError = StoreError::MissingReference { entity: "wish", id: 9 }.into();
        assert!(matches!(err, EngineError::NotFound { entity: "wish", id: 9 }));
    }

    #[test]
    fn field_errors_are_collected() {
        let err = collect_field_errors([
            Ok(()),
            Err(FieldError::new("title", "required")),
            Err(FieldError::new("amount", "positive")),
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "validation failed: title: required; amount: positive");
        assert!(collect_field_errors([Ok(())]).is_ok());
    }
}
