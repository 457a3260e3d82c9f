//! Pre-flight input checks. They run before any ledger call or store write,
//! so a failure here never leaves side effects behind.

use serde::{Deserialize, Serialize};

use crate::RowId;

/// Maximum wish title length, in characters.
pub const MAX_TITLE_LEN: usize = 100;

/// Minimum length of a wallet address.
pub const MIN_ADDRESS_LEN: usize = 32;

/// Upper bound on address length; anything longer is not a wallet address.
const MAX_ADDRESS_LEN: usize = 128;

/// A single rejected input field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_title(title: &str) -> Result<(), FieldError> {
    if title.trim().is_empty() {
        return Err(FieldError::new("title", "Wish title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(FieldError::new(
            "title",
            format!("Wish title must be at most {MAX_TITLE_LEN} characters"),
        ));
    }
    Ok(())
}

/// Checks that `value` looks like a wallet address: ASCII alphanumeric,
/// between [`MIN_ADDRESS_LEN`] and 128 characters.
pub fn validate_address(field: &str, value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError::new(field, "Wallet address is required"));
    }
    if value.len() < MIN_ADDRESS_LEN || value.len() > MAX_ADDRESS_LEN {
        return Err(FieldError::new(
            field,
            format!("Wallet address must be {MIN_ADDRESS_LEN} to {MAX_ADDRESS_LEN} characters"),
        ));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(FieldError::new(field, "Wallet address must be alphanumeric"));
    }
    Ok(())
}

/// Largest accepted amount; stores keep amounts as signed 64-bit integers.
pub const MAX_AMOUNT: u64 = i64::MAX as u64;

pub fn validate_amount(amount: u64) -> Result<(), FieldError> {
    if amount == 0 {
        return Err(FieldError::new("amount", "Amount must be a positive integer"));
    }
    if amount > MAX_AMOUNT {
        return Err(FieldError::new(
            "amount",
            format!("Amount must be at most {MAX_AMOUNT}"),
        ));
    }
    Ok(())
}

pub fn validate_wish_id(id: RowId) -> Result<(), FieldError> {
    if id <= 0 {
        return Err(FieldError::new("wishId", "Wish id must be a positive integer"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "Ab12Cd34Ef56Gh78Ij90Kl12Mn34Op56";

    #[test]
    fn title_bounds() {
        assert!(validate_title("Peace").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"a".repeat(MAX_TITLE_LEN)).is_ok());
        assert!(validate_title(&"a".repeat(MAX_TITLE_LEN + 1)).is_err());
    }

    #[test]
    fn title_counts_characters_not_bytes() {
        let title = "é".repeat(MAX_TITLE_LEN);
        assert!(validate_title(&title).is_ok());
    }

    #[test]
    fn address_shape() {
        assert_eq!(ADDR.len(), 32);
        assert!(validate_address("walletPublicKey", ADDR).is_ok());
        assert!(validate_address("walletPublicKey", "").is_err());
        assert!(validate_address("walletPublicKey", "short").is_err());
        let err = validate_address("walletPublicKey", &format!("{ADDR} x")).unwrap_err();
        assert_eq!(err.field, "walletPublicKey");
    }

    #[test]
    fn amount_and_id_must_be_positive() {
        assert!(validate_amount(1).is_ok());
        assert!(validate_amount(0).is_err());
        assert!(validate_amount(MAX_AMOUNT).is_ok());
        assert!(validate_amount(MAX_AMOUNT + 1).is_err());
        assert!(validate_amount(u64::MAX).is_err());
        assert!(validate_wish_id(1).is_ok());
        assert!(validate_wish_id(0).is_err());
        assert!(validate_wish_id(-3).is_err());
    }
}
