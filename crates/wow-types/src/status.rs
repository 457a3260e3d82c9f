use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Lifecycle state shared by wishes and donations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    #[default]
    Pending,
    Confirmed,
    Failed,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "failed" => Ok(Self::Failed),
            other => Err(TypeError::UnknownStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_pending() {
        assert_eq!(TransferStatus::default(), TransferStatus::Pending);
    }

    #[test]
    fn parse_known_and_unknown() {
        assert_eq!("confirmed".parse::<TransferStatus>().unwrap(), TransferStatus::Confirmed);
        assert_eq!(
            "settled".parse::<TransferStatus>(),
            Err(TypeError::UnknownStatus("settled".into()))
        );
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&TransferStatus::Failed).unwrap();
        assert_eq!(json, "\"failed\"");
    }
}
