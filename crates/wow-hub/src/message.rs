use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wow_types::Snapshot;

use crate::error::{HubError, HubResult};

/// An encoded push message, shared by every observer of one broadcast.
pub type Frame = Arc<str>;

/// Messages on the push channel.
///
/// Encoded as `{"type": "WISHES_LIST", "data": [...]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PushMessage {
    WishesList(Snapshot),
}

impl PushMessage {
    pub fn encode(&self) -> HubResult<Frame> {
        serde_json::to_string(self)
            .map(Frame::from)
            .map_err(|e| HubError::Encode(e.to_string()))
    }

    pub fn decode(frame: &str) -> HubResult<Self> {
        serde_json::from_str(frame).map_err(|e| HubError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::Value;
    use wow_types::WishDisplay;

    #[test]
    fn wire_shape() {
        let snapshot = Snapshot::new(vec![WishDisplay {
            id: 1,
            title: "Peace".into(),
            timestamp: Utc::now(),
            pubkey: "addr".into(),
            wallet_address: None,
            signature: Some("sig".into()),
            total_donations: 3,
        }]);
        let frame = PushMessage::WishesList(snapshot.clone()).encode().unwrap();

        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "WISHES_LIST");
        assert_eq!(value["data"][0]["title"], "Peace");
        assert_eq!(value["data"][0]["totalDonations"], 3);

        let PushMessage::WishesList(decoded) = PushMessage::decode(&frame).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn empty_snapshot_is_empty_array() {
        let frame = PushMessage::WishesList(Snapshot::default()).encode().unwrap();
        assert_eq!(&*frame, r#"{"type":"WISHES_LIST","data":[]}"#);
    }

    #[test]
    fn garbage_does_not_decode() {
        assert!(matches!(
            PushMessage::decode(r#"{"type":"OTHER"}"#),
            Err(HubError::Decode(_))
        ));
    }
}
