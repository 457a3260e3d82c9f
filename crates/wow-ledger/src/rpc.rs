use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::records::{LedgerEntry, TransferReceipt};
use crate::traits::{LedgerClient, LedgerMode};

#[derive(Serialize)]
struct EntryRequest<'a> {
    title: &'a str,
    author: &'a str,
}

#[derive(Serialize)]
struct TransferRequest<'a> {
    sender: &'a str,
    recipient: &'a str,
    amount: u64,
}

/// Ledger client speaking JSON to an HTTP ledger gateway.
///
/// - `POST {endpoint}/entries` with `{title, author}` returns `{reference, address}`
/// - `POST {endpoint}/transfers` with `{sender, recipient, amount}` returns `{reference}`
///
/// Any non-2xx status, or a 2xx body missing a reference, is a failure.
/// Calls carry no timeout of their own; a stalled gateway stalls only the
/// request that is waiting on it.
pub struct RpcLedger {
    client: reqwest::Client,
    endpoint: String,
}

impl RpcLedger {
    pub fn new(endpoint: impl Into<String>) -> LedgerResult<Self> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(LedgerError::Config(format!(
                "endpoint must be an http(s) URL: {endpoint}"
            )));
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("wow-ledger/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LedgerError::Config(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> LedgerResult<R> {
        let url = format!("{}/{path}", self.endpoint);
        debug!(%url, "ledger request");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| LedgerError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(%url, status = status.as_u16(), "ledger rejected request");
            return Err(LedgerError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| LedgerError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn record_entry(&self, title: &str, author: &str) -> LedgerResult<LedgerEntry> {
        let entry: LedgerEntry = self.post("entries", &EntryRequest { title, author }).await?;
        if entry.reference.is_empty() || entry.address.is_empty() {
            return Err(LedgerError::InvalidResponse(
                "entry response without reference or address".into(),
            ));
        }
        Ok(entry)
    }

    async fn transfer(
        &self,
        sender: &str,
        recipient: &str,
        amount: u64,
    ) -> LedgerResult<TransferReceipt> {
        let receipt: TransferReceipt = self
            .post(
                "transfers",
                &TransferRequest {
                    sender,
                    recipient,
                    amount,
                },
            )
            .await?;
        if receipt.reference.is_empty() {
            return Err(LedgerError::InvalidResponse(
                "transfer response without reference".into(),
            ));
        }
        Ok(receipt)
    }

    fn mode(&self) -> LedgerMode {
        LedgerMode::Rpc
    }
}

impl std::fmt::Debug for RpcLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcLedger")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    const SENDER: &str = "Ab12Cd34Ef56Gh78Ij90Kl12Mn34Op56";
    const RECIPIENT: &str = "Zz98Yy76Xx54Ww32Vv10Uu98Tt76Ss54";

    /// Fake gateway: records every entry, accepts transfers up to 1000 units,
    /// and answers transfers of exactly 7 with an empty reference.
    async fn spawn_gateway() -> String {
        let app = Router::new()
            .route(
                "/entries",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({
                        "reference": format!("tx-{}", body["title"].as_str().unwrap_or("")),
                        "address": format!("pda-{}", body["author"].as_str().unwrap_or("")),
                    }))
                }),
            )
            .route(
                "/transfers",
                post(|Json(body): Json<Value>| async move {
                    let amount = body["amount"].as_u64().unwrap_or(0);
                    if amount == 7 {
                        return (StatusCode::OK, Json(json!({ "reference": "" })));
                    }
                    if amount > 1000 {
                        return (
                            StatusCode::BAD_GATEWAY,
                            Json(json!({ "error": "insufficient funds" })),
                        );
                    }
                    (StatusCode::OK, Json(json!({ "reference": "tx-transfer" })))
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[test]
    fn rejects_non_http_endpoint() {
        assert!(matches!(
            RpcLedger::new("ftp://ledger"),
            Err(LedgerError::Config(_))
        ));
        let ledger = RpcLedger::new("http://ledger.local/").unwrap();
        assert_eq!(ledger.endpoint(), "http://ledger.local");
        assert_eq!(ledger.mode(), LedgerMode::Rpc);
    }

    #[tokio::test]
    async fn records_entry_through_gateway() {
        let ledger = RpcLedger::new(spawn_gateway().await).unwrap();
        let entry = ledger.record_entry("Peace", SENDER).await.unwrap();
        assert_eq!(entry.reference, "tx-Peace");
        assert_eq!(entry.address, format!("pda-{SENDER}"));
    }

    #[tokio::test]
    async fn transfer_success_and_rejection() {
        let ledger = RpcLedger::new(spawn_gateway().await).unwrap();
        let receipt = ledger.transfer(SENDER, RECIPIENT, 500).await.unwrap();
        assert_eq!(receipt.reference, "tx-transfer");

        let err = ledger.transfer(SENDER, RECIPIENT, 5000).await.unwrap_err();
        assert!(matches!(err, LedgerError::Rejected { status: 502, .. }));
    }

    #[tokio::test]
    async fn empty_reference_is_not_success() {
        let ledger = RpcLedger::new(spawn_gateway().await).unwrap();
        let err = ledger.transfer(SENDER, RECIPIENT, 7).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_gateway_is_network_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let ledger = RpcLedger::new(format!("http://{addr}")).unwrap();
        let err = ledger.record_entry("Peace", SENDER).await.unwrap_err();
        assert!(matches!(err, LedgerError::Network(_)));
    }
}
