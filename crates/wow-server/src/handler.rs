use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use wow_engine::{DonationRequest, NewUser, Snapshot, TransferStatus, User, Wish, WishReceipt};
use wow_types::{Donation, RowId};

use crate::error::ApiError;
use crate::router::AppState;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWishBody {
    pub title: String,
    pub wallet_public_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationBody {
    pub wish_id: RowId,
    pub wallet_public_key: String,
    pub amount: u64,
    pub recipient_wallet_address: String,
}

impl From<CreateDonationBody> for DonationRequest {
    fn from(body: CreateDonationBody) -> Self {
        Self {
            wish_id: body.wish_id,
            sender_wallet_address: body.wallet_public_key,
            amount: body.amount,
            recipient_wallet_address: body.recipient_wallet_address,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: TransferStatus,
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn info_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": "wow-server",
        "version": env!("CARGO_PKG_VERSION"),
        "ledger": state.engine.ledger_mode().to_string(),
        "observers": state.engine.observer_count(),
    }))
}

pub async fn create_wish(
    State(state): State<AppState>,
    body: Result<Json<CreateWishBody>, JsonRejection>,
) -> ApiResult<Json<WishReceipt>> {
    let Json(body) = body?;
    let receipt = state
        .engine
        .create_wish(&body.title, &body.wallet_public_key)
        .await?;
    Ok(Json(receipt))
}

pub async fn list_wishes(State(state): State<AppState>) -> ApiResult<Json<Snapshot>> {
    Ok(Json(state.engine.get_wishes().await?))
}

pub async fn get_wish(
    State(state): State<AppState>,
    id: Result<Path<RowId>, PathRejection>,
) -> ApiResult<Json<Wish>> {
    let Path(id) = id?;
    Ok(Json(state.engine.get_wish_by_id(id).await?))
}

pub async fn list_donations(
    State(state): State<AppState>,
    id: Result<Path<RowId>, PathRejection>,
) -> ApiResult<Json<Vec<Donation>>> {
    let Path(id) = id?;
    Ok(Json(state.engine.get_donations(id).await?))
}

pub async fn update_wish_status(
    State(state): State<AppState>,
    id: Result<Path<RowId>, PathRejection>,
    body: Result<Json<UpdateStatusBody>, JsonRejection>,
) -> ApiResult<Json<Wish>> {
    let Path(id) = id?;
    let Json(body) = body?;
    Ok(Json(state.engine.update_wish_status(id, body.status).await?))
}

pub async fn create_donation(
    State(state): State<AppState>,
    body: Result<Json<CreateDonationBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    let receipt = state.engine.create_donation(body.into()).await?;
    Ok(Json(json!({
        "success": true,
        "donation": receipt.donation,
        "transaction": receipt.transaction,
    })))
}

pub async fn register_user(
    State(state): State<AppState>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(user) = body?;
    let user = state.engine.register_user(user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
