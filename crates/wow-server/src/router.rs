use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use wow_engine::MutationEngine;

use crate::{handler, ws};

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub engine: Arc<MutationEngine>,
}

impl AppState {
    pub fn new(engine: Arc<MutationEngine>) -> Self {
        Self { engine }
    }
}

/// Build the axum router with all endpoints.
pub fn build_router(state: AppState, allow_any_origin: bool) -> Router {
    let api = Router::new()
        .route(
            "/wishes",
            get(handler::list_wishes).post(handler::create_wish),
        )
        .route("/wishes/:id", get(handler::get_wish))
        .route("/wishes/:id/status", put(handler::update_wish_status))
        .route("/wishes/:id/donations", get(handler::list_donations))
        .route("/donations", post(handler::create_donation))
        .route("/users", post(handler::register_user));

    let router = Router::new()
        .route("/health", get(handler::health_handler))
        .route("/info", get(handler::info_handler))
        .route("/ws", get(ws::ws_handler))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http());

    let router = if allow_any_origin {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };
    router.with_state(state)
}
