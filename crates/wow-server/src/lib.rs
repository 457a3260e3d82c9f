//! HTTP server for the Wall of Wishes.
//!
//! Serves the REST API under `/api` and the websocket push channel at
//! `/ws`. All state lives behind the [`MutationEngine`](wow_engine::MutationEngine);
//! handlers only translate between JSON and engine calls.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod ws;

pub use config::{DatabaseConfig, ServerConfig};
pub use error::{ApiError, ServerError, ServerResult};
pub use router::{build_router, AppState};
pub use server::{open_store, WowServer};
