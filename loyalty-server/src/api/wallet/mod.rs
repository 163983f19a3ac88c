//! Wallet Pass API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/wallet", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/class", get(handler::class))
        .route("/pass/{token}", get(handler::pass))
        .route("/reset", post(handler::reset))
}
