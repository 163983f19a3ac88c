//! Business API 模块

mod handler;

use axum::{Router, routing::{get, put}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/business", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::info))
        .route("/settings", put(handler::update_settings))
        .route("/colors", put(handler::update_colors))
}
