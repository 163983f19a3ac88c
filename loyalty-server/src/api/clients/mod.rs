//! Client API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/clients", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/register", post(handler::register))
        .route("/pending", get(handler::pending))
        .route("/search", get(handler::search))
        .route("/find", get(handler::find))
        .route("/import", post(handler::import))
        .route("/dashboard/{token}", get(handler::dashboard))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/review", post(handler::review))
}
