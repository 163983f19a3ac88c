//! Coupon API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/coupons", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::issue))
        .route("/birthday", post(handler::birthday_batch))
        .route("/{id}/redeem", post(handler::redeem))
        .route("/{id}/void", post(handler::void))
}
