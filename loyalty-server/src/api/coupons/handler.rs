//! Coupon API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::coupon;
use crate::loyalty::engine;
use crate::utils::{AppResponse, AppResult};
use shared::models::{Business, Coupon, CouponBatchReport, CouponIssue};

#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub client_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct BirthdayBatchRequest {
    /// Month name; defaults to the current month
    pub month: Option<String>,
    pub description: String,
    pub expiry_date: Option<String>,
}

/// GET /api/coupons - 租户优惠券（可按客户过滤）
pub async fn list(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Coupon>>> {
    let coupons = match query.client_id {
        Some(client_id) => coupon::find_by_client(&state.pool, current.id, client_id).await?,
        None => coupon::find_all(&state.pool, current.id).await?,
    };
    Ok(Json(coupons))
}

/// POST /api/coupons - 发放优惠券（单个/全员/商家池）
pub async fn issue(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Json(payload): Json<CouponIssue>,
) -> AppResult<Json<AppResponse<CouponBatchReport>>> {
    let issued = engine::issue(&state.pool, current.id, payload).await?;
    Ok(Json(AppResponse::success(CouponBatchReport { issued })))
}

/// POST /api/coupons/birthday - 当月生日客户批量发券
pub async fn birthday_batch(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Json(payload): Json<BirthdayBatchRequest>,
) -> AppResult<Json<AppResponse<CouponBatchReport>>> {
    let issued = engine::issue_birthday_batch(
        &state.pool,
        current.id,
        payload.month,
        &payload.description,
        payload.expiry_date.as_deref(),
    )
    .await?;
    Ok(Json(AppResponse::success(CouponBatchReport { issued })))
}

/// POST /api/coupons/{id}/redeem - 核销
pub async fn redeem(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<Coupon>>> {
    let redeemed = engine::redeem_coupon(&state.pool, current.id, id).await?;
    Ok(Json(AppResponse::success(redeemed)))
}

/// POST /api/coupons/{id}/void - 作废
pub async fn void(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<Coupon>>> {
    let voided = engine::void_coupon(&state.pool, current.id, id).await?;
    Ok(Json(AppResponse::success(voided)))
}
