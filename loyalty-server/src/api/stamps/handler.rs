//! Stamp API Handlers

use axum::{
    Json,
    extract::{Extension, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::loyalty::engine;
use crate::utils::AppResult;
use shared::models::Business;

#[derive(Deserialize)]
pub struct AddStampRequest {
    pub token: String,
    pub added_by: Option<String>,
}

#[derive(Deserialize)]
pub struct VoidStampRequest {
    pub token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStampResponse {
    pub success: bool,
    pub total_stamps: i64,
    pub in_cycle: i64,
    pub cards_completed: i64,
    /// Full-cycle reward text, present only on the completing stamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_reward: Option<String>,
    /// Mid-cycle milestone label, present only on the crossing stamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_label: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoidStampResponse {
    pub success: bool,
    pub total_stamps: i64,
    pub in_cycle: i64,
    pub cards_completed: i64,
}

/// POST /api/stamps - 记录一次消费盖章
pub async fn add(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Json(payload): Json<AddStampRequest>,
) -> AppResult<Json<AddStampResponse>> {
    let result = engine::add_stamp(
        &state.pool,
        &state.wallet,
        &current,
        &payload.token,
        payload.added_by.as_deref(),
        state.config.stamp_cooldown_secs,
    )
    .await?;

    Ok(Json(AddStampResponse {
        success: true,
        total_stamps: result.summary.total_stamps,
        in_cycle: result.summary.in_cycle,
        cards_completed: result.summary.cards_completed,
        milestone_reward: result.milestone_reward,
        milestone_label: result.milestone_label,
    }))
}

/// POST /api/stamps/void - 撤销最近一次盖章
pub async fn void(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Json(payload): Json<VoidStampRequest>,
) -> AppResult<Json<VoidStampResponse>> {
    let summary =
        engine::void_last_stamp(&state.pool, &state.wallet, &current, &payload.token).await?;

    Ok(Json(VoidStampResponse {
        success: true,
        total_stamps: summary.total_stamps,
        in_cycle: summary.in_cycle,
        cards_completed: summary.cards_completed,
    }))
}
