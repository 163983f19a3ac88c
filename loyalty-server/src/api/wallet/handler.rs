//! Wallet Pass API Handlers
//!
//! Synchronous wallet-pass lifecycle. Unlike the stamp-path notifier,
//! these calls surface upstream failures to the caller as 500s.

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::{client, visit};
use crate::loyalty::milestones;
use crate::utils::{AppError, AppResponse, AppResult};
use crate::wallet::{WalletClient, WalletUpdate};
use shared::models::Business;

#[derive(Deserialize)]
pub struct ResetRequest {
    pub token: String,
}

fn wallet_client(state: &ServerState) -> AppResult<WalletClient> {
    state
        .wallet_client()
        .ok_or_else(|| AppError::upstream("Wallet service not configured"))
}

/// GET /api/wallet/class - 卡券类定义
pub async fn class(State(state): State<ServerState>) -> AppResult<Json<serde_json::Value>> {
    let wallet = wallet_client(&state)?;
    let class = wallet.fetch_class().await?;
    Ok(Json(class))
}

/// GET /api/wallet/pass/{token} - 客户卡券
pub async fn pass(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Path(token): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    // The token must belong to this tenant before touching the pass service
    client::find_by_token(&state.pool, current.id, &token)
        .await?
        .ok_or_else(|| AppError::not_found("Client not found"))?;

    let wallet = wallet_client(&state)?;
    let pass = wallet.fetch_pass(&token).await?;
    Ok(Json(pass))
}

/// POST /api/wallet/reset - 以账本为准重推卡券状态
pub async fn reset(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Json(payload): Json<ResetRequest>,
) -> AppResult<Json<AppResponse<bool>>> {
    let found = client::find_by_token(&state.pool, current.id, &payload.token)
        .await?
        .ok_or_else(|| AppError::not_found("Client not found"))?;

    let total = visit::count_active(&state.pool, found.id).await?;
    let summary = milestones::summary(total, current.stamps_required);

    let wallet = wallet_client(&state)?;
    wallet
        .push_update(&WalletUpdate {
            token: found.token,
            stamp_count: summary.total_stamps,
            cards_completed: summary.cards_completed,
        })
        .await?;

    Ok(Json(AppResponse::success(true)))
}
