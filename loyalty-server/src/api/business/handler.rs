//! Business API Handlers

use axum::{Json, extract::{Extension, State}};

use crate::core::ServerState;
use crate::db::repository::business;
use crate::utils::{AppResponse, AppResult};
use shared::models::{Business, BusinessColorsUpdate, BusinessInfo, BusinessSettingsUpdate};

/// GET /api/business - 当前租户的品牌与配置
pub async fn info(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
) -> AppResult<Json<BusinessInfo>> {
    let milestones = business::find_milestones(&state.pool, current.id).await?;
    Ok(Json(BusinessInfo {
        business: current,
        milestones,
    }))
}

/// PUT /api/business/settings - 更新配置（含里程碑列表）
pub async fn update_settings(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Json(payload): Json<BusinessSettingsUpdate>,
) -> AppResult<Json<AppResponse<BusinessInfo>>> {
    let updated = business::update_settings(&state.pool, current.id, payload).await?;
    let milestones = business::find_milestones(&state.pool, current.id).await?;
    Ok(Json(AppResponse::success(BusinessInfo {
        business: updated,
        milestones,
    })))
}

/// PUT /api/business/colors - 更新品牌配色
pub async fn update_colors(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Json(payload): Json<BusinessColorsUpdate>,
) -> AppResult<Json<AppResponse<Business>>> {
    let updated = business::update_colors(&state.pool, current.id, payload).await?;
    Ok(Json(AppResponse::success(updated)))
}
