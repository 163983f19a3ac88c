//! Client API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::{business, client, coupon, visit};
use crate::loyalty::{milestones, registry};
use crate::utils::{AppError, AppResponse, AppResult};
use shared::models::{
    Business, BusinessInfo, Client, ClientCreate, ClientImportRow, ClientSource, ClientStatus,
    ClientUpdate, ClientWithStats, Coupon, ImportReport, StampSummary,
};

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Deserialize, Default)]
pub struct FindQuery {
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub token: Option<String>,
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub action: registry::ReviewAction,
}

#[derive(Deserialize)]
pub struct ImportRequest {
    pub rows: Vec<ClientImportRow>,
}

/// Client dashboard: everything the card page needs in one response
#[derive(Serialize)]
pub struct ClientDashboard {
    pub client: Client,
    pub business: BusinessInfo,
    pub summary: StampSummary,
    pub coupons: Vec<Coupon>,
}

/// GET /api/clients - 租户客户名册（含盖章计数）
pub async fn list(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
) -> AppResult<Json<Vec<ClientWithStats>>> {
    let clients = client::find_all_with_stats(&state.pool, current.id).await?;
    Ok(Json(clients))
}

/// GET /api/clients/pending - 待审核客户
pub async fn pending(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
) -> AppResult<Json<Vec<Client>>> {
    let clients = client::find_pending(&state.pool, current.id).await?;
    Ok(Json(clients))
}

/// GET /api/clients/search?q=xxx - 模糊搜索 (token/姓名/手机号)
pub async fn search(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Client>>> {
    if query.q.trim().is_empty() {
        return Err(AppError::validation("Search query is required"));
    }
    let clients = client::search(&state.pool, current.id, query.q.trim()).await?;
    if clients.is_empty() {
        return Err(AppError::not_found("No clients matched the search"));
    }
    Ok(Json(clients))
}

/// GET /api/clients/find - 精确查找 (email/mobile/token 任一)
pub async fn find(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Query(query): Query<FindQuery>,
) -> AppResult<Json<Client>> {
    if query.email.is_none() && query.mobile.is_none() && query.token.is_none() {
        return Err(AppError::validation("Provide email, mobile or token"));
    }
    let found = client::find_by_contact(
        &state.pool,
        current.id,
        query.email.as_deref(),
        query.mobile.as_deref(),
        query.token.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::not_found("Client not found"))?;
    Ok(Json(found))
}

/// POST /api/clients - 店员添加客户（直接批准）
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Json(payload): Json<ClientCreate>,
) -> AppResult<Json<AppResponse<Client>>> {
    let created = registry::create(
        &state.pool,
        current.id,
        payload,
        ClientSource::Staff,
        ClientStatus::Approved,
    )
    .await?;
    Ok(Json(AppResponse::success(created)))
}

/// POST /api/clients/register - 客户自助注册（待审核）
pub async fn register(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Json(payload): Json<ClientCreate>,
) -> AppResult<Json<AppResponse<Client>>> {
    let created = registry::create(
        &state.pool,
        current.id,
        payload,
        ClientSource::Registration,
        ClientStatus::Pending,
    )
    .await?;
    Ok(Json(AppResponse::success(created)))
}

/// POST /api/clients/{id}/review - 批准/拒绝
pub async fn review(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Path(id): Path<i64>,
    Json(payload): Json<ReviewRequest>,
) -> AppResult<Json<AppResponse<Client>>> {
    let reviewed = registry::review(&state.pool, current.id, id, payload.action).await?;
    Ok(Json(AppResponse::success(reviewed)))
}

/// PUT /api/clients/{id} - 稀疏更新客户资料
pub async fn update(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Path(id): Path<i64>,
    Json(payload): Json<ClientUpdate>,
) -> AppResult<Json<AppResponse<Client>>> {
    let updated = registry::edit(&state.pool, current.id, id, payload).await?;
    Ok(Json(AppResponse::success(updated)))
}

/// POST /api/clients/import - 批量导入
pub async fn import(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Json(payload): Json<ImportRequest>,
) -> AppResult<Json<AppResponse<ImportReport>>> {
    if payload.rows.is_empty() {
        return Err(AppError::validation("Import batch is empty"));
    }
    let report = registry::bulk_import(&state.pool, current.id, payload.rows).await?;
    Ok(Json(AppResponse::success(report)))
}

/// DELETE /api/clients/{id} - 删除客户（级联 visits + coupons）
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<bool>>> {
    registry::delete(&state.pool, current.id, id).await?;
    Ok(Json(AppResponse::success(true)))
}

/// GET /api/clients/dashboard/{token} - 客户卡片页视图
pub async fn dashboard(
    State(state): State<ServerState>,
    Extension(current): Extension<Business>,
    Path(token): Path<String>,
) -> AppResult<Json<ClientDashboard>> {
    let found = client::find_by_token(&state.pool, current.id, &token)
        .await?
        .ok_or_else(|| AppError::not_found("Client not found"))?;

    let total = visit::count_active(&state.pool, found.id).await?;
    let summary = milestones::summary(total, current.stamps_required);
    let coupons = coupon::find_by_client(&state.pool, current.id, found.id).await?;
    let milestones = business::find_milestones(&state.pool, current.id).await?;

    Ok(Json(ClientDashboard {
        client: found,
        business: BusinessInfo {
            business: current,
            milestones,
        },
        summary,
        coupons,
    }))
}
