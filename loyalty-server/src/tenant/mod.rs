//! Tenant Resolution
//!
//! Maps an inbound request's host header to the owning business. A host
//! that matches no active business degrades to the configured default
//! tenant; absence is never an error. The resolved [`Business`] is
//! inserted as a request extension; handlers thread its id explicitly
//! into every registry/engine call.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::HeaderMap;
use sqlx::SqlitePool;

use crate::core::ServerState;
use crate::db::repository::{RepoError, RepoResult, business};
use crate::utils::{AppError, AppResult};
use shared::models::Business;

/// Host from `X-Forwarded-Host` (proxy) falling back to `Host`, port stripped
pub fn host_from_headers(headers: &HeaderMap) -> Option<String> {
    let raw = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(http::header::HOST))?
        .to_str()
        .ok()?;
    Some(strip_port(raw).to_string())
}

/// "cards.example.com:8443" → "cards.example.com"
pub fn strip_port(host: &str) -> &str {
    host.split(':').next().unwrap_or(host).trim()
}

/// Resolve a host to its business, falling back to the default tenant.
///
/// Only a missing default business is an error; that is a deployment
/// problem, not a bad request.
pub async fn resolve(
    pool: &SqlitePool,
    host: Option<&str>,
    default_business_id: i64,
) -> RepoResult<Business> {
    if let Some(host) = host
        && !host.is_empty()
        && let Some(found) = business::find_active_by_domain(pool, host).await?
    {
        return Ok(found);
    }
    business::find_by_id(pool, default_business_id)
        .await?
        .ok_or_else(|| {
            RepoError::Database(format!(
                "Default business {default_business_id} is missing"
            ))
        })
}

/// Axum middleware: resolve the tenant and expose it as an extension
pub async fn middleware(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let host = host_from_headers(request.headers());
    let business = resolve(
        &state.pool,
        host.as_deref(),
        state.config.default_business_id,
    )
    .await
    .map_err(AppError::from)?;

    request.extensions_mut().insert(business);
    Ok(next.run(request).await)
}
