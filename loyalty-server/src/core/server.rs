//! Server Implementation
//!
//! HTTP 服务器启动和管理

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;

use crate::core::ServerState;
use crate::tenant;

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::business::router())
        .merge(crate::api::clients::router())
        .merge(crate::api::stamps::router())
        .merge(crate::api::coupons::router())
        .merge(crate::api::wallet::router())
}

/// HTTP Server
pub struct Server {
    state: ServerState,
}

impl Server {
    pub fn with_state(state: ServerState) -> Self {
        Self { state }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let app = build_app()
            // 租户解析中间件 - 每个请求先解析 Host → Business
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                tenant::middleware,
            ))
            .with_state(self.state.clone())
            // 管理面板跑在其他域名下，CORS 全开
            .layer(CorsLayer::permissive())
            .layer(middleware::from_fn(log_request));

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        tracing::info!("Loyalty server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await?;

        Ok(())
    }
}
