//! Wallet Pass Service HTTP Client

use crate::utils::{AppError, AppResult};

use super::WalletUpdate;

/// Thin reqwest wrapper around the third-party pass service
#[derive(Clone)]
pub struct WalletClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl WalletClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Push a stamp-count refresh for one pass
    pub async fn push_update(&self, update: &WalletUpdate) -> AppResult<()> {
        let resp = self
            .request(
                reqwest::Method::POST,
                &format!("/passes/{}", update.token),
            )
            .json(update)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Wallet service unreachable: {e}")))?;
        resp.error_for_status()
            .map_err(|e| AppError::upstream(format!("Wallet service rejected update: {e}")))?;
        Ok(())
    }

    /// Fetch (creating if needed) the shared pass class for this program
    pub async fn fetch_class(&self) -> AppResult<serde_json::Value> {
        let resp = self
            .request(reqwest::Method::GET, "/class")
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Wallet service unreachable: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::upstream(format!("Wallet class request failed: {e}")))?;
        resp.json()
            .await
            .map_err(|e| AppError::upstream(format!("Wallet class response invalid: {e}")))
    }

    /// Fetch the pass payload for one card token
    pub async fn fetch_pass(&self, token: &str) -> AppResult<serde_json::Value> {
        let resp = self
            .request(reqwest::Method::GET, &format!("/passes/{token}"))
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Wallet service unreachable: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::upstream(format!("Wallet pass request failed: {e}")))?;
        resp.json()
            .await
            .map_err(|e| AppError::upstream(format!("Wallet pass response invalid: {e}")))
    }
}
