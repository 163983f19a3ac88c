//! Wallet Pass Background Worker
//!
//! 从 mpsc 通道消费 WalletUpdate，推送到钱包卡券服务。
//! 通道关闭时自动退出。

use std::time::Duration;
use tokio::sync::mpsc;

use super::{WalletClient, WalletUpdate};

/// Delay between retry attempts
const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Consumes pass updates and posts them with a bounded retry.
/// Failures are logged and the update is discarded; the ledger never
/// depends on the pass service.
pub struct WalletWorker {
    client: WalletClient,
    rx: mpsc::Receiver<WalletUpdate>,
    retry_limit: u32,
}

impl WalletWorker {
    pub fn new(client: WalletClient, rx: mpsc::Receiver<WalletUpdate>, retry_limit: u32) -> Self {
        Self {
            client,
            rx,
            retry_limit: retry_limit.max(1),
        }
    }

    /// 运行 worker（阻塞直到通道关闭）
    pub async fn run(mut self) {
        tracing::info!("Wallet pass worker started");

        while let Some(update) = self.rx.recv().await {
            self.push_with_retry(&update).await;
        }

        tracing::info!("Wallet update channel closed, worker stopping");
    }

    async fn push_with_retry(&self, update: &WalletUpdate) {
        for attempt in 1..=self.retry_limit {
            match self.client.push_update(update).await {
                Ok(()) => {
                    tracing::debug!(
                        token = %update.token,
                        stamp_count = update.stamp_count,
                        "Wallet pass updated"
                    );
                    return;
                }
                Err(e) => {
                    tracing::warn!(
                        token = %update.token,
                        attempt,
                        error = %e,
                        "Wallet pass update failed"
                    );
                    if attempt < self.retry_limit {
                        tokio::time::sleep(RETRY_BACKOFF).await;
                    }
                }
            }
        }
        tracing::error!(
            token = %update.token,
            "Wallet pass update dropped after {} attempts",
            self.retry_limit
        );
    }

    /// Take over the receiving end (test hook)
    #[cfg(test)]
    pub fn into_receiver(self) -> mpsc::Receiver<WalletUpdate> {
        self.rx
    }
}
