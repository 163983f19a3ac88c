//! Wallet Pass Notifier
//!
//! The ledger write is the source of truth; the wallet pass is a cached
//! projection. Stamp mutations enqueue an update here and never wait for
//! it; the background [`worker::WalletWorker`] drains the queue, posts
//! to the pass service with a small bounded retry and logs every failure
//! without surfacing it.
//!
//! The synchronous [`client::WalletClient`] is used by the wallet API
//! endpoints, where upstream failures do become 500s.

pub mod client;
pub mod worker;

use tokio::sync::mpsc;

pub use client::WalletClient;
pub use worker::WalletWorker;

/// One pass refresh: the client's token plus its new cycle state
#[derive(Debug, Clone, serde::Serialize)]
pub struct WalletUpdate {
    pub token: String,
    pub stamp_count: i64,
    pub cards_completed: i64,
}

/// Queue capacity; beyond this, updates are dropped (and logged)
const QUEUE_SIZE: usize = 256;

/// Handle used by the engine to enqueue pass updates
#[derive(Clone)]
pub struct WalletService {
    tx: Option<mpsc::Sender<WalletUpdate>>,
}

impl WalletService {
    /// Create the service and its worker. Returns no worker when the
    /// pass service is not configured (dev / single-tenant mode).
    pub fn new(client: Option<WalletClient>, retry_limit: u32) -> (Self, Option<WalletWorker>) {
        match client {
            Some(client) => {
                let (tx, rx) = mpsc::channel(QUEUE_SIZE);
                (
                    Self { tx: Some(tx) },
                    Some(WalletWorker::new(client, rx, retry_limit)),
                )
            }
            None => (Self { tx: None }, None),
        }
    }

    /// A service that drops every update; tests and no-wallet deployments
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Non-blocking enqueue. A full or closed queue only logs; stamp
    /// operations must never fail on wallet trouble.
    pub fn enqueue(&self, update: WalletUpdate) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(e) = tx.try_send(update) {
            tracing::warn!(error = %e, "Wallet update dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_service_swallows_updates() {
        let service = WalletService::disabled();
        // Must not panic or block
        service.enqueue(WalletUpdate {
            token: "AAAA2222".into(),
            stamp_count: 3,
            cards_completed: 0,
        });
    }

    #[tokio::test]
    async fn test_enqueue_reaches_worker_channel() {
        let client = WalletClient::new("http://localhost:9".into(), None);
        let (service, worker) = WalletService::new(Some(client), 1);
        service.enqueue(WalletUpdate {
            token: "AAAA2222".into(),
            stamp_count: 5,
            cards_completed: 1,
        });

        let mut rx = worker.unwrap().into_receiver();
        let update = rx.recv().await.unwrap();
        assert_eq!(update.token, "AAAA2222");
        assert_eq!(update.stamp_count, 5);
    }

    #[tokio::test]
    async fn test_full_queue_drops_instead_of_blocking() {
        let client = WalletClient::new("http://localhost:9".into(), None);
        let (service, _worker) = WalletService::new(Some(client), 1);
        for i in 0..(QUEUE_SIZE + 10) {
            service.enqueue(WalletUpdate {
                token: "AAAA2222".into(),
                stamp_count: i as i64,
                cards_completed: 0,
            });
        }
        // Reaching here without await-blocking is the assertion
    }
}
