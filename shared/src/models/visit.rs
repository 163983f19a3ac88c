//! Visit (Stamp) Model

use serde::{Deserialize, Serialize};

/// Visit status; voiding flips status, the row is never removed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum VisitStatus {
    Active,
    Voided,
}

/// Visit entity; one stamp event
///
/// The current stamp count of a client is the count of its `active`
/// visits; everything else (in-cycle position, completed cards) derives
/// from that count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Visit {
    pub id: i64,
    pub business_id: i64,
    pub client_id: i64,
    pub status: VisitStatus,
    /// Free text: who stamped, void annotations
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Stamp cycle summary derived from the active-visit count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StampSummary {
    /// count(active visits)
    pub total_stamps: i64,
    /// total mod stamps_required
    pub in_cycle: i64,
    /// total / stamps_required
    pub cards_completed: i64,
}
