//! Coupon Model

use serde::{Deserialize, Serialize};

/// Coupon category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum CouponType {
    /// Full-cycle reward, auto-issued when a card completes
    Reward,
    Discount,
    Birthday,
    /// Mid-cycle milestone reward, auto-issued when a position is reached
    Milestone,
}

/// Redemption state; `Redeemed` and `Voided` are terminal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum RedeemState {
    #[serde(rename = "FALSE")]
    #[cfg_attr(feature = "db", sqlx(rename = "FALSE"))]
    Unredeemed,
    #[serde(rename = "TRUE")]
    #[cfg_attr(feature = "db", sqlx(rename = "TRUE"))]
    Redeemed,
    #[serde(rename = "VOIDED")]
    #[cfg_attr(feature = "db", sqlx(rename = "VOIDED"))]
    Voided,
}

impl RedeemState {
    /// Terminal states reject any further redeem/void transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, RedeemState::Redeemed | RedeemState::Voided)
    }
}

/// Coupon entity; an issued, redeemable reward
///
/// `client_id = None` represents the business-wide coupon bucket.
/// Auto-issued milestone coupons store `milestone_position` so rollback
/// retraction is an exact-position match, not a text comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Coupon {
    pub id: i64,
    pub business_id: i64,
    pub client_id: Option<i64>,
    pub coupon_type: CouponType,
    pub description: String,
    /// YYYY-MM-DD
    pub expiry_date: Option<String>,
    pub milestone_position: Option<i64>,
    pub redeemed: RedeemState,
    pub redeemed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Issue coupon payload
///
/// `target` picks the audience: a single client (by id or token), every
/// eligible client, or the business-wide bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponIssue {
    pub coupon_type: CouponType,
    pub description: String,
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub target: CouponTarget,
}

/// Audience of a coupon issuance
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum CouponTarget {
    /// Business-wide bucket (no client)
    #[default]
    Business,
    /// One client by internal id
    Client(i64),
    /// One client by public token
    Token(String),
    /// Every client that is not pending/rejected
    All,
}

/// Batch issuance outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponBatchReport {
    pub issued: u32,
}
