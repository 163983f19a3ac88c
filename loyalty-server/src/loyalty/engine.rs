//! Visit / Reward Engine
//!
//! Stamp accrual, rollback and coupon lifecycle. The active-visit count
//! in the store is the single source of truth; cycle state is derived on
//! every call rather than cached. Wallet pass refreshes are enqueued
//! fire-and-forget and can never fail a ledger write.

use crate::db::repository::{RepoError, business, client, coupon, coupon::NewCoupon, visit};
use crate::loyalty::milestones;
use crate::utils::{AppError, AppResult};
use crate::wallet::{WalletService, WalletUpdate};
use shared::models::{
    Business, Client, Coupon, CouponIssue, CouponTarget, CouponType, RedeemState, StampSummary,
};
use sqlx::SqlitePool;

/// Outcome of one add-stamp call
#[derive(Debug, Clone)]
pub struct AddStampResult {
    pub summary: StampSummary,
    /// Label of the mid-cycle milestone reached by this stamp, if any
    pub milestone_label: Option<String>,
    /// Full-cycle reward text issued by this stamp, if any
    pub milestone_reward: Option<String>,
}

async fn client_by_token(pool: &SqlitePool, business_id: i64, token: &str) -> AppResult<Client> {
    client::find_by_token(pool, business_id, token)
        .await?
        .ok_or_else(|| AppError::not_found("Client not found"))
}

/// Record one visit for the client behind `token`.
///
/// The cooldown compares against the newest active visit's stored
/// timestamp, so a client device with a skewed clock cannot bypass it.
/// Two truly concurrent calls can still both pass; the check is a soft
/// guard, not a serialization point.
pub async fn add_stamp(
    pool: &SqlitePool,
    wallet: &WalletService,
    business: &Business,
    token: &str,
    added_by: Option<&str>,
    cooldown_secs: i64,
) -> AppResult<AddStampResult> {
    let client = client_by_token(pool, business.id, token).await?;

    if let Some(last) = visit::last_active(pool, client.id).await? {
        let elapsed_ms = shared::util::now_millis() - last.created_at;
        if elapsed_ms < cooldown_secs * 1000 {
            return Err(AppError::rate_limited(
                "Please wait a minute before adding another stamp",
            ));
        }
    }

    let configured = business::find_milestones(pool, business.id).await?;
    let notes = added_by.map(|by| format!("Added by {by}"));

    // The visit and any coupons it earns commit together
    let mut tx = pool.begin().await.map_err(RepoError::from)?;
    visit::insert_in(&mut *tx, business.id, client.id, notes.as_deref()).await?;
    let total = visit::count_active_in(&mut *tx, client.id).await?;

    // Mid-cycle milestone: issue a coupon carrying the position so a
    // later rollback can retract it with an exact match.
    let milestone_label = match milestones::milestone_at(&configured, total, business.stamps_required)
    {
        Some(m) => {
            coupon::insert_in(
                &mut *tx,
                &NewCoupon {
                    business_id: business.id,
                    client_id: Some(client.id),
                    coupon_type: CouponType::Milestone,
                    description: m.label.clone(),
                    expiry_date: None,
                    milestone_position: Some(m.position),
                },
            )
            .await?;
            Some(m.label.clone())
        }
        None => None,
    };

    // Full-cycle reward at exact multiples of stamps_required
    let reward_text = business
        .reward_description
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let milestone_reward = match reward_text {
        Some(text) if milestones::completed_card(total, business.stamps_required) => {
            coupon::insert_in(
                &mut *tx,
                &NewCoupon {
                    business_id: business.id,
                    client_id: Some(client.id),
                    coupon_type: CouponType::Reward,
                    description: text.to_string(),
                    expiry_date: None,
                    milestone_position: None,
                },
            )
            .await?;
            Some(text.to_string())
        }
        _ => None,
    };
    tx.commit().await.map_err(RepoError::from)?;

    let summary = milestones::summary(total, business.stamps_required);
    wallet.enqueue(WalletUpdate {
        token: client.token,
        stamp_count: total,
        cards_completed: summary.cards_completed,
    });

    Ok(AddStampResult {
        summary,
        milestone_label,
        milestone_reward,
    })
}

/// Roll back the most recent stamp.
///
/// The visit flips to voided (never deleted) and every unredeemed
/// milestone coupon above the new cycle position is retracted.
pub async fn void_last_stamp(
    pool: &SqlitePool,
    wallet: &WalletService,
    business: &Business,
    token: &str,
) -> AppResult<StampSummary> {
    let client = client_by_token(pool, business.id, token).await?;

    let last = visit::last_active(pool, client.id)
        .await?
        .ok_or_else(|| AppError::not_found("No stamps to void"))?;

    // The status flip and the coupon retraction commit together
    let mut tx = pool.begin().await.map_err(RepoError::from)?;
    visit::void_in(&mut *tx, last.id).await?;
    let total = visit::count_active_in(&mut *tx, client.id).await?;
    let position = milestones::cycle_position(total, business.stamps_required);
    let retracted =
        coupon::retract_milestones_above_in(&mut *tx, business.id, client.id, position).await?;
    tx.commit().await.map_err(RepoError::from)?;

    if retracted > 0 {
        tracing::info!(
            client_id = client.id,
            retracted,
            "Retracted milestone coupons after stamp void"
        );
    }

    let summary = milestones::summary(total, business.stamps_required);
    wallet.enqueue(WalletUpdate {
        token: client.token,
        stamp_count: total,
        cards_completed: summary.cards_completed,
    });

    Ok(summary)
}

/// Issue a coupon to the requested audience.
///
/// Batch targets insert all rows in one transaction; either every
/// recipient gets the coupon or none do.
pub async fn issue(pool: &SqlitePool, business_id: i64, data: CouponIssue) -> AppResult<u32> {
    if data.description.trim().is_empty() {
        return Err(AppError::validation("Coupon description is required"));
    }

    match data.target {
        CouponTarget::Business => {
            coupon::insert(
                pool,
                NewCoupon {
                    business_id,
                    client_id: None,
                    coupon_type: data.coupon_type,
                    description: data.description,
                    expiry_date: data.expiry_date,
                    milestone_position: None,
                },
            )
            .await?;
            Ok(1)
        }
        CouponTarget::Client(id) => {
            let target = client::find_by_id(pool, business_id, id)
                .await?
                .ok_or_else(|| AppError::not_found("Client not found"))?;
            coupon::insert(
                pool,
                NewCoupon {
                    business_id,
                    client_id: Some(target.id),
                    coupon_type: data.coupon_type,
                    description: data.description,
                    expiry_date: data.expiry_date,
                    milestone_position: None,
                },
            )
            .await?;
            Ok(1)
        }
        CouponTarget::Token(token) => {
            let target = client_by_token(pool, business_id, &token).await?;
            coupon::insert(
                pool,
                NewCoupon {
                    business_id,
                    client_id: Some(target.id),
                    coupon_type: data.coupon_type,
                    description: data.description,
                    expiry_date: data.expiry_date,
                    milestone_position: None,
                },
            )
            .await?;
            Ok(1)
        }
        CouponTarget::All => {
            let ids = client::eligible_ids(pool, business_id).await?;
            Ok(coupon::issue_batch(
                pool,
                business_id,
                &ids,
                data.coupon_type,
                &data.description,
                data.expiry_date.as_deref(),
            )
            .await?)
        }
    }
}

/// Issue one birthday coupon per client whose birthday month matches
/// (case-insensitively). Defaults to the current month.
pub async fn issue_birthday_batch(
    pool: &SqlitePool,
    business_id: i64,
    month: Option<String>,
    description: &str,
    expiry_date: Option<&str>,
) -> AppResult<u32> {
    if description.trim().is_empty() {
        return Err(AppError::validation("Coupon description is required"));
    }
    let month = month.unwrap_or_else(|| chrono::Utc::now().format("%B").to_string());
    let ids = client::birthday_ids(pool, business_id, &month).await?;
    Ok(coupon::issue_batch(
        pool,
        business_id,
        &ids,
        CouponType::Birthday,
        description,
        expiry_date,
    )
    .await?)
}

/// Redeem a coupon. Terminal states (already redeemed or voided) reject
/// the transition instead of silently overwriting it.
pub async fn redeem_coupon(pool: &SqlitePool, business_id: i64, id: i64) -> AppResult<Coupon> {
    transition_coupon(pool, business_id, id, RedeemState::Redeemed).await
}

/// Void a coupon, with the same terminal-state guard as redeem
pub async fn void_coupon(pool: &SqlitePool, business_id: i64, id: i64) -> AppResult<Coupon> {
    transition_coupon(pool, business_id, id, RedeemState::Voided).await
}

async fn transition_coupon(
    pool: &SqlitePool,
    business_id: i64,
    id: i64,
    state: RedeemState,
) -> AppResult<Coupon> {
    let existing = coupon::find_by_id(pool, business_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Coupon not found"))?;
    if existing.redeemed.is_terminal() {
        let verb = match existing.redeemed {
            RedeemState::Redeemed => "redeemed",
            _ => "voided",
        };
        return Err(AppError::validation(format!("Coupon already {verb}")));
    }
    Ok(coupon::mark(pool, business_id, id, state).await?)
}
