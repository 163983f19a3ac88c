//! Coupon Repository

use super::{RepoError, RepoResult};
use shared::models::{Coupon, CouponType, RedeemState};
use sqlx::{SqliteConnection, SqlitePool};

const COUPON_SELECT: &str = "SELECT id, business_id, client_id, coupon_type, description, expiry_date, milestone_position, redeemed, redeemed_at, created_at, updated_at FROM coupon";

/// Insert payload
pub struct NewCoupon {
    pub business_id: i64,
    /// None = business-wide bucket
    pub client_id: Option<i64>,
    pub coupon_type: CouponType,
    pub description: String,
    pub expiry_date: Option<String>,
    /// Set for auto-issued milestone coupons, used by rollback retraction
    pub milestone_position: Option<i64>,
}

pub async fn insert(pool: &SqlitePool, data: NewCoupon) -> RepoResult<Coupon> {
    let business_id = data.business_id;
    let mut conn = pool.acquire().await?;
    let id = insert_in(&mut conn, &data).await?;
    drop(conn);

    find_by_id(pool, business_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create coupon".into()))
}

pub async fn insert_in(conn: &mut SqliteConnection, data: &NewCoupon) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO coupon (id, business_id, client_id, coupon_type, description, expiry_date, milestone_position, redeemed, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'FALSE', ?8, ?8)",
    )
    .bind(id)
    .bind(data.business_id)
    .bind(data.client_id)
    .bind(data.coupon_type)
    .bind(&data.description)
    .bind(&data.expiry_date)
    .bind(data.milestone_position)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

/// Issue one coupon per client in a single transaction; a failed insert
/// rolls the whole batch back, no partial rows remain.
pub async fn issue_batch(
    pool: &SqlitePool,
    business_id: i64,
    client_ids: &[i64],
    coupon_type: CouponType,
    description: &str,
    expiry_date: Option<&str>,
) -> RepoResult<u32> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    for client_id in client_ids {
        sqlx::query(
            "INSERT INTO coupon (id, business_id, client_id, coupon_type, description, expiry_date, redeemed, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'FALSE', ?7, ?7)",
        )
        .bind(shared::util::snowflake_id())
        .bind(business_id)
        .bind(client_id)
        .bind(coupon_type)
        .bind(description)
        .bind(expiry_date)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(client_ids.len() as u32)
}

pub async fn find_by_id(pool: &SqlitePool, business_id: i64, id: i64) -> RepoResult<Option<Coupon>> {
    let sql = format!("{COUPON_SELECT} WHERE business_id = ? AND id = ?");
    let row = sqlx::query_as::<_, Coupon>(&sql)
        .bind(business_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_all(pool: &SqlitePool, business_id: i64) -> RepoResult<Vec<Coupon>> {
    let sql = format!("{COUPON_SELECT} WHERE business_id = ? ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Coupon>(&sql)
        .bind(business_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_client(
    pool: &SqlitePool,
    business_id: i64,
    client_id: i64,
) -> RepoResult<Vec<Coupon>> {
    let sql = format!(
        "{COUPON_SELECT} WHERE business_id = ? AND client_id = ? ORDER BY created_at DESC"
    );
    let rows = sqlx::query_as::<_, Coupon>(&sql)
        .bind(business_id)
        .bind(client_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Write a redemption state. Terminal-state guarding lives in the engine;
/// this only flips the row.
pub async fn mark(
    pool: &SqlitePool,
    business_id: i64,
    id: i64,
    state: RedeemState,
) -> RepoResult<Coupon> {
    let now = shared::util::now_millis();
    let redeemed_at = match state {
        RedeemState::Redeemed => Some(now),
        _ => None,
    };
    let rows = sqlx::query(
        "UPDATE coupon SET redeemed = ?1, redeemed_at = ?2, updated_at = ?3 WHERE business_id = ?4 AND id = ?5",
    )
    .bind(state)
    .bind(redeemed_at)
    .bind(now)
    .bind(business_id)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Coupon {id} not found")));
    }
    find_by_id(pool, business_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Coupon {id} not found")))
}

/// Rollback retraction: void every unredeemed milestone coupon whose
/// stored position exceeds the client's new in-cycle stamp count.
pub async fn retract_milestones_above(
    pool: &SqlitePool,
    business_id: i64,
    client_id: i64,
    in_cycle: i64,
) -> RepoResult<u64> {
    let mut conn = pool.acquire().await?;
    retract_milestones_above_in(&mut conn, business_id, client_id, in_cycle).await
}

pub async fn retract_milestones_above_in(
    conn: &mut SqliteConnection,
    business_id: i64,
    client_id: i64,
    in_cycle: i64,
) -> RepoResult<u64> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE coupon SET redeemed = 'VOIDED', updated_at = ?1 WHERE business_id = ?2 AND client_id = ?3 AND coupon_type = 'milestone' AND redeemed = 'FALSE' AND milestone_position > ?4",
    )
    .bind(now)
    .bind(business_id)
    .bind(client_id)
    .bind(in_cycle)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn seed_client(pool: &SqlitePool, id: i64, token: &str) -> i64 {
        sqlx::query("INSERT INTO client (id, business_id, name, token, status, source) VALUES (?, 1, 'Alice', ?, 'approved', 'staff')")
            .bind(id)
            .bind(token)
            .execute(pool)
            .await
            .unwrap();
        id
    }

    fn reward(client_id: Option<i64>) -> NewCoupon {
        NewCoupon {
            business_id: 1,
            client_id,
            coupon_type: CouponType::Reward,
            description: "Free coffee".into(),
            expiry_date: None,
            milestone_position: None,
        }
    }

    #[tokio::test]
    async fn test_insert_business_wide_coupon() {
        let pool = test_pool().await;
        let c = insert(&pool, reward(None)).await.unwrap();
        assert!(c.client_id.is_none());
        assert_eq!(c.redeemed, RedeemState::Unredeemed);
    }

    #[tokio::test]
    async fn test_mark_redeemed_sets_timestamp() {
        let pool = test_pool().await;
        let client_id = seed_client(&pool, 100, "AAAA2222").await;
        let c = insert(&pool, reward(Some(client_id))).await.unwrap();

        let c = mark(&pool, 1, c.id, RedeemState::Redeemed).await.unwrap();
        assert_eq!(c.redeemed, RedeemState::Redeemed);
        assert!(c.redeemed_at.is_some());
    }

    #[tokio::test]
    async fn test_issue_batch_inserts_one_per_client() {
        let pool = test_pool().await;
        let a = seed_client(&pool, 100, "AAAA2222").await;
        let b = seed_client(&pool, 101, "BBBB3333").await;

        let issued = issue_batch(&pool, 1, &[a, b], CouponType::Birthday, "Birthday treat", None)
            .await
            .unwrap();
        assert_eq!(issued, 2);

        assert_eq!(find_by_client(&pool, 1, a).await.unwrap().len(), 1);
        assert_eq!(find_by_client(&pool, 1, b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_retract_milestones_above() {
        let pool = test_pool().await;
        let client_id = seed_client(&pool, 100, "AAAA2222").await;

        for (pos, redeemed) in [(3_i64, "FALSE"), (5, "FALSE"), (8, "TRUE")] {
            sqlx::query("INSERT INTO coupon (id, business_id, client_id, coupon_type, description, milestone_position, redeemed) VALUES (?, 1, ?, 'milestone', 'Milestone reward', ?, ?)")
                .bind(shared::util::snowflake_id())
                .bind(client_id)
                .bind(pos)
                .bind(redeemed)
                .execute(&pool)
                .await
                .unwrap();
        }

        // Rolled back to 4 in-cycle stamps: position 5 retracts, position 3
        // stays, position 8 is already redeemed and untouched.
        let retracted = retract_milestones_above(&pool, 1, client_id, 4).await.unwrap();
        assert_eq!(retracted, 1);

        let coupons = find_by_client(&pool, 1, client_id).await.unwrap();
        let state_of = |pos: i64| {
            coupons
                .iter()
                .find(|c| c.milestone_position == Some(pos))
                .map(|c| c.redeemed)
                .unwrap()
        };
        assert_eq!(state_of(3), RedeemState::Unredeemed);
        assert_eq!(state_of(5), RedeemState::Voided);
        assert_eq!(state_of(8), RedeemState::Redeemed);
    }
}
