//! Visit Repository
//!
//! The `_in` variants run against an open connection so the engine can
//! commit a stamp together with its coupons in one transaction.

use super::{RepoError, RepoResult};
use shared::models::Visit;
use sqlx::{SqliteConnection, SqlitePool};

const VISIT_SELECT: &str = "SELECT id, business_id, client_id, status, notes, created_at, updated_at FROM visit";

pub async fn insert(
    pool: &SqlitePool,
    business_id: i64,
    client_id: i64,
    notes: Option<&str>,
) -> RepoResult<Visit> {
    let mut conn = pool.acquire().await?;
    let id = insert_in(&mut conn, business_id, client_id, notes).await?;
    drop(conn);

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create visit".into()))
}

pub async fn insert_in(
    conn: &mut SqliteConnection,
    business_id: i64,
    client_id: i64,
    notes: Option<&str>,
) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO visit (id, business_id, client_id, status, notes, created_at, updated_at) VALUES (?1, ?2, ?3, 'active', ?4, ?5, ?5)",
    )
    .bind(id)
    .bind(business_id)
    .bind(client_id)
    .bind(notes)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Visit>> {
    let sql = format!("{VISIT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Visit>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// The current stamp count: active visits only
pub async fn count_active(pool: &SqlitePool, client_id: i64) -> RepoResult<i64> {
    let mut conn = pool.acquire().await?;
    count_active_in(&mut conn, client_id).await
}

pub async fn count_active_in(conn: &mut SqliteConnection, client_id: i64) -> RepoResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM visit WHERE client_id = ? AND status = 'active'")
            .bind(client_id)
            .fetch_one(&mut *conn)
            .await?;
    Ok(count)
}

/// Most recent active visit, used for the stamp cooldown and for voiding
pub async fn last_active(pool: &SqlitePool, client_id: i64) -> RepoResult<Option<Visit>> {
    let sql = format!(
        "{VISIT_SELECT} WHERE client_id = ? AND status = 'active' ORDER BY created_at DESC, id DESC LIMIT 1"
    );
    let row = sqlx::query_as::<_, Visit>(&sql)
        .bind(client_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Flip a visit to voided, stamping the void time into its notes.
/// The row stays; voided visits are excluded from counts, not deleted.
pub async fn void(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let mut conn = pool.acquire().await?;
    void_in(&mut conn, id).await
}

pub async fn void_in(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let note = format!("Voided at {now}");
    let rows = sqlx::query(
        "UPDATE visit SET status = 'voided', notes = CASE WHEN notes IS NULL OR notes = '' THEN ?1 ELSE notes || '; ' || ?1 END, updated_at = ?2 WHERE id = ?3 AND status = 'active'",
    )
    .bind(&note)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Active visit {id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use shared::models::VisitStatus;

    async fn seed_client(pool: &SqlitePool) -> i64 {
        sqlx::query("INSERT INTO client (id, business_id, name, token, status, source) VALUES (100, 1, 'Alice', 'AAAA2222', 'approved', 'staff')")
            .execute(pool)
            .await
            .unwrap();
        100
    }

    #[tokio::test]
    async fn test_insert_and_count() {
        let pool = test_pool().await;
        let client_id = seed_client(&pool).await;

        insert(&pool, 1, client_id, Some("Stamped by staff")).await.unwrap();
        insert(&pool, 1, client_id, None).await.unwrap();

        assert_eq!(count_active(&pool, client_id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_void_excludes_from_active_count() {
        let pool = test_pool().await;
        let client_id = seed_client(&pool).await;

        let v = insert(&pool, 1, client_id, None).await.unwrap();
        assert_eq!(count_active(&pool, client_id).await.unwrap(), 1);

        void(&pool, v.id).await.unwrap();
        assert_eq!(count_active(&pool, client_id).await.unwrap(), 0);

        // Row still exists, with the void note
        let row = find_by_id(&pool, v.id).await.unwrap().unwrap();
        assert_eq!(row.status, VisitStatus::Voided);
        assert!(row.notes.unwrap().contains("Voided at"));
    }

    #[tokio::test]
    async fn test_void_twice_fails() {
        let pool = test_pool().await;
        let client_id = seed_client(&pool).await;
        let v = insert(&pool, 1, client_id, None).await.unwrap();

        void(&pool, v.id).await.unwrap();
        let err = void(&pool, v.id).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_last_active_is_most_recent() {
        let pool = test_pool().await;
        let client_id = seed_client(&pool).await;

        // Explicit timestamps so ordering doesn't depend on insertion speed
        for (id, at) in [(10_i64, 1000_i64), (11, 3000), (12, 2000)] {
            sqlx::query("INSERT INTO visit (id, business_id, client_id, status, created_at, updated_at) VALUES (?, 1, ?, 'active', ?, ?)")
                .bind(id)
                .bind(client_id)
                .bind(at)
                .bind(at)
                .execute(&pool)
                .await
                .unwrap();
        }

        let last = last_active(&pool, client_id).await.unwrap().unwrap();
        assert_eq!(last.id, 11);

        void(&pool, 11).await.unwrap();
        let last = last_active(&pool, client_id).await.unwrap().unwrap();
        assert_eq!(last.id, 12);
    }
}
