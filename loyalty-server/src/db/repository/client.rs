//! Client Repository

use super::{RepoError, RepoResult};
use shared::models::{Client, ClientSource, ClientStatus, ClientUpdate, ClientWithStats};
use sqlx::SqlitePool;

const CLIENT_SELECT: &str = "SELECT id, business_id, name, token, mobile, email, birthday, birthday_month, status, source, created_at, updated_at FROM client";

const CLIENT_WITH_STATS_SELECT: &str = "SELECT c.id, c.business_id, c.name, c.token, c.mobile, c.email, c.birthday, c.birthday_month, c.status, c.source, c.created_at, c.updated_at, \
    (SELECT COUNT(*) FROM visit v WHERE v.client_id = c.id AND v.status = 'active') AS active_visits, \
    (SELECT COUNT(*) FROM visit v WHERE v.client_id = c.id) AS total_visits \
    FROM client c";

/// Insert payload; token is generated by the registry, not supplied by callers
pub struct NewClient {
    pub business_id: i64,
    pub name: String,
    pub token: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<String>,
    pub birthday_month: Option<String>,
    pub status: ClientStatus,
    pub source: ClientSource,
}

pub async fn find_by_id(pool: &SqlitePool, business_id: i64, id: i64) -> RepoResult<Option<Client>> {
    let sql = format!("{CLIENT_SELECT} WHERE business_id = ? AND id = ?");
    let row = sqlx::query_as::<_, Client>(&sql)
        .bind(business_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_token(
    pool: &SqlitePool,
    business_id: i64,
    token: &str,
) -> RepoResult<Option<Client>> {
    let sql = format!("{CLIENT_SELECT} WHERE business_id = ? AND token = ?");
    let row = sqlx::query_as::<_, Client>(&sql)
        .bind(business_id)
        .bind(token)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Token uniqueness is global across tenants
pub async fn token_exists(pool: &SqlitePool, token: &str) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM client WHERE token = ?")
        .bind(token)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Mobile uniqueness is scoped to one business
pub async fn mobile_exists(pool: &SqlitePool, business_id: i64, mobile: &str) -> RepoResult<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM client WHERE business_id = ? AND mobile = ?")
            .bind(business_id)
            .bind(mobile)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

pub async fn insert(pool: &SqlitePool, data: NewClient) -> RepoResult<Client> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO client (id, business_id, name, token, mobile, email, birthday, birthday_month, status, source, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
    )
    .bind(id)
    .bind(data.business_id)
    .bind(&data.name)
    .bind(&data.token)
    .bind(&data.mobile)
    .bind(&data.email)
    .bind(&data.birthday)
    .bind(&data.birthday_month)
    .bind(data.status)
    .bind(data.source)
    .bind(now)
    .execute(pool)
    .await
    .map_err(map_unique_violation)?;

    find_by_id(pool, data.business_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create client".into()))
}

/// Map UNIQUE index violations to Duplicate so callers can answer 409
fn map_unique_violation(err: sqlx::Error) -> RepoError {
    let msg = err.to_string();
    if msg.contains("idx_client_business_mobile") {
        RepoError::Duplicate("Mobile number already registered".into())
    } else if msg.contains("client.token") {
        RepoError::Duplicate("Token already in use".into())
    } else {
        RepoError::Database(msg)
    }
}

pub async fn find_all_with_stats(
    pool: &SqlitePool,
    business_id: i64,
) -> RepoResult<Vec<ClientWithStats>> {
    let sql = format!("{CLIENT_WITH_STATS_SELECT} WHERE c.business_id = ? ORDER BY c.created_at DESC");
    let rows = sqlx::query_as::<_, ClientWithStats>(&sql)
        .bind(business_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_pending(pool: &SqlitePool, business_id: i64) -> RepoResult<Vec<Client>> {
    let sql = format!("{CLIENT_SELECT} WHERE business_id = ? AND status = 'pending' ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Client>(&sql)
        .bind(business_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Fuzzy search on token, name and mobile
pub async fn search(pool: &SqlitePool, business_id: i64, query: &str) -> RepoResult<Vec<Client>> {
    let pattern = format!("%{query}%");
    let sql = format!(
        "{CLIENT_SELECT} WHERE business_id = ?1 AND (token LIKE ?2 OR name LIKE ?2 OR mobile LIKE ?2) ORDER BY created_at DESC"
    );
    let rows = sqlx::query_as::<_, Client>(&sql)
        .bind(business_id)
        .bind(&pattern)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Exact lookup by any of email / mobile / token
pub async fn find_by_contact(
    pool: &SqlitePool,
    business_id: i64,
    email: Option<&str>,
    mobile: Option<&str>,
    token: Option<&str>,
) -> RepoResult<Option<Client>> {
    let sql = format!(
        "{CLIENT_SELECT} WHERE business_id = ?1 AND ((?2 IS NOT NULL AND email = ?2) OR (?3 IS NOT NULL AND mobile = ?3) OR (?4 IS NOT NULL AND token = ?4)) LIMIT 1"
    );
    let row = sqlx::query_as::<_, Client>(&sql)
        .bind(business_id)
        .bind(email)
        .bind(mobile)
        .bind(token)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Ids of every client eligible for coupon issuance (not pending/rejected)
pub async fn eligible_ids(pool: &SqlitePool, business_id: i64) -> RepoResult<Vec<i64>> {
    let rows: Vec<i64> = sqlx::query_scalar(
        "SELECT id FROM client WHERE business_id = ? AND status NOT IN ('pending', 'rejected') ORDER BY id",
    )
    .bind(business_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Eligible clients whose birthday month matches, case-insensitively
pub async fn birthday_ids(pool: &SqlitePool, business_id: i64, month: &str) -> RepoResult<Vec<i64>> {
    let rows: Vec<i64> = sqlx::query_scalar(
        "SELECT id FROM client WHERE business_id = ? AND LOWER(birthday_month) = LOWER(?) AND status NOT IN ('pending', 'rejected') ORDER BY id",
    )
    .bind(business_id)
    .bind(month)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Approve / reject. Tenant-mismatched or unknown ids report NotFound
/// instead of silently updating zero rows.
pub async fn set_status(
    pool: &SqlitePool,
    business_id: i64,
    id: i64,
    status: ClientStatus,
) -> RepoResult<Client> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE client SET status = ?1, updated_at = ?2 WHERE business_id = ?3 AND id = ?4")
        .bind(status)
        .bind(now)
        .bind(business_id)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Client {id} not found")));
    }
    find_by_id(pool, business_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Client {id} not found")))
}

pub async fn update(
    pool: &SqlitePool,
    business_id: i64,
    id: i64,
    data: ClientUpdate,
) -> RepoResult<Client> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE client SET name = COALESCE(?1, name), mobile = COALESCE(?2, mobile), email = COALESCE(?3, email), birthday = COALESCE(?4, birthday), birthday_month = COALESCE(?5, birthday_month), updated_at = ?6 WHERE business_id = ?7 AND id = ?8",
    )
    .bind(&data.name)
    .bind(&data.mobile)
    .bind(&data.email)
    .bind(&data.birthday)
    .bind(&data.birthday_month)
    .bind(now)
    .bind(business_id)
    .bind(id)
    .execute(pool)
    .await
    .map_err(map_unique_violation)?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Client {id} not found")));
    }
    find_by_id(pool, business_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Client {id} not found")))
}

/// Delete a client and everything it owns in one transaction:
/// visits, then coupons, then the client row itself.
pub async fn delete_cascade(pool: &SqlitePool, business_id: i64, id: i64) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM visit WHERE business_id = ? AND client_id = ?")
        .bind(business_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM coupon WHERE business_id = ? AND client_id = ?")
        .bind(business_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let rows = sqlx::query("DELETE FROM client WHERE business_id = ? AND id = ?")
        .bind(business_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Client {id} not found")));
    }

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn new_client(business_id: i64, name: &str, token: &str, mobile: Option<&str>) -> NewClient {
        NewClient {
            business_id,
            name: name.into(),
            token: token.into(),
            mobile: mobile.map(Into::into),
            email: None,
            birthday: None,
            birthday_month: None,
            status: ClientStatus::Approved,
            source: ClientSource::Staff,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_by_token() {
        let pool = test_pool().await;
        let c = insert(&pool, new_client(1, "Alice", "AAAA2222", Some("0917000001")))
            .await
            .unwrap();
        assert_eq!(c.status, ClientStatus::Approved);

        let found = find_by_token(&pool, 1, "AAAA2222").await.unwrap().unwrap();
        assert_eq!(found.id, c.id);

        // Token is tenant-scoped on lookup even though unique globally
        assert!(find_by_token(&pool, 2, "AAAA2222").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mobile_unique_within_business_only() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO business (id, name, is_active) VALUES (2, 'Other', 1)")
            .execute(&pool)
            .await
            .unwrap();

        insert(&pool, new_client(1, "Alice", "AAAA2222", Some("0917000001")))
            .await
            .unwrap();

        // Same mobile, same business → Duplicate
        let err = insert(&pool, new_client(1, "Bob", "BBBB3333", Some("0917000001")))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        // Same mobile, other business → fine
        insert(&pool, new_client(2, "Carol", "CCCC4444", Some("0917000001")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_token_unique_across_businesses() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO business (id, name, is_active) VALUES (2, 'Other', 1)")
            .execute(&pool)
            .await
            .unwrap();

        insert(&pool, new_client(1, "Alice", "AAAA2222", None))
            .await
            .unwrap();
        let err = insert(&pool, new_client(2, "Bob", "AAAA2222", None))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_set_status_wrong_tenant_is_not_found() {
        let pool = test_pool().await;
        let c = insert(&pool, new_client(1, "Alice", "AAAA2222", None))
            .await
            .unwrap();

        let err = set_status(&pool, 999, c.id, ClientStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));

        // Correct tenant works
        let c = set_status(&pool, 1, c.id, ClientStatus::Rejected).await.unwrap();
        assert_eq!(c.status, ClientStatus::Rejected);
    }

    #[tokio::test]
    async fn test_update_is_sparse() {
        let pool = test_pool().await;
        let c = insert(&pool, new_client(1, "Alice", "AAAA2222", Some("0917000001")))
            .await
            .unwrap();

        let updated = update(
            &pool,
            1,
            c.id,
            ClientUpdate {
                email: Some("alice@example.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.email.as_deref(), Some("alice@example.com"));
        // Untouched fields survive
        assert_eq!(updated.name, "Alice");
        assert_eq!(updated.mobile.as_deref(), Some("0917000001"));
    }

    #[tokio::test]
    async fn test_delete_cascade_removes_visits_and_coupons() {
        let pool = test_pool().await;
        let c = insert(&pool, new_client(1, "Alice", "AAAA2222", None))
            .await
            .unwrap();
        sqlx::query("INSERT INTO visit (id, business_id, client_id, status) VALUES (10, 1, ?, 'active')")
            .bind(c.id)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO coupon (id, business_id, client_id, coupon_type, description) VALUES (20, 1, ?, 'reward', 'Free coffee')")
            .bind(c.id)
            .execute(&pool)
            .await
            .unwrap();

        delete_cascade(&pool, 1, c.id).await.unwrap();

        assert!(find_by_id(&pool, 1, c.id).await.unwrap().is_none());
        let visits: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visit WHERE client_id = ?")
            .bind(c.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        let coupons: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupon WHERE client_id = ?")
            .bind(c.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(visits, 0);
        assert_eq!(coupons, 0);
    }

    #[tokio::test]
    async fn test_find_all_with_stats_counts_active_only() {
        let pool = test_pool().await;
        let c = insert(&pool, new_client(1, "Alice", "AAAA2222", None))
            .await
            .unwrap();
        for (id, status) in [(10, "active"), (11, "active"), (12, "voided")] {
            sqlx::query("INSERT INTO visit (id, business_id, client_id, status) VALUES (?, 1, ?, ?)")
                .bind(id)
                .bind(c.id)
                .bind(status)
                .execute(&pool)
                .await
                .unwrap();
        }

        let roster = find_all_with_stats(&pool, 1).await.unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].active_visits, 2);
        assert_eq!(roster[0].total_visits, 3);
    }

    #[tokio::test]
    async fn test_find_by_contact() {
        let pool = test_pool().await;
        let mut data = new_client(1, "Alice", "AAAA2222", Some("0917000001"));
        data.email = Some("alice@example.com".into());
        insert(&pool, data).await.unwrap();

        let by_email = find_by_contact(&pool, 1, Some("alice@example.com"), None, None)
            .await
            .unwrap();
        assert!(by_email.is_some());

        let by_mobile = find_by_contact(&pool, 1, None, Some("0917000001"), None)
            .await
            .unwrap();
        assert!(by_mobile.is_some());

        let miss = find_by_contact(&pool, 1, Some("nobody@example.com"), None, None)
            .await
            .unwrap();
        assert!(miss.is_none());
    }
}
