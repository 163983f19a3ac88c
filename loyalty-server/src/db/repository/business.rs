//! Business Repository

use super::{RepoError, RepoResult};
use shared::models::{
    Business, BusinessColorsUpdate, BusinessSettingsUpdate, Milestone, MilestoneInput,
};
use sqlx::SqlitePool;

const BUSINESS_SELECT: &str = "SELECT id, name, domain, logo_url, cover_url, primary_color, secondary_color, text_color, stamps_required, reward_description, is_active, created_at, updated_at FROM business";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Business>> {
    let sql = format!("{BUSINESS_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Business>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Host → tenant lookup. Only active businesses resolve.
pub async fn find_active_by_domain(pool: &SqlitePool, domain: &str) -> RepoResult<Option<Business>> {
    let sql = format!("{BUSINESS_SELECT} WHERE domain = ? AND is_active = 1");
    let row = sqlx::query_as::<_, Business>(&sql)
        .bind(domain)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_milestones(pool: &SqlitePool, business_id: i64) -> RepoResult<Vec<Milestone>> {
    let rows = sqlx::query_as::<_, Milestone>(
        "SELECT id, business_id, position, icon, label, description FROM milestone WHERE business_id = ? ORDER BY position",
    )
    .bind(business_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn update_settings(
    pool: &SqlitePool,
    id: i64,
    data: BusinessSettingsUpdate,
) -> RepoResult<Business> {
    if let Some(required) = data.stamps_required
        && required < 1
    {
        return Err(RepoError::Validation(
            "stamps_required must be at least 1".into(),
        ));
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE business SET name = COALESCE(?1, name), logo_url = COALESCE(?2, logo_url), cover_url = COALESCE(?3, cover_url), stamps_required = COALESCE(?4, stamps_required), reward_description = COALESCE(?5, reward_description), updated_at = ?6 WHERE id = ?7",
    )
    .bind(&data.name)
    .bind(&data.logo_url)
    .bind(&data.cover_url)
    .bind(data.stamps_required)
    .bind(&data.reward_description)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Business {id} not found")));
    }

    // Milestone list is replaced wholesale when supplied
    if let Some(milestones) = &data.milestones {
        replace_milestones(&mut *tx, id, milestones).await?;
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Business {id} not found")))
}

async fn replace_milestones(
    tx: &mut sqlx::SqliteConnection,
    business_id: i64,
    milestones: &[MilestoneInput],
) -> RepoResult<()> {
    sqlx::query("DELETE FROM milestone WHERE business_id = ?")
        .bind(business_id)
        .execute(&mut *tx)
        .await?;
    for m in milestones {
        if m.position < 1 {
            return Err(RepoError::Validation(format!(
                "Milestone position must be at least 1, got {}",
                m.position
            )));
        }
        sqlx::query(
            "INSERT INTO milestone (id, business_id, position, icon, label, description) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(shared::util::snowflake_id())
        .bind(business_id)
        .bind(m.position)
        .bind(&m.icon)
        .bind(&m.label)
        .bind(&m.description)
        .execute(&mut *tx)
        .await?;
    }
    Ok(())
}

pub async fn update_colors(
    pool: &SqlitePool,
    id: i64,
    data: BusinessColorsUpdate,
) -> RepoResult<Business> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE business SET primary_color = COALESCE(?1, primary_color), secondary_color = COALESCE(?2, secondary_color), text_color = COALESCE(?3, text_color), updated_at = ?4 WHERE id = ?5",
    )
    .bind(&data.primary_color)
    .bind(&data.secondary_color)
    .bind(&data.text_color)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Business {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Business {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_seeded_default_business_exists() {
        let pool = test_pool().await;
        let b = find_by_id(&pool, 1).await.unwrap().unwrap();
        assert_eq!(b.stamps_required, 10);
        assert!(b.is_active);
    }

    #[tokio::test]
    async fn test_find_by_domain_only_active() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO business (id, name, domain, is_active) VALUES (2, 'Cafe', 'cafe.example.com', 0)")
            .execute(&pool)
            .await
            .unwrap();
        assert!(
            find_active_by_domain(&pool, "cafe.example.com")
                .await
                .unwrap()
                .is_none()
        );

        sqlx::query("UPDATE business SET is_active = 1 WHERE id = 2")
            .execute(&pool)
            .await
            .unwrap();
        let b = find_active_by_domain(&pool, "cafe.example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_update_settings_replaces_milestones() {
        let pool = test_pool().await;
        let update = BusinessSettingsUpdate {
            reward_description: Some("Free coffee".into()),
            milestones: Some(vec![
                MilestoneInput {
                    position: 5,
                    icon: None,
                    label: "10% off".into(),
                    description: None,
                },
                MilestoneInput {
                    position: 8,
                    icon: Some("gift".into()),
                    label: "Free pastry".into(),
                    description: None,
                },
            ]),
            ..Default::default()
        };
        let b = update_settings(&pool, 1, update).await.unwrap();
        assert_eq!(b.reward_description.as_deref(), Some("Free coffee"));

        let ms = find_milestones(&pool, 1).await.unwrap();
        assert_eq!(ms.len(), 2);
        assert_eq!(ms[0].position, 5);
        assert_eq!(ms[1].label, "Free pastry");

        // Second update with a shorter list replaces, not appends
        let update = BusinessSettingsUpdate {
            milestones: Some(vec![MilestoneInput {
                position: 3,
                icon: None,
                label: "Sticker".into(),
                description: None,
            }]),
            ..Default::default()
        };
        update_settings(&pool, 1, update).await.unwrap();
        let ms = find_milestones(&pool, 1).await.unwrap();
        assert_eq!(ms.len(), 1);
        assert_eq!(ms[0].position, 3);
    }

    #[tokio::test]
    async fn test_update_settings_rejects_zero_stamps_required() {
        let pool = test_pool().await;
        let update = BusinessSettingsUpdate {
            stamps_required: Some(0),
            ..Default::default()
        };
        let err = update_settings(&pool, 1, update).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_colors() {
        let pool = test_pool().await;
        let b = update_colors(
            &pool,
            1,
            BusinessColorsUpdate {
                primary_color: Some("#6f4e37".into()),
                secondary_color: None,
                text_color: Some("#ffffff".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(b.primary_color.as_deref(), Some("#6f4e37"));
        assert_eq!(b.text_color.as_deref(), Some("#ffffff"));
        // Untouched field stays None
        assert!(b.secondary_color.is_none());
    }

    #[tokio::test]
    async fn test_update_unknown_business_is_not_found() {
        let pool = test_pool().await;
        let err = update_colors(&pool, 999, BusinessColorsUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
