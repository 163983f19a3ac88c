//! Client Registry
//!
//! Registration, review, edits, bulk import and deletion. Every function
//! takes the owning business id explicitly; tenant scoping is an
//! argument, never ambient state.

use crate::db::repository::client::{self, NewClient};
use crate::loyalty::token;
use crate::utils::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use shared::models::{
    Client, ClientCreate, ClientImportRow, ClientSource, ClientStatus, ClientUpdate, ImportReport,
};
use sqlx::SqlitePool;

/// Staff decision on a pending registration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

/// Trim a free-text field, mapping whitespace-only to None
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Month name ("January") from a YYYY-MM-DD birthday
pub fn month_from_birthday(birthday: &str) -> Option<String> {
    chrono::NaiveDate::parse_from_str(birthday, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%B").to_string())
}

/// Create a client. Staff adds arrive approved, self-registrations
/// pending; both share token generation and tenant-scoped mobile
/// uniqueness.
pub async fn create(
    pool: &SqlitePool,
    business_id: i64,
    data: ClientCreate,
    source: ClientSource,
    status: ClientStatus,
) -> AppResult<Client> {
    let name = data.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::validation("Client name is required"));
    }

    let mobile = normalize(data.mobile);
    if let Some(m) = &mobile
        && client::mobile_exists(pool, business_id, m).await?
    {
        return Err(AppError::conflict("Mobile number already registered"));
    }

    let birthday = normalize(data.birthday);
    let birthday_month = normalize(data.birthday_month)
        .or_else(|| birthday.as_deref().and_then(month_from_birthday));

    let card_token = token::issue_token(pool).await?;
    let created = client::insert(
        pool,
        NewClient {
            business_id,
            name,
            token: card_token,
            mobile,
            email: normalize(data.email),
            birthday,
            birthday_month,
            status,
            source,
        },
    )
    .await?;
    Ok(created)
}

/// Approve or reject a pending client
pub async fn review(
    pool: &SqlitePool,
    business_id: i64,
    client_id: i64,
    action: ReviewAction,
) -> AppResult<Client> {
    let status = match action {
        ReviewAction::Approve => ClientStatus::Approved,
        ReviewAction::Reject => ClientStatus::Rejected,
    };
    Ok(client::set_status(pool, business_id, client_id, status).await?)
}

/// Sparse profile edit; an empty patch is a validation error
pub async fn edit(
    pool: &SqlitePool,
    business_id: i64,
    client_id: i64,
    patch: ClientUpdate,
) -> AppResult<Client> {
    if patch.is_empty() {
        return Err(AppError::validation("No fields provided"));
    }
    Ok(client::update(pool, business_id, client_id, patch).await?)
}

/// Bulk import. Bad rows are skipped with a recorded reason; one bad row
/// never sinks the batch.
pub async fn bulk_import(
    pool: &SqlitePool,
    business_id: i64,
    rows: Vec<ClientImportRow>,
) -> AppResult<ImportReport> {
    let mut report = ImportReport::default();

    for (index, row) in rows.into_iter().enumerate() {
        let line = index + 1;
        let name = row.name.trim().to_string();
        if name.is_empty() {
            report.skipped += 1;
            report.skip_reasons.push(format!("Row {line}: name is blank"));
            continue;
        }

        let mobile = normalize(row.mobile);
        if let Some(m) = &mobile {
            match client::mobile_exists(pool, business_id, m).await {
                Ok(true) => {
                    report.skipped += 1;
                    report
                        .skip_reasons
                        .push(format!("Row {line}: mobile {m} already registered"));
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    report.skipped += 1;
                    report.skip_reasons.push(format!("Row {line}: {e}"));
                    continue;
                }
            }
        }

        let birthday = normalize(row.birthday);
        let birthday_month = normalize(row.birthday_month)
            .or_else(|| birthday.as_deref().and_then(month_from_birthday));

        let result = async {
            let card_token = token::issue_token(pool).await?;
            client::insert(
                pool,
                NewClient {
                    business_id,
                    name: name.clone(),
                    token: card_token,
                    mobile,
                    email: normalize(row.email),
                    birthday,
                    birthday_month,
                    status: ClientStatus::Approved,
                    source: ClientSource::Import,
                },
            )
            .await
        }
        .await;

        match result {
            Ok(_) => report.imported += 1,
            Err(e) => {
                report.skipped += 1;
                report.skip_reasons.push(format!("Row {line}: {e}"));
            }
        }
    }

    Ok(report)
}

/// Delete a client with its visits and coupons (single transaction)
pub async fn delete(pool: &SqlitePool, business_id: i64, client_id: i64) -> AppResult<()> {
    Ok(client::delete_cascade(pool, business_id, client_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::loyalty::token::TOKEN_LEN;

    fn payload(name: &str, mobile: Option<&str>) -> ClientCreate {
        ClientCreate {
            name: name.into(),
            mobile: mobile.map(Into::into),
            email: None,
            birthday: None,
            birthday_month: None,
        }
    }

    #[tokio::test]
    async fn test_create_generates_token_and_status() {
        let pool = test_pool().await;
        let c = create(
            &pool,
            1,
            payload("Alice", Some("0917000001")),
            ClientSource::Staff,
            ClientStatus::Approved,
        )
        .await
        .unwrap();
        assert_eq!(c.token.len(), TOKEN_LEN);
        assert_eq!(c.status, ClientStatus::Approved);
        assert_eq!(c.source, ClientSource::Staff);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let pool = test_pool().await;
        let err = create(
            &pool,
            1,
            payload("   ", None),
            ClientSource::Staff,
            ClientStatus::Approved,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_duplicate_mobile_conflicts_within_tenant_only() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO business (id, name, is_active) VALUES (2, 'Other', 1)")
            .execute(&pool)
            .await
            .unwrap();

        create(
            &pool,
            1,
            payload("Alice", Some("0917000001")),
            ClientSource::Registration,
            ClientStatus::Pending,
        )
        .await
        .unwrap();

        let err = create(
            &pool,
            1,
            payload("Bob", Some("0917000001")),
            ClientSource::Staff,
            ClientStatus::Approved,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Same mobile under another tenant is fine
        create(
            &pool,
            2,
            payload("Carol", Some("0917000001")),
            ClientSource::Staff,
            ClientStatus::Approved,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_create_synthesizes_birthday_month() {
        let pool = test_pool().await;
        let c = create(
            &pool,
            1,
            ClientCreate {
                name: "Alice".into(),
                mobile: None,
                email: None,
                birthday: Some("1990-04-15".into()),
                birthday_month: None,
            },
            ClientSource::Staff,
            ClientStatus::Approved,
        )
        .await
        .unwrap();
        assert_eq!(c.birthday_month.as_deref(), Some("April"));
    }

    #[tokio::test]
    async fn test_edit_empty_patch_rejected() {
        let pool = test_pool().await;
        let c = create(
            &pool,
            1,
            payload("Alice", None),
            ClientSource::Staff,
            ClientStatus::Approved,
        )
        .await
        .unwrap();
        let err = edit(&pool, 1, c.id, ClientUpdate::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_review_approves_and_reports_missing() {
        let pool = test_pool().await;
        let c = create(
            &pool,
            1,
            payload("Alice", None),
            ClientSource::Registration,
            ClientStatus::Pending,
        )
        .await
        .unwrap();

        let approved = review(&pool, 1, c.id, ReviewAction::Approve).await.unwrap();
        assert_eq!(approved.status, ClientStatus::Approved);

        let err = review(&pool, 1, 424242, ReviewAction::Reject).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_bulk_import_counts_and_reasons() {
        let pool = test_pool().await;
        create(
            &pool,
            1,
            payload("Existing", Some("0917000001")),
            ClientSource::Staff,
            ClientStatus::Approved,
        )
        .await
        .unwrap();

        let rows = vec![
            ClientImportRow {
                name: "Dora".into(),
                mobile: Some("0917000002".into()),
                email: None,
                birthday: Some("1985-12-01".into()),
                birthday_month: None,
            },
            ClientImportRow {
                name: "".into(),
                mobile: None,
                email: None,
                birthday: None,
                birthday_month: None,
            },
            ClientImportRow {
                name: "Dupe".into(),
                mobile: Some("0917000001".into()),
                email: None,
                birthday: None,
                birthday_month: None,
            },
        ];

        let report = bulk_import(&pool, 1, rows).await.unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.skip_reasons.len(), 2);
        assert!(report.skip_reasons[0].contains("name is blank"));
        assert!(report.skip_reasons[1].contains("already registered"));

        // Imported row got the synthesized month
        let dora = client::find_by_contact(&pool, 1, None, Some("0917000002"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dora.birthday_month.as_deref(), Some("December"));
        assert_eq!(dora.source, ClientSource::Import);
    }

    #[test]
    fn test_month_from_birthday_rejects_garbage() {
        assert_eq!(month_from_birthday("1990-01-31").as_deref(), Some("January"));
        assert!(month_from_birthday("not-a-date").is_none());
        assert!(month_from_birthday("1990-13-01").is_none());
    }
}
