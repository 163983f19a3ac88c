//! Client Model

use serde::{Deserialize, Serialize};

/// Client lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum ClientStatus {
    /// Self-registered, awaiting staff approval
    Pending,
    Approved,
    Rejected,
}

/// Where a client record came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum ClientSource {
    /// Added by staff from the admin panel (approved immediately)
    Staff,
    /// Self-registration from the public card page (starts pending)
    Registration,
    /// Bulk import
    Import,
}

/// Client entity; a loyalty-program member, scoped to one business
///
/// `token` is the public 8-character identifier printed on the card;
/// globally unique. `mobile` is unique within its business only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Client {
    pub id: i64,
    pub business_id: i64,
    pub name: String,
    pub token: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    /// YYYY-MM-DD
    pub birthday: Option<String>,
    /// Month name ("January".."December"), used for birthday coupon batches
    pub birthday_month: Option<String>,
    pub status: ClientStatus,
    pub source: ClientSource,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create client payload (staff add and self-registration)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCreate {
    pub name: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<String>,
    pub birthday_month: Option<String>,
}

/// Update client payload (sparse; at least one field must be present)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientUpdate {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<String>,
    pub birthday_month: Option<String>,
}

impl ClientUpdate {
    /// True when the patch carries no field at all
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.mobile.is_none()
            && self.email.is_none()
            && self.birthday.is_none()
            && self.birthday_month.is_none()
    }
}

/// One row of a bulk import request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientImportRow {
    pub name: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<String>,
    pub birthday_month: Option<String>,
}

/// Bulk import outcome
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImportReport {
    pub imported: u32,
    pub skipped: u32,
    pub skip_reasons: Vec<String>,
}

/// Client with visit counters (for roster views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ClientWithStats {
    pub id: i64,
    pub business_id: i64,
    pub name: String,
    pub token: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<String>,
    pub birthday_month: Option<String>,
    pub status: ClientStatus,
    pub source: ClientSource,
    pub created_at: i64,
    pub updated_at: i64,
    /// count(visits where status = active)
    pub active_visits: i64,
    /// count(all visits, voided included)
    pub total_visits: i64,
}
