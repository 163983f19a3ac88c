//! Business Model (tenant root)

use serde::{Deserialize, Serialize};

/// Business entity; one loyalty-program owner (商家/租户)
///
/// Provisioned out-of-band; `domain` maps inbound request hosts to this
/// tenant. `stamps_required` defines one card cycle, `reward_description`
/// is the full-cycle reward text (no auto-issuance when empty).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Business {
    pub id: i64,
    pub name: String,
    /// Host this tenant answers to (unique; None = reachable only as default tenant)
    pub domain: Option<String>,
    pub logo_url: Option<String>,
    pub cover_url: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub text_color: Option<String>,
    /// Stamps per card cycle, always >= 1
    pub stamps_required: i64,
    pub reward_description: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A configured in-cycle reward position (e.g. "stamp #5 → 10% off")
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Milestone {
    pub id: i64,
    pub business_id: i64,
    /// 1-based stamp index within one card cycle
    pub position: i64,
    pub icon: Option<String>,
    pub label: String,
    pub description: Option<String>,
}

/// Input for a milestone when updating business settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneInput {
    pub position: i64,
    pub icon: Option<String>,
    pub label: String,
    pub description: Option<String>,
}

/// Update business settings payload (sparse)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BusinessSettingsUpdate {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub cover_url: Option<String>,
    pub stamps_required: Option<i64>,
    pub reward_description: Option<String>,
    /// When present, replaces the whole milestone list
    pub milestones: Option<Vec<MilestoneInput>>,
}

/// Update business branding colors payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BusinessColorsUpdate {
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub text_color: Option<String>,
}

/// Business with its milestone list (for info/dashboard views)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessInfo {
    #[serde(flatten)]
    pub business: Business,
    pub milestones: Vec<Milestone>,
}
