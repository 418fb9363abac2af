use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A finished piece shown in the public gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: String,
    pub title: String,
    pub category: String,
    /// Public image url.
    pub file: String,
    #[serde(
        rename = "public_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub public_id: Option<String>,
    /// Absent on items written before timestamps were recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for adding a portfolio item.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPortfolioItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub public_id: Option<String>,
}
