use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// An entry of the exhibitions timeline.
///
/// Optional text fields are `None` when absent; an empty string submitted by
/// a client is stored as `None` as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exhibition {
    pub id: String,
    pub title: String,
    pub location: String,
    pub city: String,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(
        rename = "public_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub public_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Exhibition {
    /// Start date as a calendar day, accepting `YYYY-MM-DD` or RFC 3339.
    pub fn start_day(&self) -> Option<NaiveDate> {
        parse_day(&self.start_date)
    }
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExhibition {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub start_date: String,
    pub end_date: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "public_id")]
    pub public_id: Option<String>,
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitionUpdate {
    pub title: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub start_date: Option<String>,
    /// `Some("")` clears the end date.
    pub end_date: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "public_id")]
    pub public_id: Option<String>,
}
