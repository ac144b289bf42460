//! Models for the reports endpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub id: String,
    #[serde(rename = "type")]
    pub report_type: String,
    pub account_id: String,
    pub status: String,
    pub download_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
