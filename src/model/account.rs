//! Models for the accounts endpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub currency: String,
    pub status: String,
    pub account_number: String,
    pub created_at: Option<DateTime<Utc>>,
}
