//! Models for the transfers endpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A payout from one of the user's accounts to a beneficiary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transfer {
    pub id: String,
    pub source_account_id: String,
    pub beneficiary_id: String,
    /// Minor units
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub reference: String,
    pub created_at: Option<DateTime<Utc>>,
}
