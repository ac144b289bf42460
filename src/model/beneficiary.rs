//! Models for the beneficiaries endpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Beneficiary {
    pub id: String,
    pub name: String,
    pub bank_country: String,
    pub currency: String,
    /// Masked by the API, e.g. `****1234`
    pub account_number: String,
    pub created_at: Option<DateTime<Utc>>,
}
