//! Models for the cards and cardholders endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Card {
    pub id: String,
    pub cardholder_id: String,
    pub brand: String,
    pub last4: String,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cardholder {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
}
