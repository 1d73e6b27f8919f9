use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Staff document: guild ID -> user ID -> record.
pub type StaffBook = HashMap<String, HashMap<String, StaffRecord>>;

/// HR record for one staff member in one guild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,

    /// Promotions and demotions, oldest first.
    #[serde(default)]
    pub history: Vec<StaffEvent>,

    #[serde(default)]
    pub infractions: Vec<StaffInfraction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffEvent {
    pub action: StaffAction,
    pub to: String,
    /// Only recorded for demotions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appealable: Option<bool>,
    pub by: u64,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffAction {
    Promote,
    Demote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffInfraction {
    pub reason: String,
    pub points: u32,
    pub by: u64,
    pub at: DateTime<Utc>,
}
