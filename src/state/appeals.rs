use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Appeals document, same `next`/`items` scheme as the case log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppealLog {
    pub next: u64,
    pub items: HashMap<String, Appeal>,
}

impl Default for AppealLog {
    fn default() -> Self {
        Self {
            next: 1,
            items: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appeal {
    pub guild_id: u64,
    pub case_id: u64,
    pub user_id: u64,
    pub reason: String,
    pub status: AppealStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppealStatus {
    Pending,
    Accepted,
    Denied,
}

impl std::fmt::Display for AppealStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppealStatus::Pending => write!(f, "pending"),
            AppealStatus::Accepted => write!(f, "accepted"),
            AppealStatus::Denied => write!(f, "denied"),
        }
    }
}
