use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Warnings document: guild ID -> user ID -> warnings, oldest first.
pub type WarningBook = HashMap<String, HashMap<String, Vec<WarningEntry>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningEntry {
    pub reason: String,
    pub by: u64,
    pub at: DateTime<Utc>,
}

/// Cases document. Case IDs are allocated from `next` under the store lock,
/// so they are dense and monotonically increasing per file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseLog {
    pub next: u64,
    pub items: HashMap<String, Case>,
}

impl Default for CaseLog {
    fn default() -> Self {
        Self {
            next: 1,
            items: HashMap::new(),
        }
    }
}

/// One moderation case (warn, kick, ban, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub guild_id: u64,
    pub action: String,
    pub target_id: u64,
    pub actor_id: u64,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}
