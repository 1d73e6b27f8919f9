use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Usage counters, keyed by command or event name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsCounters {
    pub commands: HashMap<String, u64>,
    pub events: HashMap<String, u64>,
}
