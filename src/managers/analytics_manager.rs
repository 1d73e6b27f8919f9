use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::state::AnalyticsCounters;
use crate::store::JsonStore;

/// Command/event usage counters.
pub struct AnalyticsManager {
    store: JsonStore<AnalyticsCounters>,
}

impl AnalyticsManager {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store =
            JsonStore::open(path.as_ref().to_path_buf(), &AnalyticsCounters::default()).await?;
        Ok(Self { store })
    }

    pub async fn record_command(&self, name: &str) -> Result<u64> {
        let key = name.to_string();
        self.store
            .update(move |counters| {
                let count = counters.commands.entry(key).or_insert(0);
                *count += 1;
                Ok(*count)
            })
            .await
    }

    pub async fn record_event(&self, name: &str) -> Result<u64> {
        let key = name.to_string();
        self.store
            .update(move |counters| {
                let count = counters.events.entry(key).or_insert(0);
                *count += 1;
                Ok(*count)
            })
            .await
    }

    /// Most-used commands, descending, ties broken by name for stable output.
    pub async fn top_commands(&self, limit: usize) -> Result<Vec<(String, u64)>> {
        let counters = self.store.read().await?;
        let mut entries: Vec<(String, u64)> = counters.commands.into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(limit);
        Ok(entries)
    }
}

pub type SharedAnalyticsManager = Arc<AnalyticsManager>;

pub async fn create_shared_analytics_manager(
    path: impl AsRef<Path>,
) -> Result<SharedAnalyticsManager> {
    Ok(Arc::new(AnalyticsManager::open(path).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    async fn open_manager(tag: &str) -> (AnalyticsManager, PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "warden-analytics-{}-{}.json",
            tag,
            rand::random::<u64>()
        ));
        let manager = AnalyticsManager::open(&path).await.unwrap();
        (manager, path)
    }

    #[tokio::test]
    async fn test_counters_accumulate() {
        let (manager, path) = open_manager("counters").await;

        assert_eq!(manager.record_command("ping").await.unwrap(), 1);
        assert_eq!(manager.record_command("ping").await.unwrap(), 2);
        assert_eq!(manager.record_command("help").await.unwrap(), 1);
        assert_eq!(manager.record_event("guild_join").await.unwrap(), 1);

        let top = manager.top_commands(10).await.unwrap();
        assert_eq!(
            top,
            vec![("ping".to_string(), 2), ("help".to_string(), 1)]
        );

        tokio::fs::remove_file(path).await.unwrap();
    }
}
