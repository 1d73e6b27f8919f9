use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use poise::serenity_prelude::{GuildId, UserId};

use crate::error::{BotError, Result};
use crate::state::{Appeal, AppealLog, AppealStatus};
use crate::store::JsonStore;

/// Case appeals: submit, review, query.
pub struct AppealManager {
    store: JsonStore<AppealLog>,
}

impl AppealManager {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = JsonStore::open(path.as_ref().to_path_buf(), &AppealLog::default()).await?;
        Ok(Self { store })
    }

    /// File an appeal against a case; returns the new appeal id.
    pub async fn submit(
        &self,
        guild_id: GuildId,
        case_id: u64,
        user_id: UserId,
        reason: &str,
    ) -> Result<u64> {
        let appeal = Appeal {
            guild_id: guild_id.get(),
            case_id,
            user_id: user_id.get(),
            reason: reason.to_string(),
            status: AppealStatus::Pending,
            created_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
        };
        self.store
            .update(move |log| {
                let appeal_id = log.next;
                log.next += 1;
                log.items.insert(appeal_id.to_string(), appeal);
                Ok(appeal_id)
            })
            .await
    }

    /// Record a verdict on an appeal. Fails with NotFound for an unknown id.
    pub async fn review(
        &self,
        appeal_id: u64,
        status: AppealStatus,
        reviewer: UserId,
    ) -> Result<Appeal> {
        self.store
            .update(move |log| {
                let Some(appeal) = log.items.get_mut(&appeal_id.to_string()) else {
                    return Err(BotError::not_found("Appeal", appeal_id));
                };
                appeal.status = status;
                appeal.reviewed_by = Some(reviewer.get());
                appeal.reviewed_at = Some(Utc::now());
                Ok(appeal.clone())
            })
            .await
    }

    pub async fn get(&self, appeal_id: u64) -> Result<Option<Appeal>> {
        let log = self.store.read().await?;
        Ok(log.items.get(&appeal_id.to_string()).cloned())
    }

    /// Pending appeals for a guild, oldest first.
    pub async fn pending(&self, guild_id: GuildId) -> Result<Vec<(u64, Appeal)>> {
        let log = self.store.read().await?;
        let mut appeals: Vec<(u64, Appeal)> = log
            .items
            .iter()
            .filter(|(_, a)| a.guild_id == guild_id.get() && a.status == AppealStatus::Pending)
            .filter_map(|(id, a)| id.parse().ok().map(|id| (id, a.clone())))
            .collect();
        appeals.sort_by_key(|(id, _)| *id);
        Ok(appeals)
    }
}

pub type SharedAppealManager = Arc<AppealManager>;

pub async fn create_shared_appeal_manager(path: impl AsRef<Path>) -> Result<SharedAppealManager> {
    Ok(Arc::new(AppealManager::open(path).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const GUILD: GuildId = GuildId::new(42);
    const APPELLANT: UserId = UserId::new(500);
    const REVIEWER: UserId = UserId::new(600);

    async fn open_manager(tag: &str) -> (AppealManager, PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "warden-appeals-{}-{}.json",
            tag,
            rand::random::<u64>()
        ));
        let manager = AppealManager::open(&path).await.unwrap();
        (manager, path)
    }

    #[tokio::test]
    async fn test_submit_and_review_lifecycle() {
        let (manager, path) = open_manager("lifecycle").await;

        let id = manager
            .submit(GUILD, 7, APPELLANT, "it was my brother")
            .await
            .unwrap();
        assert_eq!(id, 1);

        let pending = manager.pending(GUILD).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].1.case_id, 7);

        let reviewed = manager
            .review(id, AppealStatus::Accepted, REVIEWER)
            .await
            .unwrap();
        assert_eq!(reviewed.status, AppealStatus::Accepted);
        assert_eq!(reviewed.reviewed_by, Some(REVIEWER.get()));

        assert!(manager.pending(GUILD).await.unwrap().is_empty());

        let stored = manager.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, AppealStatus::Accepted);

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_review_unknown_appeal_is_not_found() {
        let (manager, path) = open_manager("missing").await;

        match manager.review(99, AppealStatus::Denied, REVIEWER).await {
            Err(BotError::NotFound { .. }) => {}
            other => panic!("expected NotFound, got {:?}", other),
        }

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_pending_sorted_oldest_first() {
        let (manager, path) = open_manager("order").await;

        let a = manager.submit(GUILD, 1, APPELLANT, "a").await.unwrap();
        let b = manager.submit(GUILD, 2, APPELLANT, "b").await.unwrap();
        // Different guild must not appear.
        manager
            .submit(GuildId::new(7), 3, APPELLANT, "c")
            .await
            .unwrap();

        let pending = manager.pending(GUILD).await.unwrap();
        assert_eq!(
            pending.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            vec![a, b]
        );

        tokio::fs::remove_file(path).await.unwrap();
    }
}
