use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use poise::serenity_prelude::{GuildId, UserId};

use crate::error::Result;
use crate::state::{StaffAction, StaffBook, StaffEvent, StaffInfraction, StaffRecord};
use crate::store::JsonStore;

/// Staff HR records: ranks, promotion history, infractions.
pub struct StaffManager {
    store: JsonStore<StaffBook>,
}

impl StaffManager {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = JsonStore::open(path.as_ref().to_path_buf(), &StaffBook::default()).await?;
        Ok(Self { store })
    }

    pub async fn promote(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        rank: &str,
        by: UserId,
    ) -> Result<StaffRecord> {
        self.record_rank_change(guild_id, user_id, StaffAction::Promote, rank, None, by)
            .await
    }

    pub async fn demote(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        rank: &str,
        appealable: bool,
        by: UserId,
    ) -> Result<StaffRecord> {
        self.record_rank_change(
            guild_id,
            user_id,
            StaffAction::Demote,
            rank,
            Some(appealable),
            by,
        )
        .await
    }

    /// Log an infraction, returning the member's new infraction count.
    pub async fn add_infraction(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        reason: &str,
        points: u32,
        by: UserId,
    ) -> Result<usize> {
        let guild_key = guild_id.to_string();
        let user_key = user_id.to_string();
        let infraction = StaffInfraction {
            reason: reason.to_string(),
            points,
            by: by.get(),
            at: Utc::now(),
        };
        self.store
            .update(move |book| {
                let record = book
                    .entry(guild_key)
                    .or_default()
                    .entry(user_key)
                    .or_default();
                record.infractions.push(infraction);
                Ok(record.infractions.len())
            })
            .await
    }

    pub async fn profile(&self, guild_id: GuildId, user_id: UserId) -> Result<Option<StaffRecord>> {
        let book = self.store.read().await?;
        Ok(book
            .get(&guild_id.to_string())
            .and_then(|g| g.get(&user_id.to_string()))
            .cloned())
    }

    async fn record_rank_change(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        action: StaffAction,
        rank: &str,
        appealable: Option<bool>,
        by: UserId,
    ) -> Result<StaffRecord> {
        let guild_key = guild_id.to_string();
        let user_key = user_id.to_string();
        let event = StaffEvent {
            action,
            to: rank.to_string(),
            appealable,
            by: by.get(),
            at: Utc::now(),
        };
        let rank = rank.to_string();
        self.store
            .update(move |book| {
                let record = book
                    .entry(guild_key)
                    .or_default()
                    .entry(user_key)
                    .or_default();
                record.rank = Some(rank);
                record.history.push(event);
                Ok(record.clone())
            })
            .await
    }
}

pub type SharedStaffManager = Arc<StaffManager>;

pub async fn create_shared_staff_manager(path: impl AsRef<Path>) -> Result<SharedStaffManager> {
    Ok(Arc::new(StaffManager::open(path).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const GUILD: GuildId = GuildId::new(42);
    const MEMBER: UserId = UserId::new(500);
    const MANAGER: UserId = UserId::new(600);

    async fn open_manager(tag: &str) -> (StaffManager, PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "warden-staff-{}-{}.json",
            tag,
            rand::random::<u64>()
        ));
        let manager = StaffManager::open(&path).await.unwrap();
        (manager, path)
    }

    #[tokio::test]
    async fn test_promotion_history() {
        let (manager, path) = open_manager("promote").await;

        let record = manager
            .promote(GUILD, MEMBER, "Moderator", MANAGER)
            .await
            .unwrap();
        assert_eq!(record.rank.as_deref(), Some("Moderator"));
        assert_eq!(record.history.len(), 1);

        let record = manager
            .demote(GUILD, MEMBER, "Helper", false, MANAGER)
            .await
            .unwrap();
        assert_eq!(record.rank.as_deref(), Some("Helper"));
        assert_eq!(record.history.len(), 2);
        assert_eq!(record.history[1].action, StaffAction::Demote);
        assert_eq!(record.history[1].appealable, Some(false));

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_infractions_and_profile() {
        let (manager, path) = open_manager("infraction").await;

        assert!(manager.profile(GUILD, MEMBER).await.unwrap().is_none());

        let count = manager
            .add_infraction(GUILD, MEMBER, "no-show", 3, MANAGER)
            .await
            .unwrap();
        assert_eq!(count, 1);

        let record = manager.profile(GUILD, MEMBER).await.unwrap().unwrap();
        assert!(record.rank.is_none());
        assert_eq!(record.infractions[0].points, 3);

        tokio::fs::remove_file(path).await.unwrap();
    }
}
