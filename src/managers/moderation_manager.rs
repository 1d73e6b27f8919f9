use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use poise::serenity_prelude::{GuildId, UserId};

use crate::error::Result;
use crate::state::{Case, CaseLog, WarningBook, WarningEntry};
use crate::store::JsonStore;

/// Warnings and numbered moderation cases.
///
/// Warnings and cases live in two separate stores; adding a warning and
/// opening its case are two independent updates with no cross-store
/// atomicity.
pub struct ModerationManager {
    warnings: JsonStore<WarningBook>,
    cases: JsonStore<CaseLog>,
}

impl ModerationManager {
    pub async fn open(warnings_path: impl AsRef<Path>, cases_path: impl AsRef<Path>) -> Result<Self> {
        let warnings =
            JsonStore::open(warnings_path.as_ref().to_path_buf(), &WarningBook::default()).await?;
        let cases = JsonStore::open(cases_path.as_ref().to_path_buf(), &CaseLog::default()).await?;
        Ok(Self { warnings, cases })
    }

    /// Append a warning, returning the member's new warning count.
    pub async fn add_warning(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        reason: &str,
        by: UserId,
    ) -> Result<usize> {
        let guild_key = guild_id.to_string();
        let user_key = user_id.to_string();
        let entry = WarningEntry {
            reason: reason.to_string(),
            by: by.get(),
            at: Utc::now(),
        };
        self.warnings
            .update(move |book| {
                let list = book
                    .entry(guild_key)
                    .or_default()
                    .entry(user_key)
                    .or_default();
                list.push(entry);
                Ok(list.len())
            })
            .await
    }

    pub async fn list_warnings(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Vec<WarningEntry>> {
        let book = self.warnings.read().await?;
        Ok(book
            .get(&guild_id.to_string())
            .and_then(|g| g.get(&user_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    /// Remove a warning by 1-based index. Out-of-range is a no-op; returns
    /// whether anything was removed.
    pub async fn remove_warning(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        index: usize,
    ) -> Result<bool> {
        let guild_key = guild_id.to_string();
        let user_key = user_id.to_string();
        self.warnings
            .update(move |book| {
                let Some(list) = book.get_mut(&guild_key).and_then(|g| g.get_mut(&user_key))
                else {
                    return Ok(false);
                };
                if index >= 1 && index <= list.len() {
                    list.remove(index - 1);
                    Ok(true)
                } else {
                    Ok(false)
                }
            })
            .await
    }

    /// Allocate the next case id and record the case under it.
    pub async fn new_case(
        &self,
        guild_id: GuildId,
        action: &str,
        target_id: UserId,
        actor_id: UserId,
        reason: &str,
    ) -> Result<u64> {
        let case = Case {
            guild_id: guild_id.get(),
            action: action.to_string(),
            target_id: target_id.get(),
            actor_id: actor_id.get(),
            reason: reason.to_string(),
            timestamp: Utc::now(),
        };
        self.cases
            .update(move |log| {
                let case_id = log.next;
                log.next += 1;
                log.items.insert(case_id.to_string(), case);
                Ok(case_id)
            })
            .await
    }

    pub async fn get_case(&self, case_id: u64) -> Result<Option<Case>> {
        let log = self.cases.read().await?;
        Ok(log.items.get(&case_id.to_string()).cloned())
    }

    /// The guild's most recent cases, newest first.
    pub async fn recent_cases(&self, guild_id: GuildId, limit: usize) -> Result<Vec<(u64, Case)>> {
        let log = self.cases.read().await?;
        let mut cases: Vec<(u64, Case)> = log
            .items
            .iter()
            .filter(|(_, c)| c.guild_id == guild_id.get())
            .filter_map(|(id, c)| id.parse().ok().map(|id| (id, c.clone())))
            .collect();
        cases.sort_by(|a, b| b.0.cmp(&a.0));
        cases.truncate(limit);
        Ok(cases)
    }

    pub async fn case_count(&self, guild_id: GuildId) -> Result<usize> {
        let log = self.cases.read().await?;
        Ok(log
            .items
            .values()
            .filter(|c| c.guild_id == guild_id.get())
            .count())
    }
}

pub type SharedModerationManager = Arc<ModerationManager>;

pub async fn create_shared_moderation_manager(
    warnings_path: impl AsRef<Path>,
    cases_path: impl AsRef<Path>,
) -> Result<SharedModerationManager> {
    Ok(Arc::new(
        ModerationManager::open(warnings_path, cases_path).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const GUILD: GuildId = GuildId::new(42);
    const TARGET: UserId = UserId::new(500);
    const MOD: UserId = UserId::new(600);

    async fn open_manager(tag: &str) -> (ModerationManager, PathBuf, PathBuf) {
        let nonce = rand::random::<u64>();
        let warnings = std::env::temp_dir().join(format!("warden-warn-{}-{}.json", tag, nonce));
        let cases = std::env::temp_dir().join(format!("warden-case-{}-{}.json", tag, nonce));
        let manager = ModerationManager::open(&warnings, &cases).await.unwrap();
        (manager, warnings, cases)
    }

    #[tokio::test]
    async fn test_warnings_accumulate_and_remove() {
        let (manager, warnings, cases) = open_manager("warnings").await;

        assert_eq!(
            manager.add_warning(GUILD, TARGET, "spam", MOD).await.unwrap(),
            1
        );
        assert_eq!(
            manager
                .add_warning(GUILD, TARGET, "spam again", MOD)
                .await
                .unwrap(),
            2
        );

        let list = manager.list_warnings(GUILD, TARGET).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].reason, "spam");

        assert!(manager.remove_warning(GUILD, TARGET, 1).await.unwrap());
        let list = manager.list_warnings(GUILD, TARGET).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].reason, "spam again");

        // Out of range is a no-op.
        assert!(!manager.remove_warning(GUILD, TARGET, 5).await.unwrap());
        assert!(!manager.remove_warning(GUILD, TARGET, 0).await.unwrap());
        assert_eq!(manager.list_warnings(GUILD, TARGET).await.unwrap().len(), 1);

        tokio::fs::remove_file(warnings).await.unwrap();
        tokio::fs::remove_file(cases).await.unwrap();
    }

    #[tokio::test]
    async fn test_case_ids_are_dense_and_increasing() {
        let (manager, warnings, cases) = open_manager("cases").await;

        let a = manager
            .new_case(GUILD, "warn", TARGET, MOD, "first")
            .await
            .unwrap();
        let b = manager
            .new_case(GUILD, "ban", TARGET, MOD, "second")
            .await
            .unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);

        let case = manager.get_case(a).await.unwrap().unwrap();
        assert_eq!(case.action, "warn");
        assert_eq!(case.target_id, TARGET.get());
        assert!(manager.get_case(99).await.unwrap().is_none());

        let recent = manager.recent_cases(GUILD, 10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].0, b);

        assert_eq!(manager.case_count(GUILD).await.unwrap(), 2);
        assert_eq!(manager.case_count(GuildId::new(7)).await.unwrap(), 0);

        tokio::fs::remove_file(warnings).await.unwrap();
        tokio::fs::remove_file(cases).await.unwrap();
    }
}
