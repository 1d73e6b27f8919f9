use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use poise::serenity_prelude::{GuildId, UserId};

use crate::error::Result;
use crate::state::{SessionBook, SessionEntry, SessionRecord, SESSION_HISTORY_LIMIT};
use crate::store::JsonStore;

/// Staff duty session tracking.
pub struct SessionManager {
    store: JsonStore<SessionBook>,
}

impl SessionManager {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = JsonStore::open(path.as_ref().to_path_buf(), &SessionBook::default()).await?;
        Ok(Self { store })
    }

    /// Begin a session. Starting while one is already active restarts the
    /// clock without crediting the abandoned span.
    pub async fn start(&self, guild_id: GuildId, user_id: UserId) -> Result<()> {
        let guild_key = guild_id.to_string();
        let user_key = user_id.to_string();
        self.store
            .update(move |book| {
                let record = book
                    .entry(guild_key)
                    .or_default()
                    .entry(user_key)
                    .or_default();
                record.active = true;
                record.started_at = Some(Utc::now());
                Ok(())
            })
            .await
    }

    /// End the active session, crediting its length. Returns the session
    /// length in seconds, or `None` if no session was active.
    pub async fn end(&self, guild_id: GuildId, user_id: UserId) -> Result<Option<i64>> {
        let guild_key = guild_id.to_string();
        let user_key = user_id.to_string();
        self.store
            .update(move |book| {
                let Some(record) = book.get_mut(&guild_key).and_then(|g| g.get_mut(&user_key))
                else {
                    return Ok(None);
                };
                if !record.active {
                    return Ok(None);
                }
                let Some(started_at) = record.started_at else {
                    return Ok(None);
                };

                let now = Utc::now();
                let seconds = (now - started_at).num_seconds().max(0);
                record.active = false;
                record.total_seconds += seconds;
                record.history.push(SessionEntry {
                    start: started_at,
                    end: now,
                    seconds,
                });
                if record.history.len() > SESSION_HISTORY_LIMIT {
                    let excess = record.history.len() - SESSION_HISTORY_LIMIT;
                    record.history.drain(..excess);
                }
                Ok(Some(seconds))
            })
            .await
    }

    pub async fn status(&self, guild_id: GuildId, user_id: UserId) -> Result<Option<SessionRecord>> {
        let book = self.store.read().await?;
        Ok(book
            .get(&guild_id.to_string())
            .and_then(|g| g.get(&user_id.to_string()))
            .cloned())
    }

    /// Top members by accumulated session time.
    pub async fn leaderboard(&self, guild_id: GuildId, limit: usize) -> Result<Vec<(u64, i64)>> {
        let book = self.store.read().await?;
        let mut ranking: Vec<(u64, i64)> = book
            .get(&guild_id.to_string())
            .map(|g| {
                g.iter()
                    .filter_map(|(uid, r)| uid.parse().ok().map(|uid| (uid, r.total_seconds)))
                    .collect()
            })
            .unwrap_or_default();
        ranking.sort_by(|a, b| b.1.cmp(&a.1));
        ranking.truncate(limit);
        Ok(ranking)
    }
}

pub type SharedSessionManager = Arc<SessionManager>;

pub async fn create_shared_session_manager(path: impl AsRef<Path>) -> Result<SharedSessionManager> {
    Ok(Arc::new(SessionManager::open(path).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const GUILD: GuildId = GuildId::new(42);
    const MEMBER: UserId = UserId::new(500);

    async fn open_manager(tag: &str) -> (SessionManager, PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "warden-sessions-{}-{}.json",
            tag,
            rand::random::<u64>()
        ));
        let manager = SessionManager::open(&path).await.unwrap();
        (manager, path)
    }

    #[tokio::test]
    async fn test_session_roundtrip() {
        let (manager, path) = open_manager("roundtrip").await;

        manager.start(GUILD, MEMBER).await.unwrap();
        let status = manager.status(GUILD, MEMBER).await.unwrap().unwrap();
        assert!(status.active);
        assert!(status.started_at.is_some());

        let seconds = manager.end(GUILD, MEMBER).await.unwrap().unwrap();
        assert!(seconds >= 0);

        let status = manager.status(GUILD, MEMBER).await.unwrap().unwrap();
        assert!(!status.active);
        assert_eq!(status.history.len(), 1);
        assert_eq!(status.total_seconds, seconds);

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_end_without_active_session_is_noop() {
        let (manager, path) = open_manager("noop").await;

        assert!(manager.end(GUILD, MEMBER).await.unwrap().is_none());
        assert!(manager.status(GUILD, MEMBER).await.unwrap().is_none());

        // Ending twice only credits once.
        manager.start(GUILD, MEMBER).await.unwrap();
        manager.end(GUILD, MEMBER).await.unwrap();
        assert!(manager.end(GUILD, MEMBER).await.unwrap().is_none());
        let status = manager.status(GUILD, MEMBER).await.unwrap().unwrap();
        assert_eq!(status.history.len(), 1);

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_total() {
        let (manager, path) = open_manager("leaderboard").await;

        // Seed totals directly through the store to avoid sleeping.
        manager
            .store
            .update(|book| {
                let guild = book.entry(GUILD.to_string()).or_default();
                for (uid, total) in [(1u64, 30i64), (2, 90), (3, 60)] {
                    guild.insert(
                        uid.to_string(),
                        SessionRecord {
                            total_seconds: total,
                            ..Default::default()
                        },
                    );
                }
                Ok(())
            })
            .await
            .unwrap();

        let ranking = manager.leaderboard(GUILD, 2).await.unwrap();
        assert_eq!(ranking, vec![(2, 90), (3, 60)]);

        tokio::fs::remove_file(path).await.unwrap();
    }
}
