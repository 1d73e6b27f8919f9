use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use poise::serenity_prelude::{ChannelId, GuildId, RoleId};

use crate::error::Result;
use crate::state::{ChannelKind, EmbedBranding, GuildSettings, SettingsBook};
use crate::store::JsonStore;

/// Typed per-guild configuration. One setter per field; there is no
/// free-form path syntax, only the `variables` string map.
pub struct SettingsManager {
    store: JsonStore<SettingsBook>,
}

impl SettingsManager {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = JsonStore::open(path.as_ref().to_path_buf(), &SettingsBook::default()).await?;
        Ok(Self { store })
    }

    pub async fn settings(&self, guild_id: GuildId) -> Result<GuildSettings> {
        let book = self.store.read().await?;
        Ok(book.get(&guild_id.to_string()).cloned().unwrap_or_default())
    }

    pub async fn set_channel(
        &self,
        guild_id: GuildId,
        kind: ChannelKind,
        channel_id: ChannelId,
    ) -> Result<()> {
        self.mutate(guild_id, move |settings| {
            settings.channels.insert(kind, channel_id.get());
        })
        .await
    }

    pub async fn channel(&self, guild_id: GuildId, kind: ChannelKind) -> Result<Option<ChannelId>> {
        Ok(self
            .settings(guild_id)
            .await?
            .channels
            .get(&kind)
            .map(|id| ChannelId::new(*id)))
    }

    /// Allow a role for a permission key. Returns the resulting sorted role
    /// set.
    pub async fn allow_role(
        &self,
        guild_id: GuildId,
        permission_key: &str,
        role_id: RoleId,
    ) -> Result<Vec<u64>> {
        let key = permission_key.to_string();
        self.mutate_returning(guild_id, move |settings| {
            let mut set: BTreeSet<u64> = settings
                .permissions
                .get(&key)
                .map(|v| v.iter().copied().collect())
                .unwrap_or_default();
            set.insert(role_id.get());
            let sorted: Vec<u64> = set.into_iter().collect();
            settings.permissions.insert(key, sorted.clone());
            sorted
        })
        .await
    }

    pub async fn deny_role(
        &self,
        guild_id: GuildId,
        permission_key: &str,
        role_id: RoleId,
    ) -> Result<Vec<u64>> {
        let key = permission_key.to_string();
        self.mutate_returning(guild_id, move |settings| {
            let mut set: BTreeSet<u64> = settings
                .permissions
                .get(&key)
                .map(|v| v.iter().copied().collect())
                .unwrap_or_default();
            set.remove(&role_id.get());
            let sorted: Vec<u64> = set.into_iter().collect();
            settings.permissions.insert(key, sorted.clone());
            sorted
        })
        .await
    }

    pub async fn set_branding(&self, guild_id: GuildId, branding: EmbedBranding) -> Result<()> {
        self.mutate(guild_id, move |settings| {
            settings.embed_branding = Some(branding);
        })
        .await
    }

    pub async fn set_premium_toggle(
        &self,
        guild_id: GuildId,
        key: &str,
        enabled: bool,
    ) -> Result<()> {
        let key = key.to_string();
        self.mutate(guild_id, move |settings| {
            settings.premium_toggles.insert(key, enabled);
        })
        .await
    }

    pub async fn set_variable(&self, guild_id: GuildId, key: &str, value: &str) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();
        self.mutate(guild_id, move |settings| {
            settings.variables.insert(key, value);
        })
        .await
    }

    async fn mutate(
        &self,
        guild_id: GuildId,
        f: impl FnOnce(&mut GuildSettings) + Send,
    ) -> Result<()> {
        self.mutate_returning(guild_id, |settings| {
            f(settings);
        })
        .await
    }

    async fn mutate_returning<R: Send>(
        &self,
        guild_id: GuildId,
        f: impl FnOnce(&mut GuildSettings) -> R + Send,
    ) -> Result<R> {
        let key = guild_id.to_string();
        self.store
            .update(move |book| Ok(f(book.entry(key).or_default())))
            .await
    }
}

pub type SharedSettingsManager = Arc<SettingsManager>;

pub async fn create_shared_settings_manager(
    path: impl AsRef<Path>,
) -> Result<SharedSettingsManager> {
    Ok(Arc::new(SettingsManager::open(path).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const GUILD: GuildId = GuildId::new(42);

    async fn open_manager(tag: &str) -> (SettingsManager, PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "warden-settings-{}-{}.json",
            tag,
            rand::random::<u64>()
        ));
        let manager = SettingsManager::open(&path).await.unwrap();
        (manager, path)
    }

    #[tokio::test]
    async fn test_setters_touch_only_their_field() {
        let (manager, path) = open_manager("fields").await;

        manager
            .set_channel(GUILD, ChannelKind::Log, ChannelId::new(111))
            .await
            .unwrap();
        manager
            .set_premium_toggle(GUILD, "dashboard", true)
            .await
            .unwrap();
        manager
            .set_variable(GUILD, "greeting", "hello there")
            .await
            .unwrap();

        let settings = manager.settings(GUILD).await.unwrap();
        assert_eq!(settings.channels.get(&ChannelKind::Log), Some(&111));
        assert_eq!(settings.premium_toggles.get("dashboard"), Some(&true));
        assert_eq!(
            settings.variables.get("greeting").map(String::as_str),
            Some("hello there")
        );
        assert!(settings.embed_branding.is_none());
        assert!(settings.permissions.is_empty());

        assert_eq!(
            manager.channel(GUILD, ChannelKind::Log).await.unwrap(),
            Some(ChannelId::new(111))
        );
        assert_eq!(manager.channel(GUILD, ChannelKind::Appeals).await.unwrap(), None);

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_role_permissions_are_a_set() {
        let (manager, path) = open_manager("roles").await;

        let set = manager
            .allow_role(GUILD, "moderation", RoleId::new(5))
            .await
            .unwrap();
        assert_eq!(set, vec![5]);

        let set = manager
            .allow_role(GUILD, "moderation", RoleId::new(5))
            .await
            .unwrap();
        assert_eq!(set, vec![5]);

        let set = manager
            .allow_role(GUILD, "moderation", RoleId::new(3))
            .await
            .unwrap();
        assert_eq!(set, vec![3, 5]);

        let set = manager
            .deny_role(GUILD, "moderation", RoleId::new(5))
            .await
            .unwrap();
        assert_eq!(set, vec![3]);

        tokio::fs::remove_file(path).await.unwrap();
    }
}
