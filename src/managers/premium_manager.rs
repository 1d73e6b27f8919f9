use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use chrono::{DateTime, Utc};
use poise::serenity_prelude::{GuildId, UserId};
use rand::RngCore;
use tracing::info;

use crate::error::Result;
use crate::state::{License, PremiumLedger, PremiumRecord};
use crate::store::JsonStore;
use crate::timeparse::parse_duration;

/// Tiers a guild can hold, lowest to highest.
pub const TIERS: [&str; 3] = ["Gold", "Platinum", "Enterprise"];

pub fn is_valid_tier(name: &str) -> bool {
    TIERS.contains(&name)
}

/// Reject unknown tier names before anything touches the ledger.
pub fn validate_tier(name: &str) -> Result<()> {
    if is_valid_tier(name) {
        Ok(())
    } else {
        Err(crate::error::BotError::UnknownTier {
            name: name.to_string(),
            valid: TIERS.join(", "),
        })
    }
}

/// What a successful redemption grants.
#[derive(Debug, Clone, PartialEq)]
pub struct RedeemedLicense {
    /// License state after the charge (`redeemed` already incremented).
    pub license: License,
    /// Expiry applied to the guild, parsed from the license duration at
    /// redemption time.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Entitlement lifecycle, license pool, and controller ACL over one ledger
/// file.
pub struct PremiumManager {
    store: JsonStore<PremiumLedger>,
}

impl PremiumManager {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = JsonStore::open(path.as_ref().to_path_buf(), &PremiumLedger::default()).await?;
        Ok(Self { store })
    }

    /// The stored record for a guild, or the inactive default. Absence is not
    /// an error.
    pub async fn get(&self, guild_id: GuildId) -> Result<PremiumRecord> {
        let ledger = self.store.read().await?;
        Ok(ledger
            .guilds
            .get(&guild_id.to_string())
            .cloned()
            .unwrap_or_default())
    }

    /// All stored guild records, keyed by decimal guild id.
    pub async fn list_guilds(&self) -> Result<std::collections::HashMap<String, PremiumRecord>> {
        Ok(self.store.read().await?.guilds)
    }

    /// Unconditionally overwrite a guild's entitlement.
    ///
    /// No check that `expires_at` is in the future: writing a past timestamp
    /// is the force-expire mechanism.
    pub async fn set_premium(
        &self,
        guild_id: GuildId,
        tier: &str,
        expires_at: Option<DateTime<Utc>>,
        by: UserId,
    ) -> Result<()> {
        let key = guild_id.to_string();
        let record = PremiumRecord {
            active: true,
            tier: Some(tier.to_string()),
            expires_at,
            updated_by: Some(by.get()),
        };
        self.store
            .update(move |ledger| {
                ledger.guilds.insert(key, record);
                Ok(())
            })
            .await
    }

    /// Reset a guild to the inactive default shape. A reset, not a delete:
    /// `get` still returns a well-formed record afterwards.
    pub async fn remove_premium(&self, guild_id: GuildId) -> Result<()> {
        let key = guild_id.to_string();
        self.store
            .update(move |ledger| {
                ledger.guilds.insert(key, PremiumRecord::default());
                Ok(())
            })
            .await
    }

    /// Whether the guild's entitlement is live right now.
    ///
    /// Computed from the record on every call, never persisted: a timed grant
    /// whose `expires_at` has passed reports inactive here while its stored
    /// `active` flag stays `true` until the next [`expire_due`] sweep.
    ///
    /// [`expire_due`]: PremiumManager::expire_due
    pub async fn is_active(&self, guild_id: GuildId) -> Result<bool> {
        let record = self.get(guild_id).await?;
        if !record.active {
            return Ok(false);
        }
        Ok(match record.expires_at {
            None => true,
            Some(at) => at > Utc::now(),
        })
    }

    /// Flip `active` off for every timed grant whose expiry has passed.
    ///
    /// One locked update for the whole sweep: a single write covers all
    /// flipped records, and a sweep that flips nothing writes nothing.
    /// Returns the newly expired guild ids.
    pub async fn expire_due(&self) -> Result<Vec<GuildId>> {
        self.store
            .update(|ledger| {
                let now = Utc::now();
                let mut expired = Vec::new();
                for (gid, record) in ledger.guilds.iter_mut() {
                    if record.active {
                        if let Some(at) = record.expires_at {
                            if at <= now {
                                record.active = false;
                                if let Ok(id) = gid.parse::<u64>() {
                                    expired.push(GuildId::new(id));
                                }
                            }
                        }
                    }
                }
                Ok(expired)
            })
            .await
    }

    /// Insert a license under `key`. The caller supplies the key (see
    /// [`generate_key`]); an existing license under the same key is silently
    /// overwritten, which the random keyspace makes a non-concern.
    ///
    /// [`generate_key`]: PremiumManager::generate_key
    pub async fn create_license(
        &self,
        key: &str,
        tier: &str,
        duration: &str,
        uses: u32,
    ) -> Result<()> {
        let key = key.to_string();
        let license = License {
            tier: tier.to_string(),
            duration: duration.to_string(),
            uses,
            redeemed: 0,
        };
        self.store
            .update(move |ledger| {
                ledger.licenses.insert(key, license);
                Ok(())
            })
            .await
    }

    /// Redeem `key` for `guild_id`: charge one use and grant the entitlement
    /// in the same ledger write.
    ///
    /// Returns `None` for an unknown or exhausted key. The license duration is
    /// parsed inside the update, so a malformed duration aborts before
    /// anything is charged or granted.
    pub async fn redeem(
        &self,
        key: &str,
        guild_id: GuildId,
        by: UserId,
    ) -> Result<Option<RedeemedLicense>> {
        let key = key.to_string();
        let guild_key = guild_id.to_string();
        let redeemed = self
            .store
            .update(move |ledger| {
                let Some(license) = ledger.licenses.get_mut(&key) else {
                    return Ok(None);
                };
                if license.is_exhausted() {
                    return Ok(None);
                }

                let expires_at = parse_duration(&license.duration)?;
                license.redeemed += 1;
                let license = license.clone();

                ledger.guilds.insert(
                    guild_key,
                    PremiumRecord {
                        active: true,
                        tier: Some(license.tier.clone()),
                        expires_at,
                        updated_by: Some(by.get()),
                    },
                );

                Ok(Some(RedeemedLicense {
                    license,
                    expires_at,
                }))
            })
            .await?;

        if let Some(r) = &redeemed {
            info!(
                "License redeemed for guild {}: tier={} uses={}/{}",
                guild_id, r.license.tier, r.license.redeemed, r.license.uses
            );
        }
        Ok(redeemed)
    }

    /// A fresh URL-safe license key: 16 random bytes, base64 without padding.
    pub fn generate_key() -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Add a controller. Set semantics: re-adding an existing member is a
    /// no-op. Returns the resulting sorted set.
    pub async fn add_controller(&self, guild_id: GuildId, user_id: UserId) -> Result<Vec<u64>> {
        self.mutate_controllers(guild_id, move |set| {
            set.insert(user_id.get());
        })
        .await
    }

    /// Remove a controller if present. Returns the resulting sorted set.
    pub async fn remove_controller(&self, guild_id: GuildId, user_id: UserId) -> Result<Vec<u64>> {
        self.mutate_controllers(guild_id, move |set| {
            set.remove(&user_id.get());
        })
        .await
    }

    pub async fn list_controllers(&self, guild_id: GuildId) -> Result<Vec<u64>> {
        let ledger = self.store.read().await?;
        Ok(ledger
            .controllers
            .get(&guild_id.to_string())
            .cloned()
            .unwrap_or_default())
    }

    /// Global owners always pass; everyone else needs a controller entry for
    /// this guild.
    pub async fn can_control(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        owner_ids: &[u64],
    ) -> Result<bool> {
        if owner_ids.contains(&user_id.get()) {
            return Ok(true);
        }
        Ok(self.list_controllers(guild_id).await?.contains(&user_id.get()))
    }

    async fn mutate_controllers(
        &self,
        guild_id: GuildId,
        f: impl FnOnce(&mut BTreeSet<u64>) + Send,
    ) -> Result<Vec<u64>> {
        let key = guild_id.to_string();
        self.store
            .update(move |ledger| {
                let mut set: BTreeSet<u64> = ledger
                    .controllers
                    .get(&key)
                    .map(|v| v.iter().copied().collect())
                    .unwrap_or_default();
                f(&mut set);
                let sorted: Vec<u64> = set.into_iter().collect();
                ledger.controllers.insert(key, sorted.clone());
                Ok(sorted)
            })
            .await
    }
}

pub type SharedPremiumManager = Arc<PremiumManager>;

pub async fn create_shared_premium_manager(path: impl AsRef<Path>) -> Result<SharedPremiumManager> {
    Ok(Arc::new(PremiumManager::open(path).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::path::PathBuf;

    fn temp_ledger_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "warden-premium-{}-{}.json",
            tag,
            rand::random::<u64>()
        ))
    }

    async fn open_manager(tag: &str) -> (PremiumManager, PathBuf) {
        let path = temp_ledger_path(tag);
        let manager = PremiumManager::open(&path).await.unwrap();
        (manager, path)
    }

    const GUILD: GuildId = GuildId::new(42);
    const OTHER_GUILD: GuildId = GuildId::new(99);
    const ACTOR: UserId = UserId::new(1000);

    #[tokio::test]
    async fn test_get_returns_default_for_unknown_guild() {
        let (manager, path) = open_manager("default").await;

        let record = manager.get(GUILD).await.unwrap();
        assert_eq!(record, PremiumRecord::default());
        assert!(!manager.is_active(GUILD).await.unwrap());

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_permanent_grant_stays_active() {
        let (manager, path) = open_manager("permanent").await;

        manager.set_premium(GUILD, "Gold", None, ACTOR).await.unwrap();
        assert!(manager.is_active(GUILD).await.unwrap());

        let record = manager.get(GUILD).await.unwrap();
        assert_eq!(record.tier.as_deref(), Some("Gold"));
        assert_eq!(record.updated_by, Some(ACTOR.get()));
        assert!(record.expires_at.is_none());

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_past_expiry_is_inactive_future_is_active() {
        let (manager, path) = open_manager("timed").await;

        let past = Utc::now() - Duration::hours(1);
        manager
            .set_premium(GUILD, "Gold", Some(past), ACTOR)
            .await
            .unwrap();
        assert!(!manager.is_active(GUILD).await.unwrap());
        // Stored flag stays true until a sweep runs.
        assert!(manager.get(GUILD).await.unwrap().active);

        let future = Utc::now() + Duration::hours(1);
        manager
            .set_premium(OTHER_GUILD, "Platinum", Some(future), ACTOR)
            .await
            .unwrap();
        assert!(manager.is_active(OTHER_GUILD).await.unwrap());

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_premium_resets_to_default() {
        let (manager, path) = open_manager("remove").await;

        manager.set_premium(GUILD, "Gold", None, ACTOR).await.unwrap();
        manager.remove_premium(GUILD).await.unwrap();

        assert_eq!(manager.get(GUILD).await.unwrap(), PremiumRecord::default());
        assert!(!manager.is_active(GUILD).await.unwrap());

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_expire_due_sweeps_once() {
        let (manager, path) = open_manager("sweep").await;

        let past = Utc::now() - Duration::minutes(5);
        let future = Utc::now() + Duration::hours(1);
        manager
            .set_premium(GUILD, "Gold", Some(past), ACTOR)
            .await
            .unwrap();
        manager
            .set_premium(OTHER_GUILD, "Gold", Some(future), ACTOR)
            .await
            .unwrap();

        let expired = manager.expire_due().await.unwrap();
        assert_eq!(expired, vec![GUILD]);
        assert!(!manager.get(GUILD).await.unwrap().active);
        assert!(manager.get(OTHER_GUILD).await.unwrap().active);

        // Idempotent: nothing left to flip.
        assert!(manager.expire_due().await.unwrap().is_empty());

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_noop_sweep_does_not_write() {
        let (manager, path) = open_manager("sweep-noop").await;

        manager.set_premium(GUILD, "Gold", None, ACTOR).await.unwrap();

        let before = tokio::fs::metadata(&path).await.unwrap().modified().unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        manager.expire_due().await.unwrap();
        let after = tokio::fs::metadata(&path).await.unwrap().modified().unwrap();
        assert_eq!(before, after);

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_redeem_is_capacity_bound() {
        let (manager, path) = open_manager("capacity").await;

        manager
            .create_license("ABC123", "Gold", "30d", 1)
            .await
            .unwrap();

        let first = manager.redeem("ABC123", GUILD, ACTOR).await.unwrap().unwrap();
        assert_eq!(first.license.tier, "Gold");
        assert_eq!(first.license.duration, "30d");
        assert_eq!(first.license.uses, 1);
        assert_eq!(first.license.redeemed, 1);
        assert!(first.expires_at.is_some());

        // Second redemption fails regardless of guild.
        assert!(manager
            .redeem("ABC123", OTHER_GUILD, ACTOR)
            .await
            .unwrap()
            .is_none());

        // The grant landed in the same write as the charge.
        assert!(manager.is_active(GUILD).await.unwrap());
        assert!(!manager.is_active(OTHER_GUILD).await.unwrap());

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_redeem_unknown_key_returns_none() {
        let (manager, path) = open_manager("unknown").await;

        assert!(manager
            .redeem("NOPE", GUILD, ACTOR)
            .await
            .unwrap()
            .is_none());

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_redeem_multi_use_license() {
        let (manager, path) = open_manager("multi").await;

        manager
            .create_license("MULTI", "Platinum", "unlimited", 3)
            .await
            .unwrap();

        for n in 1..=3u32 {
            let redeemed = manager.redeem("MULTI", GUILD, ACTOR).await.unwrap().unwrap();
            assert_eq!(redeemed.license.redeemed, n);
            assert!(redeemed.expires_at.is_none());
        }
        assert!(manager.redeem("MULTI", GUILD, ACTOR).await.unwrap().is_none());

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_redeem_bad_duration_charges_nothing() {
        let (manager, path) = open_manager("bad-duration").await;

        manager
            .create_license("BROKEN", "Gold", "eventually", 1)
            .await
            .unwrap();

        assert!(manager.redeem("BROKEN", GUILD, ACTOR).await.is_err());

        // Neither charged nor granted.
        let record = manager.get(GUILD).await.unwrap();
        assert!(!record.active);
        let ledger = manager.store.read().await.unwrap();
        assert_eq!(ledger.licenses["BROKEN"].redeemed, 0);

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_controller_set_semantics() {
        let (manager, path) = open_manager("controllers").await;

        let user = UserId::new(2000);

        assert!(manager.list_controllers(GUILD).await.unwrap().is_empty());

        let set = manager.add_controller(GUILD, user).await.unwrap();
        assert_eq!(set, vec![2000]);

        // Adding twice changes nothing.
        let set = manager.add_controller(GUILD, user).await.unwrap();
        assert_eq!(set, vec![2000]);

        let set = manager.add_controller(GUILD, UserId::new(1500)).await.unwrap();
        assert_eq!(set, vec![1500, 2000]);

        // Removing an absent member is a no-op.
        let set = manager
            .remove_controller(GUILD, UserId::new(9999))
            .await
            .unwrap();
        assert_eq!(set, vec![1500, 2000]);

        let set = manager.remove_controller(GUILD, user).await.unwrap();
        assert_eq!(set, vec![1500]);

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_can_control_owner_bypass() {
        let (manager, path) = open_manager("acl").await;

        let owner = UserId::new(1);
        let controller = UserId::new(2);
        let stranger = UserId::new(3);
        let owners = [owner.get()];

        manager.add_controller(GUILD, controller).await.unwrap();

        assert!(manager.can_control(GUILD, owner, &owners).await.unwrap());
        assert!(manager.can_control(GUILD, controller, &owners).await.unwrap());
        assert!(!manager.can_control(GUILD, stranger, &owners).await.unwrap());

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[test]
    fn test_generated_keys_are_distinct_and_urlsafe() {
        let a = PremiumManager::generate_key();
        let b = PremiumManager::generate_key();
        assert_ne!(a, b);
        // 16 bytes -> 22 base64 chars, no padding.
        assert_eq!(a.len(), 22);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_tier_validation() {
        assert!(is_valid_tier("Gold"));
        assert!(is_valid_tier("Enterprise"));
        assert!(!is_valid_tier("gold"));
        assert!(!is_valid_tier("Diamond"));
    }
}
