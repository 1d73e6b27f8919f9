use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// On-disk layout of the premium ledger file.
///
/// Guild and user snowflakes are decimal strings in key position (JSON object
/// keys) and plain u64 in value position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PremiumLedger {
    /// Guild ID -> entitlement record
    pub guilds: HashMap<String, PremiumRecord>,

    /// License key -> redeemable license
    pub licenses: HashMap<String, License>,

    /// Guild ID -> users allowed to manage premium there
    #[serde(default)]
    pub controllers: HashMap<String, Vec<u64>>,
}

/// Per-guild entitlement state.
///
/// `expires_at == None` means the grant never auto-expires. `active == false`
/// means no entitlement regardless of `expires_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumRecord {
    pub active: bool,
    pub tier: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<u64>,
}

impl Default for PremiumRecord {
    fn default() -> Self {
        Self {
            active: false,
            tier: None,
            expires_at: None,
            updated_by: None,
        }
    }
}

/// A capacity-limited license key.
///
/// `duration` keeps the original spec string (`30d`, `unlimited`, ...) and is
/// re-parsed when the key is redeemed, so time between key creation and
/// redemption is not charged against the grantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub tier: String,
    pub duration: String,
    pub uses: u32,
    pub redeemed: u32,
}

impl License {
    pub fn is_exhausted(&self) -> bool {
        self.redeemed >= self.uses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_inactive() {
        let record = PremiumRecord::default();
        assert!(!record.active);
        assert!(record.tier.is_none());
        assert!(record.expires_at.is_none());
    }

    #[test]
    fn test_ledger_round_trips_snowflake_keys() {
        let mut ledger = PremiumLedger::default();
        ledger.guilds.insert(
            "123456789012345678".to_string(),
            PremiumRecord {
                active: true,
                tier: Some("Gold".to_string()),
                expires_at: None,
                updated_by: Some(987654321098765432),
            },
        );
        ledger
            .controllers
            .insert("123456789012345678".to_string(), vec![987654321098765432]);

        let json = serde_json::to_string(&ledger).unwrap();
        let parsed: PremiumLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed.controllers["123456789012345678"],
            vec![987654321098765432]
        );
        assert!(parsed.guilds["123456789012345678"].active);
    }
}
