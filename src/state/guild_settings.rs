use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Guild settings document: guild ID -> settings.
pub type SettingsBook = HashMap<String, GuildSettings>;

/// Per-guild configuration.
///
/// Every field has a dedicated setter on the settings manager; the only
/// free-form surface is the `variables` string map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuildSettings {
    /// System channels (log, appeals, ...) by kind.
    #[serde(default)]
    pub channels: HashMap<ChannelKind, u64>,

    /// Permission key -> role IDs allowed to use it.
    #[serde(default)]
    pub permissions: HashMap<String, Vec<u64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_branding: Option<EmbedBranding>,

    /// Premium feature toggles by key.
    #[serde(default)]
    pub premium_toggles: HashMap<String, bool>,

    /// Free-form per-guild variables.
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

/// The system channels a guild can configure.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, poise::ChoiceParameter,
)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Log,
    Appeals,
    Sessions,
    Welcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedBranding {
    pub footer: String,
    pub author: String,
    pub banner_url: String,
    pub thumbnail_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_kinds_serialize_as_map_keys() {
        let mut settings = GuildSettings::default();
        settings.channels.insert(ChannelKind::Log, 111);
        settings.channels.insert(ChannelKind::Appeals, 222);

        let json = serde_json::to_string(&settings).unwrap();
        let parsed: GuildSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.channels.get(&ChannelKind::Log), Some(&111));
        assert_eq!(parsed.channels.get(&ChannelKind::Appeals), Some(&222));
    }
}
