use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

/// Bot-level configuration, read from `config.json` next to the binary.
///
/// A missing file is created with defaults on first run; fields added in
/// later versions fall back to their defaults when absent from an existing
/// file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Global owners: full access to every guild's premium state and the
    /// owner-only commands.
    #[serde(default)]
    pub owner_ids: Vec<u64>,

    #[serde(default = "default_embed_color")]
    pub default_embed_color: u32,

    #[serde(default)]
    pub branding: Branding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branding {
    pub author_name: String,
    pub footer_text: String,
    pub thumbnail_url: String,
    pub banner_url: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            owner_ids: Vec::new(),
            default_embed_color: default_embed_color(),
            branding: Branding::default(),
        }
    }
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            author_name: "Warden".to_string(),
            footer_text: "Warden Bot".to_string(),
            thumbnail_url: String::new(),
            banner_url: String::new(),
        }
    }
}

fn default_prefix() -> String {
    ".".to_string()
}

fn default_embed_color() -> u32 {
    0x3498db
}

impl BotConfig {
    /// Load `path`, writing a default config there first if it is missing.
    pub async fn ensure(path: &str) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| BotError::ConfigParse {
                    path: path.to_string(),
                    source: e,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.save(path).await?;
                Ok(config)
            }
            Err(e) => Err(BotError::ConfigLoad {
                path: path.to_string(),
                source: e,
            }),
        }
    }

    pub async fn save(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| BotError::ConfigSave {
                path: path.to_string(),
                source: e,
            })?;
        Ok(())
    }

    pub fn is_owner(&self, user_id: u64) -> bool {
        self.owner_ids.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: BotConfig = serde_json::from_str(r#"{"owner_ids": [42]}"#).unwrap();
        assert_eq!(config.prefix, ".");
        assert_eq!(config.owner_ids, vec![42]);
        assert_eq!(config.default_embed_color, 0x3498db);
        assert_eq!(config.branding.footer_text, "Warden Bot");
    }

    #[tokio::test]
    async fn test_ensure_creates_default_file() {
        let path = std::env::temp_dir()
            .join(format!("warden-config-{}.json", rand::random::<u64>()))
            .display()
            .to_string();

        let config = BotConfig::ensure(&path).await.unwrap();
        assert!(config.owner_ids.is_empty());

        // Second load reads the file it just wrote.
        let reloaded = BotConfig::ensure(&path).await.unwrap();
        assert_eq!(reloaded.prefix, config.prefix);

        tokio::fs::remove_file(path).await.unwrap();
    }
}
