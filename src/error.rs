use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    // Store errors
    #[error("Failed to read store file '{path}': {source}")]
    StoreLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write store file '{path}': {source}")]
    StoreSave {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Store file '{path}' contains invalid JSON: {source}")]
    StoreParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // Configuration errors
    #[error("Failed to load config file '{path}': {source}")]
    ConfigLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write config file '{path}': {source}")]
    ConfigSave {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // Validation errors
    #[error("Invalid duration '{input}'. Use formats like 30d, 12h, 45m, 1y or 'unlimited'")]
    InvalidDuration { input: String },

    #[error("Unknown tier '{name}'. Valid tiers: {valid}")]
    UnknownTier { name: String, valid: String },

    // Record lookup errors
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    // Permission errors
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    // Discord errors
    #[error("Discord API error: {message}")]
    Discord { message: String },

    // Generic errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BotError {
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        BotError::NotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<serenity::Error> for BotError {
    fn from(err: serenity::Error) -> Self {
        BotError::Discord {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for BotError {
    fn from(err: std::io::Error) -> Self {
        BotError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::Internal {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

use poise::serenity_prelude as serenity;
