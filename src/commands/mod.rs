use crate::error::BotError;
use crate::Context;

pub mod appeals;
pub mod general;
pub mod moderation;
pub mod owner;
pub mod premium;
pub mod sessions;
pub mod settings;
pub mod staff;

/// Gate for owner-only commands.
pub(crate) fn ensure_owner(ctx: &Context<'_>) -> crate::error::Result<()> {
    if ctx.data().config.is_owner(ctx.author().id.get()) {
        Ok(())
    } else {
        Err(BotError::PermissionDenied {
            message: "Owner only.".to_string(),
        })
    }
}

pub use appeals::appeals;
pub use general::{help, ping};
pub use moderation::moderation;
pub use owner::{analytics, botstats};
pub use premium::{license_generate, premium};
pub use sessions::session;
pub use settings::config;
pub use staff::staff;
