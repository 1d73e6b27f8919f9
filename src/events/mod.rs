use poise::serenity_prelude as serenity;
use poise::serenity_prelude::Mentionable;
use tracing::info;

use crate::embeds::apply_variables;
use crate::state::ChannelKind;
use crate::{Data, Error};

/// Handle when the bot joins a new guild or sees one at startup
pub async fn handle_guild_create(guild: &serenity::Guild, data: &Data) -> Result<(), Error> {
    info!("Processing guild: {} ({})", guild.name, guild.id);
    data.analytics.record_event("guild_create").await?;
    Ok(())
}

/// Greet new members in the configured welcome channel
pub async fn handle_member_add(
    ctx: &serenity::Context,
    new_member: &serenity::Member,
    data: &Data,
) -> Result<(), Error> {
    let guild_id = new_member.guild_id;
    data.analytics.record_event("member_join").await?;

    let Some(channel_id) = data.settings.channel(guild_id, ChannelKind::Welcome).await? else {
        return Ok(());
    };

    let settings = data.settings.settings(guild_id).await?;
    let template = settings
        .variables
        .get("welcome_message")
        .cloned()
        .unwrap_or_else(|| "Welcome to {guild_name}, {user}!".to_string());

    // No cache feature enabled, so fetch the guild name over HTTP.
    let guild_name = match guild_id.to_partial_guild(&ctx.http).await {
        Ok(guild) => guild.name,
        Err(_) => guild_id.to_string(),
    };

    let text = apply_variables(
        &template,
        &guild_name,
        &new_member.user.mention().to_string(),
        &settings.variables,
    );
    channel_id.say(&ctx.http, text).await?;

    info!("Welcomed {} to guild {}", new_member.user.name, guild_id);
    Ok(())
}
