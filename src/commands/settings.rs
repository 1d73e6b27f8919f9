use poise::serenity_prelude as serenity;
use poise::serenity_prelude::Mentionable;
use poise::ChoiceParameter as _;

use crate::embeds::build_embed;
use crate::state::{ChannelKind, EmbedBranding};
use crate::{Context, Error};

/// Guild configuration
#[poise::command(
    slash_command,
    guild_only,
    rename = "config",
    default_member_permissions = "MANAGE_GUILD",
    subcommands(
        "set_channel",
        "allow_role",
        "deny_role",
        "embed_brand",
        "premium_toggle",
        "set_variable",
        "show"
    )
)]
pub async fn config(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Set a system channel
#[poise::command(slash_command)]
pub async fn set_channel(
    ctx: Context<'_>,
    #[description = "Which system channel to set"] kind: ChannelKind,
    #[description = "The channel"] channel: serenity::Channel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    ctx.data()
        .settings
        .set_channel(guild_id, kind, channel.id())
        .await?;
    ctx.say(format!("Set {} channel to <#{}>", kind.name(), channel.id()))
        .await?;
    Ok(())
}

/// Allow a role for a permission key
#[poise::command(slash_command)]
pub async fn allow_role(
    ctx: Context<'_>,
    #[description = "Permission key"] permission_key: String,
    #[description = "Role to allow"] role: serenity::Role,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    ctx.data()
        .settings
        .allow_role(guild_id, &permission_key, role.id)
        .await?;
    ctx.say(format!(
        "Role {} allowed for `{}`",
        role.mention(),
        permission_key
    ))
    .await?;
    Ok(())
}

/// Remove a role from a permission key
#[poise::command(slash_command)]
pub async fn deny_role(
    ctx: Context<'_>,
    #[description = "Permission key"] permission_key: String,
    #[description = "Role to remove"] role: serenity::Role,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    ctx.data()
        .settings
        .deny_role(guild_id, &permission_key, role.id)
        .await?;
    ctx.say(format!(
        "Role {} removed from `{}`",
        role.mention(),
        permission_key
    ))
    .await?;
    Ok(())
}

/// Set guild embed branding
#[poise::command(slash_command)]
pub async fn embed_brand(
    ctx: Context<'_>,
    #[description = "Footer text"] footer: Option<String>,
    #[description = "Author line"] author: Option<String>,
    #[description = "Banner image URL"] banner_url: Option<String>,
    #[description = "Thumbnail URL"] thumbnail_url: Option<String>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let branding = EmbedBranding {
        footer: footer.unwrap_or_default(),
        author: author.unwrap_or_default(),
        banner_url: banner_url.unwrap_or_default(),
        thumbnail_url: thumbnail_url.unwrap_or_default(),
    };
    ctx.data().settings.set_branding(guild_id, branding).await?;
    ctx.say("Embed branding updated.").await?;
    Ok(())
}

/// Toggle a premium feature by key
#[poise::command(slash_command)]
pub async fn premium_toggle(
    ctx: Context<'_>,
    #[description = "Feature key"] key: String,
    #[description = "Enable or disable"] enabled: bool,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    ctx.data()
        .settings
        .set_premium_toggle(guild_id, &key, enabled)
        .await?;
    ctx.say(format!("Premium toggle `{}`={}", key, enabled)).await?;
    Ok(())
}

/// Set a free-form guild variable
#[poise::command(slash_command)]
pub async fn set_variable(
    ctx: Context<'_>,
    #[description = "Variable name"] key: String,
    #[description = "Value"] value: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    ctx.data().settings.set_variable(guild_id, &key, &value).await?;
    ctx.say(format!("Variable `{}` set.", key)).await?;
    Ok(())
}

/// Show current guild config
#[poise::command(slash_command)]
pub async fn show(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let settings = ctx.data().settings.settings(guild_id).await?;

    let mut pretty = serde_json::to_string_pretty(&settings)?;
    if pretty.len() > 1800 {
        pretty.truncate(1800);
        pretty.push_str("\n...");
    }

    let embed = build_embed(
        &ctx.data().config,
        "Guild Configuration",
        &format!("```json\n{}\n```", pretty),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
