use poise::serenity_prelude as serenity;
use poise::serenity_prelude::Mentionable;
use tracing::info;

use super::ensure_owner;
use crate::embeds::build_embed;
use crate::managers::{validate_tier, PremiumManager};
use crate::timeparse::{format_expiry, parse_duration};
use crate::{Context, Error};

async fn can_control(ctx: &Context<'_>, guild_id: serenity::GuildId) -> Result<bool, Error> {
    let data = ctx.data();
    Ok(data
        .premium
        .can_control(guild_id, ctx.author().id, &data.config.owner_ids)
        .await?)
}

/// Premium management
#[poise::command(
    slash_command,
    guild_only,
    subcommands(
        "status",
        "redeem",
        "activate_tier",
        "deactivate",
        "features",
        "tiercheck",
        "add_controller",
        "remove_controller",
        "controllers"
    )
)]
pub async fn premium(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show guild premium status
#[poise::command(slash_command)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let data = ctx.data();

    // Deliberately renders the raw record: a lapsed grant shows active=true
    // here until the expiry sweep runs, while Active reflects right now.
    let record = data.premium.get(guild_id).await?;
    let active = data.premium.is_active(guild_id).await?;
    let controllers = data.premium.list_controllers(guild_id).await?;

    let controller_list = if controllers.is_empty() {
        "None".to_string()
    } else {
        controllers
            .iter()
            .map(|u| format!("<@{}>", u))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let embed = build_embed(
        &data.config,
        "Premium Status",
        &format!(
            "Active: **{}**\nStored flag: **{}**\nTier: **{}**\nExpires: **{}**",
            active,
            record.active,
            record.tier.as_deref().unwrap_or("None"),
            format_expiry(record.expires_at),
        ),
    )
    .field("Premium Controllers", controller_list, false);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Redeem a premium license key
#[poise::command(slash_command)]
pub async fn redeem(
    ctx: Context<'_>,
    #[description = "The license key"] key: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;

    if !can_control(&ctx, guild_id).await? {
        ctx.send(poise::CreateReply::default()
            .content("You are not allowed to manage premium. Ask an owner to add you as controller.")
            .ephemeral(true))
            .await?;
        return Ok(());
    }

    // Charges the key and grants the entitlement in one ledger write.
    match ctx.data().premium.redeem(&key, guild_id, ctx.author().id).await? {
        Some(redeemed) => {
            ctx.say(format!(
                "Redeemed! Tier={} expires={}",
                redeemed.license.tier,
                format_expiry(redeemed.expires_at)
            ))
            .await?;
        }
        None => {
            ctx.send(poise::CreateReply::default()
                .content("Invalid or exhausted key.")
                .ephemeral(true))
                .await?;
        }
    }
    Ok(())
}

/// Activate a premium tier manually
#[poise::command(slash_command)]
pub async fn activate_tier(
    ctx: Context<'_>,
    #[description = "Tier name"] tier: String,
    #[description = "Duration like 30d, 12h, 1y or 'unlimited'"] duration: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;

    if !can_control(&ctx, guild_id).await? {
        ctx.send(poise::CreateReply::default()
            .content("You are not allowed to manage premium.")
            .ephemeral(true))
            .await?;
        return Ok(());
    }

    if let Err(e) = validate_tier(&tier) {
        ctx.send(poise::CreateReply::default()
            .content(e.to_string())
            .ephemeral(true))
            .await?;
        return Ok(());
    }

    let expires_at = match parse_duration(&duration) {
        Ok(expiry) => expiry,
        Err(e) => {
            ctx.send(poise::CreateReply::default()
                .content(e.to_string())
                .ephemeral(true))
                .await?;
            return Ok(());
        }
    };

    ctx.data()
        .premium
        .set_premium(guild_id, &tier, expires_at, ctx.author().id)
        .await?;
    ctx.say(format!(
        "Premium updated to {} (expires: {})",
        tier,
        format_expiry(expires_at)
    ))
    .await?;
    Ok(())
}

/// Deactivate premium for this guild
#[poise::command(slash_command)]
pub async fn deactivate(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;

    if !can_control(&ctx, guild_id).await? {
        ctx.send(poise::CreateReply::default()
            .content("You are not allowed to manage premium.")
            .ephemeral(true))
            .await?;
        return Ok(());
    }

    ctx.data().premium.remove_premium(guild_id).await?;
    ctx.say("Premium deactivated for this guild.").await?;
    Ok(())
}

/// List premium feature locks
#[poise::command(slash_command)]
pub async fn features(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(
        "Gold: advanced embeds\n\
         Platinum: dashboard widgets + analytics\n\
         Enterprise: full analytics + white-label branding",
    )
    .await?;
    Ok(())
}

/// Check your guild premium tier
#[poise::command(slash_command)]
pub async fn tiercheck(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let record = ctx.data().premium.get(guild_id).await?;
    ctx.say(format!(
        "Current tier: {}",
        record.tier.as_deref().unwrap_or("None")
    ))
    .await?;
    Ok(())
}

/// Allow a user to manage premium in this guild
#[poise::command(slash_command)]
pub async fn add_controller(
    ctx: Context<'_>,
    #[description = "User to grant premium management access"] user: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;

    if let Err(e) = ensure_owner(&ctx) {
        ctx.send(poise::CreateReply::default()
            .content(e.to_string())
            .ephemeral(true))
            .await?;
        return Ok(());
    }

    let updated = ctx.data().premium.add_controller(guild_id, user.id).await?;
    ctx.say(format!(
        "Added {} as premium controller. Total: {}",
        user.mention(),
        updated.len()
    ))
    .await?;
    Ok(())
}

/// Remove premium management access from a user
#[poise::command(slash_command)]
pub async fn remove_controller(
    ctx: Context<'_>,
    #[description = "User to revoke premium management access from"] user: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;

    if let Err(e) = ensure_owner(&ctx) {
        ctx.send(poise::CreateReply::default()
            .content(e.to_string())
            .ephemeral(true))
            .await?;
        return Ok(());
    }

    let updated = ctx
        .data()
        .premium
        .remove_controller(guild_id, user.id)
        .await?;
    ctx.say(format!(
        "Removed {} from premium controllers. Total: {}",
        user.mention(),
        updated.len()
    ))
    .await?;
    Ok(())
}

/// List users allowed to control premium
#[poise::command(slash_command)]
pub async fn controllers(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let rows = ctx.data().premium.list_controllers(guild_id).await?;

    if rows.is_empty() {
        ctx.say("No premium controllers configured.").await?;
        return Ok(());
    }
    ctx.say(
        rows.iter()
            .map(|uid| format!("- <@{}> (`{}`)", uid, uid))
            .collect::<Vec<_>>()
            .join("\n"),
    )
    .await?;
    Ok(())
}

/// Generate a license key (owner only)
#[poise::command(slash_command)]
pub async fn license_generate(
    ctx: Context<'_>,
    #[description = "Tier the key grants"] tier: String,
    #[description = "Duration like 30d or 'unlimited'"] duration: String,
    #[description = "How many redemptions the key allows"]
    #[min = 1]
    #[max = 100]
    uses: Option<u32>,
) -> Result<(), Error> {
    if let Err(e) = ensure_owner(&ctx) {
        ctx.send(poise::CreateReply::default()
            .content(e.to_string())
            .ephemeral(true))
            .await?;
        return Ok(());
    }

    if let Err(e) = validate_tier(&tier) {
        ctx.send(poise::CreateReply::default()
            .content(e.to_string())
            .ephemeral(true))
            .await?;
        return Ok(());
    }

    // Validate the duration now so a broken key never enters the pool.
    if let Err(e) = parse_duration(&duration) {
        ctx.send(poise::CreateReply::default()
            .content(e.to_string())
            .ephemeral(true))
            .await?;
        return Ok(());
    }

    let uses = uses.unwrap_or(1);
    let key = PremiumManager::generate_key();
    ctx.data()
        .premium
        .create_license(&key, &tier, &duration, uses)
        .await?;

    info!(
        "License generated by {}: tier={} duration={} uses={}",
        ctx.author().name,
        tier,
        duration,
        uses
    );
    ctx.send(poise::CreateReply::default()
        .content(format!("Generated key: `{}`", key))
        .ephemeral(true))
        .await?;
    Ok(())
}
