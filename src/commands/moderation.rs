use poise::serenity_prelude as serenity;
use poise::serenity_prelude::Mentionable;
use tracing::info;

use crate::embeds::build_embed;
use crate::{Context, Error};

/// Moderation commands
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "MODERATE_MEMBERS",
    subcommands("warn", "warnings", "removewarn", "kick", "ban", "case", "cases")
)]
pub async fn moderation(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Warn a member
#[poise::command(slash_command)]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "Member to warn"] user: serenity::User,
    #[description = "Reason for the warning"] reason: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let data = ctx.data();

    // Two separate stores: the warning lands even if the case write fails.
    data.moderation
        .add_warning(guild_id, user.id, &reason, ctx.author().id)
        .await?;
    let case_id = data
        .moderation
        .new_case(guild_id, "warn", user.id, ctx.author().id, &reason)
        .await?;

    ctx.say(format!("Warned {}. Case #{}", user.mention(), case_id))
        .await?;
    Ok(())
}

/// View member warnings
#[poise::command(slash_command)]
pub async fn warnings(
    ctx: Context<'_>,
    #[description = "Member to look up"] user: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let list = ctx.data().moderation.list_warnings(guild_id, user.id).await?;

    if list.is_empty() {
        ctx.say("No warnings found.").await?;
        return Ok(());
    }

    let lines: Vec<String> = list
        .iter()
        .rev()
        .take(20)
        .rev()
        .enumerate()
        .map(|(i, w)| format!("{}. {} (by <@{}>)", i + 1, w.reason, w.by))
        .collect();
    ctx.say(lines.join("\n")).await?;
    Ok(())
}

/// Remove a warning by index
#[poise::command(slash_command)]
pub async fn removewarn(
    ctx: Context<'_>,
    #[description = "Member whose warning to remove"] user: serenity::User,
    #[description = "1-based warning index"]
    #[min = 1]
    #[max = 100]
    index: u32,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let removed = ctx
        .data()
        .moderation
        .remove_warning(guild_id, user.id, index as usize)
        .await?;

    if removed {
        ctx.say("Warning removed.").await?;
    } else {
        ctx.send(poise::CreateReply::default()
            .content("No warning at that index.")
            .ephemeral(true))
            .await?;
    }
    Ok(())
}

/// Kick a member
#[poise::command(slash_command, required_permissions = "KICK_MEMBERS")]
pub async fn kick(
    ctx: Context<'_>,
    #[description = "Member to kick"] user: serenity::User,
    #[description = "Reason"] reason: Option<String>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let reason = reason.unwrap_or_else(|| "No reason provided".to_string());

    let case_id = ctx
        .data()
        .moderation
        .new_case(guild_id, "kick", user.id, ctx.author().id, &reason)
        .await?;
    guild_id
        .kick_with_reason(ctx.http(), user.id, &reason)
        .await?;

    info!("Kicked {} from guild {} (case #{})", user.id, guild_id, case_id);
    ctx.say(format!("Kicked {}. Case #{}", user.name, case_id))
        .await?;
    Ok(())
}

/// Ban a member
#[poise::command(slash_command, required_permissions = "BAN_MEMBERS")]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "Member to ban"] user: serenity::User,
    #[description = "Reason"] reason: Option<String>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let reason = reason.unwrap_or_else(|| "No reason provided".to_string());

    let case_id = ctx
        .data()
        .moderation
        .new_case(guild_id, "ban", user.id, ctx.author().id, &reason)
        .await?;
    guild_id
        .ban_with_reason(ctx.http(), user.id, 0, &reason)
        .await?;

    info!("Banned {} from guild {} (case #{})", user.id, guild_id, case_id);
    ctx.say(format!("Banned {}. Case #{}", user.name, case_id))
        .await?;
    Ok(())
}

/// Look up a moderation case
#[poise::command(slash_command)]
pub async fn case(
    ctx: Context<'_>,
    #[description = "Case number"] case_id: u64,
) -> Result<(), Error> {
    let Some(case) = ctx.data().moderation.get_case(case_id).await? else {
        ctx.send(poise::CreateReply::default()
            .content(format!("Case #{} not found.", case_id))
            .ephemeral(true))
            .await?;
        return Ok(());
    };

    let embed = build_embed(
        &ctx.data().config,
        &format!("Case #{}", case_id),
        &format!(
            "Action: **{}**\nTarget: <@{}>\nModerator: <@{}>\nReason: {}\nWhen: {}",
            case.action,
            case.target_id,
            case.actor_id,
            case.reason,
            case.timestamp.format("%Y-%m-%d %H:%M UTC"),
        ),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// List recent cases in this guild
#[poise::command(slash_command)]
pub async fn cases(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let recent = ctx.data().moderation.recent_cases(guild_id, 10).await?;

    if recent.is_empty() {
        ctx.say("No cases recorded.").await?;
        return Ok(());
    }

    let total = ctx.data().moderation.case_count(guild_id).await?;
    let lines: Vec<String> = recent
        .iter()
        .map(|(id, c)| format!("#{} {} <@{}>: {}", id, c.action, c.target_id, c.reason))
        .collect();
    ctx.say(format!(
        "{} cases total, most recent:\n{}",
        total,
        lines.join("\n")
    ))
    .await?;
    Ok(())
}
