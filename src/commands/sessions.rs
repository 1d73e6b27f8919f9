use poise::serenity_prelude as serenity;
use poise::serenity_prelude::Mentionable;

use crate::embeds::build_embed;
use crate::{Context, Error};

/// Staff session tracking
#[poise::command(
    slash_command,
    guild_only,
    rename = "session",
    subcommands("start", "end", "status", "leaderboard")
)]
pub async fn session(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Start your staff session
#[poise::command(slash_command)]
pub async fn start(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    ctx.data().sessions.start(guild_id, ctx.author().id).await?;

    let embed = build_embed(
        &ctx.data().config,
        "Session Started",
        "Your staff session is now active.",
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// End your staff session
#[poise::command(slash_command)]
pub async fn end(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;

    match ctx.data().sessions.end(guild_id, ctx.author().id).await? {
        Some(seconds) => {
            let embed = build_embed(
                &ctx.data().config,
                "Session Ended",
                &format!(
                    "Your staff session has ended after {:.2} hours.",
                    seconds as f64 / 3600.0
                ),
            );
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        None => {
            ctx.send(poise::CreateReply::default()
                .content("You have no active session.")
                .ephemeral(true))
                .await?;
        }
    }
    Ok(())
}

/// Check a member's session status
#[poise::command(slash_command)]
pub async fn status(
    ctx: Context<'_>,
    #[description = "Member to check (defaults to you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let user = user.as_ref().unwrap_or_else(|| ctx.author());
    let record = ctx
        .data()
        .sessions
        .status(guild_id, user.id)
        .await?
        .unwrap_or_default();

    let embed = build_embed(
        &ctx.data().config,
        "Session Status",
        &format!(
            "Member: {}\nActive: **{}**\nTotal hours: {:.2}",
            user.mention(),
            record.active,
            record.total_seconds as f64 / 3600.0
        ),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Top staff by session hours
#[poise::command(slash_command)]
pub async fn leaderboard(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let ranking = ctx.data().sessions.leaderboard(guild_id, 10).await?;

    if ranking.is_empty() {
        ctx.say("No sessions recorded yet.").await?;
        return Ok(());
    }

    let lines: Vec<String> = ranking
        .iter()
        .enumerate()
        .map(|(i, (uid, total))| {
            format!("{}. <@{}> - {:.2} hours", i + 1, uid, *total as f64 / 3600.0)
        })
        .collect();

    let embed = build_embed(&ctx.data().config, "Session Leaderboard", &lines.join("\n"));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
