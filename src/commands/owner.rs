use super::ensure_owner;
use crate::embeds::build_embed;
use crate::{Context, Error};

/// Show command usage counters
#[poise::command(slash_command, rename = "analytics")]
pub async fn analytics(ctx: Context<'_>) -> Result<(), Error> {
    let top = ctx.data().analytics.top_commands(10).await?;

    if top.is_empty() {
        ctx.say("No usage recorded yet.").await?;
        return Ok(());
    }

    let lines: Vec<String> = top
        .iter()
        .map(|(name, count)| format!("`{}` - {}", name, count))
        .collect();
    let embed = build_embed(&ctx.data().config, "Command Usage", &lines.join("\n"));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Bot-wide statistics (owner only)
#[poise::command(slash_command)]
pub async fn botstats(ctx: Context<'_>) -> Result<(), Error> {
    if let Err(e) = ensure_owner(&ctx) {
        ctx.send(poise::CreateReply::default()
            .content(e.to_string())
            .ephemeral(true))
            .await?;
        return Ok(());
    }

    let guilds = ctx.data().premium.list_guilds().await?;
    let premium_count = guilds.values().filter(|r| r.active).count();
    let top = ctx.data().analytics.top_commands(5).await?;
    let total_invocations: u64 = top.iter().map(|(_, c)| c).sum();

    let embed = build_embed(
        &ctx.data().config,
        "Bot Statistics",
        &format!(
            "Tracked guilds: **{}**\nPremium guilds: **{}**\nTop-5 command invocations: **{}**",
            guilds.len(),
            premium_count,
            total_invocations
        ),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
