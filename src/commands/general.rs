use tracing::info;

use crate::embeds::build_embed;
use crate::{Context, Error};

/// Check if the bot is running
#[poise::command(prefix_command, slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    info!("Ping command called by {}", ctx.author().name);
    ctx.send(poise::CreateReply::default()
        .content("Pong! Bot is working!")
        .ephemeral(true))
        .await?;
    Ok(())
}

/// Show help information
#[poise::command(prefix_command, slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let embed = build_embed(
        &ctx.data().config,
        "Bot Commands",
        "**/premium** - status, redeem, activate_tier, deactivate, controllers\n\
         **/moderation** - warn, warnings, removewarn, kick, ban, case, cases\n\
         **/appeals** - submit, review, status, pending\n\
         **/staff** - promote, demote, infraction, profile\n\
         **/session** - start, end, status, leaderboard\n\
         **/config** - set_channel, allow_role, embed_brand, premium_toggle, set_variable, show\n\
         **/analytics** - usage counters\n\
         **/license_generate**, **/botstats** - owner only",
    );

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
