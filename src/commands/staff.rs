use poise::serenity_prelude as serenity;
use poise::serenity_prelude::Mentionable;

use crate::embeds::build_embed;
use crate::{Context, Error};

/// Staff management
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "MANAGE_GUILD",
    subcommands("promote", "demote", "infraction", "profile")
)]
pub async fn staff(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Promote a staff member
#[poise::command(slash_command)]
pub async fn promote(
    ctx: Context<'_>,
    #[description = "Staff member"] user: serenity::User,
    #[description = "New rank"] rank: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    ctx.data()
        .staff
        .promote(guild_id, user.id, &rank, ctx.author().id)
        .await?;

    let embed = build_embed(
        &ctx.data().config,
        "Staff Promotion",
        &format!("Promoted {} to **{}**", user.mention(), rank),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Demote a staff member
#[poise::command(slash_command)]
pub async fn demote(
    ctx: Context<'_>,
    #[description = "Staff member"] user: serenity::User,
    #[description = "New rank"] rank: String,
    #[description = "Whether the demotion can be appealed"] appealable: Option<bool>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let appealable = appealable.unwrap_or(true);
    ctx.data()
        .staff
        .demote(guild_id, user.id, &rank, appealable, ctx.author().id)
        .await?;

    let embed = build_embed(
        &ctx.data().config,
        "Staff Demotion",
        &format!(
            "Demoted {} to **{}**\nAppealable: **{}**",
            user.mention(),
            rank,
            appealable
        ),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Log a staff infraction
#[poise::command(slash_command)]
pub async fn infraction(
    ctx: Context<'_>,
    #[description = "Staff member"] user: serenity::User,
    #[description = "What happened"] reason: String,
    #[description = "Infraction points"]
    #[min = 1]
    #[max = 50]
    points: Option<u32>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let points = points.unwrap_or(1);
    ctx.data()
        .staff
        .add_infraction(guild_id, user.id, &reason, points, ctx.author().id)
        .await?;

    let embed = build_embed(
        &ctx.data().config,
        "Staff Infraction",
        &format!(
            "Infraction added to {}\nReason: {}\nPoints: {}",
            user.mention(),
            reason,
            points
        ),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// View a staff profile
#[poise::command(slash_command)]
pub async fn profile(
    ctx: Context<'_>,
    #[description = "Staff member"] user: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let Some(record) = ctx.data().staff.profile(guild_id, user.id).await? else {
        let embed = build_embed(&ctx.data().config, "Staff Profile", "No staff profile found.");
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        return Ok(());
    };

    let embed = build_embed(
        &ctx.data().config,
        "Staff Profile",
        &format!(
            "Member: {}\nRank: {}\nInfractions: {}\nHistory entries: {}",
            user.mention(),
            record.rank.as_deref().unwrap_or("N/A"),
            record.infractions.len(),
            record.history.len()
        ),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
