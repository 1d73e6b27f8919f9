use crate::embeds::build_embed;
use crate::state::AppealStatus;
use crate::{Context, Error};

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum Verdict {
    Accept,
    Deny,
}

impl From<Verdict> for AppealStatus {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accept => AppealStatus::Accepted,
            Verdict::Deny => AppealStatus::Denied,
        }
    }
}

/// Appeal system
#[poise::command(
    slash_command,
    guild_only,
    subcommands("submit", "review", "status", "pending")
)]
pub async fn appeals(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Submit an appeal
#[poise::command(slash_command)]
pub async fn submit(
    ctx: Context<'_>,
    #[description = "Case number being appealed"] case_id: u64,
    #[description = "Why the case should be reconsidered"] reason: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let appeal_id = ctx
        .data()
        .appeals
        .submit(guild_id, case_id, ctx.author().id, &reason)
        .await?;
    ctx.say(format!("Appeal submitted with ID #{}", appeal_id))
        .await?;
    Ok(())
}

/// Review an appeal
#[poise::command(slash_command, required_permissions = "MODERATE_MEMBERS")]
pub async fn review(
    ctx: Context<'_>,
    #[description = "Appeal number"] appeal_id: u64,
    #[description = "Verdict"] verdict: Verdict,
) -> Result<(), Error> {
    let appeal = ctx
        .data()
        .appeals
        .review(appeal_id, verdict.into(), ctx.author().id)
        .await?;
    ctx.say(format!("Appeal #{} marked {}", appeal_id, appeal.status))
        .await?;
    Ok(())
}

/// Check an appeal's status
#[poise::command(slash_command)]
pub async fn status(
    ctx: Context<'_>,
    #[description = "Appeal number"] appeal_id: u64,
) -> Result<(), Error> {
    let Some(appeal) = ctx.data().appeals.get(appeal_id).await? else {
        ctx.send(poise::CreateReply::default()
            .content(format!("Appeal #{} not found.", appeal_id))
            .ephemeral(true))
            .await?;
        return Ok(());
    };

    let reviewed = match appeal.reviewed_by {
        Some(reviewer) => format!("<@{}>", reviewer),
        None => "Not yet reviewed".to_string(),
    };
    let embed = build_embed(
        &ctx.data().config,
        &format!("Appeal #{}", appeal_id),
        &format!(
            "Case: #{}\nSubmitted by: <@{}>\nStatus: **{}**\nReviewer: {}\nReason: {}",
            appeal.case_id, appeal.user_id, appeal.status, reviewed, appeal.reason,
        ),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// List pending appeals in this guild
#[poise::command(slash_command, required_permissions = "MODERATE_MEMBERS")]
pub async fn pending(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a guild")?;
    let pending = ctx.data().appeals.pending(guild_id).await?;

    if pending.is_empty() {
        ctx.say("No pending appeals.").await?;
        return Ok(());
    }

    let lines: Vec<String> = pending
        .iter()
        .map(|(id, a)| format!("#{} by <@{}> for case #{}: {}", id, a.user_id, a.case_id, a.reason))
        .collect();
    ctx.say(lines.join("\n")).await?;
    Ok(())
}
