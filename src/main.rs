use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

/// Discord bot for moderation, staff management, and premium licensing
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Force re-sync of slash commands to all guilds (use when commands aren't showing up)
    #[arg(long, short = 's')]
    sync_commands: bool,

    /// Register commands per-guild instead of globally (faster for testing)
    #[arg(long)]
    guild_commands: bool,

    /// Specific guild ID to sync commands to (for testing)
    #[arg(long)]
    guild_id: Option<u64>,
}

mod commands;
mod config;
mod embeds;
mod error;
mod events;
mod managers;
mod state;
mod store;
mod timeparse;

use commands::{
    analytics, appeals, botstats, config as config_cmd, help, license_generate, moderation, ping,
    premium, session, staff,
};
use config::BotConfig;
use events::{handle_guild_create, handle_member_add};
use managers::{
    create_shared_analytics_manager, create_shared_appeal_manager,
    create_shared_moderation_manager, create_shared_premium_manager,
    create_shared_session_manager, create_shared_settings_manager, create_shared_staff_manager,
    SharedAnalyticsManager, SharedAppealManager, SharedModerationManager, SharedPremiumManager,
    SharedSessionManager, SharedSettingsManager, SharedStaffManager,
};

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared application state
pub struct Data {
    pub config: BotConfig,
    pub premium: SharedPremiumManager,
    pub moderation: SharedModerationManager,
    pub appeals: SharedAppealManager,
    pub staff: SharedStaffManager,
    pub sessions: SharedSessionManager,
    pub analytics: SharedAnalyticsManager,
    pub settings: SharedSettingsManager,
}

/// Interval between premium expiry sweeps.
const EXPIRY_SWEEP_SECS: u64 = 60;

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            if let Err(e) = handle_member_add(ctx, new_member, data).await {
                error!("Failed to handle new member: {}", e);
            }
        }
        serenity::FullEvent::GuildCreate { guild, .. } => {
            if let Err(e) = handle_guild_create(guild, data).await {
                error!("Failed to handle guild create: {}", e);
            }
        }
        _ => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::INFO)
        .init();

    let token = std::env::var("DISCORD_TOKEN").expect("Missing DISCORD_TOKEN environment variable");

    // Extract bot/application ID from token (first part before the dot, base64 encoded)
    if let Some(bot_id_b64) = token.split('.').next() {
        // Discord tokens use URL-safe base64 without padding
        use base64::Engine;
        match base64::engine::general_purpose::STANDARD_NO_PAD.decode(bot_id_b64) {
            Ok(decoded) => {
                if let Ok(id_str) = String::from_utf8(decoded) {
                    info!("Bot ID: {} (configure intents at https://discord.com/developers/applications/{}/bot)", id_str, id_str);
                }
            }
            Err(_) => {
                // Try URL-safe variant
                if let Ok(decoded) =
                    base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(bot_id_b64)
                {
                    if let Ok(id_str) = String::from_utf8(decoded) {
                        info!("Bot ID: {} (configure intents at https://discord.com/developers/applications/{}/bot)", id_str, id_str);
                    }
                }
            }
        }
    }

    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.json".to_string());
    let data_path = std::env::var("DATA_PATH").unwrap_or_else(|_| "data".to_string());

    info!("Loading bot configuration from {}...", config_path);
    let bot_config = BotConfig::ensure(&config_path).await?;
    if bot_config.owner_ids.is_empty() {
        warn!(
            "No owner_ids configured in {}; owner-only commands will refuse everyone",
            config_path
        );
    }

    info!("Opening stores under {}...", data_path);
    let premium_manager =
        create_shared_premium_manager(format!("{}/premium.json", data_path)).await?;
    let moderation_manager = create_shared_moderation_manager(
        format!("{}/warnings.json", data_path),
        format!("{}/cases.json", data_path),
    )
    .await?;
    let appeal_manager = create_shared_appeal_manager(format!("{}/appeals.json", data_path)).await?;
    let staff_manager = create_shared_staff_manager(format!("{}/staff.json", data_path)).await?;
    let sessions = create_shared_session_manager(format!("{}/sessions.json", data_path)).await?;
    let analytics_manager =
        create_shared_analytics_manager(format!("{}/analytics.json", data_path)).await?;
    let settings = create_shared_settings_manager(format!("{}/guilds.json", data_path)).await?;

    // Extract CLI flags for use in setup
    let sync_commands = args.sync_commands;
    let guild_commands = args.guild_commands;
    let target_guild_id = args.guild_id;

    if sync_commands {
        info!("--sync-commands: Will force re-register slash commands");
    }
    if guild_commands {
        info!("--guild-commands: Will register commands per-guild (faster for testing)");
    } else {
        info!("Registering commands globally by default (takes up to 1 hour to propagate)");
    }
    if let Some(gid) = target_guild_id {
        info!("--guild-id: Targeting specific guild {}", gid);
    }

    // Build framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                ping(),
                help(),
                premium(),
                license_generate(),
                moderation(),
                appeals(),
                staff(),
                session(),
                config_cmd(),
                analytics(),
                botstats(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            pre_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Command '{}' invoked by {} (ID: {}) in {}",
                        ctx.command().qualified_name,
                        ctx.author().name,
                        ctx.author().id,
                        ctx.guild_id().map(|g| g.to_string()).unwrap_or_else(|| "DM".to_string())
                    );
                })
            },
            post_command: |ctx| {
                Box::pin(async move {
                    let key = format!("slash:{}", ctx.command().qualified_name);
                    if let Err(e) = ctx.data().analytics.record_command(&key).await {
                        warn!("Failed to record command usage: {}", e);
                    }
                    info!(
                        "Command '{}' completed for {}",
                        ctx.command().qualified_name,
                        ctx.author().name
                    );
                })
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!("Error in command '{}': {}", ctx.command().qualified_name, error);
                            let _ = ctx.say(format!("An error occurred: {}", error)).await;
                        }
                        poise::FrameworkError::ArgumentParse { error, input, ctx, .. } => {
                            error!("Argument parse error in '{}': {} (input: {:?})", ctx.command().qualified_name, error, input);
                        }
                        poise::FrameworkError::MissingBotPermissions { missing_permissions, ctx, .. } => {
                            error!("Bot missing permissions for '{}': {:?}", ctx.command().qualified_name, missing_permissions);
                            let _ = ctx.say(format!("Bot is missing permissions: {:?}", missing_permissions)).await;
                        }
                        poise::FrameworkError::MissingUserPermissions { missing_permissions, ctx, .. } => {
                            error!("User {} missing permissions for '{}': {:?}", ctx.author().name, ctx.command().qualified_name, missing_permissions);
                        }
                        poise::FrameworkError::NotAnOwner { ctx, .. } => {
                            error!("User {} tried to use owner command '{}'", ctx.author().name, ctx.command().qualified_name);
                        }
                        poise::FrameworkError::GuildOnly { ctx, .. } => {
                            error!("Command '{}' is guild-only, used in DM by {}", ctx.command().qualified_name, ctx.author().name);
                        }
                        other => {
                            error!("Other framework error: {}", other);
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            let premium_manager = premium_manager.clone();
            let moderation_manager = moderation_manager.clone();
            let appeal_manager = appeal_manager.clone();
            let staff_manager = staff_manager.clone();
            let sessions = sessions.clone();
            let analytics_manager = analytics_manager.clone();
            let settings = settings.clone();

            Box::pin(async move {
                info!("Bot logged in as: {}", ready.user.name);

                // Determine which guilds to register commands for
                let guilds_to_register: Vec<serenity::GuildId> = if let Some(gid) = target_guild_id {
                    // Only register to specific guild
                    vec![serenity::GuildId::new(gid)]
                } else {
                    // Register to all guilds the bot is in
                    ready.guilds.iter().map(|g| g.id).collect()
                };

                if guild_commands || sync_commands {
                    // Register commands per-guild (faster for testing)
                    for guild_id in &guilds_to_register {
                        info!("Registering commands to guild: {}", guild_id);
                        if let Err(e) = poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            *guild_id,
                        ).await {
                            error!("Failed to register commands for guild {}: {}", guild_id, e);
                        } else {
                            info!("Successfully registered {} commands for guild {}",
                                  framework.options().commands.len(), guild_id);
                        }
                    }
                } else {
                    // Default: Register commands globally
                    info!("Registering commands globally...");
                    if let Err(e) = poise::builtins::register_globally(
                        ctx,
                        &framework.options().commands,
                    ).await {
                        error!("Failed to register commands globally: {}", e);
                    } else {
                        info!("Successfully registered {} commands globally (may take up to 1 hour to propagate)",
                              framework.options().commands.len());
                    }
                }

                // Background premium expiry sweep
                let sweeper = premium_manager.clone();
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(
                        std::time::Duration::from_secs(EXPIRY_SWEEP_SECS),
                    );
                    loop {
                        interval.tick().await;
                        match sweeper.expire_due().await {
                            Ok(expired) if !expired.is_empty() => {
                                info!("Expired premium for guilds: {:?}", expired);
                            }
                            Ok(_) => {}
                            Err(e) => error!("Premium expiry sweep failed: {}", e),
                        }
                    }
                });

                Ok(Data {
                    config: bot_config,
                    premium: premium_manager,
                    moderation: moderation_manager,
                    appeals: appeal_manager,
                    staff: staff_manager,
                    sessions,
                    analytics: analytics_manager,
                    settings,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS;

    // Log which privileged intents we're requesting
    let privileged_intents: Vec<&str> = vec![
        if intents.contains(serenity::GatewayIntents::MESSAGE_CONTENT) {
            Some("MESSAGE_CONTENT")
        } else {
            None
        },
        if intents.contains(serenity::GatewayIntents::GUILD_MEMBERS) {
            Some("GUILD_MEMBERS")
        } else {
            None
        },
    ]
    .into_iter()
    .flatten()
    .collect();

    info!("Requesting privileged intents: {:?}", privileged_intents);

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot...");
    if let Err(e) = client.start().await {
        // Check if it's a disallowed intents error
        let err_str = e.to_string();
        if err_str.contains("Disallowed") || err_str.contains("intents") {
            error!("Failed to start bot: {}", e);
            error!("The following privileged intents need to be enabled in the Discord Developer Portal:");
            for intent in &privileged_intents {
                error!("  - {}", intent);
            }
            error!("Go to https://discord.com/developers/applications -> Your App -> Bot -> Privileged Gateway Intents");
            return Err(anyhow::anyhow!(
                "Disallowed gateway intents. Enable these in Discord Developer Portal: {:?}",
                privileged_intents
            ));
        }
        return Err(e.into());
    }
    warn!("Bot ended.");

    Ok(())
}
