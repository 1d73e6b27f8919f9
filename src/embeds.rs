use std::collections::HashMap;

use chrono::Utc;
use poise::serenity_prelude as serenity;

use crate::config::BotConfig;

/// Build a branded embed for command replies.
pub fn build_embed(config: &BotConfig, title: &str, description: &str) -> serenity::CreateEmbed {
    let brand = &config.branding;

    let mut embed = serenity::CreateEmbed::new()
        .title(title.to_string())
        .description(description.to_string())
        .color(config.default_embed_color);

    if !brand.author_name.is_empty() {
        embed = embed.author(serenity::CreateEmbedAuthor::new(brand.author_name.clone()));
    }
    if !brand.footer_text.is_empty() {
        embed = embed.footer(serenity::CreateEmbedFooter::new(brand.footer_text.clone()));
    }
    if !brand.thumbnail_url.is_empty() {
        embed = embed.thumbnail(brand.thumbnail_url.clone());
    }
    if !brand.banner_url.is_empty() {
        embed = embed.image(brand.banner_url.clone());
    }

    embed
}

/// Substitute `{placeholder}` variables in configurable message text.
pub fn apply_variables(
    text: &str,
    guild_name: &str,
    user_mention: &str,
    extra: &HashMap<String, String>,
) -> String {
    let mut out = text.to_string();
    out = out.replace("{guild_name}", guild_name);
    out = out.replace("{user}", user_mention);
    out = out.replace(
        "{timestamp}",
        &Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
    );
    for (key, value) in extra {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_variables() {
        let mut extra = HashMap::new();
        extra.insert("rank".to_string(), "Moderator".to_string());

        let out = apply_variables(
            "Welcome to {guild_name}, {user}! Rank: {rank}",
            "Test Guild",
            "<@123>",
            &extra,
        );
        assert_eq!(out, "Welcome to Test Guild, <@123>! Rank: Moderator");
    }

    #[test]
    fn test_unknown_placeholders_left_alone() {
        let out = apply_variables("hello {unknown}", "g", "u", &HashMap::new());
        assert_eq!(out, "hello {unknown}");
    }
}
