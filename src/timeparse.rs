use chrono::{DateTime, Duration, Utc};

use crate::error::{BotError, Result};

/// Parse a duration spec like `30d`, `12h`, `45m`, `1y` into an absolute
/// expiry timestamp. `unlimited`/`forever`/`perm`/`permanent` mean no expiry
/// and parse to `None`.
pub fn parse_duration(spec: &str) -> Result<Option<DateTime<Utc>>> {
    let spec = spec.trim().to_lowercase();
    if matches!(spec.as_str(), "unlimited" | "forever" | "perm" | "permanent") {
        return Ok(None);
    }

    let invalid = || BotError::InvalidDuration {
        input: spec.clone(),
    };

    let unit = spec.chars().last().ok_or_else(invalid)?;
    let amount: i64 = spec[..spec.len() - unit.len_utf8()]
        .parse()
        .map_err(|_| invalid())?;
    if amount <= 0 {
        return Err(invalid());
    }

    let delta = match unit {
        'm' => Duration::minutes(amount),
        'h' => Duration::hours(amount),
        'd' => Duration::days(amount),
        'y' => Duration::days(365 * amount),
        _ => return Err(invalid()),
    };

    Ok(Some(Utc::now() + delta))
}

/// Render an expiry timestamp for user-facing messages.
pub fn format_expiry(expires_at: Option<DateTime<Utc>>) -> String {
    match expires_at {
        None => "Unlimited".to_string(),
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
    }
}
