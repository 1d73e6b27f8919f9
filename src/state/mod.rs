pub mod analytics;
pub mod appeals;
pub mod guild_settings;
pub mod moderation;
pub mod premium;
pub mod sessions;
pub mod staff;

pub use analytics::AnalyticsCounters;
pub use appeals::{Appeal, AppealLog, AppealStatus};
pub use guild_settings::{ChannelKind, EmbedBranding, GuildSettings, SettingsBook};
pub use moderation::{Case, CaseLog, WarningBook, WarningEntry};
pub use premium::{License, PremiumLedger, PremiumRecord};
pub use sessions::{SessionBook, SessionEntry, SessionRecord, SESSION_HISTORY_LIMIT};
pub use staff::{StaffAction, StaffBook, StaffEvent, StaffInfraction, StaffRecord};
