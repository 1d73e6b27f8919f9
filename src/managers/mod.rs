pub mod analytics_manager;
pub mod appeal_manager;
pub mod moderation_manager;
pub mod premium_manager;
pub mod session_manager;
pub mod settings_manager;
pub mod staff_manager;

pub use analytics_manager::{create_shared_analytics_manager, SharedAnalyticsManager};
pub use appeal_manager::{create_shared_appeal_manager, SharedAppealManager};
pub use moderation_manager::{create_shared_moderation_manager, SharedModerationManager};
pub use premium_manager::{
    create_shared_premium_manager, is_valid_tier, validate_tier, PremiumManager, RedeemedLicense,
    SharedPremiumManager, TIERS,
};
pub use session_manager::{create_shared_session_manager, SharedSessionManager};
pub use settings_manager::{create_shared_settings_manager, SharedSettingsManager};
pub use staff_manager::{create_shared_staff_manager, SharedStaffManager};
