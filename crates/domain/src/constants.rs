//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! authorization flow.

// Authorization request parameters
pub const AUTH_SCOPES: &str = "tweet.read users.read offline.access";
pub const IDENTITY_USER_FIELDS: &str = "profile_image_url,verified";

// Correlation store lifecycle
pub const CORRELATION_TTL_SECS: u64 = 600;
pub const CORRELATION_SWEEP_INTERVAL_SECS: u64 = 60;

// Client login attempt lifecycle
pub const LOGIN_TIMEOUT_SECS: u64 = 300;
pub const POPUP_POLL_INTERVAL_MS: u64 = 1000;
pub const POPUP_CLOSE_GRACE_MS: u64 = 1000;

// Durable client-side credential storage
pub const KEYCHAIN_SERVICE: &str = "Larkwire";
pub const CREDENTIAL_ACCOUNT: &str = "main";

// Timeline read path
pub const DEFAULT_TIMELINE_PAGE_SIZE: u32 = 10;
pub const FEED_CAPACITY: usize = 200;
