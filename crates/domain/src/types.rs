//! Common data types used throughout the application

pub mod identity;
pub mod session;
pub mod timeline;

pub use identity::Identity;
pub use session::{AuthSessionState, Credential, HandoffMessage};
pub use timeline::{Timeline, Tweet, TweetAuthor, TweetMedia, TweetMetrics};
