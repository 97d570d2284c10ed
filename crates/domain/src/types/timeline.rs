//! Timeline types shared by the relay read path and the client feed
//!
//! The relay flattens the upstream response (tweets plus `includes`
//! expansions) into this self-contained shape so consumers never join
//! against the raw upstream format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A page of the reverse-chronological home timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub tweets: Vec<Tweet>,
    /// Upstream pagination metadata, passed through verbatim
    #[serde(default)]
    pub meta: serde_json::Value,
}

/// A single tweet with its author and media resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub author: TweetAuthor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<TweetMetrics>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<TweetMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_annotations: Option<serde_json::Value>,
}

/// Author resolved from the upstream user expansion
///
/// All fields are optional because the expansion can be missing for a
/// given `author_id`; `verified` defaults to false in that case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TweetAuthor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

/// Engagement counters attached to a tweet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetMetrics {
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub quote_count: u64,
}

/// Media item resolved from the upstream media expansion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetMedia {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_key: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    //! Unit tests for timeline types.
    use super::*;

    /// Validates that a transformed timeline round-trips with defaulted
    /// optional fields.
    #[test]
    fn test_timeline_serialization() {
        let timeline = Timeline {
            tweets: vec![Tweet {
                id: "1".to_string(),
                text: "hello".to_string(),
                created_at: None,
                author: TweetAuthor {
                    id: Some("9".to_string()),
                    name: Some("Lark".to_string()),
                    username: Some("lark".to_string()),
                    profile_image_url: None,
                    verified: false,
                },
                metrics: Some(TweetMetrics { like_count: 3, ..TweetMetrics::default() }),
                media: vec![],
                entities: None,
                context_annotations: None,
            }],
            meta: serde_json::json!({"result_count": 1}),
        };

        let json = serde_json::to_string(&timeline).expect("serialize");
        let back: Timeline = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(back.tweets.len(), 1);
        assert_eq!(back.tweets[0].id, "1");
        assert_eq!(back.tweets[0].metrics.as_ref().map(|m| m.like_count), Some(3));
        assert_eq!(back.meta["result_count"], 1);
    }

    /// Validates the `type` field rename on media items.
    #[test]
    fn test_media_type_rename() {
        let media = TweetMedia {
            media_key: Some("m1".to_string()),
            kind: "photo".to_string(),
            url: Some("https://img.example/1.jpg".to_string()),
            preview_image_url: None,
        };

        let json = serde_json::to_string(&media).expect("serialize");
        assert!(json.contains("\"type\":\"photo\""));
    }
}
