//! Upstream OAuth and resource API client
//!
//! Thin reqwest wrapper around the three upstream endpoints the relay
//! depends on: the token endpoint (Basic-authenticated code exchange), the
//! identity endpoint, and the reverse-chronological timeline endpoint.
//! Base URLs are injectable so tests can point the client at a stub
//! server.

use chrono::{DateTime, Utc};
use larkwire_domain::constants::{AUTH_SCOPES, IDENTITY_USER_FIELDS};
use larkwire_domain::{
    Identity, LarkwireError, Result, Timeline, Tweet, TweetAuthor, TweetMedia, TweetMetrics,
};
use serde::Deserialize;
use tracing::debug;

const TIMELINE_TWEET_FIELDS: &str =
    "created_at,author_id,public_metrics,context_annotations,entities";
const TIMELINE_USER_FIELDS: &str = "name,username,profile_image_url,verified";
const TIMELINE_EXPANSIONS: &str = "author_id,attachments.media_keys";
const TIMELINE_MEDIA_FIELDS: &str = "type,url,preview_image_url";

/// Token grant returned by the upstream token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Client for the upstream authorization server and resource API
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    auth_url: String,
    api_base: String,
}

impl UpstreamClient {
    /// Create a client for the given upstream endpoints
    ///
    /// # Errors
    /// Returns `LarkwireError::Internal` if the HTTP client cannot be built.
    pub fn new(auth_url: impl Into<String>, api_base: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| LarkwireError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            auth_url: auth_url.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build the upstream authorization page URL for one attempt
    #[must_use]
    pub fn authorization_url(
        &self,
        client_id: &str,
        redirect_uri: &str,
        state: &str,
        code_challenge: &str,
    ) -> String {
        let params = [
            ("response_type", "code"),
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("scope", AUTH_SCOPES),
            ("state", state),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
        ];

        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.auth_url, query)
    }

    /// Exchange an authorization code for a token grant
    ///
    /// The relay authenticates itself as a confidential client via HTTP
    /// Basic; the PKCE verifier binds the exchange to the original attempt.
    ///
    /// # Errors
    /// - `TokenExchangeFailed` with the upstream body on a non-success
    ///   response
    /// - `UpstreamUnavailable` on a network-level failure
    pub async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<TokenGrant> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("code_verifier", code_verifier),
        ];

        let response = self
            .http
            .post(format!("{}/2/oauth2/token", self.api_base))
            .basic_auth(client_id, Some(client_secret))
            .form(&form)
            .send()
            .await
            .map_err(|e| LarkwireError::UpstreamUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LarkwireError::TokenExchangeFailed(body));
        }

        response
            .json::<TokenGrant>()
            .await
            .map_err(|e| LarkwireError::TokenExchangeFailed(format!("malformed grant: {e}")))
    }

    /// Fetch the identity profile for a bearer token
    ///
    /// # Errors
    /// - `UpstreamStatus` carrying the upstream status/body on rejection
    ///   (callers map this to `IdentityFetchFailed` or `InvalidToken`
    ///   depending on context)
    /// - `UpstreamUnavailable` on a network-level failure
    pub async fn fetch_identity(&self, access_token: &str) -> Result<Identity> {
        let url = format!(
            "{}/2/users/me?user.fields={}",
            self.api_base,
            urlencoding::encode(IDENTITY_USER_FIELDS)
        );

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| LarkwireError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LarkwireError::UpstreamStatus { status: status.as_u16(), body });
        }

        let envelope: UserEnvelope = response
            .json()
            .await
            .map_err(|e| LarkwireError::Internal(format!("malformed identity body: {e}")))?;

        Ok(envelope.data)
    }

    /// Fetch and flatten a page of the reverse-chronological timeline
    ///
    /// # Errors
    /// - `UpstreamStatus` mirroring the upstream status/body on rejection
    /// - `UpstreamUnavailable` on a network-level failure
    pub async fn fetch_timeline(
        &self,
        access_token: &str,
        max_results: u32,
        since_id: Option<&str>,
    ) -> Result<Timeline> {
        let max_results = max_results.to_string();
        let mut params = vec![
            ("max_results", max_results.as_str()),
            ("tweet.fields", TIMELINE_TWEET_FIELDS),
            ("user.fields", TIMELINE_USER_FIELDS),
            ("expansions", TIMELINE_EXPANSIONS),
            ("media.fields", TIMELINE_MEDIA_FIELDS),
        ];
        if let Some(since_id) = since_id {
            params.push(("since_id", since_id));
        }

        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let url =
            format!("{}/2/users/me/timelines/reverse_chronological?{}", self.api_base, query);

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| LarkwireError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LarkwireError::UpstreamStatus { status: status.as_u16(), body });
        }

        let raw: RawTimeline = response
            .json()
            .await
            .map_err(|e| LarkwireError::Internal(format!("malformed timeline body: {e}")))?;

        debug!(tweets = raw.data.len(), "fetched upstream timeline page");
        Ok(flatten_timeline(raw))
    }
}

#[derive(Deserialize)]
struct UserEnvelope {
    data: Identity,
}

// Raw upstream timeline shapes; flattened before leaving this module.

#[derive(Debug, Deserialize)]
struct RawTimeline {
    #[serde(default)]
    data: Vec<RawTweet>,
    #[serde(default)]
    includes: RawIncludes,
    #[serde(default)]
    meta: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct RawIncludes {
    #[serde(default)]
    users: Vec<RawUser>,
    #[serde(default)]
    media: Vec<RawMedia>,
}

#[derive(Debug, Deserialize)]
struct RawTweet {
    id: String,
    text: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    author_id: Option<String>,
    #[serde(default)]
    public_metrics: Option<TweetMetrics>,
    #[serde(default)]
    attachments: Option<RawAttachments>,
    #[serde(default)]
    entities: Option<serde_json::Value>,
    #[serde(default)]
    context_annotations: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAttachments {
    #[serde(default)]
    media_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawUser {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    profile_image_url: Option<String>,
    #[serde(default)]
    verified: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct RawMedia {
    #[serde(default)]
    media_key: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    preview_image_url: Option<String>,
}

/// Join tweets against the user/media expansions into self-contained rows
fn flatten_timeline(raw: RawTimeline) -> Timeline {
    let tweets = raw
        .data
        .into_iter()
        .map(|tweet| {
            let author = tweet
                .author_id
                .as_deref()
                .and_then(|id| raw.includes.users.iter().find(|user| user.id == id))
                .map(|user| TweetAuthor {
                    id: Some(user.id.clone()),
                    name: user.name.clone(),
                    username: user.username.clone(),
                    profile_image_url: user.profile_image_url.clone(),
                    verified: user.verified,
                })
                .unwrap_or_default();

            let media = tweet
                .attachments
                .as_ref()
                .map(|attachments| {
                    attachments
                        .media_keys
                        .iter()
                        .filter_map(|key| {
                            raw.includes
                                .media
                                .iter()
                                .find(|media| media.media_key.as_deref() == Some(key))
                        })
                        .map(|media| TweetMedia {
                            media_key: media.media_key.clone(),
                            kind: media.kind.clone(),
                            url: media.url.clone(),
                            preview_image_url: media.preview_image_url.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default();

            Tweet {
                id: tweet.id,
                text: tweet.text,
                created_at: tweet.created_at,
                author,
                metrics: tweet.public_metrics,
                media,
                entities: tweet.entities,
                context_annotations: tweet.context_annotations,
            }
        })
        .collect();

    Timeline { tweets, meta: raw.meta }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the upstream client.
    use super::*;

    fn client() -> UpstreamClient {
        UpstreamClient::new("https://auth.example/authorize", "https://api.example")
            .expect("client")
    }

    /// Validates the authorization URL carries every required parameter.
    #[test]
    fn test_authorization_url_parameters() {
        let url = client().authorization_url(
            "client123",
            "https://relay.example/callback",
            "state-abc",
            "challenge-xyz",
        );

        assert!(url.starts_with("https://auth.example/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client123"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Frelay.example%2Fcallback"));
        assert!(url.contains("scope=tweet.read%20users.read%20offline.access"));
        assert!(url.contains("state=state-abc"));
        assert!(url.contains("code_challenge=challenge-xyz"));
        assert!(url.contains("code_challenge_method=S256"));
    }

    /// Validates the author and media joins in the timeline flattening.
    #[test]
    fn test_flatten_timeline_joins() {
        let raw: RawTimeline = serde_json::from_value(serde_json::json!({
            "data": [
                {
                    "id": "t1",
                    "text": "first",
                    "author_id": "u1",
                    "public_metrics": {"retweet_count": 1, "reply_count": 2, "like_count": 3, "quote_count": 0},
                    "attachments": {"media_keys": ["m1", "missing"]}
                },
                {"id": "t2", "text": "orphaned author", "author_id": "unknown"}
            ],
            "includes": {
                "users": [{"id": "u1", "name": "Lark", "username": "lark", "verified": true}],
                "media": [{"media_key": "m1", "type": "photo", "url": "https://img.example/1.jpg"}]
            },
            "meta": {"result_count": 2, "newest_id": "t1"}
        }))
        .expect("fixture");

        let timeline = flatten_timeline(raw);

        assert_eq!(timeline.tweets.len(), 2);

        let first = &timeline.tweets[0];
        assert_eq!(first.author.username.as_deref(), Some("lark"));
        assert!(first.author.verified);
        assert_eq!(first.metrics.as_ref().map(|m| m.like_count), Some(3));
        assert_eq!(first.media.len(), 1);
        assert_eq!(first.media[0].kind, "photo");

        // Unresolvable author degrades to an empty author, not an error.
        let second = &timeline.tweets[1];
        assert!(second.author.username.is_none());
        assert!(!second.author.verified);

        assert_eq!(timeline.meta["newest_id"], "t1");
    }

    /// Validates that an empty upstream body flattens to an empty page.
    #[test]
    fn test_flatten_empty_timeline() {
        let raw: RawTimeline = serde_json::from_value(serde_json::json!({})).expect("fixture");
        let timeline = flatten_timeline(raw);

        assert!(timeline.tweets.is_empty());
        assert!(timeline.meta.is_null() || timeline.meta.as_object().is_some());
    }
}
