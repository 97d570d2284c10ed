//! HTTP client for the backend relay
//!
//! The trait abstracts the three relay calls the session manager and feed
//! depend on, enabling mock implementations in tests.

use async_trait::async_trait;
use larkwire_domain::{Identity, LarkwireError, Result, Timeline};
use serde::Deserialize;
use tracing::debug;

/// Response of the relay's `/start` endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct StartLogin {
    pub auth_url: String,
    pub state: String,
    pub code_challenge: String,
}

/// Relay operations used by the client session core
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Mint a fresh authorization attempt
    async fn start(&self) -> Result<StartLogin>;

    /// Forward-validate a bearer credential, returning the identity
    ///
    /// An upstream rejection surfaces as `LarkwireError::InvalidToken`.
    async fn verify(&self, access_token: &str) -> Result<Identity>;

    /// Fetch a page of the home timeline
    async fn timeline(
        &self,
        access_token: &str,
        max_results: u32,
        since_id: Option<&str>,
    ) -> Result<Timeline>;
}

/// reqwest-backed [`SessionApi`] implementation
#[derive(Debug, Clone)]
pub struct RelayApi {
    http: reqwest::Client,
    base_url: String,
}

impl RelayApi {
    /// Create a client for the relay at `base_url`
    ///
    /// # Errors
    /// Returns `LarkwireError::Internal` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| LarkwireError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url: base_url.into().trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl SessionApi for RelayApi {
    async fn start(&self) -> Result<StartLogin> {
        let response = self
            .http
            .get(format!("{}/start", self.base_url))
            .send()
            .await
            .map_err(|e| LarkwireError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LarkwireError::UpstreamStatus { status: status.as_u16(), body });
        }

        response
            .json()
            .await
            .map_err(|e| LarkwireError::Internal(format!("malformed start response: {e}")))
    }

    async fn verify(&self, access_token: &str) -> Result<Identity> {
        let response = self
            .http
            .get(format!("{}/verify", self.base_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| LarkwireError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            debug!("relay rejected bearer credential");
            return Err(LarkwireError::InvalidToken);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LarkwireError::UpstreamStatus { status: status.as_u16(), body });
        }

        response
            .json()
            .await
            .map_err(|e| LarkwireError::Internal(format!("malformed identity response: {e}")))
    }

    async fn timeline(
        &self,
        access_token: &str,
        max_results: u32,
        since_id: Option<&str>,
    ) -> Result<Timeline> {
        let mut url = format!("{}/timeline?max_results={max_results}", self.base_url);
        if let Some(since_id) = since_id {
            url.push_str(&format!("&since_id={}", urlencoding::encode(since_id)));
        }

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| LarkwireError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LarkwireError::InvalidToken);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LarkwireError::UpstreamStatus { status: status.as_u16(), body });
        }

        response
            .json()
            .await
            .map_err(|e| LarkwireError::Internal(format!("malformed timeline response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    //! Integration-style tests for the relay API client against a stub
    //! relay.
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    /// Validates `/start` response parsing.
    #[tokio::test]
    async fn test_start_parses_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/start"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "auth_url": "https://auth.example/authorize?state=abc",
                "state": "abc",
                "code_challenge": "xyz"
            })))
            .mount(&server)
            .await;

        let api = RelayApi::new(server.uri()).expect("api");
        let start = api.start().await.expect("start");

        assert_eq!(start.state, "abc");
        assert!(start.auth_url.contains("state=abc"));
    }

    /// Validates that a relay 401 maps to `InvalidToken`.
    #[tokio::test]
    async fn test_verify_maps_401_to_invalid_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/verify"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid token"))
            .mount(&server)
            .await;

        let api = RelayApi::new(server.uri()).expect("api");
        let result = api.verify("revoked").await;

        assert!(matches!(result, Err(LarkwireError::InvalidToken)));
    }

    /// Validates the bearer header and identity parsing on `/verify`.
    #[tokio::test]
    async fn test_verify_sends_bearer_and_parses_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/verify"))
            .and(header("authorization", "Bearer good-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "7",
                "username": "lark",
                "name": "Lark",
                "verified": false
            })))
            .mount(&server)
            .await;

        let api = RelayApi::new(server.uri()).expect("api");
        let identity = api.verify("good-token").await.expect("identity");

        assert_eq!(identity.username, "lark");
    }

    /// Validates timeline pagination parameters and status mirroring.
    #[tokio::test]
    async fn test_timeline_params_and_error_mirror() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/timeline"))
            .and(query_param("max_results", "25"))
            .and(query_param("since_id", "t9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tweets": [],
                "meta": {}
            })))
            .mount(&server)
            .await;

        let api = RelayApi::new(server.uri()).expect("api");
        let timeline = api.timeline("good-token", 25, Some("t9")).await.expect("timeline");
        assert!(timeline.tweets.is_empty());

        let rate_limited = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/timeline"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&rate_limited)
            .await;

        let api = RelayApi::new(rate_limited.uri()).expect("api");
        let result = api.timeline("good-token", 10, None).await;
        assert!(matches!(
            result,
            Err(LarkwireError::UpstreamStatus { status: 429, .. })
        ));
    }
}
