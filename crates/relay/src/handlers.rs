//! HTTP handlers for the relay endpoints

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::response::Html;
use axum::Json;
use larkwire_common::PkcePair;
use larkwire_domain::constants::DEFAULT_TIMELINE_PAGE_SIZE;
use larkwire_domain::{HandoffMessage, Identity, LarkwireError, Timeline};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handoff;
use crate::server::AppState;

/// Response body of `GET /start`
#[derive(Debug, Serialize, Deserialize)]
pub struct StartResponse {
    pub auth_url: String,
    pub state: String,
    pub code_challenge: String,
}

/// Query parameters accepted by `GET /timeline`
#[derive(Debug, Deserialize)]
pub struct TimelineParams {
    pub max_results: Option<u32>,
    pub since_id: Option<String>,
}

/// `GET /start` - mint a fresh authorization attempt
///
/// Each call produces an independent correlation entry; the verifier never
/// leaves the relay.
pub async fn start(State(app): State<AppState>) -> Result<Json<StartResponse>, ApiError> {
    let state = Uuid::new_v4().to_string();
    let pkce = PkcePair::generate()?;

    app.store.insert(state.clone(), pkce.code_verifier.clone()).await?;

    let auth_url = app.upstream.authorization_url(
        &app.config.client_id,
        &app.config.redirect_uri(),
        &state,
        &pkce.code_challenge,
    );

    info!(state = %state, "minted authorization attempt");

    Ok(Json(StartResponse { auth_url, state, code_challenge: pkce.code_challenge }))
}

/// `GET /callback` - consume the upstream redirect
///
/// Parameter validation happens before any store access; the correlation
/// entry is consumed atomically so a replayed `state` fails.
pub async fn callback(
    State(app): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let code = require_param(&params, "code")?;
    let state = require_param(&params, "state")?;

    let code_verifier = app
        .store
        .take(state)
        .await?
        .ok_or(LarkwireError::UnknownOrExpiredState)?;

    let grant = app
        .upstream
        .exchange_code(
            &app.config.client_id,
            &app.config.client_secret,
            code,
            &code_verifier,
            &app.config.redirect_uri(),
        )
        .await?;

    let identity =
        app.upstream.fetch_identity(&grant.access_token).await.map_err(|err| match err {
            LarkwireError::UpstreamStatus { body, .. } => LarkwireError::IdentityFetchFailed(body),
            other => other,
        })?;

    info!(username = %identity.username, "authorization completed, handing off credential");

    let message = HandoffMessage::Success {
        access_token: grant.access_token,
        refresh_token: grant.refresh_token,
        identity,
    };

    Ok(Html(handoff::render(&message)?))
}

/// `GET /verify` - forward-validate a bearer credential
///
/// The header is checked before any network call; an upstream rejection
/// maps to `InvalidToken`.
pub async fn verify(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Identity>, ApiError> {
    let token = bearer_token(&headers)?;

    let identity = app.upstream.fetch_identity(token).await.map_err(|err| match err {
        LarkwireError::UpstreamStatus { status, .. } => {
            debug!(status, "upstream rejected bearer token");
            LarkwireError::InvalidToken
        }
        other => other,
    })?;

    Ok(Json(identity))
}

/// `GET /timeline` - authenticated timeline pass-through
///
/// Upstream failures mirror the upstream status to the caller.
pub async fn timeline(
    State(app): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<TimelineParams>,
) -> Result<Json<Timeline>, ApiError> {
    let token = bearer_token(&headers)?;

    let timeline = app
        .upstream
        .fetch_timeline(
            token,
            params.max_results.unwrap_or(DEFAULT_TIMELINE_PAGE_SIZE),
            params.since_id.as_deref(),
        )
        .await?;

    Ok(Json(timeline))
}

fn require_param<'a>(
    params: &'a HashMap<String, String>,
    name: &str,
) -> Result<&'a str, ApiError> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError(LarkwireError::MissingParameter(name.to_string())))
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or(ApiError(LarkwireError::Unauthorized))
}

#[cfg(test)]
mod tests {
    //! Unit tests for handler helpers.
    use axum::http::HeaderValue;

    use super::*;

    /// Validates bearer extraction across well-formed and malformed headers.
    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers).map(|t| t.to_string()).ok(), Some("abc123".to_string()));
    }

    /// Validates required-parameter extraction treats empty values as missing.
    #[test]
    fn test_require_param() {
        let mut params = HashMap::new();
        assert!(require_param(&params, "code").is_err());

        params.insert("code".to_string(), String::new());
        assert!(require_param(&params, "code").is_err());

        params.insert("code".to_string(), "abc".to_string());
        assert_eq!(require_param(&params, "code").map(str::to_string).ok(), Some("abc".to_string()));
    }
}
