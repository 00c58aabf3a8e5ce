//! Google OAuth2 client: authorization URL, code exchange and access-token
//! refresh with an in-memory cache.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use calsync_core::AuthorizationProvider;
use calsync_domain::constants::ACCESS_TOKEN_REFRESH_THRESHOLD_SECS;
use calsync_domain::{CalSyncError, CalendarAccount, GoogleConfig, Result};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use super::types::{IdTokenClaims, TokenResponse};

const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const SCOPES: [&str; 4] = [CALENDAR_SCOPE, "openid", "profile", "email"];
const CALLBACK_PATH: &str = "/google-calendar/authorization/callback";

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now > Duration::seconds(ACCESS_TOKEN_REFRESH_THRESHOLD_SECS)
    }
}

/// OAuth client for Google accounts
pub struct GoogleOAuthClient {
    http: Client,
    config: GoogleConfig,
    tokens: Mutex<HashMap<String, CachedToken>>,
}

impl GoogleOAuthClient {
    pub fn new(http: Client, config: GoogleConfig) -> Self {
        Self { http, config, tokens: Mutex::new(HashMap::new()) }
    }

    /// Redirect URI registered with Google for the authorization callback.
    pub fn redirect_uri(&self) -> String {
        format!("{}{CALLBACK_PATH}", self.config.redirect_base_uri.trim_end_matches('/'))
    }

    /// Return a valid access token for `account`, refreshing it from the
    /// refresh token when the cached one expires within five minutes.
    #[instrument(skip(self, account), fields(account_id = %account.account_id))]
    pub async fn access_token(&self, account: &CalendarAccount) -> Result<String> {
        let now = Utc::now();
        let cached = self
            .tokens
            .lock()
            .get(&account.account_id)
            .filter(|token| token.is_fresh(now))
            .map(|token| token.access_token.clone());
        if let Some(access_token) = cached {
            return Ok(access_token);
        }

        if account.refresh_token.is_empty() {
            return Err(CalSyncError::Auth(format!(
                "no refresh token stored for account {}",
                account.account_id
            )));
        }

        let response = self
            .request_token(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", account.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .await?;

        debug!(expires_in = response.expires_in, "access token refreshed");
        Ok(self.cache(&account.account_id, response.access_token, response.expires_in))
    }

    /// Drop the cached access token of an account.
    pub fn invalidate(&self, account_id: &str) {
        self.tokens.lock().remove(account_id);
    }

    fn cache(&self, account_id: &str, access_token: String, expires_in: i64) -> String {
        let expires_at = Utc::now() + Duration::seconds(expires_in);
        self.tokens
            .lock()
            .insert(account_id.to_string(), CachedToken { access_token: access_token.clone(), expires_at });
        access_token
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| CalSyncError::Auth(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CalSyncError::Auth(format!("token endpoint returned {status}: {error_text}")));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| CalSyncError::Auth(format!("failed to parse token response: {e}")))
    }
}

#[async_trait]
impl AuthorizationProvider for GoogleOAuthClient {
    fn authorization_url(&self) -> Result<String> {
        let redirect_uri = self.redirect_uri();
        let scope = SCOPES.join(" ");
        let url = Url::parse_with_params(
            &self.config.authorization_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| CalSyncError::Config(format!("invalid authorization endpoint: {e}")))?;
        Ok(url.into())
    }

    #[instrument(skip(self, code))]
    async fn authorize(&self, code: &str) -> Result<CalendarAccount> {
        let redirect_uri = self.redirect_uri();
        let response = self
            .request_token(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .await?;

        let id_token = response
            .id_token
            .as_deref()
            .ok_or_else(|| CalSyncError::Auth("token response carried no ID token".into()))?;
        let claims = decode_id_token(id_token)?;
        let refresh_token = response.refresh_token.clone().ok_or_else(|| {
            CalSyncError::Auth("no refresh token issued; offline access was not granted".into())
        })?;
        let email = claims
            .email
            .ok_or_else(|| CalSyncError::Auth("email claim missing from ID token".into()))?;

        self.cache(&claims.sub, response.access_token, response.expires_in);
        info!(account_id = %claims.sub, "authorization code exchanged");
        Ok(CalendarAccount::new(claims.sub, email, refresh_token))
    }
}

/// Read the identity claims from an ID token (JWT) payload.
///
/// The token comes straight from the token endpoint over TLS, so the
/// signature is not verified here.
pub fn decode_id_token(id_token: &str) -> Result<IdTokenClaims> {
    let parts: Vec<&str> = id_token.split('.').collect();
    if parts.len() != 3 {
        return Err(CalSyncError::Auth("invalid ID token format".into()));
    }

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|err| CalSyncError::Auth(format!("failed to decode ID token payload: {err}")))?;

    serde_json::from_slice(&payload_bytes)
        .map_err(|err| CalSyncError::Auth(format!("failed to parse ID token payload: {err}")))
}
