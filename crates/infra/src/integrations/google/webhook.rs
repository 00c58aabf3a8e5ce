//! Google push-notification channel registration.

use std::sync::Arc;

use async_trait::async_trait;
use calsync_core::WebhookRegistrar;
use calsync_domain::constants::{PRIMARY_CALENDAR_ID, WEBHOOK_CHANNEL_LIFETIME_DAYS};
use calsync_domain::{CalSyncError, CalendarAccount, GoogleConfig, Result, WebhookChannel};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use tracing::{info, instrument};
use uuid::Uuid;

use super::oauth::GoogleOAuthClient;
use super::types::{WatchRequest, WatchResponse};
use crate::errors::conversions::map_http_error;

/// Registers `web_hook` channels pointing at this service's update route
pub struct GoogleWebhookRegistrar {
    http: Client,
    oauth: Arc<GoogleOAuthClient>,
    api_base_url: String,
    redirect_base_uri: String,
}

impl GoogleWebhookRegistrar {
    pub fn new(http: Client, oauth: Arc<GoogleOAuthClient>, config: &GoogleConfig) -> Self {
        Self {
            http,
            oauth,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            redirect_base_uri: config.redirect_base_uri.trim_end_matches('/').to_string(),
        }
    }

    /// Notification address for an account.
    pub fn callback_address(&self, account_id: &str) -> String {
        format!("{}/google-calendar/{account_id}/events/update", self.redirect_base_uri)
    }
}

#[async_trait]
impl WebhookRegistrar for GoogleWebhookRegistrar {
    #[instrument(skip(self, account), fields(account_id = %account.account_id))]
    async fn register_webhook(&self, account: &CalendarAccount) -> Result<WebhookChannel> {
        let access_token = self.oauth.access_token(account).await?;
        let requested_expiry = Utc::now() + Duration::days(WEBHOOK_CHANNEL_LIFETIME_DAYS);
        let request = WatchRequest {
            id: Uuid::new_v4().to_string(),
            kind: "web_hook".to_string(),
            address: self.callback_address(&account.account_id),
            expiration: requested_expiry.timestamp_millis(),
        };

        let response = self
            .http
            .post(format!("{}/calendars/{PRIMARY_CALENDAR_ID}/events/watch", self.api_base_url))
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CalSyncError::RemoteFetch(format!(
                "watch request failed ({status}): {error_text}"
            )));
        }

        let body: WatchResponse = response
            .json()
            .await
            .map_err(|e| CalSyncError::RemoteFetch(format!("Failed to parse watch response: {e}")))?;

        // Google may shorten the requested lifetime.
        let expires_at = body
            .expiration
            .and_then(|ms| ms.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or(requested_expiry);

        info!(channel_id = %body.id, %expires_at, "push channel created");
        Ok(WebhookChannel { channel_id: body.id, address: request.address, expires_at })
    }
}
