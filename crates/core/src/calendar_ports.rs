//! Calendar provider port interfaces for authorization and push
//! notifications.

use async_trait::async_trait;
use calsync_domain::{CalendarAccount, Result, WebhookChannel};

/// Trait for the provider's OAuth authorization flow
#[async_trait]
pub trait AuthorizationProvider: Send + Sync {
    /// Build the URL the user opens to grant calendar access
    fn authorization_url(&self) -> Result<String>;

    /// Exchange an authorization code for a freshly authorized account
    async fn authorize(&self, code: &str) -> Result<CalendarAccount>;
}

/// Trait for registering change-notification channels with the provider
#[async_trait]
pub trait WebhookRegistrar: Send + Sync {
    /// Register a push channel for the account's primary calendar
    async fn register_webhook(&self, account: &CalendarAccount) -> Result<WebhookChannel>;
}
