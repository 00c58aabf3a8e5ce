//! Google Calendar adapters

pub mod client;
pub mod oauth;
pub mod types;
pub mod webhook;

pub use client::GoogleCalendarClient;
pub use oauth::GoogleOAuthClient;
pub use webhook::GoogleWebhookRegistrar;
