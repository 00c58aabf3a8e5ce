//! Configuration structures
//!
//! Loaded by `calsync_infra::config` from environment variables or a
//! TOML/JSON file. Everything except the Google client credentials has a
//! default.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_PAGES, DEFAULT_SYNC_WINDOW_DAYS};

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    pub google: GoogleConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// SQLite database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "calsync.db".to_string(), pool_size: default_pool_size() }
    }
}

/// Google Calendar API and OAuth client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Public base URI of this service; OAuth redirects and webhook
    /// notifications are addressed relative to it.
    pub redirect_base_uri: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_authorization_url")]
    pub authorization_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Length of the window fetched when an account has no sync cursor
    #[serde(default = "default_sync_window_days")]
    pub sync_window_days: i64,
}

impl GoogleConfig {
    /// Settings pointing at the production Google endpoints.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_base_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_base_uri: redirect_base_uri.into(),
            api_base_url: default_api_base_url(),
            authorization_url: default_authorization_url(),
            token_url: default_token_url(),
            sync_window_days: default_sync_window_days(),
        }
    }
}

/// Synchronization and scheduling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Upper bound on pages fetched in one pass; `None` disables the cap
    #[serde(default = "default_max_pages")]
    pub max_pages: Option<u32>,
    #[serde(default = "default_scheduler_enabled")]
    pub scheduler_enabled: bool,
    /// Six-field cron expression (with seconds)
    #[serde(default = "default_cron_expression")]
    pub cron_expression: String,
    /// Timeout for one scheduled "sync every account" run
    #[serde(default = "default_job_timeout_seconds")]
    pub job_timeout_seconds: u64,
    /// Timeout for one webhook-triggered pass
    #[serde(default = "default_sync_timeout_seconds")]
    pub sync_timeout_seconds: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            scheduler_enabled: default_scheduler_enabled(),
            cron_expression: default_cron_expression(),
            job_timeout_seconds: default_job_timeout_seconds(),
            sync_timeout_seconds: default_sync_timeout_seconds(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:8080".to_string() }
    }
}

/// Log output settings (level comes from `RUST_LOG`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

fn default_pool_size() -> u32 {
    4
}

fn default_api_base_url() -> String {
    "https://www.googleapis.com/calendar/v3".to_string()
}

fn default_authorization_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_sync_window_days() -> i64 {
    DEFAULT_SYNC_WINDOW_DAYS
}

fn default_max_pages() -> Option<u32> {
    Some(DEFAULT_MAX_PAGES)
}

fn default_scheduler_enabled() -> bool {
    true
}

fn default_cron_expression() -> String {
    "0 */15 * * * *".to_string() // every 15 minutes
}

fn default_job_timeout_seconds() -> u64 {
    300
}

fn default_sync_timeout_seconds() -> u64 {
    60
}
