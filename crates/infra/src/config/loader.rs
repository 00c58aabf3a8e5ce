//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required ones are missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Required:
//! - `CALSYNC_GOOGLE_CLIENT_ID`, `CALSYNC_GOOGLE_CLIENT_SECRET`: OAuth client
//! - `CALSYNC_REDIRECT_BASE_URI`: public base URI of this service
//!
//! Optional (defaults in `calsync_domain::config`):
//! - `CALSYNC_DB_PATH`, `CALSYNC_DB_POOL_SIZE`
//! - `CALSYNC_GOOGLE_API_BASE_URL`, `CALSYNC_GOOGLE_AUTHORIZATION_URL`,
//!   `CALSYNC_GOOGLE_TOKEN_URL`, `CALSYNC_SYNC_WINDOW_DAYS`
//! - `CALSYNC_MAX_PAGES` (`0` disables the page cap)
//! - `CALSYNC_SCHEDULER_ENABLED`, `CALSYNC_SYNC_CRON`,
//!   `CALSYNC_JOB_TIMEOUT_SECONDS`, `CALSYNC_SYNC_TIMEOUT_SECONDS`
//! - `CALSYNC_BIND_ADDRESS`, `CALSYNC_LOG_JSON`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}` and `./calsync.{json,toml}` (current directory)
//! 2. `../config.{json,toml}`
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use calsync_domain::constants::MAX_SYNC_WINDOW_DAYS;
use calsync_domain::{CalSyncError, Config, GoogleConfig, Result};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `CalSyncError::Config` if configuration cannot be loaded from
/// either source or a value is invalid.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `CalSyncError::Config` if a required variable is missing or an
/// optional one has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut google = GoogleConfig::new(
        env_var("CALSYNC_GOOGLE_CLIENT_ID")?,
        env_var("CALSYNC_GOOGLE_CLIENT_SECRET")?,
        env_var("CALSYNC_REDIRECT_BASE_URI")?,
    );
    override_string(&mut google.api_base_url, "CALSYNC_GOOGLE_API_BASE_URL");
    override_string(&mut google.authorization_url, "CALSYNC_GOOGLE_AUTHORIZATION_URL");
    override_string(&mut google.token_url, "CALSYNC_GOOGLE_TOKEN_URL");
    override_parsed(&mut google.sync_window_days, "CALSYNC_SYNC_WINDOW_DAYS")?;

    let mut config = Config {
        database: Default::default(),
        google,
        sync: Default::default(),
        server: Default::default(),
        logging: Default::default(),
    };

    override_string(&mut config.database.path, "CALSYNC_DB_PATH");
    override_parsed(&mut config.database.pool_size, "CALSYNC_DB_POOL_SIZE")?;

    if let Some(max_pages) = env_parsed::<u32>("CALSYNC_MAX_PAGES")? {
        config.sync.max_pages = Some(max_pages);
    }
    config.sync.scheduler_enabled = env_bool("CALSYNC_SCHEDULER_ENABLED", config.sync.scheduler_enabled);
    override_string(&mut config.sync.cron_expression, "CALSYNC_SYNC_CRON");
    override_parsed(&mut config.sync.job_timeout_seconds, "CALSYNC_JOB_TIMEOUT_SECONDS")?;
    override_parsed(&mut config.sync.sync_timeout_seconds, "CALSYNC_SYNC_TIMEOUT_SECONDS")?;

    override_string(&mut config.server.bind_address, "CALSYNC_BIND_ADDRESS");
    config.logging.json = env_bool("CALSYNC_LOG_JSON", config.logging.json);

    normalize(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Format is detected by file extension.
///
/// # Errors
/// Returns `CalSyncError::Config` if the file is missing, unreadable or
/// invalid.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CalSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CalSyncError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CalSyncError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path).and_then(normalize)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CalSyncError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CalSyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(CalSyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Apply cross-field rules shared by both sources.
fn normalize(mut config: Config) -> Result<Config> {
    if config.sync.max_pages == Some(0) {
        config.sync.max_pages = None;
    }
    if config.google.sync_window_days <= 0 {
        return Err(CalSyncError::Config("sync_window_days must be positive".to_string()));
    }
    if config.google.sync_window_days > MAX_SYNC_WINDOW_DAYS {
        return Err(CalSyncError::Config(format!(
            "sync_window_days must not exceed {MAX_SYNC_WINDOW_DAYS}"
        )));
    }
    if config.google.redirect_base_uri.trim().is_empty() {
        return Err(CalSyncError::Config("redirect_base_uri must not be empty".to_string()));
    }
    Ok(config)
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["config.json", "config.toml", "calsync.json", "calsync.toml"];
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(NAMES.iter().map(|name| cwd.join(name)));
        candidates.push(cwd.join("../config.json"));
        candidates.push(cwd.join("../config.toml"));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| CalSyncError::Config(format!("Missing required environment variable: {key}")))
}

fn env_parsed<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| CalSyncError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

fn override_parsed<T: FromStr>(target: &mut T, key: &str) -> Result<()>
where
    T::Err: std::fmt::Display,
{
    if let Some(value) = env_parsed(key)? {
        *target = value;
    }
    Ok(())
}

fn override_string(target: &mut String, key: &str) {
    if let Ok(value) = std::env::var(key) {
        *target = value;
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;
    use tempfile::NamedTempFile;

    use super::*;

    const REQUIRED: [(&str, &str); 3] = [
        ("CALSYNC_GOOGLE_CLIENT_ID", "client-id"),
        ("CALSYNC_GOOGLE_CLIENT_SECRET", "client-secret"),
        ("CALSYNC_REDIRECT_BASE_URI", "https://calsync.example.com"),
    ];

    const OPTIONAL: [&str; 10] = [
        "CALSYNC_DB_PATH",
        "CALSYNC_DB_POOL_SIZE",
        "CALSYNC_MAX_PAGES",
        "CALSYNC_SCHEDULER_ENABLED",
        "CALSYNC_SYNC_CRON",
        "CALSYNC_SYNC_WINDOW_DAYS",
        "CALSYNC_SYNC_TIMEOUT_SECONDS",
        "CALSYNC_GOOGLE_API_BASE_URL",
        "CALSYNC_BIND_ADDRESS",
        "CALSYNC_LOG_JSON",
    ];

    fn clear_env() {
        for (key, _) in REQUIRED {
            std::env::remove_var(key);
        }
        for key in OPTIONAL {
            std::env::remove_var(key);
        }
    }

    fn set_required() {
        for (key, value) in REQUIRED {
            std::env::set_var(key, value);
        }
    }

    fn temp_config(contents: &str, extension: &str) -> (NamedTempFile, PathBuf) {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        (temp_file, path)
    }

    #[test]
    #[serial]
    fn test_env_bool_parsing() {
        std::env::set_var("CALSYNC_TEST_BOOL", "YES");
        assert!(env_bool("CALSYNC_TEST_BOOL", false));
        std::env::set_var("CALSYNC_TEST_BOOL", "off");
        assert!(!env_bool("CALSYNC_TEST_BOOL", true));
        std::env::remove_var("CALSYNC_TEST_BOOL");
        assert!(env_bool("CALSYNC_TEST_BOOL", true));
    }

    #[test]
    #[serial]
    fn test_load_from_env_with_defaults() {
        clear_env();
        set_required();

        let config = load_from_env().expect("config from env");

        assert_eq!(config.google.client_id, "client-id");
        assert_eq!(config.database.path, "calsync.db");
        assert_eq!(config.sync.max_pages, Some(1000));
        assert!(config.sync.scheduler_enabled);
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_from_env_overrides() {
        clear_env();
        set_required();
        std::env::set_var("CALSYNC_DB_PATH", "/tmp/calsync-test.db");
        std::env::set_var("CALSYNC_DB_POOL_SIZE", "8");
        std::env::set_var("CALSYNC_MAX_PAGES", "0");
        std::env::set_var("CALSYNC_SCHEDULER_ENABLED", "false");
        std::env::set_var("CALSYNC_SYNC_CRON", "0 0 * * * *");
        std::env::set_var("CALSYNC_GOOGLE_API_BASE_URL", "http://127.0.0.1:9999");
        std::env::set_var("CALSYNC_LOG_JSON", "1");

        let config = load_from_env().expect("config from env");

        assert_eq!(config.database.path, "/tmp/calsync-test.db");
        assert_eq!(config.database.pool_size, 8);
        assert_eq!(config.sync.max_pages, None);
        assert!(!config.sync.scheduler_enabled);
        assert_eq!(config.sync.cron_expression, "0 0 * * * *");
        assert_eq!(config.google.api_base_url, "http://127.0.0.1:9999");
        assert!(config.logging.json);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_from_env_missing_required() {
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, CalSyncError::Config(msg) if msg.contains("CALSYNC_GOOGLE_CLIENT_ID")));
    }

    #[test]
    #[serial]
    fn test_load_from_env_invalid_number() {
        clear_env();
        set_required();
        std::env::set_var("CALSYNC_DB_POOL_SIZE", "many");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, CalSyncError::Config(_)));

        clear_env();
    }

    #[test]
    fn test_load_from_file_toml() {
        let (_guard, path) = temp_config(
            r#"
[database]
path = "events.db"
pool_size = 2

[google]
client_id = "id"
client_secret = "secret"
redirect_base_uri = "https://calsync.example.com"
sync_window_days = 14

[sync]
max_pages = 50
scheduler_enabled = false
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).expect("toml config");
        assert_eq!(config.database.path, "events.db");
        assert_eq!(config.google.sync_window_days, 14);
        assert_eq!(config.sync.max_pages, Some(50));
        assert!(!config.sync.scheduler_enabled);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_json() {
        let (_guard, path) = temp_config(
            r#"{
                "google": {
                    "client_id": "id",
                    "client_secret": "secret",
                    "redirect_base_uri": "https://calsync.example.com"
                },
                "sync": { "max_pages": 0 },
                "logging": { "json": true }
            }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).expect("json config");
        assert_eq!(config.sync.max_pages, None);
        assert!(config.logging.json);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/config.json"))).unwrap_err();
        assert!(matches!(err, CalSyncError::Config(_)));
    }

    #[test]
    fn test_non_positive_window_is_rejected() {
        let (_guard, path) = temp_config(
            r#"
[google]
client_id = "id"
client_secret = "secret"
redirect_base_uri = "https://calsync.example.com"
sync_window_days = 0
"#,
            "toml",
        );

        assert!(load_from_file(Some(path.clone())).is_err());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_oversized_window_is_rejected() {
        let (_guard, path) = temp_config(
            r#"
[google]
client_id = "id"
client_secret = "secret"
redirect_base_uri = "https://calsync.example.com"
sync_window_days = 9223372036854775807
"#,
            "toml",
        );

        let err = load_from_file(Some(path.clone())).unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", &PathBuf::from("test.yaml"));
        assert!(result.is_err());
    }
}
