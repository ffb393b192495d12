use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let data_url = require("STOREMAP_DATA_URL")?;
    let data_url = data_url.trim().trim_end_matches('/').to_string();
    if !(data_url.starts_with("http://") || data_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "STOREMAP_DATA_URL".to_string(),
            reason: format!("expected an http(s) URL, got \"{data_url}\""),
        });
    }

    let boundaries_url = lookup("STOREMAP_BOUNDARIES_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| format!("{data_url}/static/boundaries.geojson"));

    let env = parse_environment(&or_default("STOREMAP_ENV", "development"))?;
    let bind_addr = parse_addr("STOREMAP_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("STOREMAP_LOG_LEVEL", "info");
    let map_style_path = PathBuf::from(or_default(
        "STOREMAP_MAP_STYLE_PATH",
        "./config/map.yaml",
    ));

    let request_timeout_secs = parse_u64("STOREMAP_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("STOREMAP_USER_AGENT", "storemap/0.1 (retail-dashboard)");
    let max_retries = parse_u32("STOREMAP_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("STOREMAP_RETRY_BACKOFF_BASE_MS", "500")?;

    let refresh_cron = or_default("STOREMAP_REFRESH_CRON", "0 */15 * * * *");
    if refresh_cron.split_whitespace().count() < 6 {
        return Err(ConfigError::InvalidEnvVar {
            var: "STOREMAP_REFRESH_CRON".to_string(),
            reason: "expected a six-field cron expression (seconds first)".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        data_url,
        boundaries_url,
        map_style_path,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        refresh_cron,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOREMAP_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
