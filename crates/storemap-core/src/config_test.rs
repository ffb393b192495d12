use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("STOREMAP_DATA_URL", "http://localhost:8000/");
    m
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "STOREMAP_ENV"));
}

#[test]
fn build_app_config_fails_without_data_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "STOREMAP_DATA_URL"),
        "expected MissingEnvVar(STOREMAP_DATA_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_data_url_as_missing() {
    let mut map = HashMap::new();
    map.insert("STOREMAP_DATA_URL", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_rejects_non_http_data_url() {
    let mut map = HashMap::new();
    map.insert("STOREMAP_DATA_URL", "ftp://example.com");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREMAP_DATA_URL"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("STOREMAP_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREMAP_BIND_ADDR"),
        "expected InvalidEnvVar(STOREMAP_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_all_required_vars() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.data_url, "http://localhost:8000");
    assert_eq!(
        cfg.boundaries_url,
        "http://localhost:8000/static/boundaries.geojson"
    );
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.map_style_path.to_str(), Some("./config/map.yaml"));
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "storemap/0.1 (retail-dashboard)");
    assert_eq!(cfg.max_retries, 3);
    assert_eq!(cfg.retry_backoff_base_ms, 500);
    assert_eq!(cfg.refresh_cron, "0 */15 * * * *");
}

#[test]
fn boundaries_url_override() {
    let mut map = full_env();
    map.insert(
        "STOREMAP_BOUNDARIES_URL",
        "https://cdn.example.com/kosovo.geojson",
    );
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.boundaries_url, "https://cdn.example.com/kosovo.geojson");
}

#[test]
fn request_timeout_secs_override() {
    let mut map = full_env();
    map.insert("STOREMAP_REQUEST_TIMEOUT_SECS", "60");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.request_timeout_secs, 60);
}

#[test]
fn request_timeout_secs_invalid() {
    let mut map = full_env();
    map.insert("STOREMAP_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREMAP_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(STOREMAP_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn max_retries_override() {
    let mut map = full_env();
    map.insert("STOREMAP_MAX_RETRIES", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_retries, 0);
}

#[test]
fn max_retries_invalid() {
    let mut map = full_env();
    map.insert("STOREMAP_MAX_RETRIES", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREMAP_MAX_RETRIES")
    );
}

#[test]
fn retry_backoff_base_ms_override() {
    let mut map = full_env();
    map.insert("STOREMAP_RETRY_BACKOFF_BASE_MS", "1000");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.retry_backoff_base_ms, 1000);
}

#[test]
fn refresh_cron_requires_six_fields() {
    let mut map = full_env();
    map.insert("STOREMAP_REFRESH_CRON", "*/15 * * * *");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREMAP_REFRESH_CRON")
    );
}
