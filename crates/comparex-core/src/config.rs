use crate::app_config::{AppConfig, ClientConfig, Environment};
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

/// Load CLI client settings. No variable is required.
///
/// # Errors
///
/// Returns `ConfigError` if a provided value is invalid.
pub fn load_client_config() -> Result<ClientConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_client_config(|key| std::env::var(key))
}

fn or_default<F>(lookup: &F, var: &str, default: &str) -> String
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    lookup(var).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T, F>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let raw = or_default(lookup, var, default);
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let database_url =
        lookup("DATABASE_URL").map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".into()))?;

    let env = parse_environment(&or_default(&lookup, "COMPAREX_ENV", "development"))?;
    let bind_addr: SocketAddr = parse_var(&lookup, "COMPAREX_BIND_ADDR", "0.0.0.0:5001")?;
    let log_level = or_default(&lookup, "COMPAREX_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default(
        &lookup,
        "COMPAREX_CATALOG_PATH",
        "./config/catalog.yaml",
    ));

    let db_max_connections = parse_var(&lookup, "COMPAREX_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_var(&lookup, "COMPAREX_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_var(&lookup, "COMPAREX_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    let price_cache_write = parse_var(&lookup, "COMPAREX_PRICE_CACHE_WRITE", "false")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        catalog_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        price_cache_write,
    })
}

fn build_client_config<F>(lookup: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let api_url = or_default(&lookup, "COMPAREX_API_URL", "http://localhost:5001/api");
    if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "COMPAREX_API_URL".to_string(),
            reason: format!("expected an http(s) URL, got '{api_url}'"),
        });
    }

    Ok(ClientConfig {
        api_url,
        state_dir: or_default(&lookup, "COMPAREX_STATE_DIR", "./.comparex").into(),
        request_timeout_secs: parse_var(&lookup, "COMPAREX_REQUEST_TIMEOUT_SECS", "15")?,
        log_level: or_default(&lookup, "COMPAREX_LOG_LEVEL", "warn"),
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "COMPAREX_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
