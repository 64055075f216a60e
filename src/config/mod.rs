use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("environment variable {name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Unset means the in-memory store is used.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Unset means rate limiting is disabled.
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    /// Upper bound for one AI request, seconds.
    pub openai_timeout_secs: u64,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_expiration_secs = match get("JWT_EXPIRATION") {
            Some(raw) => parse::<u64>("JWT_EXPIRATION", raw.trim_end_matches('h'))?
                .checked_mul(3600)
                .filter(|secs| *secs <= MAX_JWT_EXPIRATION_SECS)
                .ok_or(ConfigError::Invalid {
                    name: "JWT_EXPIRATION",
                    value: raw,
                })?,
            None => 24 * 3600,
        };

        Ok(Config {
            database_url: get("DATABASE_URL"),
            database_max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 10)?,
            redis_url: get("REDIS_URL"),
            jwt_secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            jwt_expiration_secs,
            rate_limit_window_secs: parse_or(&get, "RATE_LIMIT_WINDOW", 60)?,
            rate_limit_requests: parse_or(&get, "RATE_LIMIT_REQUESTS", 100)?,
            server_host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parse_or(&get, "SERVER_PORT", 3000)?,
            api_base_uri: normalize_base_uri(get("API_BASE_URI").as_deref().unwrap_or("/api")),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".into()),
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".into())
                .trim_end_matches('/')
                .to_string(),
            openai_timeout_secs: parse_or(&get, "OPENAI_TIMEOUT", 30)?,
            admin_email: get("ADMIN_EMAIL"),
            admin_password: get("ADMIN_PASSWORD"),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn openai_timeout(&self) -> Duration {
        Duration::from_secs(self.openai_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

// Ten years. Longer lifetimes overflow token timestamp arithmetic.
const MAX_JWT_EXPIRATION_SECS: u64 = 10 * 365 * 24 * 3600;

fn parse<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => parse(name, &raw),
        None => Ok(default),
    }
}

// "api/" and "/api" both nest at "/api"; "/" nests at the root.
fn normalize_base_uri(raw: &str) -> String {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = config_from(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert!(config.database_url.is_none());
        assert!(config.redis_url.is_none());
        assert_eq!(config.jwt_expiration(), Duration::from_secs(24 * 3600));
        assert_eq!(config.rate_limit_requests, 100);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.api_base_uri, "/api");
        assert_eq!(config.openai_model, "gpt-4o-mini");
    }

    #[test]
    fn missing_secret_is_an_error() {
        assert!(matches!(
            config_from(&[]),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
        assert!(matches!(
            config_from(&[("JWT_SECRET", "  ")]),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
    }

    #[test]
    fn expiration_accepts_hour_suffix() {
        let config = config_from(&[("JWT_SECRET", "x"), ("JWT_EXPIRATION", "2h")]).unwrap();
        assert_eq!(config.jwt_expiration_secs, 7200);
    }

    #[test]
    fn oversized_expiration_is_rejected() {
        for raw in ["18446744073709551615h", "100000h"] {
            let err = config_from(&[("JWT_SECRET", "x"), ("JWT_EXPIRATION", raw)]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { name: "JWT_EXPIRATION", .. }));
        }
    }

    #[test]
    fn ai_timeout_defaults_and_overrides() {
        let config = config_from(&[("JWT_SECRET", "x")]).unwrap();
        assert_eq!(config.openai_timeout(), Duration::from_secs(30));
        let config = config_from(&[("JWT_SECRET", "x"), ("OPENAI_TIMEOUT", "5")]).unwrap();
        assert_eq!(config.openai_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn bad_number_is_reported() {
        let err = config_from(&[("JWT_SECRET", "x"), ("SERVER_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "SERVER_PORT", .. }));
    }

    #[test]
    fn base_uri_is_normalized() {
        let config = config_from(&[("JWT_SECRET", "x"), ("API_BASE_URI", "v1/")]).unwrap();
        assert_eq!(config.api_base_uri, "/v1");
        let config = config_from(&[("JWT_SECRET", "x"), ("API_BASE_URI", "/")]).unwrap();
        assert_eq!(config.api_base_uri, "");
    }
}
