//! Server Configuration
//!
//! Read once at startup from the environment (after `.env` is loaded).

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::{AuthConfig, SigningKey};
use base64::Engine;
use base64::engine::general_purpose;
use platform::rate_limit::RateLimitConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

#[derive(Debug)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// `None` selects the in-memory store
    pub database_url: Option<String>,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address")?;

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let token_secret = match env::var("AUTH_TOKEN_SECRET") {
            Ok(secret_b64) => decode_secret(&secret_b64)?,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("AUTH_TOKEN_SECRET not set, using a random key; tokens will not survive restarts");
                SigningKey::generate()
            }
            Err(_) => bail!("AUTH_TOKEN_SECRET must be set in production"),
        };

        let password_pepper = env::var("AUTH_PASSWORD_PEPPER")
            .ok()
            .filter(|pepper| !pepper.is_empty())
            .map(String::into_bytes);

        let max_failures: u32 = parse_var("AUTH_LOGIN_MAX_FAILURES", 5)?;
        let window_secs: u64 = parse_var("AUTH_LOGIN_WINDOW_SECS", 900)?;
        let login_throttle =
            (max_failures > 0).then(|| RateLimitConfig::new(max_failures, window_secs));

        let auth = AuthConfig {
            token_secret,
            token_ttl: Duration::from_secs(parse_var("AUTH_TOKEN_TTL_SECS", 3600)?),
            password_pepper,
            store_timeout: Duration::from_millis(parse_var("AUTH_STORE_TIMEOUT_MS", 5000)?),
            login_throttle,
        };

        Ok(Self {
            bind_addr,
            database_url,
            frontend_origins,
            auth,
        })
    }
}

fn decode_secret(secret_b64: &str) -> anyhow::Result<SigningKey> {
    let bytes = general_purpose::STANDARD
        .decode(secret_b64.trim())
        .context("AUTH_TOKEN_SECRET must be base64")?;
    let key: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| anyhow::anyhow!("AUTH_TOKEN_SECRET must decode to 32 bytes, got {}", bytes.len()))?;
    Ok(SigningKey::new(key))
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_secret() {
        let encoded = general_purpose::STANDARD.encode([1u8; 32]);
        assert!(decode_secret(&encoded).is_ok());

        let short = general_purpose::STANDARD.encode([1u8; 16]);
        assert!(decode_secret(&short).is_err());
        assert!(decode_secret("not base64!").is_err());
    }

    #[test]
    fn test_parse_var_default() {
        let value: u64 = parse_var("AUTH_API_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
