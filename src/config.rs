use chrono::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0} must be a positive number of seconds")]
    InvalidTtl(&'static str),

    #[error("{0} must be true or false")]
    InvalidBool(&'static str),

    #[error("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ")]
    SharedSecret,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub mongodb_uri: String,
    pub db_name: String,
}

#[derive(Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub cors_origin: Option<String>,
    pub cookie_secure: bool,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database: DatabaseConfig,
    pub tokens: TokenConfig,
    pub http: HttpConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Builds the config from any key lookup, so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database: DatabaseConfig::from_lookup(&lookup)?,
            tokens: TokenConfig::from_lookup(&lookup)?,
            http: HttpConfig::from_lookup(&lookup)?,
        })
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mongodb_uri = required(&lookup, "MONGODB_URI")?;
        let db_name = lookup("DB_NAME").unwrap_or_else(|| "session_issuer".to_string());

        Ok(Self {
            mongodb_uri,
            db_name,
        })
    }
}

impl TokenConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_secret = required(&lookup, "ACCESS_TOKEN_SECRET")?;
        let refresh_secret = required(&lookup, "REFRESH_TOKEN_SECRET")?;

        if access_secret == refresh_secret {
            return Err(ConfigError::SharedSecret);
        }

        let access_ttl = ttl(&lookup, "ACCESS_TOKEN_TTL_SECONDS", 15 * 60)?;
        let refresh_ttl = ttl(&lookup, "REFRESH_TOKEN_TTL_SECONDS", 7 * 24 * 60 * 60)?;

        Ok(Self {
            access_secret,
            refresh_secret,
            access_ttl,
            refresh_ttl,
        })
    }
}

impl HttpConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:1865".to_string());
        let cors_origin = lookup("CORS_ORIGIN").filter(|v| !v.trim().is_empty());
        let cookie_secure = match lookup("COOKIE_SECURE").as_deref() {
            None => false,
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(_) => return Err(ConfigError::InvalidBool("COOKIE_SECURE")),
        };

        Ok(Self {
            bind_addr,
            cors_origin,
            cookie_secure,
        })
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn ttl<F>(lookup: &F, key: &'static str, default_seconds: i64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let seconds = match lookup(key) {
        None => default_seconds,
        Some(v) => v.parse::<i64>().map_err(|_| ConfigError::InvalidTtl(key))?,
    };
    if seconds <= 0 {
        return Err(ConfigError::InvalidTtl(key));
    }
    Ok(Duration::seconds(seconds))
}
