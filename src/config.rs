use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How an ownership mismatch on a `{userid}` route is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnershipPolicy {
    /// Respond 404, so other users' lists cannot be probed.
    #[default]
    NotFound,
    /// Respond 403.
    Forbidden,
}

impl FromStr for OwnershipPolicy {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "not_found" | "404" => Ok(OwnershipPolicy::NotFound),
            "forbidden" | "403" => Ok(OwnershipPolicy::Forbidden),
            _ => Err(()),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has invalid value {:?}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Process configuration, loaded once at startup and passed explicitly to the services.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// When `None` the service runs against the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub min_password_length: usize,
    pub bcrypt_cost: u32,
    pub ownership_policy: OwnershipPolicy,
    pub store_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let token_ttl_minutes: i64 = parse_or(&get, "TOKEN_TTL_MINUTES", 24 * 60)?;
        if token_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_MINUTES",
                value: token_ttl_minutes.to_string(),
            });
        }

        let bcrypt_cost: u32 = parse_or(&get, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let ownership_policy = match get("OWNERSHIP_MISMATCH") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "OWNERSHIP_MISMATCH",
                value,
            })?,
            None => OwnershipPolicy::default(),
        };

        Ok(Self {
            server_host: get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port: parse_or(&get, "SERVER_PORT", 8080)?,
            database_url: get("DATABASE_URL"),
            database_max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret,
            token_ttl: chrono::Duration::minutes(token_ttl_minutes),
            min_password_length: parse_or(&get, "MIN_PASSWORD_LENGTH", 6)?,
            bcrypt_cost,
            ownership_policy,
            store_timeout: Duration::from_secs(parse_or(&get, "STORE_TIMEOUT_SECS", 5)?),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T, F>(get: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
