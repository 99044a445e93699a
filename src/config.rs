//! Smoke-test configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`). Every key has a default so the tool runs unconfigured
//! against a local database.

use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

use crate::error::SmokeError;

/// Password used when `DB_PASSWORD` is not set.
///
/// Kept for parity with container setups that ship this default; a warning
/// is logged whenever it is used.
pub const FALLBACK_PASSWORD: &str = "YourPass321";

/// Message written into the probe row when `SMOKE_MESSAGE` is not set.
pub const DEFAULT_MESSAGE: &str = "Test message from Rust";

/// Maximum length of the probe message (`VARCHAR(100)`).
pub const MAX_MESSAGE_LEN: usize = 100;

/// Where the password in [`ConnectionParams`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordSource {
    /// Read from the `DB_PASSWORD` environment variable.
    Environment,
    /// Hardcoded [`FALLBACK_PASSWORD`].
    Fallback,
}

/// Network address and credentials of the database under test.
#[derive(Clone)]
pub struct ConnectionParams {
    /// Database host name or IP.
    pub host: String,
    /// Database TCP port.
    pub port: u16,
    /// Database (service) name.
    pub database: String,
    /// Login user.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Origin of [`Self::password`].
    pub password_source: PasswordSource,
}

impl ConnectionParams {
    /// Builds driver connect options from these parameters.
    #[must_use]
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .password(&self.password)
    }

    /// Returns `host:port/database` for log lines.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("password_source", &self.password_source)
            .finish()
    }
}

/// Fixed-interval retry budget for the connection waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of connection attempts.
    pub max_attempts: NonZeroU32,
    /// Pause between two consecutive attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Default number of attempts.
    pub const DEFAULT_MAX_ATTEMPTS: NonZeroU32 = NonZeroU32::MIN.saturating_add(29);

    /// Default pause between attempts.
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(10);

    /// Creates a policy with the given budget and delay.
    #[must_use]
    pub const fn new(max_attempts: NonZeroU32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_DELAY)
    }
}

/// Top-level smoke-test configuration.
///
/// Loaded once at startup via [`SmokeConfig::from_env`].
#[derive(Debug, Clone)]
pub struct SmokeConfig {
    /// Where and as whom to connect.
    pub connection: ConnectionParams,
    /// How long to wait for the database.
    pub retry: RetryPolicy,
    /// Text stored in the probe row.
    pub message: String,
}

impl SmokeConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set. Calls
    /// `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`SmokeError::Config`] if a numeric variable is set but
    /// malformed, if `DB_CONNECT_MAX_ATTEMPTS` is zero, or if
    /// `SMOKE_MESSAGE` is longer than [`MAX_MESSAGE_LEN`] characters.
    pub fn from_env() -> Result<Self, SmokeError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`SmokeConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SmokeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (password, password_source) = match lookup("DB_PASSWORD") {
            Some(p) => (p, PasswordSource::Environment),
            None => (FALLBACK_PASSWORD.to_string(), PasswordSource::Fallback),
        };

        let connection = ConnectionParams {
            host: lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_var(&lookup, "DB_PORT", 5432)?,
            database: lookup("DB_NAME").unwrap_or_else(|| "postgres".to_string()),
            username: lookup("DB_USER").unwrap_or_else(|| "postgres".to_string()),
            password,
            password_source,
        };

        let max_attempts = parse_var(
            &lookup,
            "DB_CONNECT_MAX_ATTEMPTS",
            RetryPolicy::DEFAULT_MAX_ATTEMPTS.get(),
        )?;
        let max_attempts = NonZeroU32::new(max_attempts).ok_or_else(|| {
            SmokeError::Config("DB_CONNECT_MAX_ATTEMPTS must be at least 1".to_string())
        })?;
        let delay_secs = parse_var(
            &lookup,
            "DB_CONNECT_RETRY_DELAY_SECS",
            RetryPolicy::DEFAULT_DELAY.as_secs(),
        )?;

        let message = lookup("SMOKE_MESSAGE").unwrap_or_else(|| DEFAULT_MESSAGE.to_string());
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(SmokeError::Config(format!(
                "SMOKE_MESSAGE exceeds {MAX_MESSAGE_LEN} characters"
            )));
        }

        Ok(Self {
            connection,
            retry: RetryPolicy::new(max_attempts, Duration::from_secs(delay_secs)),
            message,
        })
    }
}

/// Parses `key` as `T`, returning `default` when it is unset and an error
/// when it is set but invalid.
fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, SmokeError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| SmokeError::Config(format!("{key}={raw:?}: {e}"))),
        None => Ok(default),
    }
}
