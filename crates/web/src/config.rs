//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TRIPQUEST_DATABASE_URL` - `PostgreSQL` connection string
//! - `TRIPQUEST_SESSION_SECRET` - Session token signing secret (min 32 chars, high entropy)
//! - `AMADEUS_CLIENT_ID` - Amadeus self-service API key
//! - `AMADEUS_CLIENT_SECRET` - Amadeus self-service API secret
//!
//! ## Optional
//! - `TRIPQUEST_HOST` - Bind address (default: 127.0.0.1)
//! - `TRIPQUEST_PORT` - Listen port (default: 1234)
//! - `TRIPQUEST_CURRENCY` - Currency code for offer prices (default: NGN)
//! - `AMADEUS_BASE_URL` - Amadeus API origin (default: <https://test.api.amadeus.com>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry tracing sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// tripQuest application configuration.
#[derive(Debug, Clone)]
pub struct TripquestConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Session token signing secret
    pub session_secret: SecretString,
    /// ISO 4217 currency code requested for offer prices
    pub currency: String,
    /// Amadeus API configuration
    pub amadeus: AmadeusConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g., production, staging)
    pub sentry_environment: Option<String>,
    /// Fraction of error events reported to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced in Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Amadeus self-service API configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct AmadeusConfig {
    /// API origin, e.g. `https://test.api.amadeus.com`
    pub base_url: String,
    /// OAuth client id (the Amadeus "API key")
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: SecretString,
}

impl std::fmt::Debug for AmadeusConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmadeusConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl TripquestConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // .env is optional; deployments set the environment directly
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("TRIPQUEST_DATABASE_URL")?;
        let host = get_env_or_default("TRIPQUEST_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("TRIPQUEST_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("TRIPQUEST_PORT", "1234")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("TRIPQUEST_PORT".to_string(), e.to_string()))?;
        let session_secret = get_validated_secret("TRIPQUEST_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "TRIPQUEST_SESSION_SECRET")?;
        let currency = get_env_or_default("TRIPQUEST_CURRENCY", "NGN");

        let amadeus = AmadeusConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_env_or_default("SENTRY_SAMPLE_RATE", "1.0")
            .parse::<f32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SENTRY_SAMPLE_RATE".to_string(), e.to_string())
            })?;
        let sentry_traces_sample_rate = get_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")
            .parse::<f32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SENTRY_TRACES_SAMPLE_RATE".to_string(), e.to_string())
            })?;

        Ok(Self {
            database_url,
            host,
            port,
            session_secret,
            currency,
            amadeus,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AmadeusConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_env_or_default("AMADEUS_BASE_URL", "https://test.api.amadeus.com");
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("AMADEUS_BASE_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            base_url,
            client_id: get_required_env("AMADEUS_CLIENT_ID")?,
            client_secret: get_validated_secret("AMADEUS_CLIENT_SECRET")?,
        })
    }
}

// =============================================================================
// Environment helpers
// =============================================================================

/// Read a variable that must be set.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Read the database URL, falling back to the plain `DATABASE_URL` name that
/// managed Postgres providers inject.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Read a variable that may be absent.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Read a variable, substituting `default` when unset.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Reject session secrets below the minimum length.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let length = secret.expose_secret().len();
    if length < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("{length} characters is shorter than the {MIN_SESSION_SECRET_LENGTH} minimum"),
        ));
    }
    Ok(())
}

/// Shannon entropy of the string, in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }

    // Secrets are far too short for the usize -> f64 casts to lose anything.
    #[allow(clippy::cast_precision_loss)]
    let total = s.chars().count() as f64;
    counts
        .into_values()
        .map(|count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Reject secrets that look like placeholders or lack randomness.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(**p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("looks like a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy {entropy:.2} bits/char is below the {MIN_ENTROPY_BITS_PER_CHAR:.1} floor; generate the secret randomly"
            ),
        ));
    }

    Ok(())
}

/// Read a secret variable and run the strength checks on it.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
