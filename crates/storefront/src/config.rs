//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `FIREBASE_PROJECT_ID` - Firebase project holding the `products` collection
//! - `FIREBASE_API_KEY` - Firebase Web API key
//! - `ORDER_FORM_URL` - Form endpoint that receives checkout submissions
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_CACHE_TTL_SECS` - Product query cache TTL (default: 300)
//! - `STOREFRONT_HTTP_TIMEOUT_SECS` - Outgoing request timeout (default: 10)
//! - `STOREFRONT_DELIVERY_ZONES` - Delivery zone table
//!   (default: `crates/storefront/data/delivery_zones.json`)
//! - `STOREFRONT_TRUST_PROXY_HEADERS` - Take the client IP for login rate
//!   limiting from `CF-Connecting-IP` / `X-Forwarded-For` / `X-Real-IP`
//!   (default: false). Only enable behind a proxy that overwrites them.
//! - `FIRESTORE_URL` - Firestore REST base URL, e.g. an emulator
//! - `FIREBASE_AUTH_URL` - Identity Toolkit base URL, e.g. an emulator
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Public Firestore REST endpoint.
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

/// Public Identity Toolkit endpoint.
pub const DEFAULT_FIREBASE_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Default product cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

const DEFAULT_DELIVERY_ZONES: &str = "crates/storefront/data/delivery_zones.json";

/// Firebase Web API keys start with this prefix.
const FIREBASE_API_KEY_PREFIX: &str = "AIza";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Firebase project configuration
    pub firebase: FirebaseConfig,
    /// Form endpoint receiving orders
    pub order_form_url: Url,
    /// Time-to-live for cached product queries
    pub cache_ttl: Duration,
    /// Timeout for requests to Firebase and the order form
    pub http_timeout: Duration,
    /// JSON file with the delivery zone table
    pub delivery_zones_path: PathBuf,
    /// Whether client IP headers set by a reverse proxy are trusted
    pub trust_proxy_headers: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Firebase project configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct FirebaseConfig {
    /// Project id (e.g., zym-power)
    pub project_id: String,
    /// Web API key
    pub api_key: SecretString,
    /// Firestore REST base URL
    pub firestore_url: String,
    /// Identity Toolkit base URL
    pub auth_url: String,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("project_id", &self.project_id)
            .field("api_key", &"[REDACTED]")
            .field("firestore_url", &self.firestore_url)
            .field("auth_url", &self.auth_url)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let order_form_url = get_required_url("ORDER_FORM_URL")?;
        let cache_ttl = get_secs_or_default("STOREFRONT_CACHE_TTL_SECS", DEFAULT_CACHE_TTL)?;
        let http_timeout =
            get_secs_or_default("STOREFRONT_HTTP_TIMEOUT_SECS", Duration::from_secs(10))?;
        let delivery_zones_path =
            PathBuf::from(get_env_or_default("STOREFRONT_DELIVERY_ZONES", DEFAULT_DELIVERY_ZONES));
        let trust_proxy_headers = get_optional_env("STOREFRONT_TRUST_PROXY_HEADERS")
            .map_or(Ok(false), |raw| parse_bool("STOREFRONT_TRUST_PROXY_HEADERS", &raw))?;

        Ok(Self {
            host,
            port,
            base_url,
            firebase: FirebaseConfig::from_env()?,
            order_form_url,
            cache_ttl,
            http_timeout,
            delivery_zones_path,
            trust_proxy_headers,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl FirebaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = get_required_env("FIREBASE_API_KEY")?;
        validate_api_key(&api_key, "FIREBASE_API_KEY")?;

        Ok(Self {
            project_id: get_required_env("FIREBASE_PROJECT_ID")?,
            api_key: SecretString::from(api_key),
            firestore_url: get_env_or_default("FIRESTORE_URL", DEFAULT_FIRESTORE_URL),
            auth_url: get_env_or_default("FIREBASE_AUTH_URL", DEFAULT_FIREBASE_AUTH_URL),
        })
    }

    /// Base URL of the project's document tree.
    #[must_use]
    pub fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.firestore_url.trim_end_matches('/'),
            self.project_id
        )
    }

    /// The API key, for query strings.
    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable holding an absolute URL.
fn get_required_url(key: &str) -> Result<Url, ConfigError> {
    let value = get_required_env(key)?;
    Url::parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a duration in whole seconds with a default value.
fn get_secs_or_default(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |raw| parse_secs(key, &raw))
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected true or false, got '{other}'"),
        )),
    }
}

/// Reject API keys that are obviously not Firebase Web API keys.
fn validate_api_key(value: &str, var_name: &str) -> Result<(), ConfigError> {
    if !value.starts_with(FIREBASE_API_KEY_PREFIX) || value.len() < 30 {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("expected a Firebase Web API key starting with '{FIREBASE_API_KEY_PREFIX}'"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn firebase() -> FirebaseConfig {
        FirebaseConfig {
            project_id: "zym-power".to_string(),
            api_key: SecretString::from("AIzaSyTestKeyValue0123456789abcdefg"),
            firestore_url: "http://localhost:8080/v1/".to_string(),
            auth_url: DEFAULT_FIREBASE_AUTH_URL.to_string(),
        }
    }

    #[test]
    fn test_validate_api_key() {
        assert!(validate_api_key("AIzaSyTestKeyValue0123456789abcdefg", "K").is_ok());
        assert!(matches!(
            validate_api_key("changeme", "K"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(validate_api_key("AIza-short", "K").is_err());
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("T", " 60 ").unwrap(), Duration::from_secs(60));
        assert!(parse_secs("T", "five").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("T", "true").unwrap());
        assert!(parse_bool("T", " YES ").unwrap());
        assert!(!parse_bool("T", "0").unwrap());
        assert!(parse_bool("T", "sometimes").is_err());
    }

    #[test]
    fn test_documents_url() {
        assert_eq!(
            firebase().documents_url(),
            "http://localhost:8080/v1/projects/zym-power/databases/(default)/documents"
        );
    }

    #[test]
    fn test_firebase_config_debug_redacts_api_key() {
        let debug_output = format!("{:?}", firebase());
        assert!(debug_output.contains("zym-power"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("AIzaSyTestKeyValue"));
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            firebase: firebase(),
            order_form_url: Url::parse("https://forms.example/formResponse").unwrap(),
            cache_ttl: DEFAULT_CACHE_TTL,
            http_timeout: Duration::from_secs(10),
            delivery_zones_path: PathBuf::from(DEFAULT_DELIVERY_ZONES),
            trust_proxy_headers: false,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_secure());
    }
}
