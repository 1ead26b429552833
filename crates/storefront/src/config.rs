//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `WOOCOMMERCE_BASE_URL` - WordPress site hosting WooCommerce (e.g., <https://shop.example.ir>)
//! - `WOOCOMMERCE_CONSUMER_KEY` - REST API consumer key (`ck_...`)
//! - `WOOCOMMERCE_CONSUMER_SECRET` - REST API consumer secret (`cs_...`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_PUBLIC_DIR` - Static files served under `/static` (default: public)
//! - `STOREFRONT_SITE_SETTINGS` - Site settings document, path or URL (default: public/site-settings.json)
//! - `STOREFRONT_SLIDER_CONFIG` - Slider pointer document, path or URL (default: public/config.json)
//! - `STOREFRONT_MASK_ORDER_FAILURES` - Complete checkout with a synthetic order when
//!   order submission fails (default: true)
//! - `WOOCOMMERCE_API_VERSION` - REST API namespace (default: wc/v3)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::documents::DocumentSource;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Directory of static files served under `/static`
    pub public_dir: PathBuf,
    /// WooCommerce REST API configuration
    pub woocommerce: WooCommerceConfig,
    /// Static configuration documents
    pub documents: DocumentsConfig,
    /// Checkout behavior
    pub checkout: CheckoutConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., production, staging)
    pub sentry_environment: Option<String>,
}

/// WooCommerce REST API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct WooCommerceConfig {
    /// WordPress site URL (without the `/wp-json` suffix)
    pub base_url: String,
    /// REST API namespace (e.g., wc/v3)
    pub api_version: String,
    /// REST API consumer key
    pub consumer_key: SecretString,
    /// REST API consumer secret
    pub consumer_secret: SecretString,
}

impl std::fmt::Debug for WooCommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooCommerceConfig")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("consumer_key", &"[REDACTED]")
            .field("consumer_secret", &"[REDACTED]")
            .finish()
    }
}

impl WooCommerceConfig {
    /// Root of the REST API, e.g. `https://shop.example.ir/wp-json/wc/v3`.
    #[must_use]
    pub fn api_base(&self) -> String {
        format!(
            "{}/wp-json/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version.trim_matches('/')
        )
    }
}

/// Locations of the static JSON documents the storefront reads at startup.
#[derive(Debug, Clone)]
pub struct DocumentsConfig {
    /// Site settings (name, contact, theme, footer)
    pub site_settings: DocumentSource,
    /// Slider pointer document (`{"sliderDataUrl": ...}`)
    pub slider_config: DocumentSource,
}

/// Checkout behavior flags.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutConfig {
    /// When order submission fails, finish checkout with a synthetic
    /// cash-on-delivery order instead of reporting the failure.
    pub mask_submission_failures: bool,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            mask_submission_failures: true,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
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
        let base_url = get_required_url("STOREFRONT_BASE_URL")?;
        let public_dir = PathBuf::from(get_env_or_default("STOREFRONT_PUBLIC_DIR", "public"));

        let woocommerce = WooCommerceConfig::from_env()?;
        let documents = DocumentsConfig::from_env()?;
        let checkout = CheckoutConfig {
            mask_submission_failures: get_bool_env("STOREFRONT_MASK_ORDER_FAILURES", true)?,
        };

        Ok(Self {
            host,
            port,
            base_url,
            public_dir,
            woocommerce,
            documents,
            checkout,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl WooCommerceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: get_required_url("WOOCOMMERCE_BASE_URL")?,
            api_version: get_env_or_default("WOOCOMMERCE_API_VERSION", "wc/v3"),
            consumer_key: get_validated_secret("WOOCOMMERCE_CONSUMER_KEY")?,
            consumer_secret: get_validated_secret("WOOCOMMERCE_CONSUMER_SECRET")?,
        })
    }
}

impl DocumentsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            site_settings: get_document_source(
                "STOREFRONT_SITE_SETTINGS",
                "public/site-settings.json",
            )?,
            slider_config: get_document_source("STOREFRONT_SLIDER_CONFIG", "public/config.json")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable that must be an absolute URL.
fn get_required_url(key: &str) -> Result<String, ConfigError> {
    let value = get_required_env(key)?;
    Url::parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(value.trim_end_matches('/').to_string())
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a boolean environment variable with a default value.
fn get_bool_env(key: &str, default: bool) -> Result<bool, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |value| {
        parse_bool(&value).ok_or_else(|| {
            ConfigError::InvalidEnvVar(key.to_string(), format!("expected a boolean, got {value:?}"))
        })
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get a document location (file path or URL) with a default.
fn get_document_source(key: &str, default: &str) -> Result<DocumentSource, ConfigError> {
    get_env_or_default(key, default)
        .parse::<DocumentSource>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real WooCommerce keys are 40 random hex characters after the prefix
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key generated by WooCommerce."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn woocommerce_config() -> WooCommerceConfig {
        WooCommerceConfig {
            base_url: "https://shop.test".to_string(),
            api_version: "wc/v3".to_string(),
            consumer_key: SecretString::from("ck_super_secret_consumer_key"),
            consumer_secret: SecretString::from("cs_super_secret_consumer_secret"),
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-consumer-key", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("ck_aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_woocommerce_key() {
        let result = validate_secret_strength("ck_9f2c4e1a7b3d8605f1e2d3c4b5a69788a1b2c3d4", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_api_base_normalizes_slashes() {
        let mut config = woocommerce_config();
        config.base_url = "https://shop.test/".to_string();
        config.api_version = "/wc/v3/".to_string();
        assert_eq!(config.api_base(), "https://shop.test/wp-json/wc/v3");
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            public_dir: PathBuf::from("public"),
            woocommerce: woocommerce_config(),
            documents: DocumentsConfig {
                site_settings: "public/site-settings.json".parse().unwrap(),
                slider_config: "public/config.json".parse().unwrap(),
            },
            checkout: CheckoutConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_secure());
        assert!(config.checkout.mask_submission_failures);
    }

    #[test]
    fn test_woocommerce_config_debug_redacts_secrets() {
        let debug_output = format!("{:?}", woocommerce_config());

        assert!(debug_output.contains("https://shop.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_consumer_key"));
        assert!(!debug_output.contains("super_secret_consumer_secret"));
    }
}
