//! Storefront configuration loaded from environment variables.
//!
//! Every variable is optional. Names used by the original web deployment
//! (`NEXT_PUBLIC_*`) are accepted alongside the plain names; the first
//! non-empty value wins.
//!
//! # Environment Variables
//!
//! ## Server
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//!
//! ## Data store
//! - `NEXT_PUBLIC_SUPABASE_URL` / `SUPABASE_URL` - Supabase project URL
//! - `NEXT_PUBLIC_SUPABASE_ANON_KEY` / `SUPABASE_ANON_KEY` - anon API key
//!
//! ## Checkout
//! - `NEXT_PUBLIC_WHATSAPP_NUMBER` / `WHATSAPP_NUMBER` - order recipient
//! - `NEXT_PUBLIC_BRAND_NAME` / `BRAND_NAME` - brand in messages (default: Store)
//! - `NEXT_PUBLIC_DEFAULT_CURRENCY` / `DEFAULT_CURRENCY` - (default: USD)
//! - `NEXT_PUBLIC_SITE_URL` / `SITE_URL` - public URL for product links
//! - `MESSAGING_HOST` - deep link host (default: wa.me)
//! - `CHECKOUT_EVENT_TIMEOUT_MS` - bound on the analytics write (default: 2000)
//!
//! ## Error tracking
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`,
//!   `SENTRY_TRACES_SAMPLE_RATE`

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use babyluxe_core::CheckoutSettings;
use babyluxe_core::checkout::{DEFAULT_BRAND_NAME, DEFAULT_CURRENCY, DEFAULT_MESSAGING_HOST};
use secrecy::SecretString;
use thiserror::Error;

const SUPABASE_URL_KEYS: &[&str] = &["NEXT_PUBLIC_SUPABASE_URL", "SUPABASE_URL"];
const SUPABASE_KEY_KEYS: &[&str] = &["NEXT_PUBLIC_SUPABASE_ANON_KEY", "SUPABASE_ANON_KEY"];
const WHATSAPP_KEYS: &[&str] = &["NEXT_PUBLIC_WHATSAPP_NUMBER", "WHATSAPP_NUMBER"];
const BRAND_KEYS: &[&str] = &["NEXT_PUBLIC_BRAND_NAME", "BRAND_NAME"];
const CURRENCY_KEYS: &[&str] = &["NEXT_PUBLIC_DEFAULT_CURRENCY", "DEFAULT_CURRENCY"];
const SITE_URL_KEYS: &[&str] = &["NEXT_PUBLIC_SITE_URL", "SITE_URL"];

const DEFAULT_EVENT_TIMEOUT_MS: u64 = 2000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
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
    /// Public site URL (no trailing slash)
    pub site_url: Option<String>,
    /// Hosted data store; `None` when not configured
    pub supabase: Option<SupabaseConfig>,
    /// Checkout handoff settings
    pub checkout: CheckoutConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Supabase project configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL (e.g., <https://abc.supabase.co>)
    pub url: String,
    /// Anon API key sent as `apikey` and bearer token
    pub anon_key: SecretString,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

/// Checkout handoff configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Recipient number for order messages
    pub whatsapp_number: Option<String>,
    /// Brand shown in the message header
    pub brand_name: String,
    /// Currency assumed when a product carries none
    pub default_currency: String,
    /// Deep link host
    pub messaging_host: String,
    /// Upper bound on the analytics write before redirecting
    pub event_timeout: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            whatsapp_number: None,
            brand_name: DEFAULT_BRAND_NAME.to_string(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            messaging_host: DEFAULT_MESSAGING_HOST.to_string(),
            event_timeout: Duration::from_millis(DEFAULT_EVENT_TIMEOUT_MS),
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
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`StorefrontConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let host = env
            .or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string()))?;

        let site_url = env
            .first_of(SITE_URL_KEYS)
            .map(|url| url.trim_end_matches('/').to_string());

        let supabase = SupabaseConfig::from_env(&env)?;
        let checkout = CheckoutConfig::from_env(&env)?;

        Ok(Self {
            host,
            port,
            site_url,
            supabase,
            checkout,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Settings for the checkout composer.
    #[must_use]
    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            brand_name: self.checkout.brand_name.clone(),
            recipient: self.checkout.whatsapp_number.clone(),
            site_base_url: self.site_url.clone(),
            messaging_host: self.checkout.messaging_host.clone(),
            default_currency: self.checkout.default_currency.clone(),
        }
    }

    /// Whether session cookies should be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.site_url
            .as_deref()
            .is_some_and(|url| url.starts_with("https://"))
    }
}

impl SupabaseConfig {
    fn from_env<F>(env: &Env<F>) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match (env.first_of(SUPABASE_URL_KEYS), env.first_of(SUPABASE_KEY_KEYS)) {
            (Some(url), Some(key)) => {
                url::Url::parse(&url).map_err(|e| {
                    ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e.to_string())
                })?;
                Ok(Some(Self {
                    url: url.trim_end_matches('/').to_string(),
                    anon_key: SecretString::from(key),
                }))
            }
            (None, None) => Ok(None),
            (url, _) => {
                let missing = if url.is_some() {
                    SUPABASE_KEY_KEYS
                } else {
                    SUPABASE_URL_KEYS
                };
                tracing::warn!(
                    missing = %missing.join(" or "),
                    "Supabase is half configured; catalog and checkout events are disabled"
                );
                Ok(None)
            }
        }
    }
}

impl CheckoutConfig {
    fn from_env<F>(env: &Env<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let timeout_ms = env.parse_or("CHECKOUT_EVENT_TIMEOUT_MS", DEFAULT_EVENT_TIMEOUT_MS)?;

        Ok(Self {
            whatsapp_number: env.first_of(WHATSAPP_KEYS),
            brand_name: env.first_of(BRAND_KEYS).unwrap_or(defaults.brand_name),
            default_currency: env
                .first_of(CURRENCY_KEYS)
                .map_or(defaults.default_currency, |c| c.to_uppercase()),
            messaging_host: env
                .optional("MESSAGING_HOST")
                .unwrap_or(defaults.messaging_host),
            event_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup that treats empty values as unset.
struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional environment variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// First non-empty value among several names.
    fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.optional(key))
    }

    /// Get an environment variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse an optional variable, falling back to a default when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert!(config.supabase.is_none());
        assert!(config.checkout.whatsapp_number.is_none());
        assert_eq!(config.checkout.brand_name, "Store");
        assert_eq!(config.checkout.default_currency, "USD");
        assert_eq!(config.checkout.messaging_host, "wa.me");
        assert_eq!(config.checkout.event_timeout, Duration::from_millis(2000));
        assert!(!config.is_secure());
    }

    #[test]
    fn test_public_names_take_precedence() {
        let config = load(&[
            ("NEXT_PUBLIC_BRAND_NAME", "BabyLuxe"),
            ("BRAND_NAME", "Other"),
            ("WHATSAPP_NUMBER", "+1 555 000 0000"),
            ("NEXT_PUBLIC_DEFAULT_CURRENCY", "eur"),
        ])
        .unwrap();
        assert_eq!(config.checkout.brand_name, "BabyLuxe");
        assert_eq!(
            config.checkout.whatsapp_number.as_deref(),
            Some("+1 555 000 0000")
        );
        assert_eq!(config.checkout.default_currency, "EUR");
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = load(&[("NEXT_PUBLIC_WHATSAPP_NUMBER", "  ")]).unwrap();
        assert!(config.checkout.whatsapp_number.is_none());
    }

    #[test]
    fn test_site_url_trailing_slash_trimmed() {
        let config = load(&[("NEXT_PUBLIC_SITE_URL", "https://babyluxe.shop/")]).unwrap();
        assert_eq!(config.site_url.as_deref(), Some("https://babyluxe.shop"));
        assert!(config.is_secure());
        assert_eq!(
            config.checkout_settings().site_base_url.as_deref(),
            Some("https://babyluxe.shop")
        );
    }

    #[test]
    fn test_supabase_pair() {
        let config = load(&[
            ("SUPABASE_URL", "https://abc.supabase.co/"),
            ("SUPABASE_ANON_KEY", "anon-key"),
        ])
        .unwrap();
        let supabase = config.supabase.unwrap();
        assert_eq!(supabase.url, "https://abc.supabase.co");
        assert_eq!(supabase.anon_key.expose_secret(), "anon-key");
    }

    #[test]
    fn test_supabase_half_configured_is_unset() {
        let config = load(&[("SUPABASE_URL", "https://abc.supabase.co")]).unwrap();
        assert!(config.supabase.is_none());
    }

    #[test]
    fn test_supabase_invalid_url() {
        let err = load(&[("SUPABASE_URL", "not a url"), ("SUPABASE_ANON_KEY", "k")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("STOREFRONT_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_supabase_debug_redacts_key() {
        let config = SupabaseConfig {
            url: "https://abc.supabase.co".to_string(),
            anon_key: SecretString::from("super_secret_anon_key"),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("abc.supabase.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_anon_key"));
    }
}
