//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! ## Server
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_STATIC_DIR` - Product images and assets (default: crates/storefront/static)
//!
//! ## Cart
//! - `STOREFRONT_DATA_DIR` - Directory holding the cart slot (default: data)
//! - `STOREFRONT_CART_SLOT` - Name of the cart slot (default: `lumina_cart`)
//! - `STOREFRONT_CURRENCY` - ISO 4217 code for prices (default: INR)
//! - `STOREFRONT_LOCALE` - Digit grouping, `en-IN` or `en-US` (default: en-IN)
//!
//! ## Payment
//! - `PAYMENT_KEY_ID` - Gateway identity key; checkout is unavailable without it
//! - `PAYMENT_DISPLAY_NAME` - Merchant name shown by the gateway (default: Lumina Jewelry)
//! - `PAYMENT_DESCRIPTION` - Order description (default: Lumina Cart Total)
//! - `PAYMENT_IMAGE` - Merchant logo path or URL (default: assets/images/earring-gold.png)
//! - `PAYMENT_THEME_COLOR` - Gateway accent color as `#RRGGBB` (default: #D4AF37)
//!
//! ## Error tracking
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use lumina_core::{CurrencyCode, NumberLocale};
use thiserror::Error;
use url::Url;

use crate::storage::DEFAULT_CART_SLOT;

/// Prefix every gateway identity key carries.
const PAYMENT_KEY_PREFIX: &str = "rzp_";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
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
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Cart storage and display settings
    pub cart: CartConfig,
    /// Payment gateway settings
    pub payment: PaymentConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Where the cart lives and how its amounts are shown.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Directory holding the cart slot file
    pub data_dir: PathBuf,
    /// Name of the cart slot
    pub slot: String,
    /// Currency of every price in the cart
    pub currency: CurrencyCode,
    /// Digit grouping for displayed amounts
    pub locale: NumberLocale,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            slot: DEFAULT_CART_SLOT.to_string(),
            currency: CurrencyCode::default(),
            locale: NumberLocale::default(),
        }
    }
}

/// Fixed branding handed to the payment gateway with every request.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Gateway identity key (public, safe to expose in the browser)
    pub key_id: Option<String>,
    /// Merchant name
    pub display_name: String,
    /// Order description
    pub description: String,
    /// Merchant logo
    pub image: String,
    /// Accent color
    pub theme_color: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            key_id: None,
            display_name: "Lumina Jewelry".to_string(),
            description: "Lumina Cart Total".to_string(),
            image: "assets/images/earring-gold.png".to_string(),
            theme_color: "#D4AF37".to_string(),
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
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("STOREFRONT_PORT", "3000")?;
        let static_dir = PathBuf::from(get_env_or_default(
            "STOREFRONT_STATIC_DIR",
            "crates/storefront/static",
        ));

        let cart = CartConfig::from_env()?;
        let payment = PaymentConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_rate("SENTRY_SAMPLE_RATE", "1.0")?;
        let sentry_traces_sample_rate = parse_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            host,
            port,
            static_dir,
            cart,
            payment,
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

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            static_dir: PathBuf::from("crates/storefront/static"),
            cart: CartConfig::default(),
            payment: PaymentConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl CartConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            data_dir: get_optional_env("STOREFRONT_DATA_DIR")
                .map_or(defaults.data_dir, PathBuf::from),
            slot: get_env_or_default("STOREFRONT_CART_SLOT", &defaults.slot),
            currency: parse_env_or_default("STOREFRONT_CURRENCY", "INR")?,
            locale: parse_env_or_default("STOREFRONT_LOCALE", "en-IN")?,
        })
    }
}

impl PaymentConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let key_id = get_optional_env("PAYMENT_KEY_ID").filter(|key| !key.is_empty());
        if let Some(key) = &key_id {
            validate_key_id(key, "PAYMENT_KEY_ID")?;
        }

        let image = get_env_or_default("PAYMENT_IMAGE", &defaults.image);
        validate_image(&image, "PAYMENT_IMAGE")?;

        let theme_color = get_env_or_default("PAYMENT_THEME_COLOR", &defaults.theme_color);
        validate_hex_color(&theme_color, "PAYMENT_THEME_COLOR")?;

        Ok(Self {
            key_id,
            display_name: get_env_or_default("PAYMENT_DISPLAY_NAME", &defaults.display_name),
            description: get_env_or_default("PAYMENT_DESCRIPTION", &defaults.description),
            image,
            theme_color,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a sample rate and check it lies in `0.0..=1.0`.
fn parse_rate(key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_env_or_default(key, default)?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

/// Gateway keys look like `rzp_test_...` or `rzp_live_...`.
fn validate_key_id(key: &str, var_name: &str) -> Result<(), ConfigError> {
    let valid = key.starts_with(PAYMENT_KEY_PREFIX)
        && key.len() > PAYMENT_KEY_PREFIX.len()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("expected a key starting with '{PAYMENT_KEY_PREFIX}'"),
        ));
    }
    Ok(())
}

/// Accept absolute URLs or site-relative paths.
fn validate_image(image: &str, var_name: &str) -> Result<(), ConfigError> {
    match Url::parse(image) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported URL scheme '{}'", url.scheme()),
        )),
        Err(url::ParseError::RelativeUrlWithoutBase) if !image.trim().is_empty() => Ok(()),
        Err(e) => Err(ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string())),
    }
}

/// Accept `#RRGGBB`.
fn validate_hex_color(color: &str, var_name: &str) -> Result<(), ConfigError> {
    let valid = color
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("expected #RRGGBB (got '{color}')"),
        ));
    }
    Ok(())
}
