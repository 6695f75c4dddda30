//! Configuration structures for the service.
//!
//! This module provides TOML-based configuration. The configuration system
//! supports:
//! - Bundled defaults (include_str! from domainforge.toml)
//! - User overrides (./domainforge.toml or ~/.config/domainforge/domainforge.toml)
//! - `DOMAINFORGE__SECTION__KEY` environment variables
//! - The legacy `FREE_TIER_LIMIT`, `MID_TIER_LIMIT`, `PREMIUM_TIER_LIMIT`,
//!   `PORT` and `CORS_ORIGIN` variables

use domainforge_core::{AiModel, Tier};
use domainforge_error::{ConfigError, DomainforgeError, DomainforgeResult};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../domainforge.toml");

/// Monthly generation allowance.
///
/// Serialized as a number or the string `"unlimited"`.
///
/// # Examples
///
/// ```
/// use domainforge_rate_limit::UsageLimit;
///
/// assert_eq!(UsageLimit::parse("unlimited"), Some(UsageLimit::Unlimited));
/// assert_eq!(UsageLimit::parse(" 25 "), Some(UsageLimit::Limited(25)));
/// assert_eq!(UsageLimit::parse("lots"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageLimit {
    /// At most this many calls per window
    Limited(u32),
    /// No cap and no counting
    Unlimited,
}

impl UsageLimit {
    /// Parse `"unlimited"` or a non-negative integer.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("unlimited") {
            return Some(UsageLimit::Unlimited);
        }
        value.parse::<u32>().ok().map(UsageLimit::Limited)
    }
}

impl Serialize for UsageLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            UsageLimit::Limited(n) => serializer.serialize_u32(*n),
            UsageLimit::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

impl<'de> Deserialize<'de> for UsageLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LimitVisitor;

        impl serde::de::Visitor<'_> for LimitVisitor {
            type Value = UsageLimit;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a non-negative integer or \"unlimited\"")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<UsageLimit, E> {
                u32::try_from(v)
                    .map(UsageLimit::Limited)
                    .map_err(|_| E::custom(format!("limit {} out of range", v)))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<UsageLimit, E> {
                u32::try_from(v)
                    .map(UsageLimit::Limited)
                    .map_err(|_| E::custom(format!("limit {} out of range", v)))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<UsageLimit, E> {
                UsageLimit::parse(v).ok_or_else(|| E::custom(format!("invalid limit '{}'", v)))
            }
        }

        deserializer.deserialize_any(LimitVisitor)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Allowed CORS origin
    pub cors_origin: String,
    /// Timeout applied to every outbound HTTP call
    pub request_timeout_secs: u64,
}

/// Limit and default model for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TierConfig {
    /// Monthly generation allowance
    pub limit: UsageLimit,
    /// Model used when the request names none
    pub model: AiModel,
}

/// Per-tier settings.
///
/// ```toml
/// [tiers.free]
/// limit = 2
/// model = "llama-3-8b"
///
/// [tiers.premium]
/// limit = "unlimited"
/// model = "gpt-4o"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TiersConfig {
    /// Free tier
    pub free: TierConfig,
    /// Mid tier
    pub mid: TierConfig,
    /// Premium tier
    pub premium: TierConfig,
}

impl TiersConfig {
    /// Settings for a tier.
    pub fn get(&self, tier: Tier) -> &TierConfig {
        match tier {
            Tier::Free => &self.free,
            Tier::Mid => &self.mid,
            Tier::Premium => &self.premium,
        }
    }

    /// Monthly allowance for a tier.
    pub fn limit(&self, tier: Tier) -> UsageLimit {
        self.get(tier).limit
    }

    /// Default model for a tier.
    pub fn model(&self, tier: Tier) -> AiModel {
        self.get(tier).model
    }
}

/// Usage accounting switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct UsageConfig {
    /// Honor the request body's `tier` instead of billing records
    #[serde(default)]
    pub trust_request_tier: bool,
}

/// One fixed request window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WindowConfig {
    /// Requests allowed per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

/// Per-IP limits for each route group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// `/api/domains`
    pub domains: WindowConfig,
    /// `/api/subscriptions`
    pub subscriptions: WindowConfig,
}

/// Availability cache lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct AvailabilityConfig {
    /// Freshness of confirmed answers
    pub ttl_secs: u64,
    /// Freshness of failed lookups
    pub failure_ttl_secs: u64,
    /// Entry cap; unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
}

/// Top-level Domainforge configuration.
///
/// Loaded once at startup and shared read-only.
///
/// # Example
///
/// ```no_run
/// use domainforge_rate_limit::DomainforgeConfig;
/// use domainforge_core::Tier;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DomainforgeConfig::load()?;
/// println!("free tier model: {}", config.tiers.model(Tier::Free));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DomainforgeConfig {
    /// HTTP listener
    pub server: ServerConfig,
    /// Tier limits and models
    pub tiers: TiersConfig,
    /// Usage accounting
    #[serde(default)]
    pub usage: UsageConfig,
    /// Per-IP limits
    pub rate_limit: RateLimitConfig,
    /// Availability cache
    pub availability: AvailabilityConfig,
}

impl DomainforgeConfig {
    /// Bundled defaults only, ignoring files and the environment.
    pub fn bundled() -> DomainforgeResult<Self> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .map_err(|e| config_error(BUNDLED_LAYER, e))?
            .try_deserialize()
            .map_err(|e| config_error(BUNDLED_LAYER, e))
    }

    /// Load configuration from a specific file layered over the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> DomainforgeResult<Self> {
        debug!("Loading configuration from file");
        let layer = path.as_ref().display().to_string();

        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| config_error(&layer, e))?
            .try_deserialize()
            .map_err(|e| config_error(&layer, e))
    }

    /// Load configuration with the standard precedence.
    ///
    /// Sources in order of precedence (later sources override earlier):
    /// 1. Bundled defaults (domainforge.toml shipped with the binary)
    /// 2. `~/.config/domainforge/domainforge.toml`
    /// 3. `./domainforge.toml`
    /// 4. `DOMAINFORGE__*` environment variables
    /// 5. Legacy environment variables
    ///
    /// Missing files are skipped.
    #[instrument]
    pub fn load() -> DomainforgeResult<Self> {
        Self::load_with(None)
    }

    /// Like [`load`](Self::load), with an extra file applied after `./domainforge.toml`.
    #[instrument(skip(extra), fields(extra = ?extra.map(|p| p.display().to_string())))]
    pub fn load_with(extra: Option<&Path>) -> DomainforgeResult<Self> {
        debug!("Loading configuration with precedence: env > explicit > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/domainforge/domainforge.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("domainforge").required(false));

        if let Some(path) = extra {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("DOMAINFORGE")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: Self = builder
            .build()
            .map_err(|e| config_error(MERGED_LAYER, e))?
            .try_deserialize()
            .map_err(|e| config_error(MERGED_LAYER, e))?;

        config.apply_legacy_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply the legacy unprefixed variables.
    ///
    /// Unparseable values are ignored with a warning, keeping the value
    /// already configured.
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (key, tier) in [
            ("FREE_TIER_LIMIT", Tier::Free),
            ("MID_TIER_LIMIT", Tier::Mid),
            ("PREMIUM_TIER_LIMIT", Tier::Premium),
        ] {
            let Some(raw) = lookup(key) else { continue };
            match UsageLimit::parse(&raw) {
                Some(limit) => {
                    debug!(key, ?limit, "Tier limit overridden from environment");
                    self.tier_mut(tier).limit = limit;
                }
                None => warn!(key, value = %raw, "Ignoring unparseable tier limit"),
            }
        }

        if let Some(raw) = lookup("PORT") {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %raw, "Ignoring unparseable PORT"),
            }
        }

        if let Some(origin) = lookup("CORS_ORIGIN").filter(|o| !o.trim().is_empty()) {
            self.server.cors_origin = origin;
        }
    }

    fn tier_mut(&mut self, tier: Tier) -> &mut TierConfig {
        match tier {
            Tier::Free => &mut self.tiers.free,
            Tier::Mid => &mut self.tiers.mid,
            Tier::Premium => &mut self.tiers.premium,
        }
    }
}

const BUNDLED_LAYER: &str = "bundled defaults";
const MERGED_LAYER: &str = "layered sources";

/// Wrap a loader failure, keeping the setting it blamed.
fn config_error(layer: &str, e: config::ConfigError) -> DomainforgeError {
    let key = match &e {
        config::ConfigError::NotFound(key) => Some(key.clone()),
        config::ConfigError::Type { key, .. } | config::ConfigError::At { key, .. } => key.clone(),
        _ => None,
    };
    let err = ConfigError::new(layer, e.to_string());
    DomainforgeError::from(match key {
        Some(key) => err.with_key(key),
        None => err,
    })
}
