//! Config manager - engine defaults and server settings
//!
//! Every optional pricing field of an audit request has an explicit default
//! here. The defaults can be replaced at runtime through the API; audits take
//! a snapshot so an update never lands halfway through a computation.

use crate::audit::PriceAuditEngine;
use crate::error::ConfigError;
use crate::types::{MarginRange, PriceAuditInput};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use tracing::info;

/// Upper bound for any rate or margin default (10 = 1000%)
const MAX_RATE: f64 = 10.0;

/// Defaults applied to optional audit input fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditDefaults {
    /// Label used when a request carries none; never converted
    pub currency: String,
    pub shipping_fee: f64,
    pub platform_fee_rate: f64,
    pub tax_rate: f64,
    pub normal_margin_range: MarginRange,
}

impl Default for AuditDefaults {
    fn default() -> Self {
        Self {
            currency: String::new(),
            shipping_fee: 0.0,
            platform_fee_rate: 0.1,
            tax_rate: 0.1,
            normal_margin_range: MarginRange::default(),
        }
    }
}

/// Cost components of one audit with every default filled in
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    pub currency: String,
    pub shipping_fee: f64,
    pub platform_fee_rate: f64,
    pub tax_rate: f64,
    pub margin: MarginRange,
}

/// Partial update for [`AuditDefaults`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultsUpdate {
    pub currency: Option<String>,
    pub shipping_fee: Option<f64>,
    pub platform_fee_rate: Option<f64>,
    pub tax_rate: Option<f64>,
    pub normal_margin_range: Option<MarginRange>,
}

impl AuditDefaults {
    /// Fill the input's missing cost components from these defaults
    pub fn resolve(&self, input: &PriceAuditInput) -> CostModel {
        let currency = if input.currency.is_empty() {
            self.currency.clone()
        } else {
            input.currency.clone()
        };

        CostModel {
            currency,
            shipping_fee: input.shipping_fee.unwrap_or(self.shipping_fee),
            platform_fee_rate: input.platform_fee_rate.unwrap_or(self.platform_fee_rate),
            tax_rate: input.tax_rate.unwrap_or(self.tax_rate),
            margin: input.normal_margin_range.unwrap_or(self.normal_margin_range),
        }
    }

    /// Apply a partial update, returning the new validated defaults
    pub fn apply(&self, update: &DefaultsUpdate) -> Result<Self, ConfigError> {
        let next = Self {
            currency: update.currency.clone().unwrap_or_else(|| self.currency.clone()),
            shipping_fee: update.shipping_fee.unwrap_or(self.shipping_fee),
            platform_fee_rate: update.platform_fee_rate.unwrap_or(self.platform_fee_rate),
            tax_rate: update.tax_rate.unwrap_or(self.tax_rate),
            normal_margin_range: update.normal_margin_range.unwrap_or(self.normal_margin_range),
        };
        next.validate()?;
        Ok(next)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("shippingFee", self.shipping_fee, f64::MAX)?;
        check_non_negative("platformFeeRate", self.platform_fee_rate, MAX_RATE)?;
        check_non_negative("taxRate", self.tax_rate, MAX_RATE)?;
        check_non_negative("normalMarginRange.min", self.normal_margin_range.min, MAX_RATE)?;
        check_non_negative("normalMarginRange.max", self.normal_margin_range.max, MAX_RATE)?;

        if self.normal_margin_range.min > self.normal_margin_range.max {
            return Err(ConfigError::InvalidDefault {
                field: "normalMarginRange",
                reason: format!(
                    "min {} exceeds max {}",
                    self.normal_margin_range.min, self.normal_margin_range.max
                ),
            });
        }
        Ok(())
    }
}

fn check_non_negative(field: &'static str, value: f64, max: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidDefault {
            field,
            reason: format!("{} must be a finite non-negative number", value),
        });
    }
    if value > max {
        return Err(ConfigError::InvalidDefault {
            field,
            reason: format!("{} exceeds limit {}", value, max),
        });
    }
    Ok(())
}

/// Holds the live audit defaults
pub struct ConfigManager {
    defaults: RwLock<AuditDefaults>,
}

impl ConfigManager {
    pub fn new(defaults: AuditDefaults) -> Self {
        info!(
            "ConfigManager initialized: platform_fee={:.1}%, tax={:.1}%, shipping={}, margin={:.0}%-{:.0}%",
            defaults.platform_fee_rate * 100.0,
            defaults.tax_rate * 100.0,
            defaults.shipping_fee,
            defaults.normal_margin_range.min * 100.0,
            defaults.normal_margin_range.max * 100.0
        );

        Self {
            defaults: RwLock::new(defaults),
        }
    }

    /// Get current defaults
    pub fn get_defaults(&self) -> AuditDefaults {
        self.defaults.read().clone()
    }

    /// Validate and replace the defaults
    pub fn update_defaults(&self, update: &DefaultsUpdate) -> Result<AuditDefaults, ConfigError> {
        let mut defaults = self.defaults.write();
        let next = defaults.apply(update)?;
        *defaults = next.clone();
        info!(
            "Updated audit defaults: platform_fee={:.1}%, tax={:.1}%, shipping={}, margin={:.0}%-{:.0}%",
            next.platform_fee_rate * 100.0,
            next.tax_rate * 100.0,
            next.shipping_fee,
            next.normal_margin_range.min * 100.0,
            next.normal_margin_range.max * 100.0
        );
        Ok(next)
    }

    /// Engine bound to a snapshot of the current defaults
    pub fn engine(&self) -> PriceAuditEngine {
        PriceAuditEngine::new(self.get_defaults())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new(AuditDefaults::default())
    }
}

/// HTTP server settings read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub cors_allow_any: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            cors_allow_any: true,
        }
    }
}

impl ServerConfig {
    /// Read `HOST`, `PORT` and `CORS_ALLOW_ANY`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key: "HOST", value: host.clone() })?;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key: "PORT", value: port.clone() })?;
        }
        if let Some(flag) = lookup("CORS_ALLOW_ANY") {
            config.cors_allow_any = match flag.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(ConfigError::InvalidEnv { key: "CORS_ALLOW_ANY", value: flag }),
            };
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_values() {
        let defaults = AuditDefaults::default();
        assert_eq!(defaults.shipping_fee, 0.0);
        assert_eq!(defaults.platform_fee_rate, 0.1);
        assert_eq!(defaults.tax_rate, 0.1);
        assert_eq!(defaults.normal_margin_range, MarginRange { min: 0.2, max: 0.5 });
    }

    #[test]
    fn test_resolve_prefers_input_values() {
        let mut input = PriceAuditInput::new("KRW", 10000.0, 20000.0);
        input.shipping_fee = Some(3000.0);
        input.tax_rate = Some(0.0);

        let model = AuditDefaults::default().resolve(&input);
        assert_eq!(model.shipping_fee, 3000.0);
        assert_eq!(model.tax_rate, 0.0);
        assert_eq!(model.platform_fee_rate, 0.1);
        assert_eq!(model.margin, MarginRange::default());
        assert_eq!(model.currency, "KRW");
    }

    #[test]
    fn test_resolve_falls_back_to_default_currency() {
        let defaults = AuditDefaults { currency: "USD".to_string(), ..AuditDefaults::default() };
        let model = defaults.resolve(&PriceAuditInput::new("", 10.0, 20.0));
        assert_eq!(model.currency, "USD");

        let stock = AuditDefaults::default().resolve(&PriceAuditInput::new("", 10.0, 20.0));
        assert_eq!(stock.currency, "");
    }

    #[test]
    fn test_update_rejects_inverted_margin() {
        let manager = ConfigManager::default();
        let update = DefaultsUpdate {
            normal_margin_range: Some(MarginRange { min: 0.6, max: 0.3 }),
            ..Default::default()
        };
        assert!(manager.update_defaults(&update).is_err());
        // Unchanged after a rejected update
        assert_eq!(manager.get_defaults(), AuditDefaults::default());
    }

    #[test]
    fn test_update_rejects_negative_and_non_finite() {
        let defaults = AuditDefaults::default();
        let negative = DefaultsUpdate { tax_rate: Some(-0.1), ..Default::default() };
        assert!(defaults.apply(&negative).is_err());
        let infinite = DefaultsUpdate { shipping_fee: Some(f64::INFINITY), ..Default::default() };
        assert!(defaults.apply(&infinite).is_err());
        let huge = DefaultsUpdate { platform_fee_rate: Some(25.0), ..Default::default() };
        assert!(defaults.apply(&huge).is_err());
    }

    #[test]
    fn test_update_applies_partial_changes() {
        let manager = ConfigManager::default();
        let update = DefaultsUpdate { shipping_fee: Some(2500.0), ..Default::default() };
        let next = manager.update_defaults(&update).unwrap();
        assert_eq!(next.shipping_fee, 2500.0);
        assert_eq!(next.tax_rate, 0.1);
        assert_eq!(manager.engine().defaults().shipping_fee, 2500.0);
    }

    #[test]
    fn test_server_config_from_lookup() {
        let env: HashMap<&str, &str> = [("PORT", "9100"), ("HOST", "127.0.0.1"), ("CORS_ALLOW_ANY", "false")]
            .into_iter()
            .collect();
        let config = ServerConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(!config.cors_allow_any);

        let empty = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(empty, ServerConfig::default());
    }

    #[test]
    fn test_server_config_rejects_bad_port() {
        let err = ServerConfig::from_lookup(|k| (k == "PORT").then(|| "eighty".to_string())).unwrap_err();
        assert_eq!(err, ConfigError::InvalidEnv { key: "PORT", value: "eighty".to_string() });
    }
}
