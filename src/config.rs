//! Company tax settings and bill numbering configuration

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::tax::jurisdiction::normalize_state;
use crate::utils::decimal;
use crate::utils::validation::validate_gst_rate;

/// Rate used when neither the item nor the state table provides one
pub const DEFAULT_GST_RATE: i32 = 18;
/// Zero-padding width of bill number sequences
pub const DEFAULT_SEQUENCE_WIDTH: usize = 4;
/// Prefix for demo bills
pub const DEFAULT_DEMO_PREFIX: &str = "DEMO";

/// Tax settings of the issuing company.
///
/// State names are normalised when inserted, so lookups are case and
/// whitespace insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TaxConfigFile", into = "TaxConfigFile")]
pub struct TaxConfig {
    default_rate: BigDecimal,
    seller_state: Option<String>,
    state_rates: HashMap<String, BigDecimal>,
}

impl TaxConfig {
    /// Create a configuration with the given default rate and no state table
    pub fn new(default_rate: BigDecimal) -> Result<Self, ConfigError> {
        validate_gst_rate(&default_rate).map_err(|e| ConfigError::InvalidRate(e.to_string()))?;
        Ok(Self {
            default_rate,
            seller_state: None,
            state_rates: HashMap::new(),
        })
    }

    /// Set the state the company is registered in
    pub fn with_seller_state(mut self, state: impl Into<String>) -> Self {
        self.seller_state = Some(state.into());
        self
    }

    /// Add or replace the rate configured for a state
    pub fn insert_state_rate(&mut self, state: &str, rate: BigDecimal) -> Result<(), ConfigError> {
        let key = normalize_state(state)
            .ok_or_else(|| ConfigError::InvalidRate("State name cannot be empty".to_string()))?;
        validate_gst_rate(&rate)
            .map_err(|e| ConfigError::InvalidRate(format!("{}: {}", state, e)))?;
        self.state_rates.insert(key, rate);
        Ok(())
    }

    pub fn default_rate(&self) -> &BigDecimal {
        &self.default_rate
    }

    pub fn seller_state(&self) -> Option<&str> {
        self.seller_state.as_deref()
    }

    /// Rate configured for a state, if any
    pub fn state_rate(&self, state: &str) -> Option<&BigDecimal> {
        normalize_state(state).and_then(|key| self.state_rates.get(&key))
    }

    /// The state's configured rate when present and positive, else the default rate
    pub fn resolve_rate(&self, state: Option<&str>) -> BigDecimal {
        state
            .and_then(|state| self.state_rate(state))
            .filter(|rate| **rate > BigDecimal::from(0))
            .unwrap_or(&self.default_rate)
            .clone()
    }
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            default_rate: BigDecimal::from(DEFAULT_GST_RATE),
            seller_state: None,
            state_rates: HashMap::new(),
        }
    }
}

/// Serialized form of [`TaxConfig`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxConfigFile {
    #[serde(deserialize_with = "decimal::deserialize")]
    default_rate: BigDecimal,
    seller_state: Option<String>,
    #[serde(deserialize_with = "decimal::deserialize_map")]
    state_rates: HashMap<String, BigDecimal>,
}

impl Default for TaxConfigFile {
    fn default() -> Self {
        TaxConfig::default().into()
    }
}

impl TryFrom<TaxConfigFile> for TaxConfig {
    type Error = ConfigError;

    fn try_from(file: TaxConfigFile) -> Result<Self, Self::Error> {
        let mut config = TaxConfig::new(file.default_rate)?;
        config.seller_state = file.seller_state;
        for (state, rate) in file.state_rates {
            config.insert_state_rate(&state, rate)?;
        }
        Ok(config)
    }
}

impl From<TaxConfig> for TaxConfigFile {
    fn from(config: TaxConfig) -> Self {
        Self {
            default_rate: config.default_rate,
            seller_state: config.seller_state,
            state_rates: config.state_rates,
        }
    }
}

/// Bill number formatting settings.
///
/// Always valid once constructed: the width is 1 to 9 digits and the demo
/// prefix is non-empty, free of `/` and distinct from the reserved prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NumberingConfigFile", into = "NumberingConfigFile")]
pub struct NumberingConfig {
    width: usize,
    demo_prefix: String,
}

impl NumberingConfig {
    pub fn new(width: usize, demo_prefix: impl Into<String>) -> Result<Self, ConfigError> {
        let demo_prefix = demo_prefix.into().trim().to_string();

        if !(1..=9).contains(&width) {
            return Err(ConfigError::InvalidNumbering(format!(
                "Sequence width must be between 1 and 9, got {}",
                width
            )));
        }

        if demo_prefix.is_empty() || demo_prefix.contains('/') {
            return Err(ConfigError::InvalidNumbering(format!(
                "Demo prefix must be non-empty and contain no '/': {:?}",
                demo_prefix
            )));
        }

        if matches!(demo_prefix.as_str(), "GST" | "NGST" | "QUO") {
            return Err(ConfigError::InvalidNumbering(format!(
                "Demo prefix {:?} collides with a reserved prefix",
                demo_prefix
            )));
        }

        Ok(Self { width, demo_prefix })
    }

    /// Zero-padding width of the sequence part
    pub fn width(&self) -> usize {
        self.width
    }

    /// Prefix used for demo bills
    pub fn demo_prefix(&self) -> &str {
        &self.demo_prefix
    }
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SEQUENCE_WIDTH,
            demo_prefix: DEFAULT_DEMO_PREFIX.to_string(),
        }
    }
}

/// Serialized form of [`NumberingConfig`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NumberingConfigFile {
    width: usize,
    demo_prefix: String,
}

impl Default for NumberingConfigFile {
    fn default() -> Self {
        NumberingConfig::default().into()
    }
}

impl TryFrom<NumberingConfigFile> for NumberingConfig {
    type Error = ConfigError;

    fn try_from(file: NumberingConfigFile) -> Result<Self, Self::Error> {
        NumberingConfig::new(file.width, file.demo_prefix)
    }
}

impl From<NumberingConfig> for NumberingConfigFile {
    fn from(config: NumberingConfig) -> Self {
        Self {
            width: config.width,
            demo_prefix: config.demo_prefix,
        }
    }
}

/// Complete billing configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    pub tax: TaxConfig,
    pub numbering: NumberingConfig,
}

impl BillingConfig {
    /// Parse a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid tax rate: {0}")]
    InvalidRate(String),
    #[error("Invalid numbering settings: {0}")]
    InvalidNumbering(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults() {
        let config = BillingConfig::default();
        assert_eq!(config.tax.default_rate(), &BigDecimal::from(18));
        assert_eq!(config.tax.seller_state(), None);
        assert_eq!(config.numbering.width(), 4);
        assert_eq!(config.numbering.demo_prefix(), "DEMO");
    }

    #[test]
    fn test_from_json() {
        let config = BillingConfig::from_json_str(
            r#"{
                "tax": {
                    "defaultRate": 12,
                    "sellerState": "Tamil Nadu",
                    "stateRates": { " KERALA ": "5", "Goa": 28 }
                },
                "numbering": { "width": 5, "demoPrefix": "TRY" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.tax.default_rate(), &BigDecimal::from(12));
        assert_eq!(config.tax.seller_state(), Some("Tamil Nadu"));
        assert_eq!(config.tax.state_rate("kerala"), Some(&BigDecimal::from(5)));
        assert_eq!(config.tax.state_rate("GOA"), Some(&BigDecimal::from(28)));
        assert_eq!(config.numbering.width(), 5);
        assert_eq!(config.numbering.demo_prefix(), "TRY");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = BillingConfig::from_json_str(r#"{"tax": {"sellerState": "Goa"}}"#).unwrap();
        assert_eq!(config.tax.default_rate(), &BigDecimal::from(18));
        assert_eq!(config.numbering, NumberingConfig::default());
    }

    #[test]
    fn test_rejects_out_of_range_rates() {
        let result = BillingConfig::from_json_str(r#"{"tax": {"defaultRate": 150}}"#);
        assert!(result.is_err());

        let result = BillingConfig::from_json_str(r#"{"tax": {"stateRates": {"Goa": -1}}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_bad_numbering() {
        assert!(BillingConfig::from_json_str(r#"{"numbering": {"width": 0}}"#).is_err());
        assert!(BillingConfig::from_json_str(r#"{"numbering": {"demoPrefix": "GST"}}"#).is_err());
        assert!(BillingConfig::from_json_str(r#"{"numbering": {"demoPrefix": "A/B"}}"#).is_err());
    }

    #[test]
    fn test_numbering_is_validated_on_every_path() {
        assert!(NumberingConfig::new(4, "GST").is_err());
        assert!(NumberingConfig::new(4, "  ").is_err());
        assert!(NumberingConfig::new(10, "DEMO").is_err());
        assert_eq!(NumberingConfig::new(3, " TRY ").unwrap().demo_prefix(), "TRY");

        // Plain serde goes through the same checks
        assert!(serde_json::from_str::<BillingConfig>(r#"{"numbering": {"demoPrefix": "NGST"}}"#).is_err());
        assert!(serde_json::from_str::<NumberingConfig>(r#"{"demoPrefix": ""}"#).is_err());
        assert!(serde_json::from_str::<NumberingConfig>(r#"{"width": 99}"#).is_err());

        let round_trip: NumberingConfig =
            serde_json::from_value(serde_json::to_value(NumberingConfig::default()).unwrap())
                .unwrap();
        assert_eq!(round_trip, NumberingConfig::default());
    }

    #[test]
    fn test_json_rates_are_exact() {
        let config = BillingConfig::from_json_str(
            r#"{"tax": {"defaultRate": 0.1, "stateRates": {"Goa": 2.675}}}"#,
        )
        .unwrap();
        assert_eq!(config.tax.default_rate(), &BigDecimal::from_str("0.1").unwrap());
        assert_eq!(
            config.tax.state_rate("goa"),
            Some(&BigDecimal::from_str("2.675").unwrap())
        );
    }

    #[test]
    fn test_resolve_rate() {
        let mut config = TaxConfig::default();
        config.insert_state_rate("Kerala", BigDecimal::from(12)).unwrap();
        config.insert_state_rate("Goa", BigDecimal::from(0)).unwrap();

        assert_eq!(config.resolve_rate(Some("kerala")), BigDecimal::from(12));
        assert_eq!(config.resolve_rate(Some("Goa")), BigDecimal::from(18));
        assert_eq!(config.resolve_rate(Some("Punjab")), BigDecimal::from(18));
        assert_eq!(config.resolve_rate(None), BigDecimal::from(18));
        assert!(config
            .insert_state_rate("Kerala", BigDecimal::from_str("100.5").unwrap())
            .is_err());
    }
}
