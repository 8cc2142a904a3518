//! Exact decimal parsing for amounts that arrive as JSON numbers or strings
//!
//! A JSON number reaches serde as an `f64`. Its shortest round-trip text is the
//! literal the caller wrote, so it is re-parsed from that text instead of
//! converting the binary value.

use bigdecimal::BigDecimal;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A decimal parsed from its written form
#[derive(Debug, Clone, PartialEq)]
pub struct ExactDecimal(pub BigDecimal);

struct ExactDecimalVisitor;

impl Visitor<'_> for ExactDecimalVisitor {
    type Value = ExactDecimal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number or a numeric string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        BigDecimal::from_str(value.trim())
            .map(ExactDecimal)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(ExactDecimal(BigDecimal::from(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(ExactDecimal(BigDecimal::from(value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if !value.is_finite() {
            return Err(E::invalid_value(de::Unexpected::Float(value), &self));
        }
        self.visit_str(&value.to_string())
    }
}

impl<'de> Deserialize<'de> for ExactDecimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ExactDecimalVisitor)
    }
}

/// `deserialize_with` helper for `BigDecimal` fields
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
    ExactDecimal::deserialize(deserializer).map(|exact| exact.0)
}

/// `deserialize_with` helper for `Option<BigDecimal>` fields
pub fn deserialize_option<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<BigDecimal>, D::Error> {
    Option::<ExactDecimal>::deserialize(deserializer).map(|exact| exact.map(|e| e.0))
}

/// `deserialize_with` helper for maps of decimals
pub fn deserialize_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<HashMap<String, BigDecimal>, D::Error> {
    HashMap::<String, ExactDecimal>::deserialize(deserializer)
        .map(|map| map.into_iter().map(|(key, exact)| (key, exact.0)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_json_numbers_keep_written_digits() {
        let parsed: Vec<ExactDecimal> =
            serde_json::from_str(r#"[2.675, 0.1, 59, -3, "112.50", " 7 "]"#).unwrap();
        let values: Vec<BigDecimal> = parsed.into_iter().map(|e| e.0).collect();

        assert_eq!(
            values,
            vec![dec("2.675"), dec("0.1"), dec("59"), dec("-3"), dec("112.50"), dec("7")]
        );
    }

    #[test]
    fn test_rejects_non_numeric_text() {
        assert!(serde_json::from_str::<ExactDecimal>(r#""twelve""#).is_err());
        assert!(serde_json::from_str::<ExactDecimal>("true").is_err());
    }

    #[test]
    fn test_map_helper() {
        #[derive(Deserialize)]
        struct Rates {
            #[serde(deserialize_with = "deserialize_map")]
            rates: HashMap<String, BigDecimal>,
        }

        let parsed: Rates = serde_json::from_str(r#"{"rates": {"Goa": 0.25}}"#).unwrap();
        assert_eq!(parsed.rates["Goa"], dec("0.25"));
    }
}
