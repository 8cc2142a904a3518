//! Core types and data structures shared across the billing core

use bigdecimal::{BigDecimal, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::billing::number::NumberingError;
use crate::tax::gst::TaxError;
use crate::utils::decimal;
use crate::utils::validation::validate_line_item;

/// How the entered unit price relates to GST
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceConvention {
    /// Entered price already contains GST; tax is extracted from it
    #[default]
    Inclusive,
    /// Entered price is the taxable value; tax is added on top
    Exclusive,
}

/// Whether GST applies to a bill at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingMode {
    #[default]
    Gst,
    NonGst,
}

/// A single line on a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item description
    pub description: String,
    /// Number of units, always positive
    pub quantity: u32,
    /// Price per unit; inclusive or exclusive of GST depending on the bill's convention
    pub unit_price: BigDecimal,
    /// GST rate percentage for this item (0-100)
    pub gst_rate: BigDecimal,
}

impl LineItem {
    /// Create a new line item
    pub fn new(
        description: impl Into<String>,
        quantity: u32,
        unit_price: BigDecimal,
        gst_rate: BigDecimal,
    ) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            gst_rate,
        }
    }

    /// `unit_price × quantity`, unrounded
    pub fn line_amount(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }

    /// Check quantity, price and rate bounds
    pub fn validate(&self) -> Result<(), TaxError> {
        validate_line_item(self)
    }
}

/// Line item as it arrives from forms and stored documents.
///
/// Field names vary between callers (`itemQuantity`, `quantity`, `qty`, ...);
/// every alias is accepted here and nowhere else.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLineItem {
    #[serde(alias = "itemName", alias = "name", alias = "productName")]
    pub description: Option<String>,
    #[serde(
        default,
        alias = "itemQuantity",
        alias = "qty",
        deserialize_with = "decimal::deserialize_option"
    )]
    pub quantity: Option<BigDecimal>,
    #[serde(
        default,
        alias = "itemPrice",
        alias = "price",
        deserialize_with = "decimal::deserialize_option"
    )]
    pub unit_price: Option<BigDecimal>,
    #[serde(
        default,
        alias = "gst",
        alias = "taxRate",
        alias = "itemGst",
        deserialize_with = "decimal::deserialize_option"
    )]
    pub gst_rate: Option<BigDecimal>,
}

impl TryFrom<RawLineItem> for LineItem {
    type Error = TaxError;

    fn try_from(raw: RawLineItem) -> Result<Self, Self::Error> {
        let quantity = raw
            .quantity
            .ok_or_else(|| TaxError::InvalidInput("Quantity is required".to_string()))?;
        if quantity.with_scale(0) != quantity {
            return Err(TaxError::InvalidInput(format!(
                "Quantity must be a whole number: {}",
                quantity
            )));
        }
        if quantity <= BigDecimal::from(0) {
            return Err(TaxError::InvalidInput(format!(
                "Quantity must be positive: {}",
                quantity
            )));
        }
        let quantity = quantity.to_u32().ok_or_else(|| {
            TaxError::InvalidInput(format!("Quantity is too large: {}", quantity))
        })?;

        let unit_price = raw
            .unit_price
            .ok_or_else(|| TaxError::InvalidInput("Unit price is required".to_string()))?;

        let item = LineItem::new(
            raw.description.unwrap_or_default(),
            quantity,
            unit_price,
            raw.gst_rate.unwrap_or_else(|| BigDecimal::from(0)),
        );
        item.validate()?;
        Ok(item)
    }
}

/// Buyer details needed for billing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    /// State of the buyer, used for the intrastate/interstate decision
    pub state: Option<String>,
    /// Buyer GSTIN, printed on B2B bills
    pub gstin: Option<String>,
}

impl Customer {
    pub fn new(name: impl Into<String>, state: Option<&str>) -> Self {
        Self {
            name: name.into(),
            state: state.map(str::to_string),
            gstin: None,
        }
    }

    /// Attach the buyer's GST identification number
    pub fn with_gstin(mut self, gstin: impl Into<String>) -> Self {
        self.gstin = Some(gstin.into().trim().to_uppercase());
        self
    }
}

/// Errors that can occur while issuing and storing bills
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Tax(#[from] TaxError),
    #[error(transparent)]
    Numbering(#[from] NumberingError),
    #[error("Duplicate bill number: {0}")]
    DuplicateBillNumber(String),
    #[error("Bill not found: {0}")]
    BillNotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Could not allocate a bill number after {0} attempts")]
    AllocationExhausted(u32),
}

/// Result type for billing operations
pub type BillingResult<T> = Result<T, BillingError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn parse_raw(json: &str) -> RawLineItem {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_raw_item_aliases() {
        let item: LineItem = parse_raw(r#"{"itemName": "Tea", "itemQuantity": 3, "itemPrice": "118.00", "gst": 18}"#)
            .try_into()
            .unwrap();
        assert_eq!(item.description, "Tea");
        assert_eq!(item.quantity, 3);
        assert_eq!(item.unit_price, BigDecimal::from(118));
        assert_eq!(item.gst_rate, BigDecimal::from(18));

        let item: LineItem = parse_raw(r#"{"name": "Rice", "qty": "2", "price": 50}"#)
            .try_into()
            .unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.gst_rate, BigDecimal::from(0));

        let item: LineItem = parse_raw(r#"{"quantity": 1, "unitPrice": 10.5, "gstRate": 5}"#)
            .try_into()
            .unwrap();
        assert_eq!(item.unit_price, BigDecimal::from_str("10.5").unwrap());
    }

    #[test]
    fn test_raw_item_rejects_bad_quantity() {
        let negative = LineItem::try_from(parse_raw(r#"{"qty": -1, "price": 10}"#));
        assert!(matches!(negative, Err(TaxError::InvalidInput(_))));

        let fractional = LineItem::try_from(parse_raw(r#"{"qty": "1.5", "price": 10}"#));
        assert!(matches!(fractional, Err(TaxError::InvalidInput(_))));

        let missing = LineItem::try_from(parse_raw(r#"{"price": 10}"#));
        assert!(matches!(missing, Err(TaxError::InvalidInput(_))));
    }

    #[test]
    fn test_raw_item_rejects_out_of_range_rate() {
        let result = LineItem::try_from(parse_raw(r#"{"qty": 1, "price": 10, "gst": 120}"#));
        assert!(matches!(result, Err(TaxError::InvalidInput(_))));
    }

    #[test]
    fn test_raw_item_prices_are_exact() {
        let item: LineItem = parse_raw(r#"{"qty": 1, "price": 2.675, "gst": 0}"#)
            .try_into()
            .unwrap();
        assert_eq!(item.unit_price, BigDecimal::from_str("2.675").unwrap());

        let breakdown = crate::tax::calculator::TaxCalculator::default()
            .calculate(
                &[item],
                &crate::tax::jurisdiction::TaxJurisdictionPair::new("Karnataka", "Karnataka"),
                crate::tax::calculator::CalculationOptions::new(
                    BillingMode::Gst,
                    PriceConvention::Exclusive,
                ),
            )
            .unwrap();
        assert_eq!(breakdown.subtotal, BigDecimal::from_str("2.68").unwrap());
        assert_eq!(breakdown.total_amount, BigDecimal::from_str("2.68").unwrap());
    }

    #[test]
    fn test_customer_gstin_is_normalised() {
        let customer = Customer::new("Asha Traders", Some("Kerala")).with_gstin(" 32abcde1234f1z5 ");
        assert_eq!(customer.gstin.as_deref(), Some("32ABCDE1234F1Z5"));
    }

    #[test]
    fn test_line_amount() {
        let item = LineItem::new("Pen", 4, BigDecimal::from_str("12.25").unwrap(), BigDecimal::from(12));
        assert_eq!(item.line_amount(), BigDecimal::from(49));
    }
}
