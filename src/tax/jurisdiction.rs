//! Intrastate / interstate resolution from the seller and buyer states

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::tax::gst::TaxError;
use crate::tax::rounding::round_currency;

/// Where a supply takes place relative to the seller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Jurisdiction {
    /// Seller and buyer in the same state: CGST + SGST
    Intrastate,
    /// Seller and buyer in different states: IGST
    Interstate,
}

/// A tax amount divided into its GST components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSplit {
    pub cgst: BigDecimal,
    pub sgst: BigDecimal,
    pub igst: BigDecimal,
}

impl Jurisdiction {
    pub fn is_interstate(&self) -> bool {
        matches!(self, Jurisdiction::Interstate)
    }

    /// Divide a rounded tax total into components.
    ///
    /// For intrastate supplies CGST takes the rounded half and SGST the
    /// remainder, so the components always add back up to `total_tax`.
    pub fn split(&self, total_tax: &BigDecimal) -> TaxSplit {
        match self {
            Jurisdiction::Intrastate => {
                let cgst = round_currency(&(total_tax / BigDecimal::from(2)));
                let sgst = total_tax - &cgst;
                TaxSplit {
                    cgst,
                    sgst,
                    igst: BigDecimal::from(0),
                }
            }
            Jurisdiction::Interstate => TaxSplit {
                cgst: BigDecimal::from(0),
                sgst: BigDecimal::from(0),
                igst: total_tax.clone(),
            },
        }
    }
}

/// Seller and buyer states for a single bill
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxJurisdictionPair {
    pub seller_state: Option<String>,
    pub buyer_state: Option<String>,
}

impl TaxJurisdictionPair {
    pub fn new(seller_state: impl Into<String>, buyer_state: impl Into<String>) -> Self {
        Self {
            seller_state: Some(seller_state.into()),
            buyer_state: Some(buyer_state.into()),
        }
    }

    pub fn from_options(seller_state: Option<&str>, buyer_state: Option<&str>) -> Self {
        Self {
            seller_state: seller_state.map(str::to_string),
            buyer_state: buyer_state.map(str::to_string),
        }
    }

    /// Decide the jurisdiction.
    ///
    /// Both states must be present and non-blank; there is no implicit
    /// fallback to either side.
    pub fn resolve(&self) -> Result<Jurisdiction, TaxError> {
        let seller = self.seller_state.as_deref().and_then(normalize_state);
        let buyer = self.buyer_state.as_deref().and_then(normalize_state);

        match (seller, buyer) {
            (Some(seller), Some(buyer)) if seller == buyer => Ok(Jurisdiction::Intrastate),
            (Some(_), Some(_)) => Ok(Jurisdiction::Interstate),
            (None, Some(_)) => Err(TaxError::IndeterminateJurisdiction(
                "seller state is missing".to_string(),
            )),
            (Some(_), None) => Err(TaxError::IndeterminateJurisdiction(
                "buyer state is missing".to_string(),
            )),
            (None, None) => Err(TaxError::IndeterminateJurisdiction(
                "seller and buyer states are missing".to_string(),
            )),
        }
    }
}

/// Canonical form of a state name: trimmed, lowercased, inner whitespace collapsed.
/// Returns `None` for blank input.
pub fn normalize_state(state: &str) -> Option<String> {
    let normalized = state
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
