//! Bill-level tax breakdown produced by the calculator

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::tax::rounding::round_whole;
use crate::types::{BillingMode, PriceConvention};

/// Tax figures for one line, for invoice and print rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineTax {
    pub description: String,
    pub quantity: u32,
    /// Unit price as entered
    pub unit_price: BigDecimal,
    /// Rate actually applied to this line
    pub gst_rate: BigDecimal,
    /// Taxable value of the line
    pub taxable_amount: BigDecimal,
    pub gst_amount: BigDecimal,
    /// Line total including GST
    pub total_amount: BigDecimal,
}

/// Complete tax breakdown for a bill.
///
/// Amounts are rounded to two decimals. `total_tax == cgst + sgst + igst` and
/// `total_amount == subtotal + total_tax` hold exactly; per-line figures are
/// rounded individually and may differ from the bill totals by a few paise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// Taxable value of the bill
    pub subtotal: BigDecimal,
    pub cgst: BigDecimal,
    pub sgst: BigDecimal,
    pub igst: BigDecimal,
    pub total_tax: BigDecimal,
    /// Bill total including GST
    pub total_amount: BigDecimal,
    pub is_interstate: bool,
    /// Effective rate, rounded to two decimals
    pub gst_rate: BigDecimal,
    pub mode: BillingMode,
    pub convention: PriceConvention,
    pub lines: Vec<LineTax>,
}

/// Final amount shown to the customer, rounded to a whole unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayTotal {
    pub final_amount: BigDecimal,
    /// `final_amount - total_amount`, positive when rounded up
    pub round_off: BigDecimal,
}

impl TaxBreakdown {
    /// Whole-unit total for display. Stored amounts are not affected.
    pub fn display_total(&self) -> DisplayTotal {
        let final_amount = round_whole(&self.total_amount);
        let round_off = &final_amount - &self.total_amount;
        DisplayTotal {
            final_amount,
            round_off,
        }
    }

    pub fn has_tax(&self) -> bool {
        self.total_tax != BigDecimal::from(0)
    }
}
