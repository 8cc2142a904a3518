//! GST (Goods and Services Tax) rate structures and single-amount calculations

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::tax::jurisdiction::Jurisdiction;
use crate::tax::rounding::round_currency;
use crate::utils::validation::validate_gst_rate;

/// GST rate structure for Indian taxation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstRate {
    /// Total GST rate percentage (e.g., 18.0 for 18%)
    pub total_rate: BigDecimal,
    /// CGST rate percentage (Central GST)
    pub cgst_rate: BigDecimal,
    /// SGST rate percentage (State GST)
    pub sgst_rate: BigDecimal,
    /// IGST rate percentage (Integrated GST)
    pub igst_rate: BigDecimal,
}

impl GstRate {
    /// Create a new GST rate with intra-state rates (CGST + SGST)
    pub fn intra_state(total_rate: BigDecimal) -> Self {
        let half_rate = &total_rate / BigDecimal::from(2);
        Self {
            total_rate,
            cgst_rate: half_rate.clone(),
            sgst_rate: half_rate,
            igst_rate: BigDecimal::from(0),
        }
    }

    /// Create a new GST rate with inter-state rates (IGST)
    pub fn inter_state(total_rate: BigDecimal) -> Self {
        Self {
            total_rate: total_rate.clone(),
            cgst_rate: BigDecimal::from(0),
            sgst_rate: BigDecimal::from(0),
            igst_rate: total_rate,
        }
    }

    /// Create the component rates for a resolved jurisdiction
    pub fn for_jurisdiction(total_rate: BigDecimal, jurisdiction: Jurisdiction) -> Self {
        match jurisdiction {
            Jurisdiction::Intrastate => Self::intra_state(total_rate),
            Jurisdiction::Interstate => Self::inter_state(total_rate),
        }
    }

    /// Whether the IGST component carries the tax
    pub fn is_inter_state(&self) -> bool {
        self.igst_rate > BigDecimal::from(0)
    }

    /// Validate that the GST rate structure is correct
    pub fn validate(&self) -> Result<(), TaxError> {
        validate_gst_rate(&self.total_rate)?;

        let calculated_total = &self.cgst_rate + &self.sgst_rate + &self.igst_rate;

        if calculated_total != self.total_rate {
            return Err(TaxError::InvalidRate(format!(
                "GST components don't add up to total rate: {} != {}",
                calculated_total, self.total_rate
            )));
        }

        // For intra-state transactions, CGST and SGST should be equal
        if self.igst_rate == BigDecimal::from(0) && self.cgst_rate != self.sgst_rate {
            return Err(TaxError::InvalidRate(
                "CGST and SGST rates must be equal for intra-state transactions".to_string(),
            ));
        }

        // For inter-state transactions, only IGST should be non-zero
        if self.igst_rate > BigDecimal::from(0)
            && (self.cgst_rate > BigDecimal::from(0) || self.sgst_rate > BigDecimal::from(0))
        {
            return Err(TaxError::InvalidRate(
                "Only IGST should be applicable for inter-state transactions".to_string(),
            ));
        }

        Ok(())
    }
}

/// Detailed GST calculation breakdown for a single amount
///
/// All amounts are rounded to two decimals. Rounding happens once, on the
/// final values, and `total_amount == base_amount + total_gst_amount` holds
/// exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstCalculation {
    /// Base amount (before GST)
    pub base_amount: BigDecimal,
    /// GST rate used for calculation
    pub gst_rate: GstRate,
    /// Calculated CGST amount
    pub cgst_amount: BigDecimal,
    /// Calculated SGST amount
    pub sgst_amount: BigDecimal,
    /// Calculated IGST amount
    pub igst_amount: BigDecimal,
    /// Total GST amount (CGST + SGST + IGST)
    pub total_gst_amount: BigDecimal,
    /// Total amount including GST
    pub total_amount: BigDecimal,
}

impl GstCalculation {
    /// Calculate GST on top of a tax-exclusive base amount
    pub fn calculate(base_amount: BigDecimal, gst_rate: GstRate) -> Result<Self, TaxError> {
        gst_rate.validate()?;
        if base_amount < BigDecimal::from(0) {
            return Err(TaxError::InvalidInput(format!(
                "Base amount cannot be negative: {}",
                base_amount
            )));
        }

        let raw_gst = (&base_amount * &gst_rate.total_rate) / BigDecimal::from(100);
        let base_amount = round_currency(&base_amount);
        let total_gst_amount = round_currency(&raw_gst);
        let total_amount = &base_amount + &total_gst_amount;

        Ok(Self::assemble(
            base_amount,
            gst_rate,
            total_gst_amount,
            total_amount,
        ))
    }

    /// Extract GST from a GST-inclusive total (reverse calculation)
    pub fn reverse_calculate(
        total_amount: BigDecimal,
        gst_rate: GstRate,
    ) -> Result<Self, TaxError> {
        gst_rate.validate()?;
        if total_amount < BigDecimal::from(0) {
            return Err(TaxError::InvalidInput(format!(
                "Total amount cannot be negative: {}",
                total_amount
            )));
        }

        let divisor = BigDecimal::from(100) + &gst_rate.total_rate;
        let raw_base = (&total_amount * BigDecimal::from(100)) / divisor;
        let base_amount = round_currency(&raw_base);
        let total_amount = round_currency(&total_amount);
        let total_gst_amount = &total_amount - &base_amount;

        Ok(Self::assemble(
            base_amount,
            gst_rate,
            total_gst_amount,
            total_amount,
        ))
    }

    fn assemble(
        base_amount: BigDecimal,
        gst_rate: GstRate,
        total_gst_amount: BigDecimal,
        total_amount: BigDecimal,
    ) -> Self {
        let jurisdiction = if gst_rate.is_inter_state() {
            Jurisdiction::Interstate
        } else {
            Jurisdiction::Intrastate
        };
        let split = jurisdiction.split(&total_gst_amount);

        Self {
            base_amount,
            gst_rate,
            cgst_amount: split.cgst,
            sgst_amount: split.sgst,
            igst_amount: split.igst,
            total_gst_amount,
            total_amount,
        }
    }
}

/// Standard GST slabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GstSlab {
    /// Exempt items (fresh food, medicines, etc.) - 0%
    Exempt,
    /// Reduced rate items - 5%
    Reduced,
    /// Standard rate items - 12%
    Standard,
    /// Higher rate items - 18%
    Higher,
    /// Luxury/Sin goods - 28%
    Luxury,
}

impl GstSlab {
    /// All slabs in ascending rate order
    pub const ALL: [GstSlab; 5] = [
        GstSlab::Exempt,
        GstSlab::Reduced,
        GstSlab::Standard,
        GstSlab::Higher,
        GstSlab::Luxury,
    ];

    /// Get the rate percentage for this slab
    pub fn rate(&self) -> BigDecimal {
        match self {
            GstSlab::Exempt => BigDecimal::from(0),
            GstSlab::Reduced => BigDecimal::from(5),
            GstSlab::Standard => BigDecimal::from(12),
            GstSlab::Higher => BigDecimal::from(18),
            GstSlab::Luxury => BigDecimal::from(28),
        }
    }

    /// Find the slab matching a rate percentage, if it is a standard one
    pub fn from_rate(rate: &BigDecimal) -> Option<Self> {
        Self::ALL.into_iter().find(|slab| &slab.rate() == rate)
    }

    /// Component rates for this slab in the given jurisdiction
    pub fn rate_for(&self, jurisdiction: Jurisdiction) -> GstRate {
        GstRate::for_jurisdiction(self.rate(), jurisdiction)
    }
}

/// Tax calculation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaxError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid GST rate: {0}")]
    InvalidRate(String),
    #[error("Cannot decide intrastate or interstate: {0}")]
    IndeterminateJurisdiction(String),
}
