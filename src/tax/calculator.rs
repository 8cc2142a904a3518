//! Bill-level GST calculation engine

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::TaxConfig;
use crate::tax::breakdown::{LineTax, TaxBreakdown};
use crate::tax::gst::{GstCalculation, GstRate, TaxError};
use crate::tax::jurisdiction::{Jurisdiction, TaxJurisdictionPair, TaxSplit};
use crate::tax::rounding::round_currency;
use crate::types::{BillingMode, LineItem, PriceConvention};
use crate::utils::validation::validate_gst_rate;

/// Where the rate applied to each line comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePolicy {
    /// Each line uses its own `gst_rate`
    #[default]
    ItemRates,
    /// One rate for the bill: the buyer state's configured rate, else the default rate
    Configured,
    /// One rate for the bill: the amount-weighted average of the item rates
    Weighted,
}

/// Options for a bill calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalculationOptions {
    pub mode: BillingMode,
    pub convention: PriceConvention,
    pub policy: RatePolicy,
}

impl CalculationOptions {
    pub fn new(mode: BillingMode, convention: PriceConvention) -> Self {
        Self {
            mode,
            convention,
            policy: RatePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RatePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// GST calculation engine.
///
/// Pure: holds read-only configuration and never performs I/O, so a single
/// instance can be shared freely between threads.
#[derive(Debug, Clone, Default)]
pub struct TaxCalculator {
    config: TaxConfig,
}

impl TaxCalculator {
    /// Create a new calculator over the given tax configuration
    pub fn new(config: TaxConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TaxConfig {
        &self.config
    }

    /// Jurisdiction pair for a buyer, using the configured seller state
    pub fn jurisdiction_for(&self, buyer_state: Option<&str>) -> TaxJurisdictionPair {
        TaxJurisdictionPair::from_options(self.config.seller_state(), buyer_state)
    }

    /// Forward calculation for one item: tax added on top of a tax-exclusive price
    pub fn forward(
        &self,
        item: &LineItem,
        jurisdiction: Jurisdiction,
    ) -> Result<GstCalculation, TaxError> {
        item.validate()?;
        GstCalculation::calculate(
            item.line_amount(),
            GstRate::for_jurisdiction(item.gst_rate.clone(), jurisdiction),
        )
    }

    /// Reverse calculation: extract tax from a GST-inclusive entered total
    pub fn reverse(
        &self,
        entered_total: BigDecimal,
        gst_rate: BigDecimal,
        jurisdiction: Jurisdiction,
    ) -> Result<GstCalculation, TaxError> {
        validate_gst_rate(&gst_rate)?;
        GstCalculation::reverse_calculate(
            entered_total,
            GstRate::for_jurisdiction(gst_rate, jurisdiction),
        )
    }

    /// Calculate the full tax breakdown of a bill.
    ///
    /// Every line is validated before anything is computed. In GST mode the
    /// jurisdiction must be resolvable; Non-GST bills carry no tax and do not
    /// need one.
    pub fn calculate(
        &self,
        items: &[LineItem],
        pair: &TaxJurisdictionPair,
        options: CalculationOptions,
    ) -> Result<TaxBreakdown, TaxError> {
        for item in items {
            item.validate()?;
        }

        let jurisdiction = match options.mode {
            BillingMode::Gst => Some(pair.resolve().inspect_err(|e| {
                warn!(error = %e, "GST bill without a resolvable jurisdiction");
            })?),
            BillingMode::NonGst => pair.resolve().ok(),
        };

        let bill_rate = match (options.mode, options.policy) {
            (BillingMode::NonGst, _) => Some(BigDecimal::from(0)),
            (BillingMode::Gst, RatePolicy::ItemRates) => None,
            (BillingMode::Gst, RatePolicy::Configured) => {
                Some(self.config.resolve_rate(pair.buyer_state.as_deref()))
            }
            (BillingMode::Gst, RatePolicy::Weighted) => Some(weighted_rate(items)),
        };

        debug!(
            items = items.len(),
            mode = ?options.mode,
            policy = ?options.policy,
            jurisdiction = ?jurisdiction,
            bill_rate = ?bill_rate,
            "Calculating bill tax"
        );

        let mut taxable_total = BigDecimal::from(0);
        let mut gst_total = BigDecimal::from(0);
        let mut entered_total = BigDecimal::from(0);
        let mut lines = Vec::with_capacity(items.len());

        for item in items {
            let rate = bill_rate.clone().unwrap_or_else(|| item.gst_rate.clone());
            let entered = item.line_amount();
            let (taxable, gst) = apportion(&entered, &rate, options.convention);
            let (line_taxable, line_gst, line_total) =
                settle(&taxable, &gst, &entered, options.convention);

            lines.push(LineTax {
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price.clone(),
                gst_rate: rate,
                taxable_amount: line_taxable,
                gst_amount: line_gst,
                total_amount: line_total,
            });

            taxable_total += taxable;
            gst_total += gst;
            entered_total += entered;
        }

        let (subtotal, total_tax, total_amount) =
            settle(&taxable_total, &gst_total, &entered_total, options.convention);

        let effective_rate = match bill_rate {
            Some(rate) => round_currency(&rate),
            None if taxable_total == BigDecimal::from(0) => BigDecimal::from(0),
            None => round_currency(&(&gst_total * BigDecimal::from(100) / &taxable_total)),
        };

        let split = match jurisdiction {
            Some(jurisdiction) => jurisdiction.split(&total_tax),
            None => TaxSplit {
                cgst: BigDecimal::from(0),
                sgst: BigDecimal::from(0),
                igst: BigDecimal::from(0),
            },
        };

        Ok(TaxBreakdown {
            subtotal,
            cgst: split.cgst,
            sgst: split.sgst,
            igst: split.igst,
            total_tax,
            total_amount,
            is_interstate: jurisdiction.is_some_and(|j| j.is_interstate()),
            gst_rate: effective_rate,
            mode: options.mode,
            convention: options.convention,
            lines,
        })
    }
}

/// Amount-weighted GST rate over the items, unrounded.
///
/// `(Σ amount × rate / 100) / Σ amount × 100`, or 0 when the amounts sum to 0.
pub fn weighted_rate(items: &[LineItem]) -> BigDecimal {
    let mut amount_total = BigDecimal::from(0);
    let mut tax_total = BigDecimal::from(0);

    for item in items {
        let amount = item.line_amount();
        tax_total += &amount * &item.gst_rate / BigDecimal::from(100);
        amount_total += amount;
    }

    if amount_total == BigDecimal::from(0) {
        return BigDecimal::from(0);
    }

    tax_total / amount_total * BigDecimal::from(100)
}

/// Split an entered amount into unrounded (taxable, gst)
fn apportion(
    entered: &BigDecimal,
    rate: &BigDecimal,
    convention: PriceConvention,
) -> (BigDecimal, BigDecimal) {
    match convention {
        PriceConvention::Exclusive => {
            let gst = entered * rate / BigDecimal::from(100);
            (entered.clone(), gst)
        }
        PriceConvention::Inclusive => {
            let taxable = entered * BigDecimal::from(100) / (BigDecimal::from(100) + rate);
            let gst = entered - &taxable;
            (taxable, gst)
        }
    }
}

/// Round unrounded figures into (taxable, tax, total) that add up exactly.
///
/// Inclusive prices keep the entered total; exclusive prices keep the taxable value.
fn settle(
    taxable: &BigDecimal,
    gst: &BigDecimal,
    entered: &BigDecimal,
    convention: PriceConvention,
) -> (BigDecimal, BigDecimal, BigDecimal) {
    let taxable = round_currency(taxable);
    match convention {
        PriceConvention::Inclusive => {
            let total = round_currency(entered);
            let tax = &total - &taxable;
            (taxable, tax, total)
        }
        PriceConvention::Exclusive => {
            let tax = round_currency(gst);
            let total = &taxable + &tax;
            (taxable, tax, total)
        }
    }
}
