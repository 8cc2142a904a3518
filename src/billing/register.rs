//! Bill register that coordinates tax calculation, numbering and storage

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::billing::bill::{Bill, BillDraft};
use crate::billing::number::{BillNumber, BillNumberGenerator, BillType, FinancialYear};
use crate::config::BillingConfig;
use crate::tax::breakdown::TaxBreakdown;
use crate::tax::calculator::{CalculationOptions, RatePolicy, TaxCalculator};
use crate::traits::*;
use crate::types::*;

/// How bill numbers are allocated against the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// Atomic increment-and-fetch counter per bill type and financial year
    #[default]
    AtomicCounter,
    /// Scan issued numbers, take max + 1 and rely on the repository's
    /// duplicate check, retrying up to `max_attempts` times on conflict.
    /// At least one attempt is always made.
    ScanExisting { max_attempts: u32 },
}

/// Main register that issues and stores bills
pub struct BillRegister<R: BillRepository> {
    repository: R,
    calculator: TaxCalculator,
    generator: BillNumberGenerator,
    strategy: AllocationStrategy,
    rate_policy: RatePolicy,
    validator: Box<dyn BillValidator>,
}

impl<R: BillRepository> BillRegister<R> {
    /// Create a new register with the given repository and configuration
    pub fn new(repository: R, config: BillingConfig) -> Self {
        Self::with_validator(repository, config, Box::new(DefaultBillValidator))
    }

    /// Create a new register with a custom validator
    pub fn with_validator(
        repository: R,
        config: BillingConfig,
        validator: Box<dyn BillValidator>,
    ) -> Self {
        Self {
            repository,
            calculator: TaxCalculator::new(config.tax),
            generator: BillNumberGenerator::new(config.numbering),
            strategy: AllocationStrategy::default(),
            rate_policy: RatePolicy::default(),
            validator,
        }
    }

    pub fn with_strategy(mut self, strategy: AllocationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_rate_policy(mut self, rate_policy: RatePolicy) -> Self {
        self.rate_policy = rate_policy;
        self
    }

    pub fn calculator(&self) -> &TaxCalculator {
        &self.calculator
    }

    pub fn generator(&self) -> &BillNumberGenerator {
        &self.generator
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Compute the tax breakdown of a draft without numbering or saving it
    pub fn preview(&self, draft: &BillDraft) -> BillingResult<TaxBreakdown> {
        let pair = self
            .calculator
            .jurisdiction_for(draft.customer.state.as_deref());
        let options = CalculationOptions::new(draft.bill_type.billing_mode(), draft.convention)
            .with_policy(self.rate_policy);

        Ok(self.calculator.calculate(&draft.items, &pair, options)?)
    }

    /// The number the next bill of this type would get, from the stored numbers.
    ///
    /// Informational only; the number is not reserved.
    pub async fn peek_next_number(
        &self,
        bill_type: BillType,
        date: NaiveDate,
    ) -> BillingResult<BillNumber> {
        let existing = self.repository.list_bill_numbers(bill_type).await?;
        Ok(self.generator.next_number(bill_type, date, &existing)?)
    }

    /// Validate, calculate, number and save a bill
    #[instrument(skip(self, draft), fields(bill_type = ?draft.bill_type, date = %draft.date))]
    pub async fn issue(&self, draft: BillDraft) -> BillingResult<Bill> {
        self.validator.validate_draft(&draft)?;
        let breakdown = self.preview(&draft)?;
        let financial_year = self.generator.financial_year(draft.date);

        let bill = match self.strategy {
            AllocationStrategy::AtomicCounter => {
                self.issue_with_counter(draft, breakdown, financial_year)
                    .await?
            }
            AllocationStrategy::ScanExisting { max_attempts } => {
                self.issue_with_scan(draft, breakdown, financial_year, max_attempts)
                    .await?
            }
        };

        info!(
            bill_id = %bill.id,
            number = %bill.number,
            total = %bill.breakdown.total_amount,
            "Bill issued"
        );
        Ok(bill)
    }

    async fn issue_with_counter(
        &self,
        draft: BillDraft,
        breakdown: TaxBreakdown,
        financial_year: FinancialYear,
    ) -> BillingResult<Bill> {
        let sequence = self
            .repository
            .next_sequence(draft.bill_type, financial_year)
            .await?;
        let number = self
            .generator
            .format(draft.bill_type, financial_year, sequence)?;
        debug!(number = %number, "Allocated bill number from counter");

        let bill = Bill::issue(draft, number, breakdown);
        self.repository.save_bill(&bill).await?;
        Ok(bill)
    }

    async fn issue_with_scan(
        &self,
        draft: BillDraft,
        breakdown: TaxBreakdown,
        financial_year: FinancialYear,
        max_attempts: u32,
    ) -> BillingResult<Bill> {
        let max_attempts = max_attempts.max(1);
        for attempt in 1..=max_attempts {
            let existing = self.repository.list_bill_numbers(draft.bill_type).await?;
            let sequence =
                self.generator
                    .next_sequence(draft.bill_type, financial_year, &existing)?;
            let number = self
                .generator
                .format(draft.bill_type, financial_year, sequence)?;
            debug!(number = %number, attempt, "Allocated bill number from scan");

            let bill = Bill::issue(draft.clone(), number, breakdown.clone());
            match self.repository.save_bill(&bill).await {
                Ok(()) => return Ok(bill),
                Err(BillingError::DuplicateBillNumber(taken)) => {
                    warn!(number = %taken, attempt, "Bill number taken concurrently, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(BillingError::AllocationExhausted(max_attempts))
    }

    /// Get a bill by ID
    pub async fn get_bill(&self, bill_id: Uuid) -> BillingResult<Option<Bill>> {
        self.repository.get_bill(bill_id).await
    }

    /// Get a bill by its formatted number, returning an error if not found
    pub async fn get_bill_by_number(&self, number: &str) -> BillingResult<Bill> {
        self.repository
            .get_bill_by_number(number)
            .await?
            .ok_or_else(|| BillingError::BillNotFound(number.to_string()))
    }

    /// List bills, optionally filtered by type
    pub async fn list_bills(&self, bill_type: Option<BillType>) -> BillingResult<Vec<Bill>> {
        self.repository.list_bills(bill_type).await
    }
}
