//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use uuid::Uuid;

use crate::billing::bill::{Bill, BillDraft};
use crate::billing::number::{BillType, FinancialYear};
use crate::types::*;

/// Storage abstraction for issued bills
///
/// This trait allows the billing core to work with any storage backend
/// (PostgreSQL, a document store, in-memory, etc.) by implementing these methods.
/// Implementations own durability, uniqueness of bill numbers and the
/// atomicity of sequence allocation.
#[async_trait]
pub trait BillRepository: Send + Sync {
    /// Atomically allocate the next sequence for a bill type and financial year.
    ///
    /// Two calls for the same key never return the same value.
    async fn next_sequence(
        &self,
        bill_type: BillType,
        financial_year: FinancialYear,
    ) -> BillingResult<u32>;

    /// Save a bill, failing with `BillingError::DuplicateBillNumber` if its
    /// formatted number is already taken
    async fn save_bill(&self, bill: &Bill) -> BillingResult<()>;

    /// Get a bill by ID
    async fn get_bill(&self, bill_id: Uuid) -> BillingResult<Option<Bill>>;

    /// Get a bill by its formatted number
    async fn get_bill_by_number(&self, number: &str) -> BillingResult<Option<Bill>>;

    /// Formatted numbers of all stored bills of a type, across financial years
    async fn list_bill_numbers(&self, bill_type: BillType) -> BillingResult<Vec<String>>;

    /// List bills, optionally filtered by type
    async fn list_bills(&self, bill_type: Option<BillType>) -> BillingResult<Vec<Bill>>;
}

/// Trait for implementing custom bill validation rules
pub trait BillValidator: Send + Sync {
    /// Validate a draft before it is numbered and saved
    fn validate_draft(&self, draft: &BillDraft) -> BillingResult<()>;
}

/// Default bill validator: every line item must be valid
pub struct DefaultBillValidator;

impl BillValidator for DefaultBillValidator {
    fn validate_draft(&self, draft: &BillDraft) -> BillingResult<()> {
        for item in &draft.items {
            item.validate()?;
        }
        Ok(())
    }
}
