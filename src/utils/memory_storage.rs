//! In-memory bill repository for testing and development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::billing::bill::Bill;
use crate::billing::number::{BillType, FinancialYear};
use crate::traits::*;
use crate::types::*;

/// In-memory repository; clones share the same underlying data.
///
/// Sequence counters sit behind a single mutex, so `next_sequence` is an
/// atomic increment-and-fetch per `(bill type, financial year)`. Saving a bill
/// also raises the counter of its key to at least the saved sequence.
#[derive(Debug, Clone, Default)]
pub struct MemoryBillRepository {
    bills: Arc<RwLock<HashMap<Uuid, Bill>>>,
    counters: Arc<Mutex<HashMap<(BillType, FinancialYear), u32>>>,
}

fn poisoned<T>(_: T) -> BillingError {
    BillingError::Storage("Memory repository lock poisoned".to_string())
}

impl MemoryBillRepository {
    /// Create a new memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> BillingResult<()> {
        self.bills.write().map_err(poisoned)?.clear();
        self.counters.lock().map_err(poisoned)?.clear();
        Ok(())
    }

    pub fn len(&self) -> BillingResult<usize> {
        Ok(self.bills.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> BillingResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl BillRepository for MemoryBillRepository {
    async fn next_sequence(
        &self,
        bill_type: BillType,
        financial_year: FinancialYear,
    ) -> BillingResult<u32> {
        let mut counters = self.counters.lock().map_err(poisoned)?;
        let counter = counters.entry((bill_type, financial_year)).or_insert(0);
        *counter = counter
            .checked_add(1)
            .ok_or_else(|| BillingError::Storage("Sequence counter overflow".to_string()))?;
        debug!(?bill_type, %financial_year, sequence = *counter, "Allocated sequence");
        Ok(*counter)
    }

    async fn save_bill(&self, bill: &Bill) -> BillingResult<()> {
        let mut bills = self.bills.write().map_err(poisoned)?;

        if bills
            .values()
            .any(|existing| existing.number.formatted == bill.number.formatted)
        {
            return Err(BillingError::DuplicateBillNumber(
                bill.number.formatted.clone(),
            ));
        }
        bills.insert(bill.id, bill.clone());

        let mut counters = self.counters.lock().map_err(poisoned)?;
        let counter = counters
            .entry((bill.number.bill_type, bill.number.financial_year))
            .or_insert(0);
        *counter = (*counter).max(bill.number.sequence);

        Ok(())
    }

    async fn get_bill(&self, bill_id: Uuid) -> BillingResult<Option<Bill>> {
        Ok(self.bills.read().map_err(poisoned)?.get(&bill_id).cloned())
    }

    async fn get_bill_by_number(&self, number: &str) -> BillingResult<Option<Bill>> {
        let number = number.trim();
        Ok(self
            .bills
            .read()
            .map_err(poisoned)?
            .values()
            .find(|bill| bill.number.formatted == number)
            .cloned())
    }

    async fn list_bill_numbers(&self, bill_type: BillType) -> BillingResult<Vec<String>> {
        Ok(self
            .bills
            .read()
            .map_err(poisoned)?
            .values()
            .filter(|bill| bill.bill_type() == bill_type)
            .map(|bill| bill.number.formatted.clone())
            .collect())
    }

    async fn list_bills(&self, bill_type: Option<BillType>) -> BillingResult<Vec<Bill>> {
        let bills = self.bills.read().map_err(poisoned)?;
        let mut filtered: Vec<Bill> = bills
            .values()
            .filter(|bill| bill_type.is_none_or(|t| bill.bill_type() == t))
            .cloned()
            .collect();
        filtered.sort_by(|a, b| {
            (a.number.financial_year, a.bill_type() as u8, a.number.sequence).cmp(&(
                b.number.financial_year,
                b.bill_type() as u8,
                b.number.sequence,
            ))
        });
        Ok(filtered)
    }
}
