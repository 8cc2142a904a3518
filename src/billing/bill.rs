//! Bill drafts and issued bill records

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::billing::number::{BillNumber, BillType};
use crate::tax::breakdown::TaxBreakdown;
use crate::tax::gst::TaxError;
use crate::types::*;

/// A bill that has not been numbered yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillDraft {
    pub bill_type: BillType,
    /// Bill date, which decides the financial year of the number
    pub date: NaiveDate,
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub convention: PriceConvention,
    pub notes: Option<String>,
}

/// An issued bill. Never mutated after it is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: Uuid,
    pub number: BillNumber,
    pub date: NaiveDate,
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub convention: PriceConvention,
    pub breakdown: TaxBreakdown,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Bill {
    /// Turn a draft into a bill record
    pub fn issue(draft: BillDraft, number: BillNumber, breakdown: TaxBreakdown) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            date: draft.date,
            customer: draft.customer,
            items: draft.items,
            convention: draft.convention,
            breakdown,
            notes: draft.notes,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn bill_type(&self) -> BillType {
        self.number.bill_type
    }
}

/// Builder for bill drafts
#[derive(Debug)]
pub struct BillBuilder {
    draft: BillDraft,
}

impl BillBuilder {
    /// Start a draft of the given type, dated `date`, with GST-inclusive prices
    pub fn new(bill_type: BillType, date: NaiveDate) -> Self {
        Self {
            draft: BillDraft {
                bill_type,
                date,
                customer: Customer::default(),
                items: Vec::new(),
                convention: PriceConvention::default(),
                notes: None,
            },
        }
    }

    pub fn customer(mut self, customer: Customer) -> Self {
        self.draft.customer = customer;
        self
    }

    /// Add a line item
    pub fn item(mut self, item: LineItem) -> Self {
        self.draft.items.push(item);
        self
    }

    /// Add line items as they arrive from forms, normalising field aliases
    pub fn raw_items<I>(mut self, items: I) -> Result<Self, TaxError>
    where
        I: IntoIterator<Item = RawLineItem>,
    {
        for raw in items {
            self.draft.items.push(LineItem::try_from(raw)?);
        }
        Ok(self)
    }

    pub fn convention(mut self, convention: PriceConvention) -> Self {
        self.draft.convention = convention;
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.draft.notes = Some(notes.into());
        self
    }

    /// Build the draft, validating every line item
    pub fn build(self) -> Result<BillDraft, TaxError> {
        for item in &self.draft.items {
            item.validate()?;
        }
        Ok(self.draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 10).unwrap()
    }

    #[test]
    fn test_builder_defaults_to_inclusive_prices() {
        let draft = BillBuilder::new(BillType::Gst, date())
            .customer(Customer::new("Asha Traders", Some("Kerala")))
            .item(LineItem::new("Tea", 2, BigDecimal::from(118), BigDecimal::from(18)))
            .notes("Deliver by Friday")
            .build()
            .unwrap();

        assert_eq!(draft.convention, PriceConvention::Inclusive);
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.notes.as_deref(), Some("Deliver by Friday"));
    }

    #[test]
    fn test_builder_rejects_invalid_item() {
        let result = BillBuilder::new(BillType::Gst, date())
            .item(LineItem::new("Tea", 1, BigDecimal::from(-5), BigDecimal::from(18)))
            .build();
        assert!(matches!(result, Err(TaxError::InvalidInput(_))));
    }

    #[test]
    fn test_builder_raw_items() {
        let raw: Vec<RawLineItem> = serde_json::from_str(
            r#"[{"itemName": "Tea", "qty": 2, "price": 59}, {"name": "Cup", "itemQuantity": 1, "itemPrice": 20, "gst": 12}]"#,
        )
        .unwrap();

        let draft = BillBuilder::new(BillType::Quotation, date())
            .raw_items(raw)
            .unwrap()
            .convention(PriceConvention::Exclusive)
            .build()
            .unwrap();

        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.items[1].gst_rate, BigDecimal::from(12));
    }
}
