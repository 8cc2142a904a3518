//! Validation utilities

use bigdecimal::BigDecimal;
use regex::Regex;

use crate::billing::bill::BillDraft;
use crate::tax::gst::TaxError;
use crate::tax::jurisdiction::normalize_state;
use crate::traits::*;
use crate::types::*;

/// Validate that a GST rate lies within 0-100 percent
pub fn validate_gst_rate(rate: &BigDecimal) -> Result<(), TaxError> {
    if *rate < BigDecimal::from(0) || *rate > BigDecimal::from(100) {
        return Err(TaxError::InvalidInput(format!(
            "GST rate must be between 0 and 100, got {}",
            rate
        )));
    }
    Ok(())
}

/// Validate that a unit price is not negative
pub fn validate_unit_price(price: &BigDecimal) -> Result<(), TaxError> {
    if *price < BigDecimal::from(0) {
        return Err(TaxError::InvalidInput(format!(
            "Unit price cannot be negative: {}",
            price
        )));
    }
    Ok(())
}

/// Validate quantity, price and rate of a line item
pub fn validate_line_item(item: &LineItem) -> Result<(), TaxError> {
    if item.quantity == 0 {
        return Err(TaxError::InvalidInput(format!(
            "Quantity must be positive for '{}'",
            item.description
        )));
    }
    validate_unit_price(&item.unit_price)?;
    validate_gst_rate(&item.gst_rate)
}

/// Validate that a customer name is usable on a bill
pub fn validate_customer_name(name: &str) -> BillingResult<()> {
    if name.trim().is_empty() {
        return Err(BillingError::Validation(
            "Customer name cannot be empty".to_string(),
        ));
    }

    if name.len() > 100 {
        return Err(BillingError::Validation(
            "Customer name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate the shape of a GSTIN: state code, PAN, entity number, `Z`, check character
pub fn validate_gstin(gstin: &str) -> BillingResult<()> {
    let pattern = Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$")
        .map_err(|e| BillingError::Validation(e.to_string()))?;

    if !pattern.is_match(gstin) {
        return Err(BillingError::Validation(format!(
            "Invalid GSTIN: {}",
            gstin
        )));
    }

    Ok(())
}

/// Validate that an item description is usable on a bill
pub fn validate_item_description(description: &str) -> BillingResult<()> {
    if description.trim().is_empty() {
        return Err(BillingError::Validation(
            "Item description cannot be empty".to_string(),
        ));
    }

    if description.len() > 200 {
        return Err(BillingError::Validation(
            "Item description cannot exceed 200 characters".to_string(),
        ));
    }

    Ok(())
}

/// Stricter validator used before saving bills from user input
pub struct EnhancedBillValidator;

impl BillValidator for EnhancedBillValidator {
    fn validate_draft(&self, draft: &BillDraft) -> BillingResult<()> {
        DefaultBillValidator.validate_draft(draft)?;

        validate_customer_name(&draft.customer.name)?;
        if let Some(gstin) = &draft.customer.gstin {
            validate_gstin(gstin)?;
        }

        if draft.items.is_empty() {
            return Err(BillingError::Validation(
                "Bill must have at least one item".to_string(),
            ));
        }

        for item in &draft.items {
            validate_item_description(&item.description)?;
        }

        // GST bills need the buyer state to pick CGST/SGST or IGST
        if draft.bill_type.billing_mode() == BillingMode::Gst
            && draft.customer.state.as_deref().and_then(normalize_state).is_none()
        {
            return Err(BillingError::Validation(
                "Customer state is required for GST bills".to_string(),
            ));
        }

        Ok(())
    }
}
