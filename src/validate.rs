//! Draft validation. Runs before totals computation and before anything
//! is sent to the service; the totals and render paths assume a draft
//! that already passed these checks.

use regex::Regex;
use thiserror::Error;

use crate::model::InvoiceDraft;

// Form-level syntax check only; the service is the authority on whether
// the address is deliverable.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("customer name is required")]
    MissingCustomerName,
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("customer address is required")]
    MissingCustomerAddress,
    #[error("invoice needs at least one line item")]
    NoItems,
    #[error("item {0}: description is required")]
    MissingDescription(usize),
    #[error("item {0}: quantity must be a whole number of at least 1")]
    BadQuantity(usize),
    #[error("item {0}: unit price must be at least 0.01")]
    BadUnitPrice(usize),
    #[error("tax rate must be between 0 and 100")]
    TaxRateOutOfRange,
}

pub fn validate_draft(draft: &InvoiceDraft) -> Result<(), ValidationError> {
    if draft.customer_name.trim().is_empty() {
        return Err(ValidationError::MissingCustomerName);
    }

    let email_re = Regex::new(EMAIL_PATTERN).unwrap();
    if !email_re.is_match(draft.customer_email.trim()) {
        return Err(ValidationError::InvalidEmail(draft.customer_email.clone()));
    }

    if draft.customer_address.trim().is_empty() {
        return Err(ValidationError::MissingCustomerAddress);
    }

    if draft.items.is_empty() {
        return Err(ValidationError::NoItems);
    }

    for (idx, item) in draft.items.iter().enumerate() {
        let index = idx + 1;
        if item.description.trim().is_empty() {
            return Err(ValidationError::MissingDescription(index));
        }
        if item.quantity < 1.0 || item.quantity.fract() != 0.0 {
            return Err(ValidationError::BadQuantity(index));
        }
        if item.unit_price < 0.01 {
            return Err(ValidationError::BadUnitPrice(index));
        }
    }

    if !(0.0..=100.0).contains(&draft.tax_rate_percent) {
        return Err(ValidationError::TaxRateOutOfRange);
    }

    Ok(())
}
