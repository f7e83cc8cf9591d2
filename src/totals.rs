//! Invoice arithmetic. Everything here is full-precision `f64`; the
//! two-decimal rounding a printed invoice shows is applied when text is
//! emitted at render time, never carried back into these values.

use crate::model::LineItem;

/// Sum of `quantity * unit_price` across all items. An empty slice sums
/// to zero; callers enforce the at-least-one-item rule before this runs.
pub fn compute_subtotal(items: &[LineItem]) -> f64 {
    items.iter().map(|i| i.quantity * i.unit_price).sum()
}

/// `subtotal * rate / 100`. The `0..=100` range on the rate is a
/// precondition cleared by form validation, not re-checked here.
pub fn compute_tax(subtotal: f64, tax_rate_percent: f64) -> f64 {
    subtotal * tax_rate_percent / 100.0
}

pub fn compute_total(subtotal: f64, tax: f64) -> f64 {
    subtotal + tax
}

/// The three derived amounts an invoice carries to the service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl Totals {
    pub fn compute(items: &[LineItem], tax_rate_percent: f64) -> Self {
        let subtotal = compute_subtotal(items);
        let tax = compute_tax(subtotal, tax_rate_percent);
        let total = compute_total(subtotal, tax);
        Totals { subtotal, tax, total }
    }
}
