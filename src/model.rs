use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::totals::Totals;

/// One billable row. Quantity is a whole number of units; fractional
/// values are rejected by validation before anything downstream runs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl LineItem {
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Unsaved, user-entered invoice data. Lives only for the duration of a
/// form session; submission turns it into a `NewInvoice`.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
    pub items: Vec<LineItem>,
    pub tax_rate_percent: f64,
}

/// Create-request body sent to the invoice service: the draft plus the
/// computed totals, unrounded. Field casing follows the service's JSON.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
    pub items: Vec<LineItem>,
    pub tax_rate_percent: f64,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl NewInvoice {
    pub fn from_draft(draft: InvoiceDraft, totals: Totals) -> Self {
        Self {
            customer_name: draft.customer_name,
            customer_email: draft.customer_email,
            customer_address: draft.customer_address,
            items: draft.items,
            tax_rate_percent: draft.tax_rate_percent,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
        }
    }
}

/// Invoice record as returned by the service, with its assigned id and
/// creation timestamp. Immutable from this side; we only hold a copy for
/// rendering and display.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedInvoice {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
    pub items: Vec<LineItem>,
    pub tax_rate_percent: f64,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub created_at: DateTime<Utc>,
}
