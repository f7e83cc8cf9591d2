//! Client for the remote invoice service. The service owns the records;
//! it assigns ids and creation timestamps on create, and this side only
//! ever holds transient copies.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;

use crate::model::{NewInvoice, PersistedInvoice};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invoice service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invoice service rejected the request ({0})")]
    Status(StatusCode),
}

pub struct StoreClient {
    http: Client,
    base_url: String,
}

impl StoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        StoreClient {
            http: Client::new(),
            base_url,
        }
    }

    fn invoices_url(&self) -> String {
        format!("{}/invoices", self.base_url)
    }

    /// POST the draft plus its computed totals as one JSON object. The
    /// success body is the persisted record; anything non-success is a
    /// generic failure with no structured taxonomy behind it.
    pub fn create(&self, invoice: &NewInvoice) -> Result<PersistedInvoice, StoreError> {
        let response = self.http.post(self.invoices_url()).json(invoice).send()?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status()));
        }
        Ok(response.json()?)
    }

    pub fn list(&self) -> Result<Vec<PersistedInvoice>, StoreError> {
        let response = self.http.get(self.invoices_url()).send()?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status()));
        }
        Ok(response.json()?)
    }
}
