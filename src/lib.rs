//! invoice-desk core.
//!
//! The pieces the CLI wires together: draft validation, invoice totals,
//! fixed-layout document rendering, the remote invoice-service client,
//! and the export sink that saves the printable artifact.

pub mod config;
pub mod export;
pub mod layout;
pub mod model;
pub mod render;
pub mod store;
pub mod totals;
pub mod validate;

pub use config::{AppSettings, ConfigError};
pub use export::{DocumentSink, ExportError, FileSink};
pub use layout::LayoutConfig;
pub use model::{InvoiceDraft, LineItem, NewInvoice, PersistedInvoice};
pub use render::{Document, DocumentRenderer};
pub use store::{StoreClient, StoreError};
pub use totals::Totals;
pub use validate::{validate_draft, ValidationError};
