//! Export sink. The renderer yields an artifact and a filename hint; the
//! sink decides where it lands and performs the actual I/O, including the
//! Typst compile step that turns the source into a PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Datelike;
use slug::slugify;
use thiserror::Error;

use crate::model::PersistedInvoice;
use crate::render::Document;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),
    #[error("'typst' is not installed. Please install it (brew install typst)")]
    TypstMissing,
    #[error("typst failed to compile {}", .0.display())]
    CompileFailed(PathBuf),
}

/// Receives a finalized document and saves it somewhere. The renderer
/// itself never touches the filesystem.
pub trait DocumentSink {
    fn save(&self, document: &Document) -> Result<PathBuf, ExportError>;
}

/// Writes `<hint>.typ` under `<output root>/<year>/<customer-slug>/` and
/// compiles `<hint>.pdf` next to it.
pub struct FileSink {
    dir: PathBuf,
    compile_pdf: bool,
}

impl FileSink {
    pub fn for_invoice(output_root: &Path, invoice: &PersistedInvoice) -> Self {
        let dir = output_root
            .join(invoice.created_at.year().to_string())
            .join(slugify(&invoice.customer_name));
        FileSink {
            dir,
            compile_pdf: true,
        }
    }

    /// Skip the Typst compile and keep only the source document.
    pub fn with_compile(mut self, compile_pdf: bool) -> Self {
        self.compile_pdf = compile_pdf;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DocumentSink for FileSink {
    fn save(&self, document: &Document) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.dir)?;
        let typ_path = self.dir.join(format!("{}.typ", document.filename_hint));
        fs::write(&typ_path, &document.source)?;

        if !self.compile_pdf {
            return Ok(typ_path);
        }

        if Command::new("typst").arg("--version").output().is_err() {
            return Err(ExportError::TypstMissing);
        }

        let pdf_path = typ_path.with_extension("pdf");
        match Command::new("typst")
            .arg("compile")
            .arg(&typ_path)
            .arg(&pdf_path)
            .status()
        {
            Ok(status) if status.success() => Ok(pdf_path),
            _ => Err(ExportError::CompileFailed(typ_path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutConfig;
    use crate::model::LineItem;
    use crate::render::DocumentRenderer;
    use chrono::{TimeZone, Utc};

    fn sample_invoice() -> PersistedInvoice {
        PersistedInvoice {
            id: "42".to_string(),
            customer_name: "Acme Corp".to_string(),
            customer_email: "billing@acme.test".to_string(),
            customer_address: "1 Main St".to_string(),
            items: vec![LineItem {
                description: "Widget".to_string(),
                quantity: 2.0,
                unit_price: 9.99,
            }],
            tax_rate_percent: 10.0,
            subtotal: 19.98,
            tax: 1.998,
            total: 21.978,
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 16, 30, 0).unwrap(),
        }
    }

    #[test]
    fn sink_writes_source_under_year_and_customer() {
        let tmp = tempfile::tempdir().unwrap();
        let invoice = sample_invoice();
        let document = DocumentRenderer::new(LayoutConfig::default()).render(&invoice);

        let sink = FileSink::for_invoice(tmp.path(), &invoice).with_compile(false);
        let path = sink.save(&document).unwrap();

        assert_eq!(path, tmp.path().join("2024/acme-corp/invoice-42.typ"));
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, document.source);
    }
}
