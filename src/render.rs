//! Fixed-layout document generation. A persisted invoice is first laid
//! out as absolutely-positioned text runs, then serialized through the
//! embedded Tera template into a Typst source document the export sink
//! can compile and save.
//!
//! The whole pass is deterministic: the same invoice and layout always
//! produce byte-identical output.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tera::{Context, Tera};

use crate::layout::LayoutConfig;
use crate::model::PersistedInvoice;

const DOCUMENT_TEMPLATE: &str = include_str!("../templates/invoice.tera");

/// A single text run at an absolute position on a page.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TextOp {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub bold: bool,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Page {
    pub ops: Vec<TextOp>,
}

/// Finalized printable artifact plus the filename the sink should use
/// (extension is the sink's business).
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub source: String,
    pub filename_hint: String,
}

pub fn format_money(value: f64) -> String {
    format!("${:.2}", value)
}

fn format_date(date: DateTime<Utc>) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

fn op(x: f64, y: f64, size: f64, bold: bool, text: String) -> TextOp {
    TextOp { x, y, size, bold, text }
}

/// Lay an invoice out as pages of positioned text runs.
///
/// Title and bill-to blocks go on the first page; the item table starts
/// at the configured header offset and rows continue onto fresh pages
/// when they would cross the bottom margin. The totals block follows the
/// last row after a fixed gap.
pub fn layout_pages(invoice: &PersistedInvoice, cfg: &LayoutConfig) -> Vec<Page> {
    let lh = cfg.line_height;
    let left = cfg.margin_left;
    let body = cfg.body_size;
    let bottom = cfg.page_height - cfg.margin_bottom;

    let mut first = Page::default();

    // Title block: issuer, invoice id, creation date.
    let mut y = cfg.margin_top;
    first.ops.push(op(left, y, cfg.title_size, true, cfg.issuer_name.clone()));
    y += lh * 2.0;
    first
        .ops
        .push(op(left, y, body, false, format!("Invoice #{}", invoice.id)));
    y += lh;
    first.ops.push(op(
        left,
        y,
        body,
        false,
        format!("Date: {}", format_date(invoice.created_at)),
    ));

    // Bill-to block, one line per field.
    y += lh * 2.0;
    first.ops.push(op(left, y, body, true, "Bill To:".to_string()));
    for line in [
        &invoice.customer_name,
        &invoice.customer_email,
        &invoice.customer_address,
    ] {
        y += lh;
        first.ops.push(op(left, y, body, false, line.clone()));
    }

    // Item table header at its fixed offset.
    let header = |page: &mut Page, y: f64| {
        page.ops.push(op(cfg.col_description, y, body, true, "Description".to_string()));
        page.ops.push(op(cfg.col_quantity, y, body, true, "Qty".to_string()));
        page.ops.push(op(cfg.col_price, y, body, true, "Price".to_string()));
        page.ops.push(op(cfg.col_total, y, body, true, "Total".to_string()));
    };
    header(&mut first, cfg.table_top);

    let mut pages = vec![first];
    let mut row_y = cfg.table_top;
    for item in &invoice.items {
        let mut y = row_y + lh;
        if y > bottom {
            let mut next = Page::default();
            header(&mut next, cfg.margin_top);
            pages.push(next);
            y = cfg.margin_top + lh;
        }
        let page = pages.last_mut().unwrap();
        page.ops.push(op(cfg.col_description, y, body, false, item.description.clone()));
        page.ops.push(op(cfg.col_quantity, y, body, false, format!("{}", item.quantity)));
        page.ops.push(op(cfg.col_price, y, body, false, format_money(item.unit_price)));
        page.ops.push(op(cfg.col_total, y, body, false, format_money(item.line_total())));
        row_y = y;
    }

    // Totals block after the configured gap, kept together as a unit.
    let mut y = row_y + cfg.totals_gap;
    if y + lh * 2.0 > bottom {
        pages.push(Page::default());
        y = cfg.margin_top;
    }
    let page = pages.last_mut().unwrap();
    page.ops.push(op(
        cfg.col_price,
        y,
        body,
        false,
        format!("Subtotal: {}", format_money(invoice.subtotal)),
    ));
    y += lh;
    page.ops.push(op(
        cfg.col_price,
        y,
        body,
        false,
        format!(
            "Tax ({}%): {}",
            invoice.tax_rate_percent,
            format_money(invoice.tax)
        ),
    ));
    y += lh;
    page.ops.push(op(
        cfg.col_price,
        y,
        body,
        true,
        format!("Total: {}", format_money(invoice.total)),
    ));

    pages
}

#[derive(Serialize)]
struct RenderContext {
    page_width: f64,
    page_height: f64,
    pages: Vec<Page>,
}

// Typst gives `#`, `$`, brackets and a few sigils markup meaning; invoice
// text must come through literally ("$9.99" in particular).
fn typst_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let raw = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("typst filter expects a string"))?;
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' | '#' | '$' | '[' | ']' | '*' | '_' | '@' | '`' | '<' | '>' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    Ok(tera::Value::String(escaped))
}

pub struct DocumentRenderer {
    tera: Tera,
    layout: LayoutConfig,
}

impl DocumentRenderer {
    pub fn new(layout: LayoutConfig) -> Self {
        let mut tera = Tera::default();
        tera.register_filter("typst", typst_filter);
        tera.add_raw_template("invoice.tera", DOCUMENT_TEMPLATE)
            .expect("embedded invoice template parses");
        DocumentRenderer { tera, layout }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Stateless transform of a persisted invoice into the printable
    /// artifact. Never fails on a well-formed invoice: the template is
    /// embedded and the context is built right here.
    pub fn render(&self, invoice: &PersistedInvoice) -> Document {
        let context = RenderContext {
            page_width: self.layout.page_width,
            page_height: self.layout.page_height,
            pages: layout_pages(invoice, &self.layout),
        };
        let context = Context::from_serialize(&context).expect("render context serializes");
        let source = self
            .tera
            .render("invoice.tera", &context)
            .expect("embedded invoice template renders");
        Document {
            source,
            filename_hint: format!("invoice-{}", invoice.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineItem;
    use chrono::TimeZone;

    fn invoice(items: Vec<LineItem>, tax_rate_percent: f64) -> PersistedInvoice {
        let subtotal = crate::totals::compute_subtotal(&items);
        let tax = crate::totals::compute_tax(subtotal, tax_rate_percent);
        PersistedInvoice {
            id: "7".to_string(),
            customer_name: "Acme Corp".to_string(),
            customer_email: "billing@acme.test".to_string(),
            customer_address: "1 Main St, Springfield".to_string(),
            items,
            tax_rate_percent,
            subtotal,
            tax,
            total: subtotal + tax,
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 16, 30, 0).unwrap(),
        }
    }

    fn widget_invoice() -> PersistedInvoice {
        invoice(
            vec![LineItem {
                description: "Widget".to_string(),
                quantity: 2.0,
                unit_price: 9.99,
            }],
            10.0,
        )
    }

    fn texts(pages: &[Page]) -> Vec<&str> {
        pages
            .iter()
            .flat_map(|p| p.ops.iter().map(|o| o.text.as_str()))
            .collect()
    }

    #[test]
    fn tax_line_shows_rate_and_rounded_amount() {
        let pages = layout_pages(&widget_invoice(), &LayoutConfig::default());
        let texts = texts(&pages);
        assert!(texts.contains(&"Subtotal: $19.98"));
        assert!(texts.contains(&"Tax (10%): $2.00"));
        assert!(texts.contains(&"Total: $21.98"));
    }

    #[test]
    fn stored_amounts_stay_unrounded() {
        let inv = widget_invoice();
        assert!((inv.tax - 1.998).abs() < 1e-9);
        assert!((inv.total - 21.978).abs() < 1e-9);
    }

    #[test]
    fn total_line_is_bold() {
        let pages = layout_pages(&widget_invoice(), &LayoutConfig::default());
        let total = pages
            .iter()
            .flat_map(|p| p.ops.iter())
            .find(|o| o.text.starts_with("Total:"))
            .unwrap();
        assert!(total.bold);
    }

    #[test]
    fn date_is_unpadded_month_day_year() {
        let pages = layout_pages(&widget_invoice(), &LayoutConfig::default());
        assert!(texts(&pages).contains(&"Date: 3/5/2024"));
    }

    #[test]
    fn item_rows_step_by_line_height() {
        let cfg = LayoutConfig::default();
        let inv = invoice(
            vec![
                LineItem {
                    description: "A".to_string(),
                    quantity: 1.0,
                    unit_price: 10.0,
                },
                LineItem {
                    description: "B".to_string(),
                    quantity: 3.0,
                    unit_price: 5.0,
                },
            ],
            0.0,
        );
        let pages = layout_pages(&inv, &cfg);
        let row_a = pages[0].ops.iter().find(|o| o.text == "A").unwrap();
        let row_b = pages[0].ops.iter().find(|o| o.text == "B").unwrap();
        assert_eq!(row_a.y, cfg.table_top + cfg.line_height);
        assert_eq!(row_b.y, row_a.y + cfg.line_height);
        assert_eq!(row_a.x, cfg.col_description);
        let qty = pages[0]
            .ops
            .iter()
            .find(|o| o.y == row_b.y && o.x == cfg.col_quantity)
            .unwrap();
        assert_eq!(qty.text, "3");
    }

    #[test]
    fn empty_items_render_header_and_totals_only() {
        let pages = layout_pages(&invoice(vec![], 0.0), &LayoutConfig::default());
        assert_eq!(pages.len(), 1);
        let texts = texts(&pages);
        assert!(texts.contains(&"Description"));
        assert!(texts.contains(&"Subtotal: $0.00"));
        // 3 title ops + 4 bill-to ops + 4 header cells + 3 totals lines.
        assert_eq!(pages[0].ops.len(), 14);
    }

    #[test]
    fn long_invoices_continue_on_fresh_pages() {
        let cfg = LayoutConfig::default();
        let items: Vec<LineItem> = (0..60)
            .map(|i| LineItem {
                description: format!("Service day {}", i + 1),
                quantity: 1.0,
                unit_price: 100.0,
            })
            .collect();
        let pages = layout_pages(&invoice(items, 0.0), &cfg);
        assert!(pages.len() >= 2);
        // Continuation pages restart below the top margin with a header row.
        assert_eq!(pages[1].ops[0].text, "Description");
        assert_eq!(pages[1].ops[0].y, cfg.margin_top);
        let max_y = pages
            .iter()
            .flat_map(|p| p.ops.iter().map(|o| o.y))
            .fold(0.0f64, f64::max);
        assert!(max_y <= cfg.page_height - cfg.margin_bottom);
    }

    #[test]
    fn render_is_idempotent() {
        let renderer = DocumentRenderer::new(LayoutConfig::default());
        let inv = widget_invoice();
        assert_eq!(renderer.render(&inv), renderer.render(&inv));
    }

    #[test]
    fn rendered_source_escapes_currency_sigils() {
        let renderer = DocumentRenderer::new(LayoutConfig::default());
        let doc = renderer.render(&widget_invoice());
        assert_eq!(doc.filename_hint, "invoice-7");
        assert!(doc.source.contains("Tax (10%): \\$2.00"));
        assert!(doc.source.contains("weight: \"bold\""));
    }

    #[test]
    fn money_formatting_is_two_decimal() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(1.998), "$2.00");
        assert_eq!(format_money(1234.5), "$1234.50");
    }
}
