//! Invoice document rendering.
//!
//! [`layout_lines`] turns an invoice into positioned rows of text; the renderer
//! then draws those rows onto A4 pages with the built-in Helvetica fonts,
//! starting a new page whenever the next row would cross the bottom margin.

use crate::{
    core::invoice::InvoiceDetail,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use tracing::debug;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
/// Vertical advance per point of font size
const LEADING_MM_PER_PT: f32 = 0.55;
const MAX_DESCRIPTION_CHARS: usize = 48;

const COL_DESCRIPTION: f32 = MARGIN_MM;
const COL_QUANTITY: f32 = 118.0;
const COL_PRICE: f32 = 138.0;
const COL_TOTAL: f32 = 166.0;

/// Font weight of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

/// One row of text; each cell is `(x in mm, text)`. A row with no cells is a spacer.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfLine {
    /// `(x offset in mm, text)` pairs
    pub cells: Vec<(f32, String)>,
    /// Font size in points
    pub size: f32,
    /// Font weight
    pub weight: Weight,
}

impl PdfLine {
    fn text(text: impl Into<String>, size: f32, weight: Weight) -> Self {
        Self {
            cells: vec![(MARGIN_MM, text.into())],
            size,
            weight,
        }
    }

    fn spacer() -> Self {
        Self {
            cells: Vec::new(),
            size: 8.0,
            weight: Weight::Regular,
        }
    }

    fn height(&self) -> f32 {
        self.size * LEADING_MM_PER_PT
    }
}

fn currency(amount: f64) -> String {
    format!("${amount:.2}")
}

fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

/// Lays out an invoice: header, bill-to block, item table, total, and notes.
#[must_use]
pub fn layout_lines(detail: &InvoiceDetail) -> Vec<PdfLine> {
    let invoice = &detail.invoice;
    let mut lines = vec![
        PdfLine::text("INVOICE", 24.0, Weight::Bold),
        PdfLine::spacer(),
        PdfLine::text(format!("Invoice Number: {}", invoice.invoice_number), 11.0, Weight::Regular),
        PdfLine::text(
            format!("Invoice Date: {}", long_date(invoice.invoice_date)),
            11.0,
            Weight::Regular,
        ),
    ];
    if let Some(due) = invoice.due_date {
        lines.push(PdfLine::text(format!("Due Date: {}", long_date(due)), 11.0, Weight::Regular));
    }

    lines.push(PdfLine::spacer());
    lines.push(PdfLine::text("Bill To:", 12.0, Weight::Bold));
    let bill_to = detail
        .company
        .as_ref()
        .map(|c| c.name.clone())
        .or_else(|| detail.user.as_ref().map(|u| u.name.clone().unwrap_or_else(|| u.email.clone())));
    if let Some(name) = bill_to {
        lines.push(PdfLine::text(name, 11.0, Weight::Regular));
    }
    let contact = detail
        .user
        .as_ref()
        .and_then(|u| u.name.clone())
        .filter(|_| detail.company.is_some());
    if let Some(contact) = contact {
        lines.push(PdfLine::text(contact, 11.0, Weight::Regular));
    }
    for address_line in detail.billing.lines() {
        lines.push(PdfLine::text(address_line, 11.0, Weight::Regular));
    }

    lines.push(PdfLine::spacer());
    lines.push(PdfLine {
        cells: vec![
            (COL_DESCRIPTION, "Description".to_string()),
            (COL_QUANTITY, "Qty".to_string()),
            (COL_PRICE, "Unit Price".to_string()),
            (COL_TOTAL, "Total".to_string()),
        ],
        size: 10.0,
        weight: Weight::Bold,
    });
    for line in &detail.items {
        let item = &line.item;
        lines.push(PdfLine {
            cells: vec![
                (COL_DESCRIPTION, truncate(&item.description, MAX_DESCRIPTION_CHARS)),
                (COL_QUANTITY, item.quantity.to_string()),
                (COL_PRICE, currency(item.unit_price)),
                (COL_TOTAL, currency(item.total)),
            ],
            size: 10.0,
            weight: Weight::Regular,
        });
        if let Some(notes) = &item.notes {
            lines.push(PdfLine {
                cells: vec![(COL_DESCRIPTION + 4.0, truncate(notes, MAX_DESCRIPTION_CHARS + 10))],
                size: 8.0,
                weight: Weight::Regular,
            });
        }
    }

    lines.push(PdfLine::spacer());
    lines.push(PdfLine {
        cells: vec![
            (COL_PRICE, "Total:".to_string()),
            (COL_TOTAL, currency(invoice.total)),
        ],
        size: 12.0,
        weight: Weight::Bold,
    });

    if let Some(notes) = &invoice.notes {
        lines.push(PdfLine::spacer());
        lines.push(PdfLine::text("Notes:", 11.0, Weight::Bold));
        for note_line in notes.lines() {
            lines.push(PdfLine::text(note_line, 10.0, Weight::Regular));
        }
    }
    lines
}

/// Renders an invoice to PDF bytes.
///
/// # Errors
/// Returns [`Error::Pdf`] if the document cannot be assembled or serialized.
pub fn render_invoice_pdf(detail: &InvoiceDetail) -> Result<Vec<u8>> {
    let pdf_err = |e: printpdf::Error| Error::Pdf {
        message: e.to_string(),
    };
    let title = format!("Invoice {}", detail.invoice.invoice_number);
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
    let mut pages = 1;
    for line in layout_lines(detail) {
        let height = line.height();
        if y - height < MARGIN_MM {
            let (page, page_layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
            y = PAGE_HEIGHT_MM - MARGIN_MM;
            pages += 1;
        }
        y -= height;
        let font = match line.weight {
            Weight::Regular => &regular,
            Weight::Bold => &bold,
        };
        for (x, text) in line.cells {
            layer.use_text(text, line.size, Mm(x), Mm(y), font);
        }
    }

    let bytes = doc.save_to_bytes().map_err(pdf_err)?;
    debug!(
        invoice = %detail.invoice.invoice_number,
        pages,
        bytes = bytes.len(),
        "Rendered invoice PDF"
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{company::BillingAddress, invoice::InvoiceLine},
        entities::{invoice, invoice_item},
    };

    fn sample(items: usize, notes: Option<&str>) -> InvoiceDetail {
        let now = chrono::Utc::now();
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        InvoiceDetail {
            invoice: invoice::Model {
                id: 1,
                invoice_number: "INV-2026-001".to_string(),
                company_id: 1,
                user_id: None,
                quote_id: None,
                invoice_date: date,
                due_date: None,
                billing_address: "{}".to_string(),
                notes: notes.map(str::to_string),
                total: 10.0 * items as f64,
                created_at: now,
                updated_at: now,
            },
            company: None,
            user: None,
            quote: None,
            items: (0..items)
                .map(|i| InvoiceLine {
                    item: invoice_item::Model {
                        id: i as i64,
                        invoice_id: 1,
                        product_id: None,
                        description: format!("Line {i}"),
                        quantity: 1,
                        unit_price: 10.0,
                        total: 10.0,
                        notes: None,
                    },
                    product_name: None,
                })
                .collect(),
            billing: BillingAddress {
                city: Some("Springfield".to_string()),
                state: Some("IL".to_string()),
                ..Default::default()
            },
        }
    }

    fn texts(lines: &[PdfLine]) -> Vec<String> {
        lines
            .iter()
            .flat_map(|l| l.cells.iter().map(|(_, t)| t.clone()))
            .collect()
    }

    #[test]
    fn test_layout_contains_header_items_and_total() {
        let lines = layout_lines(&sample(2, Some("Net 30\nThanks!")));
        let texts = texts(&lines);

        assert_eq!(texts[0], "INVOICE");
        assert!(texts.contains(&"Invoice Number: INV-2026-001".to_string()));
        assert!(texts.contains(&"Invoice Date: March 5, 2026".to_string()));
        assert!(texts.contains(&"Springfield, IL".to_string()));
        assert!(texts.contains(&"Line 1".to_string()));
        assert!(texts.contains(&"$20.00".to_string()));
        assert!(texts.contains(&"Thanks!".to_string()));
        assert!(!texts.iter().any(|t| t.starts_with("Due Date")));
    }

    #[test]
    fn test_truncate_long_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_render_produces_pdf_and_paginates() {
        let single = render_invoice_pdf(&sample(3, None)).unwrap();
        assert!(single.starts_with(b"%PDF"));

        let lines = layout_lines(&sample(200, None));
        let total_height: f32 = lines.iter().map(PdfLine::height).sum();
        assert!(total_height > PAGE_HEIGHT_MM - 2.0 * MARGIN_MM);
        let long = render_invoice_pdf(&sample(200, None)).unwrap();
        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > single.len());
    }
}
