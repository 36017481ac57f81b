//! Invoice business logic - Numbering, line totals, and company-scoped access.
//!
//! Totals are always computed here: a line total is `quantity * unit_price`
//! rounded to cents, and the invoice total is the rounded sum of its lines.
//! Client-supplied totals are never trusted.
//!
//! Numbers have the form `INV-<year>-<seq>` where `seq` restarts at 1 each year
//! and is zero-padded to three digits. The next number is derived from the
//! numerically highest existing suffix inside the same transaction that inserts
//! the invoice; the unique index on `invoice_number` turns a racing duplicate
//! into a failed insert rather than a second invoice with the same number.

use crate::{
    core::{
        company::{self, BillingAddress},
        non_blank, quote as quotes, required, user as users, validate_price,
    },
    entities::{
        Invoice, InvoiceItem, Product, Quote, Role, company as company_entity, invoice,
        invoice_item, quote, user,
    },
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// One line of an invoice as submitted by an admin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceItemInput {
    /// Catalog product the line refers to, if any
    pub product_id: Option<i64>,
    /// Printed line description
    pub description: String,
    /// Units billed, at least 1
    pub quantity: i32,
    /// Price per unit
    pub unit_price: f64,
    /// Line notes
    pub notes: Option<String>,
}

/// Request body for creating or replacing an invoice.
///
/// When `company_id` is omitted the company of `user_id` is billed. A missing
/// billing address defaults to the company's address.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceInput {
    /// Billed company; defaults to the user's company
    pub company_id: Option<i64>,
    /// Vendor the invoice is for
    pub user_id: Option<i64>,
    /// Quote the invoice was raised from
    pub quote_id: Option<i64>,
    /// Defaults to today
    pub invoice_date: Option<NaiveDate>,
    /// Payment due date
    pub due_date: Option<NaiveDate>,
    /// Defaults to the company's address
    pub billing_address: Option<BillingAddress>,
    /// Printed notes
    pub notes: Option<String>,
    /// Invoice lines, at least one
    pub items: Vec<InvoiceItemInput>,
}

/// Request body for turning a quote into an invoice.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FromQuoteInput {
    /// Quote to bill
    pub quote_id: i64,
    /// Defaults to today
    pub invoice_date: Option<NaiveDate>,
    /// Payment due date
    pub due_date: Option<NaiveDate>,
    /// Defaults to the company's address
    pub billing_address: Option<BillingAddress>,
    /// Printed notes
    pub notes: Option<String>,
}

/// An invoice line with the name of the catalog product, if any.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    /// The stored line
    #[serde(flatten)]
    pub item: invoice_item::Model,
    /// Name of the linked catalog product
    pub product_name: Option<String>,
}

/// Id and name of the quote an invoice came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteRef {
    /// Quote id
    pub id: i64,
    /// Name the vendor gave the quote
    pub name: Option<String>,
}

/// An invoice with everything needed to display or print it.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    /// The invoice row
    #[serde(flatten)]
    pub invoice: invoice::Model,
    /// Billed company
    pub company: Option<company_entity::Model>,
    /// Vendor the invoice is for
    pub user: Option<users::UserBrief>,
    /// Source quote
    pub quote: Option<QuoteRef>,
    /// Invoice lines in entry order
    pub items: Vec<InvoiceLine>,
    /// Decoded `billing_address`
    pub billing: BillingAddress,
}

/// A validated line ready for insert.
#[derive(Debug, Clone, PartialEq)]
struct PricedLine {
    product_id: Option<i64>,
    description: String,
    quantity: i32,
    unit_price: f64,
    total: f64,
    notes: Option<String>,
}

/// Validated header fields shared by create and update.
struct InvoiceHeader {
    company: company_entity::Model,
    user_id: Option<i64>,
    quote_id: Option<i64>,
    invoice_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    billing_address: Option<BillingAddress>,
    notes: Option<String>,
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// `quantity * unit_price`, rounded to cents.
#[must_use]
pub fn line_total(quantity: i32, unit_price: f64) -> f64 {
    round_cents(f64::from(quantity) * unit_price)
}

/// Sum of line totals, rounded to cents.
fn invoice_total(lines: &[PricedLine]) -> f64 {
    round_cents(lines.iter().map(|line| line.total).sum())
}

/// Formats `INV-<year>-<seq>` with `seq` padded to at least three digits.
#[must_use]
pub fn format_invoice_number(year: i32, sequence: u32) -> String {
    format!("INV-{year}-{sequence:03}")
}

/// Extracts the sequence from a number carrying `prefix`, e.g. `INV-2026-`.
#[must_use]
pub fn parse_sequence(invoice_number: &str, prefix: &str) -> Option<u32> {
    invoice_number.strip_prefix(prefix)?.parse().ok()
}

/// Computes the next free invoice number for `year`.
///
/// Call this inside the transaction that inserts the invoice.
#[instrument(skip(db))]
pub async fn next_invoice_number<C>(db: &C, year: i32) -> Result<String>
where
    C: ConnectionTrait,
{
    let prefix = format!("INV-{year}-");
    let numbers: Vec<String> = Invoice::find()
        .select_only()
        .column(invoice::Column::InvoiceNumber)
        .filter(invoice::Column::InvoiceNumber.starts_with(&prefix))
        .into_tuple()
        .all(db)
        .await?;

    let last = numbers
        .iter()
        .filter_map(|number| parse_sequence(number, &prefix))
        .max()
        .unwrap_or(0);
    let next = format_invoice_number(year, last + 1);
    debug!(existing = numbers.len(), next = %next, "Allocated invoice number");
    Ok(next)
}

fn price_lines(items: Vec<InvoiceItemInput>) -> Result<Vec<PricedLine>> {
    if items.is_empty() {
        return Err(Error::validation("An invoice needs at least one item"));
    }
    items
        .into_iter()
        .map(|item| {
            let description = required("Item description", &item.description)?;
            if item.quantity < 1 {
                return Err(Error::validation("Item quantity must be at least 1"));
            }
            let unit_price = validate_price(item.unit_price)?;
            Ok(PricedLine {
                product_id: item.product_id,
                description,
                quantity: item.quantity,
                unit_price,
                total: line_total(item.quantity, unit_price),
                notes: non_blank(item.notes),
            })
        })
        .collect()
}

async fn resolve_header<C>(db: &C, input: &InvoiceInput) -> Result<InvoiceHeader>
where
    C: ConnectionTrait,
{
    let owner = match input.user_id {
        Some(user_id) => Some(users::get_user(db, user_id).await?),
        None => None,
    };
    let company_id = input
        .company_id
        .or_else(|| owner.as_ref().and_then(|u| u.company_id))
        .ok_or_else(|| Error::validation("An invoice must be billed to a company"))?;
    let company = company::get_company(db, company_id).await?;
    if let Some(quote_id) = input.quote_id {
        Quote::find_by_id(quote_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("Quote", quote_id))?;
    }

    Ok(InvoiceHeader {
        company,
        user_id: input.user_id,
        quote_id: input.quote_id,
        invoice_date: input.invoice_date,
        due_date: input.due_date,
        billing_address: input.billing_address.clone(),
        notes: non_blank(input.notes.clone()),
    })
}

async fn insert_lines<C>(db: &C, invoice_id: i64, lines: &[PricedLine]) -> Result<()>
where
    C: ConnectionTrait,
{
    for line in lines {
        invoice_item::ActiveModel {
            invoice_id: Set(invoice_id),
            product_id: Set(line.product_id),
            description: Set(line.description.clone()),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            total: Set(line.total),
            notes: Set(line.notes.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Numbers and inserts an invoice with its lines in one transaction.
async fn insert_invoice(
    db: &DatabaseConnection,
    header: InvoiceHeader,
    lines: Vec<PricedLine>,
) -> Result<invoice::Model> {
    let billing = header
        .billing_address
        .unwrap_or_else(|| BillingAddress::from_company(&header.company));
    let total = invoice_total(&lines);
    let now = chrono::Utc::now();

    let txn = db.begin().await?;
    let invoice_number = next_invoice_number(&txn, now.year()).await?;
    let invoice = invoice::ActiveModel {
        invoice_number: Set(invoice_number),
        company_id: Set(header.company.id),
        user_id: Set(header.user_id),
        quote_id: Set(header.quote_id),
        invoice_date: Set(header.invoice_date.unwrap_or_else(|| now.date_naive())),
        due_date: Set(header.due_date),
        billing_address: Set(serde_json::to_string(&billing)?),
        notes: Set(header.notes),
        total: Set(total),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    insert_lines(&txn, invoice.id, &lines).await?;
    txn.commit().await?;

    info!(
        invoice_id = invoice.id,
        company_id = invoice.company_id,
        total,
        "Created invoice {}",
        invoice.invoice_number
    );
    Ok(invoice)
}

/// Creates an invoice from admin-entered lines.
///
/// # Errors
/// - [`Error::Validation`] for missing company, empty item list, or bad lines
/// - [`Error::InvalidAmount`] for a negative or non-finite unit price
/// - [`Error::NotFound`] if the company, user, or quote does not exist
pub async fn create_invoice(db: &DatabaseConnection, input: InvoiceInput) -> Result<invoice::Model> {
    let header = resolve_header(db, &input).await?;
    let lines = price_lines(input.items)?;
    insert_invoice(db, header, lines).await
}

/// Creates an invoice billing a quote's lines at current catalog prices.
///
/// Unpriced products are billed at 0.
///
/// # Errors
/// - [`Error::NotFound`] if the quote does not exist
/// - [`Error::Validation`] if the quote's owner has no company, or the quote is empty
pub async fn create_from_quote(
    db: &DatabaseConnection,
    input: FromQuoteInput,
) -> Result<invoice::Model> {
    let source = quotes::get_quote_with_items(db, input.quote_id).await?;
    let owner = users::get_user(db, source.quote.user_id).await?;
    let company_id = owner
        .company_id
        .ok_or_else(|| Error::validation("The quote's owner is not assigned to a company"))?;
    let company = company::get_company(db, company_id).await?;

    let lines = source
        .items
        .into_iter()
        .map(|line| {
            let (description, unit_price) = line.product.map_or_else(
                || (format!("Product #{}", line.item.product_id), 0.0),
                |p| (p.name, p.price.unwrap_or(0.0)),
            );
            PricedLine {
                product_id: Some(line.item.product_id),
                description,
                quantity: line.item.qty,
                unit_price,
                total: line_total(line.item.qty, unit_price),
                notes: line.item.notes,
            }
        })
        .collect::<Vec<_>>();
    if lines.is_empty() {
        return Err(Error::validation("Cannot invoice an empty quote"));
    }

    let header = InvoiceHeader {
        company,
        user_id: Some(owner.id),
        quote_id: Some(source.quote.id),
        invoice_date: input.invoice_date,
        due_date: input.due_date,
        billing_address: input.billing_address,
        notes: non_blank(input.notes),
    };
    insert_invoice(db, header, lines).await
}

/// Replaces an invoice's header and lines; the number is kept.
///
/// An omitted company, user, quote, invoice date, or billing address keeps the
/// stored value.
pub async fn update_invoice(
    db: &DatabaseConnection,
    invoice_id: i64,
    input: InvoiceInput,
) -> Result<invoice::Model> {
    let txn = db.begin().await?;
    let existing = Invoice::find_by_id(invoice_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Invoice", invoice_id))?;

    let input = InvoiceInput {
        company_id: input.company_id.or(Some(existing.company_id)),
        user_id: input.user_id.or(existing.user_id),
        quote_id: input.quote_id.or(existing.quote_id),
        ..input
    };
    let header = resolve_header(&txn, &input).await?;
    let lines = price_lines(input.items)?;
    let total = invoice_total(&lines);

    InvoiceItem::delete_many()
        .filter(invoice_item::Column::InvoiceId.eq(invoice_id))
        .exec(&txn)
        .await?;
    insert_lines(&txn, invoice_id, &lines).await?;

    let mut invoice: invoice::ActiveModel = existing.into();
    invoice.company_id = Set(header.company.id);
    invoice.user_id = Set(header.user_id);
    invoice.quote_id = Set(header.quote_id);
    if let Some(date) = header.invoice_date {
        invoice.invoice_date = Set(date);
    }
    invoice.due_date = Set(header.due_date);
    if let Some(billing) = header.billing_address {
        invoice.billing_address = Set(serde_json::to_string(&billing)?);
    }
    invoice.notes = Set(header.notes);
    invoice.total = Set(total);
    invoice.updated_at = Set(chrono::Utc::now());
    let invoice = invoice.update(&txn).await?;
    txn.commit().await?;

    info!(invoice_id, total, lines = lines.len(), "Updated invoice");
    Ok(invoice)
}

/// Deletes an invoice and its lines.
pub async fn delete_invoice(db: &DatabaseConnection, invoice_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let invoice = Invoice::find_by_id(invoice_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Invoice", invoice_id))?;
    InvoiceItem::delete_many()
        .filter(invoice_item::Column::InvoiceId.eq(invoice_id))
        .exec(&txn)
        .await?;
    Invoice::delete_by_id(invoice_id).exec(&txn).await?;
    txn.commit().await?;

    info!(invoice_id, "Deleted invoice {}", invoice.invoice_number);
    Ok(())
}

async fn detail(db: &DatabaseConnection, invoice: invoice::Model) -> Result<InvoiceDetail> {
    let company = company_entity::Entity::find_by_id(invoice.company_id)
        .one(db)
        .await?;
    let user = match invoice.user_id {
        Some(user_id) => users::get_user_brief(db, user_id).await?,
        None => None,
    };
    let quote = match invoice.quote_id {
        Some(quote_id) => Quote::find_by_id(quote_id)
            .one(db)
            .await?
            .map(|q: quote::Model| QuoteRef { id: q.id, name: q.name }),
        None => None,
    };
    let items = InvoiceItem::find()
        .filter(invoice_item::Column::InvoiceId.eq(invoice.id))
        .find_also_related(Product)
        .order_by_asc(invoice_item::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|(item, product)| InvoiceLine {
            item,
            product_name: product.map(|p| p.name),
        })
        .collect();
    let billing = serde_json::from_str(&invoice.billing_address).unwrap_or_default();

    Ok(InvoiceDetail {
        invoice,
        company,
        user,
        quote,
        items,
        billing,
    })
}

async fn details(
    db: &DatabaseConnection,
    invoices: Vec<invoice::Model>,
) -> Result<Vec<InvoiceDetail>> {
    let mut result = Vec::with_capacity(invoices.len());
    for invoice in invoices {
        result.push(detail(db, invoice).await?);
    }
    Ok(result)
}

/// Retrieves one invoice with company, user, quote, and lines.
pub async fn get_invoice_detail(db: &DatabaseConnection, invoice_id: i64) -> Result<InvoiceDetail> {
    let invoice = Invoice::find_by_id(invoice_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Invoice", invoice_id))?;
    detail(db, invoice).await
}

/// Lists every invoice, newest first.
pub async fn list_invoices(db: &DatabaseConnection) -> Result<Vec<InvoiceDetail>> {
    let invoices = Invoice::find()
        .order_by_desc(invoice::Column::CreatedAt)
        .order_by_desc(invoice::Column::Id)
        .all(db)
        .await?;
    details(db, invoices).await
}

/// Lists the invoices of a user's company; empty when the user has no company.
pub async fn invoices_for_user(db: &DatabaseConnection, user_id: i64) -> Result<Vec<InvoiceDetail>> {
    let viewer = users::get_user(db, user_id).await?;
    let Some(company_id) = viewer.company_id else {
        return Ok(Vec::new());
    };
    let invoices = Invoice::find()
        .filter(invoice::Column::CompanyId.eq(company_id))
        .order_by_desc(invoice::Column::CreatedAt)
        .order_by_desc(invoice::Column::Id)
        .all(db)
        .await?;
    details(db, invoices).await
}

/// Retrieves an invoice on behalf of a user.
///
/// # Errors
/// - [`Error::NotFound`] if the invoice does not exist
/// - [`Error::Forbidden`] if a vendor asks for another company's invoice
pub async fn get_invoice_for_user(
    db: &DatabaseConnection,
    viewer: &user::Model,
    invoice_id: i64,
) -> Result<InvoiceDetail> {
    let detail = get_invoice_detail(db, invoice_id).await?;
    if viewer.role != Role::Admin && viewer.company_id != Some(detail.invoice.company_id) {
        return Err(Error::Forbidden);
    }
    Ok(detail)
}
