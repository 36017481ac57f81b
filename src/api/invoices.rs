//! Invoice handlers, including the PDF download.

use super::{AppState, extract::{AdminSession, Session}, success};
use crate::{
    core::{
        invoice::{self, FromQuoteInput, InvoiceDetail, InvoiceInput},
        invoice_pdf,
    },
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use serde_json::Value;

/// GET /api/admin/invoices
pub async fn admin_list(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<Vec<InvoiceDetail>>> {
    Ok(Json(invoice::list_invoices(&state.db).await?))
}

/// POST /api/admin/invoices
pub async fn create(
    State(state): State<AppState>,
    _admin: AdminSession,
    Json(input): Json<InvoiceInput>,
) -> Result<Json<InvoiceDetail>> {
    let created = invoice::create_invoice(&state.db, input).await?;
    Ok(Json(invoice::get_invoice_detail(&state.db, created.id).await?))
}

/// POST /api/admin/invoices/from-quote
pub async fn create_from_quote(
    State(state): State<AppState>,
    _admin: AdminSession,
    Json(input): Json<FromQuoteInput>,
) -> Result<Json<InvoiceDetail>> {
    let created = invoice::create_from_quote(&state.db, input).await?;
    Ok(Json(invoice::get_invoice_detail(&state.db, created.id).await?))
}

/// GET /api/admin/invoices/{id}
pub async fn admin_get(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<InvoiceDetail>> {
    Ok(Json(invoice::get_invoice_detail(&state.db, id).await?))
}

/// PUT /api/admin/invoices/{id} - Replace header and lines
pub async fn update(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
    Json(input): Json<InvoiceInput>,
) -> Result<Json<InvoiceDetail>> {
    invoice::update_invoice(&state.db, id, input).await?;
    Ok(Json(invoice::get_invoice_detail(&state.db, id).await?))
}

/// DELETE /api/admin/invoices/{id}
pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    invoice::delete_invoice(&state.db, id).await?;
    Ok(success())
}

/// GET /api/admin/invoices/{id}/pdf
pub async fn pdf(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let detail = invoice::get_invoice_detail(&state.db, id).await?;
    let filename = format!("invoice-{}.pdf", detail.invoice.invoice_number);
    let bytes =
        tokio::task::spawn_blocking(move || invoice_pdf::render_invoice_pdf(&detail)).await??;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

/// GET /api/invoices/my - Invoices of the caller's company
pub async fn my_invoices(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<InvoiceDetail>>> {
    Ok(Json(invoice::invoices_for_user(&state.db, session.user_id()).await?))
}

/// GET /api/invoices/{id} - One invoice of the caller's company (admins: any)
pub async fn get_for_user(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Json<InvoiceDetail>> {
    Ok(Json(
        invoice::get_invoice_for_user(&state.db, &session.user, id).await?,
    ))
}
