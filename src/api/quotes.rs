//! Quote cart handlers.

use super::{AppState, extract::{AdminSession, Session}, success};
use crate::{
    core::quote::{self, QuoteWithItems},
    entities::quote as quote_entity,
    errors::Result,
};
use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::Value;

/// Body of POST /api/quotes/add-item
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    /// Product to add
    pub product_id: i64,
    /// Defaults to 1
    #[serde(default)]
    pub quantity: Option<i32>,
    /// Sizes, colours, or other requests
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body of POST /api/quotes/remove-item
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    /// Line to remove
    pub item_id: i64,
}

/// Body of POST /api/quotes/submit
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    /// The caller's pending quote
    pub quote_id: i64,
    /// Optional label for the request
    #[serde(default)]
    pub name: Option<String>,
}

/// GET /api/quotes/current - The pending cart, created on demand
pub async fn current(State(state): State<AppState>, session: Session) -> Result<Json<QuoteWithItems>> {
    Ok(Json(quote::current_quote(&state.db, session.user_id()).await?))
}

/// POST /api/quotes/add-item
pub async fn add_item(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<Value>> {
    quote::add_item(
        &state.db,
        session.user_id(),
        req.product_id,
        req.quantity,
        req.notes,
    )
    .await?;
    Ok(success())
}

/// POST /api/quotes/remove-item
pub async fn remove_item(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<RemoveItemRequest>,
) -> Result<Json<Value>> {
    quote::remove_item(&state.db, session.user_id(), req.item_id).await?;
    Ok(success())
}

/// POST /api/quotes/submit
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<quote_entity::Model>> {
    Ok(Json(
        quote::submit(&state.db, session.user_id(), req.quote_id, req.name).await?,
    ))
}

/// GET /api/quotes/my - Quotes of the caller's company
pub async fn my_quotes(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<QuoteWithItems>>> {
    Ok(Json(quote::quotes_for_user(&state.db, session.user_id()).await?))
}

/// GET /api/admin/quotes
pub async fn admin_list(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<Vec<QuoteWithItems>>> {
    Ok(Json(quote::all_quotes(&state.db).await?))
}
