//! Product of the Month handlers.

use super::{AppState, extract::{AdminSession, Session}, success};
use crate::{
    core::potm::{
        self, ApplicationInput, ApplicationUpdate, ApplicationWithUser, CalendarSlot, MonthInput,
    },
    entities::{potm_application, potm_month},
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Datelike;
use serde::Deserialize;
use serde_json::Value;

/// Query string of the calendar endpoint
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    /// Defaults to the current year
    pub year: Option<i32>,
}

/// GET /api/potm/calendar?year=
pub async fn calendar(
    State(state): State<AppState>,
    _session: Session,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<CalendarSlot>>> {
    let year = query.year.unwrap_or_else(|| chrono::Utc::now().year());
    Ok(Json(potm::calendar(&state.db, year).await?))
}

/// POST /api/potm/apply
pub async fn apply(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<ApplicationInput>,
) -> Result<Json<Value>> {
    potm::apply(&state.db, session.user_id(), input).await?;
    Ok(success())
}

/// GET /api/potm/my-applications
pub async fn my_applications(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<potm_application::Model>>> {
    Ok(Json(potm::my_applications(&state.db, session.user_id()).await?))
}

/// GET /api/admin/potm - Stored month rows
pub async fn admin_months(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<Vec<potm_month::Model>>> {
    Ok(Json(potm::list_months(&state.db).await?))
}

/// PUT /api/admin/potm - Set one month's status and label
pub async fn admin_set_month(
    State(state): State<AppState>,
    _admin: AdminSession,
    Json(input): Json<MonthInput>,
) -> Result<Json<potm_month::Model>> {
    Ok(Json(potm::set_month(&state.db, input).await?))
}

/// GET /api/admin/potm/applications
pub async fn admin_applications(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<Vec<ApplicationWithUser>>> {
    Ok(Json(potm::list_applications(&state.db).await?))
}

/// PUT /api/admin/potm/applications/{id} - Approve, reject, reset, or move
pub async fn admin_update_application(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
    Json(update): Json<ApplicationUpdate>,
) -> Result<Json<potm_application::Model>> {
    Ok(Json(potm::update_application(&state.db, id, update).await?))
}
