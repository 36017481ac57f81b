//! Company and user administration.

use super::{AppState, extract::AdminSession, success};
use crate::{
    core::{
        company::{self, CompanyInput, CompanyWithCounts},
        user::{self as users, NewUserInput, UpdateUserInput, UserSummary},
    },
    entities::{company as company_entity, user},
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;

// Companies //
//***********//

/// GET /api/admin/companies
pub async fn list_companies(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<Vec<CompanyWithCounts>>> {
    Ok(Json(company::list_companies(&state.db).await?))
}

/// GET /api/admin/companies/{id}
pub async fn get_company(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<CompanyWithCounts>> {
    Ok(Json(company::get_company_with_counts(&state.db, id).await?))
}

/// POST /api/admin/companies
pub async fn create_company(
    State(state): State<AppState>,
    _admin: AdminSession,
    Json(input): Json<CompanyInput>,
) -> Result<Json<company_entity::Model>> {
    Ok(Json(company::create_company(&state.db, input).await?))
}

/// PUT /api/admin/companies/{id}
pub async fn update_company(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
    Json(input): Json<CompanyInput>,
) -> Result<Json<company_entity::Model>> {
    Ok(Json(company::update_company(&state.db, id, input).await?))
}

/// DELETE /api/admin/companies/{id} - Refused while users or invoices remain
pub async fn delete_company(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    company::delete_company(&state.db, id).await?;
    Ok(success())
}

// Users //
//*******//

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<Vec<UserSummary>>> {
    Ok(Json(users::list_users(&state.db).await?))
}

/// POST /api/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    _admin: AdminSession,
    Json(input): Json<NewUserInput>,
) -> Result<Json<user::Model>> {
    Ok(Json(users::create_user(&state.db, input).await?))
}

/// PUT /api/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<i64>,
    Json(input): Json<UpdateUserInput>,
) -> Result<Json<user::Model>> {
    Ok(Json(users::update_user(&state.db, id, input).await?))
}

/// DELETE /api/admin/users/{id} - Admins cannot delete themselves
pub async fn delete_user(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    users::delete_user(&state.db, admin.user_id(), id).await?;
    Ok(success())
}
