//! User business logic - Accounts, login, and applicant summaries.
//!
//! Admins create accounts for vendors; there is no self sign-up. Deleting an
//! account is refused while it still owns quotes, POTM applications, or
//! invoices, and an admin can never delete their own account.

use crate::{
    auth,
    core::{company, non_blank},
    entities::{
        Company, Invoice, PotmApplication, Quote, Role, User, company as company_entity, invoice,
        potm_application, quote, user,
    },
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const MIN_PASSWORD_LEN: usize = 8;

/// Request body for creating a user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewUserInput {
    /// Login email, stored lowercased
    pub email: String,
    /// Display name
    pub name: Option<String>,
    /// At least 8 characters
    pub password: String,
    /// Defaults to vendor
    pub role: Option<Role>,
    /// Company the user belongs to
    pub company_id: Option<i64>,
}

/// Request body for updating a user. A missing password keeps the current one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUserInput {
    /// Display name
    pub name: Option<String>,
    /// New role; omitted keeps the current one
    pub role: Option<Role>,
    /// Company the user belongs to
    pub company_id: Option<i64>,
    /// New password; omitted keeps the current one
    pub password: Option<String>,
}

/// Name, email, and company of a user, embedded in quotes, invoices, and applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBrief {
    /// Display name
    pub name: Option<String>,
    /// Login email
    pub email: String,
    /// The user's company
    pub company: Option<company_entity::Model>,
}

/// Per-user record counts shown on the admin user list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCounts {
    /// Quotes owned
    pub quotes: u64,
    /// POTM applications submitted
    pub potm_applications: u64,
}

/// A user as returned by the API: model plus company.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    /// The user row
    #[serde(flatten)]
    pub user: user::Model,
    /// The user's company
    pub company: Option<company_entity::Model>,
}

/// A user on the admin list, with counts.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    /// The user row
    #[serde(flatten)]
    pub user: user::Model,
    /// The user's company
    pub company: Option<company_entity::Model>,
    /// Owned record counts
    #[serde(rename = "_count")]
    pub count: UserCounts,
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::validation("A valid email is required"));
    }
    Ok(email)
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Retrieves a user by id.
pub async fn get_user<C>(db: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))
}

/// Finds a user by email (case-insensitive), returning None if not found.
pub async fn get_user_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a user together with their company.
pub async fn get_user_view(db: &DatabaseConnection, user_id: i64) -> Result<UserView> {
    let (user, company) = User::find_by_id(user_id)
        .find_also_related(Company)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))?;
    Ok(UserView { user, company })
}

/// Builds the embedded applicant/owner summary for a user id.
///
/// Returns `None` when the user no longer exists.
pub async fn get_user_brief<C>(db: &C, user_id: i64) -> Result<Option<UserBrief>>
where
    C: ConnectionTrait,
{
    let found = User::find_by_id(user_id)
        .find_also_related(Company)
        .one(db)
        .await?;
    Ok(found.map(|(user, company)| UserBrief {
        name: user.name,
        email: user.email,
        company,
    }))
}

/// Lists all users, newest first, with their company and record counts.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<UserSummary>> {
    let users = User::find()
        .find_also_related(Company)
        .order_by_desc(user::Column::CreatedAt)
        .all(db)
        .await?;

    let mut result = Vec::with_capacity(users.len());
    for (user, company) in users {
        let quotes = Quote::find()
            .filter(quote::Column::UserId.eq(user.id))
            .count(db)
            .await?;
        let potm_applications = PotmApplication::find()
            .filter(potm_application::Column::UserId.eq(user.id))
            .count(db)
            .await?;
        result.push(UserSummary {
            user,
            company,
            count: UserCounts {
                quotes,
                potm_applications,
            },
        });
    }
    Ok(result)
}

/// Creates a user with a hashed password.
///
/// # Errors
/// - [`Error::Validation`] for an invalid email, a short password, or a duplicate email
/// - [`Error::NotFound`] if `company_id` names a missing company
pub async fn create_user(db: &DatabaseConnection, input: NewUserInput) -> Result<user::Model> {
    let email = normalize_email(&input.email)?;
    validate_password(&input.password)?;
    if let Some(company_id) = input.company_id {
        company::get_company(db, company_id).await?;
    }
    if get_user_by_email(db, &email).await?.is_some() {
        return Err(Error::validation("Email already exists"));
    }

    let password_hash = auth::hash_password(input.password).await?;
    let now = chrono::Utc::now();
    let user = user::ActiveModel {
        email: Set(email),
        name: Set(non_blank(input.name)),
        password_hash: Set(password_hash),
        role: Set(input.role.unwrap_or_default()),
        company_id: Set(input.company_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let user = user.insert(db).await?;
    info!(user_id = user.id, role = ?user.role, "Created user {}", user.email);
    Ok(user)
}

/// Updates a user's name, role, company, and optionally password.
pub async fn update_user(
    db: &DatabaseConnection,
    user_id: i64,
    input: UpdateUserInput,
) -> Result<user::Model> {
    let existing = get_user(db, user_id).await?;
    if let Some(company_id) = input.company_id {
        company::get_company(db, company_id).await?;
    }

    let mut user: user::ActiveModel = existing.into();
    user.name = Set(non_blank(input.name));
    if let Some(role) = input.role {
        user.role = Set(role);
    }
    user.company_id = Set(input.company_id);
    if let Some(password) = input.password.filter(|p| !p.is_empty()) {
        validate_password(&password)?;
        user.password_hash = Set(auth::hash_password(password).await?);
    }
    user.updated_at = Set(chrono::Utc::now());

    user.update(db).await.map_err(Into::into)
}

/// Deletes a user that owns no quotes, applications, or invoices.
///
/// # Errors
/// - [`Error::Validation`] when `acting_user_id == user_id`, or dependents exist
/// - [`Error::NotFound`] if the user does not exist
pub async fn delete_user(db: &DatabaseConnection, acting_user_id: i64, user_id: i64) -> Result<()> {
    if acting_user_id == user_id {
        return Err(Error::validation("You cannot delete your own account"));
    }
    let user = get_user(db, user_id).await?;

    let quotes = Quote::find()
        .filter(quote::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    let applications = PotmApplication::find()
        .filter(potm_application::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    let invoices = Invoice::find()
        .filter(invoice::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    if quotes + applications + invoices > 0 {
        return Err(Error::validation(
            "Cannot delete user with quotes, POTM applications, or invoices",
        ));
    }

    User::delete_by_id(user_id).exec(db).await?;
    info!(user_id, "Deleted user {}", user.email);
    Ok(())
}

/// Checks an email/password pair and returns the matching user.
///
/// Unknown emails and wrong passwords both yield [`Error::Unauthorized`].
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model> {
    let Some(user) = get_user_by_email(db, email).await? else {
        warn!("Login attempt for unknown email");
        return Err(Error::Unauthorized);
    };
    if !auth::verify_password(password.to_string(), user.password_hash.clone()).await? {
        warn!(user_id = user.id, "Login attempt with wrong password");
        return Err(Error::Unauthorized);
    }
    Ok(user)
}
