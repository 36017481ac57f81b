//! Company business logic - Handles company records and billing addresses.
//!
//! Companies group vendor users and are the billing party on invoices. A company
//! that still has users or invoices cannot be deleted; those must be removed or
//! reassigned first.

use crate::{
    core::{non_blank, required},
    entities::{Company, Invoice, User, company, invoice, user},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Request body for creating or updating a company.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyInput {
    /// Company name, required
    pub name: String,
    /// Street line
    pub street: Option<String>,
    /// City
    pub city: Option<String>,
    /// State or region
    pub state: Option<String>,
    /// Postal code
    pub zip: Option<String>,
    /// Country
    pub country: Option<String>,
}

/// Number of records that keep a company from being deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompanyCounts {
    /// Users assigned to the company
    pub users: u64,
    /// Invoices billed to the company
    pub invoices: u64,
}

/// A company together with its dependent record counts.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyWithCounts {
    /// The company row
    #[serde(flatten)]
    pub company: company::Model,
    /// Dependent record counts
    #[serde(rename = "_count")]
    pub count: CompanyCounts,
}

/// Billing address snapshot stored as JSON on invoices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillingAddress {
    /// Street line
    pub street: Option<String>,
    /// City
    pub city: Option<String>,
    /// State or region
    pub state: Option<String>,
    /// Postal code
    pub zip: Option<String>,
    /// Country
    pub country: Option<String>,
}

impl BillingAddress {
    /// Copies the address fields of a company.
    #[must_use]
    pub fn from_company(company: &company::Model) -> Self {
        Self {
            street: company.street.clone(),
            city: company.city.clone(),
            state: company.state.clone(),
            zip: company.zip.clone(),
            country: company.country.clone(),
        }
    }

    /// Address lines for printing, skipping empty parts.
    ///
    /// City, state, and zip share one line (`"Springfield, IL 62701"`).
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(street) = &self.street {
            lines.push(street.clone());
        }
        let city_state = [self.city.as_deref(), self.state.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");
        let locality = match (&self.zip, city_state.is_empty()) {
            (Some(zip), false) => format!("{city_state} {zip}"),
            (Some(zip), true) => zip.clone(),
            (None, _) => city_state,
        };
        if !locality.is_empty() {
            lines.push(locality);
        }
        if let Some(country) = &self.country {
            lines.push(country.clone());
        }
        lines
    }
}

/// Counts the users and invoices that reference a company.
pub async fn count_dependents<C>(db: &C, company_id: i64) -> Result<CompanyCounts>
where
    C: ConnectionTrait,
{
    let users = User::find()
        .filter(user::Column::CompanyId.eq(company_id))
        .count(db)
        .await?;
    let invoices = Invoice::find()
        .filter(invoice::Column::CompanyId.eq(company_id))
        .count(db)
        .await?;
    Ok(CompanyCounts { users, invoices })
}

/// Retrieves a company by id.
pub async fn get_company<C>(db: &C, company_id: i64) -> Result<company::Model>
where
    C: ConnectionTrait,
{
    Company::find_by_id(company_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Company", company_id))
}

/// Retrieves a company with its dependent counts.
pub async fn get_company_with_counts(
    db: &DatabaseConnection,
    company_id: i64,
) -> Result<CompanyWithCounts> {
    let company = get_company(db, company_id).await?;
    let count = count_dependents(db, company_id).await?;
    Ok(CompanyWithCounts { company, count })
}

/// Lists all companies alphabetically with their dependent counts.
pub async fn list_companies(db: &DatabaseConnection) -> Result<Vec<CompanyWithCounts>> {
    let companies = Company::find()
        .order_by_asc(company::Column::Name)
        .all(db)
        .await?;

    let mut result = Vec::with_capacity(companies.len());
    for company in companies {
        let count = count_dependents(db, company.id).await?;
        result.push(CompanyWithCounts { company, count });
    }
    Ok(result)
}

/// Creates a company. The name is required; blank address fields are stored as NULL.
pub async fn create_company(db: &DatabaseConnection, input: CompanyInput) -> Result<company::Model> {
    let name = required("Company name", &input.name)?;
    let now = chrono::Utc::now();

    let company = company::ActiveModel {
        name: Set(name),
        street: Set(non_blank(input.street)),
        city: Set(non_blank(input.city)),
        state: Set(non_blank(input.state)),
        zip: Set(non_blank(input.zip)),
        country: Set(non_blank(input.country)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let company = company.insert(db).await?;
    info!(company_id = company.id, "Created company {}", company.name);
    Ok(company)
}

/// Replaces a company's name and address.
pub async fn update_company(
    db: &DatabaseConnection,
    company_id: i64,
    input: CompanyInput,
) -> Result<company::Model> {
    let name = required("Company name", &input.name)?;
    let mut company: company::ActiveModel = get_company(db, company_id).await?.into();

    company.name = Set(name);
    company.street = Set(non_blank(input.street));
    company.city = Set(non_blank(input.city));
    company.state = Set(non_blank(input.state));
    company.zip = Set(non_blank(input.zip));
    company.country = Set(non_blank(input.country));
    company.updated_at = Set(chrono::Utc::now());

    company.update(db).await.map_err(Into::into)
}

/// Deletes a company that has no users and no invoices.
///
/// # Errors
/// - [`Error::NotFound`] if the company does not exist
/// - [`Error::Validation`] if users or invoices still reference it
pub async fn delete_company(db: &DatabaseConnection, company_id: i64) -> Result<()> {
    let company = get_company(db, company_id).await?;
    let count = count_dependents(db, company_id).await?;
    if count.users > 0 || count.invoices > 0 {
        return Err(Error::validation(
            "Cannot delete company with associated users or invoices. \
             Please remove or reassign them first.",
        ));
    }

    Company::delete_by_id(company.id).exec(db).await?;
    info!(company_id, "Deleted company {}", company.name);
    Ok(())
}
