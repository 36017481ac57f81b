//! Product of the Month - Calendar slots, vendor applications, and reservations.
//!
//! A month is `open` unless a row says otherwise. Approving an application
//! reserves its month under the label `"<company> - <product>"`; rejecting,
//! resetting, or moving an approved application frees the month again once no
//! other approved application holds it. At most one application may be approved
//! per month.

use crate::{
    core::{non_blank, required, user as users},
    entities::{
        ApplicationStatus, MonthStatus, PotmApplication, PotmMonth, potm_application, potm_month,
    },
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One month on the public calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSlot {
    /// `YYYY-MM`
    pub month_key: String,
    /// English month name
    pub month_name: &'static str,
    /// 1 to 12
    pub month_num: u32,
    /// Open, reserved, or unavailable
    pub status: MonthStatus,
    /// Who holds a reserved month
    pub reserved_label: Option<String>,
    /// Applications still waiting for a decision
    pub pending_count: u64,
}

/// Admin request to set a month's status directly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonthInput {
    /// `YYYY-MM` of the month to set
    pub month_key: String,
    /// New status
    pub status: MonthStatus,
    /// Label shown on the calendar
    pub reserved_label: Option<String>,
}

/// Vendor application for a month.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationInput {
    /// Requested month, `YYYY-MM`
    pub month_key: String,
    /// Applicant company
    pub company_name: String,
    /// Contact person
    pub contact_name: String,
    /// Contact email
    pub contact_email: String,
    /// Product to feature
    pub product_name: String,
    /// Why the product should be featured
    pub description: String,
    /// Product page
    pub link: Option<String>,
    /// Anything else for the reviewers
    pub notes: Option<String>,
}

/// Admin decision on an application; omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationUpdate {
    /// New review status
    pub status: Option<ApplicationStatus>,
    /// Move the application to another month
    pub month_key: Option<String>,
}

/// An application with its applicant, for the admin review list.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationWithUser {
    /// The application row
    #[serde(flatten)]
    pub application: potm_application::Model,
    /// The applying user
    pub user: Option<users::UserBrief>,
}

/// Parses a `YYYY-MM` key into `(year, month)`.
///
/// # Errors
/// Returns [`Error::Validation`] for anything but a four-digit year and a month 01-12.
pub fn parse_month_key(key: &str) -> Result<(i32, u32)> {
    let invalid = || Error::validation(format!("Invalid month '{key}', expected YYYY-MM"));
    let (year, month) = key.split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

/// Formats a month key, e.g. `2026-03`.
#[must_use]
pub fn month_key(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

/// Lists every stored month row by key.
pub async fn list_months(db: &DatabaseConnection) -> Result<Vec<potm_month::Model>> {
    PotmMonth::find()
        .order_by_asc(potm_month::Column::MonthKey)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts or overwrites the row for `key`.
pub async fn upsert_month<C>(
    db: &C,
    key: &str,
    status: MonthStatus,
    reserved_label: Option<String>,
) -> Result<potm_month::Model>
where
    C: ConnectionTrait,
{
    let existing = PotmMonth::find()
        .filter(potm_month::Column::MonthKey.eq(key))
        .one(db)
        .await?;
    let now = chrono::Utc::now();
    let month = match existing {
        Some(row) => {
            let mut month: potm_month::ActiveModel = row.into();
            month.status = Set(status);
            month.reserved_label = Set(reserved_label);
            month.updated_at = Set(now);
            month.update(db).await?
        }
        None => {
            potm_month::ActiveModel {
                month_key: Set(key.to_string()),
                status: Set(status),
                reserved_label: Set(reserved_label),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };
    debug!(month_key = key, status = ?month.status, "Upserted month");
    Ok(month)
}

/// Admin override of a month's status and label.
pub async fn set_month(db: &DatabaseConnection, input: MonthInput) -> Result<potm_month::Model> {
    parse_month_key(&input.month_key)?;
    let txn = db.begin().await?;
    let month = upsert_month(&txn, &input.month_key, input.status, non_blank(input.reserved_label))
        .await?;
    txn.commit().await?;
    info!(month_key = %month.month_key, status = ?month.status, "Month set by admin");
    Ok(month)
}

/// Creates `open` rows for any month of `year` that has none. Existing rows are untouched.
pub async fn ensure_year<C>(db: &C, year: i32) -> Result<u32>
where
    C: ConnectionTrait,
{
    let mut created = 0;
    for month in 1..=12 {
        let key = month_key(year, month);
        let exists = PotmMonth::find()
            .filter(potm_month::Column::MonthKey.eq(key.as_str()))
            .count(db)
            .await?
            > 0;
        if !exists {
            upsert_month(db, &key, MonthStatus::Open, None).await?;
            created += 1;
        }
    }
    Ok(created)
}

/// Builds the twelve slots of `year` from stored rows and pending counts.
#[must_use]
pub fn build_calendar(
    year: i32,
    months: &[potm_month::Model],
    pending: &HashMap<String, u64>,
) -> Vec<CalendarSlot> {
    let by_key: HashMap<&str, &potm_month::Model> =
        months.iter().map(|m| (m.month_key.as_str(), m)).collect();

    (1..=12u32)
        .zip(MONTH_NAMES)
        .map(|(month_num, month_name)| {
            let key = month_key(year, month_num);
            let row = by_key.get(key.as_str());
            CalendarSlot {
                month_name,
                month_num,
                status: row.map_or(MonthStatus::Open, |m| m.status),
                reserved_label: row.and_then(|m| m.reserved_label.clone()),
                pending_count: pending.get(&key).copied().unwrap_or(0),
                month_key: key,
            }
        })
        .collect()
}

/// The calendar for `year`.
pub async fn calendar(db: &DatabaseConnection, year: i32) -> Result<Vec<CalendarSlot>> {
    let prefix = format!("{year:04}-");
    let months = PotmMonth::find()
        .filter(potm_month::Column::MonthKey.starts_with(&prefix))
        .all(db)
        .await?;
    let pending_apps = PotmApplication::find()
        .filter(potm_application::Column::MonthKey.starts_with(&prefix))
        .filter(potm_application::Column::Status.eq(ApplicationStatus::Pending))
        .all(db)
        .await?;

    let mut pending: HashMap<String, u64> = HashMap::new();
    for app in pending_apps {
        *pending.entry(app.month_key).or_default() += 1;
    }
    Ok(build_calendar(year, &months, &pending))
}

/// Submits an application for an open month.
///
/// # Errors
/// - [`Error::Validation`] for a malformed month key, a blank required field, or a reserved month
pub async fn apply(
    db: &DatabaseConnection,
    user_id: i64,
    input: ApplicationInput,
) -> Result<potm_application::Model> {
    parse_month_key(&input.month_key)?;
    let company_name = required("Company name", &input.company_name)?;
    let contact_name = required("Contact name", &input.contact_name)?;
    let contact_email = required("Contact email", &input.contact_email)?;
    let product_name = required("Product name", &input.product_name)?;
    let description = required("Description", &input.description)?;

    let month = PotmMonth::find()
        .filter(potm_month::Column::MonthKey.eq(input.month_key.as_str()))
        .one(db)
        .await?;
    if month.is_some_and(|m| m.status != MonthStatus::Open) {
        return Err(Error::validation("This month is not open for applications"));
    }

    let now = chrono::Utc::now();
    let application = potm_application::ActiveModel {
        user_id: Set(user_id),
        month_key: Set(input.month_key),
        company_name: Set(company_name),
        contact_name: Set(contact_name),
        contact_email: Set(contact_email),
        product_name: Set(product_name),
        description: Set(description),
        link: Set(non_blank(input.link)),
        notes: Set(non_blank(input.notes)),
        status: Set(ApplicationStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        application_id = application.id,
        user_id,
        month_key = %application.month_key,
        "New POTM application"
    );
    Ok(application)
}

/// A user's own applications, newest first.
pub async fn my_applications(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<potm_application::Model>> {
    PotmApplication::find()
        .filter(potm_application::Column::UserId.eq(user_id))
        .order_by_desc(potm_application::Column::CreatedAt)
        .order_by_desc(potm_application::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All applications with their applicants, newest first.
pub async fn list_applications(db: &DatabaseConnection) -> Result<Vec<ApplicationWithUser>> {
    let applications = PotmApplication::find()
        .order_by_desc(potm_application::Column::CreatedAt)
        .order_by_desc(potm_application::Column::Id)
        .all(db)
        .await?;

    let mut result = Vec::with_capacity(applications.len());
    for application in applications {
        let user = users::get_user_brief(db, application.user_id).await?;
        result.push(ApplicationWithUser { application, user });
    }
    Ok(result)
}

async fn other_approved_exists<C>(db: &C, key: &str, exclude_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = PotmApplication::find()
        .filter(potm_application::Column::MonthKey.eq(key))
        .filter(potm_application::Column::Status.eq(ApplicationStatus::Approved))
        .filter(potm_application::Column::Id.ne(exclude_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Opens `key` unless another approved application still holds it.
async fn release_month<C>(db: &C, key: &str, exclude_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    if other_approved_exists(db, key, exclude_id).await? {
        debug!(month_key = key, "Month stays reserved by another approval");
        return Ok(());
    }
    upsert_month(db, key, MonthStatus::Open, None).await?;
    info!(month_key = key, "Released month");
    Ok(())
}

/// Applies an admin decision and keeps the month reservations consistent.
///
/// All reads and writes happen in one transaction.
///
/// # Errors
/// - [`Error::NotFound`] if the application does not exist
/// - [`Error::Validation`] for a malformed month key, or when approving into a
///   month another approved application already holds
#[instrument(skip(db, update), fields(status = ?update.status, month = ?update.month_key))]
pub async fn update_application(
    db: &DatabaseConnection,
    application_id: i64,
    update: ApplicationUpdate,
) -> Result<potm_application::Model> {
    let new_month = non_blank(update.month_key);
    if let Some(key) = &new_month {
        parse_month_key(key)?;
    }

    let txn = db.begin().await?;
    let existing = PotmApplication::find_by_id(application_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Application", application_id))?;

    let was_approved = existing.status == ApplicationStatus::Approved;
    let old_month = existing.month_key.clone();
    let target = new_month.unwrap_or_else(|| old_month.clone());
    let final_status = update.status.unwrap_or(existing.status);
    let month_changed = target != old_month;

    if final_status == ApplicationStatus::Approved
        && other_approved_exists(&txn, &target, application_id).await?
    {
        return Err(Error::validation(format!(
            "{target} is already reserved by another approved application"
        )));
    }

    let label = format!("{} - {}", existing.company_name, existing.product_name);
    let mut application: potm_application::ActiveModel = existing.into();
    application.status = Set(final_status);
    application.month_key = Set(target.clone());
    application.updated_at = Set(chrono::Utc::now());
    let application = application.update(&txn).await?;

    if month_changed && was_approved {
        release_month(&txn, &old_month, application_id).await?;
    }
    if final_status == ApplicationStatus::Approved {
        upsert_month(&txn, &target, MonthStatus::Reserved, Some(label)).await?;
        info!(application_id, month_key = %target, "Reserved month for approved application");
    } else if was_approved {
        release_month(&txn, &target, application_id).await?;
    }

    txn.commit().await?;
    Ok(application)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    async fn month(db: &DatabaseConnection, key: &str) -> Result<Option<potm_month::Model>> {
        Ok(PotmMonth::find()
            .filter(potm_month::Column::MonthKey.eq(key))
            .one(db)
            .await?)
    }

    fn approve() -> ApplicationUpdate {
        ApplicationUpdate {
            status: Some(ApplicationStatus::Approved),
            month_key: None,
        }
    }

    /// Legacy data: a second approved row sitting on an already reserved month.
    async fn force_second_approval(
        db: &DatabaseConnection,
        user_id: i64,
        key: &str,
    ) -> Result<potm_application::Model> {
        let mut other = test_application_input("2026-08");
        other.company_name = "Globex".to_string();
        let other = apply(db, user_id, other).await?;
        let mut forced: potm_application::ActiveModel = other.into();
        forced.month_key = Set(key.to_string());
        forced.status = Set(ApplicationStatus::Approved);
        Ok(forced.update(db).await?)
    }

    #[test]
    fn test_parse_month_key() {
        assert_eq!(parse_month_key("2026-03").unwrap(), (2026, 3));
        for bad in ["2026-13", "2026-00", "2026-3", "26-03", "2026/03", "abcd-ef", ""] {
            assert!(parse_month_key(bad).is_err(), "{bad} should be rejected");
        }
        assert_eq!(month_key(2026, 3), "2026-03");
    }

    #[test]
    fn test_build_calendar_defaults_to_open() {
        let now = chrono::Utc::now();
        let rows = vec![potm_month::Model {
            id: 1,
            month_key: "2026-05".to_string(),
            status: MonthStatus::Reserved,
            reserved_label: Some("Acme - Widget".to_string()),
            updated_at: now,
        }];
        let pending = HashMap::from([("2026-02".to_string(), 3)]);

        let slots = build_calendar(2026, &rows, &pending);
        assert_eq!(slots.len(), 12);
        assert_eq!(slots[0].month_key, "2026-01");
        assert_eq!(slots[0].month_name, "January");
        assert_eq!(slots[1].pending_count, 3);
        assert_eq!(slots[4].status, MonthStatus::Reserved);
        assert_eq!(slots[4].reserved_label.as_deref(), Some("Acme - Widget"));
        assert_eq!(slots[11].month_num, 12);
        assert!(slots.iter().filter(|s| s.month_num != 5).all(|s| s.status == MonthStatus::Open));
    }

    #[tokio::test]
    async fn test_apply_rules() -> Result<()> {
        let db = setup_test_db().await?;
        let vendor = create_test_vendor(&db, "v@example.com", None).await?;

        let app = apply(&db, vendor.id, test_application_input("2026-03")).await?;
        assert_eq!(app.status, ApplicationStatus::Pending);

        let bad_key = apply(&db, vendor.id, test_application_input("2026-3")).await;
        assert!(matches!(bad_key.unwrap_err(), Error::Validation { .. }));

        let mut blank = test_application_input("2026-04");
        blank.product_name = " ".to_string();
        let blank = apply(&db, vendor.id, blank).await;
        assert!(matches!(blank.unwrap_err(), Error::Validation { .. }));

        upsert_month(&db, "2026-05", MonthStatus::Reserved, None).await?;
        let reserved = apply(&db, vendor.id, test_application_input("2026-05")).await;
        assert!(matches!(reserved.unwrap_err(), Error::Validation { .. }));

        assert_eq!(my_applications(&db, vendor.id).await?.len(), 1);
        let calendar = calendar(&db, 2026).await?;
        assert_eq!(calendar[2].pending_count, 1);
        assert_eq!(calendar[4].status, MonthStatus::Reserved);
        Ok(())
    }

    #[tokio::test]
    async fn test_approve_reserves_month() -> Result<()> {
        let db = setup_test_db().await?;
        let vendor = create_test_vendor(&db, "v@example.com", None).await?;
        let app = apply(&db, vendor.id, test_application_input("2026-03")).await?;

        let approved = update_application(&db, app.id, approve()).await?;
        assert_eq!(approved.status, ApplicationStatus::Approved);

        let row = month(&db, "2026-03").await?.unwrap();
        assert_eq!(row.status, MonthStatus::Reserved);
        assert_eq!(row.reserved_label.as_deref(), Some("Acme - Widget"));
        Ok(())
    }

    #[tokio::test]
    async fn test_second_approval_for_same_month_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let vendor = create_test_vendor(&db, "v@example.com", None).await?;
        let first = apply(&db, vendor.id, test_application_input("2026-03")).await?;
        let second = apply(&db, vendor.id, test_application_input("2026-03")).await?;

        update_application(&db, first.id, approve()).await?;
        let result = update_application(&db, second.id, approve()).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let unchanged = PotmApplication::find_by_id(second.id).one(&db).await?.unwrap();
        assert_eq!(unchanged.status, ApplicationStatus::Pending);
        Ok(())
    }

    #[tokio::test]
    async fn test_reject_approved_reopens_month() -> Result<()> {
        let db = setup_test_db().await?;
        let vendor = create_test_vendor(&db, "v@example.com", None).await?;
        let app = apply(&db, vendor.id, test_application_input("2026-03")).await?;
        update_application(&db, app.id, approve()).await?;

        update_application(
            &db,
            app.id,
            ApplicationUpdate {
                status: Some(ApplicationStatus::Rejected),
                month_key: None,
            },
        )
        .await?;
        let row = month(&db, "2026-03").await?.unwrap();
        assert_eq!(row.status, MonthStatus::Open);
        assert_eq!(row.reserved_label, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_move_approved_frees_old_month() -> Result<()> {
        let db = setup_test_db().await?;
        let vendor = create_test_vendor(&db, "v@example.com", None).await?;
        let app = apply(&db, vendor.id, test_application_input("2026-03")).await?;
        update_application(&db, app.id, approve()).await?;

        let moved = update_application(
            &db,
            app.id,
            ApplicationUpdate {
                status: None,
                month_key: Some("2026-06".to_string()),
            },
        )
        .await?;
        assert_eq!(moved.month_key, "2026-06");
        assert_eq!(moved.status, ApplicationStatus::Approved);
        assert_eq!(month(&db, "2026-03").await?.unwrap().status, MonthStatus::Open);
        assert_eq!(month(&db, "2026-06").await?.unwrap().status, MonthStatus::Reserved);
        Ok(())
    }

    #[tokio::test]
    async fn test_move_keeps_month_held_by_other_approval() -> Result<()> {
        let db = setup_test_db().await?;
        let vendor = create_test_vendor(&db, "v@example.com", None).await?;
        let app = apply(&db, vendor.id, test_application_input("2026-03")).await?;
        update_application(&db, app.id, approve()).await?;

        force_second_approval(&db, vendor.id, "2026-03").await?;

        update_application(
            &db,
            app.id,
            ApplicationUpdate {
                status: None,
                month_key: Some("2026-07".to_string()),
            },
        )
        .await?;
        assert_eq!(month(&db, "2026-03").await?.unwrap().status, MonthStatus::Reserved);
        assert_eq!(month(&db, "2026-07").await?.unwrap().status, MonthStatus::Reserved);
        Ok(())
    }

    #[tokio::test]
    async fn test_reject_keeps_month_held_by_other_approval() -> Result<()> {
        let db = setup_test_db().await?;
        let vendor = create_test_vendor(&db, "v@example.com", None).await?;
        let app = apply(&db, vendor.id, test_application_input("2026-03")).await?;
        update_application(&db, app.id, approve()).await?;
        let other = force_second_approval(&db, vendor.id, "2026-03").await?;

        let rejected = update_application(
            &db,
            app.id,
            ApplicationUpdate {
                status: Some(ApplicationStatus::Rejected),
                month_key: None,
            },
        )
        .await?;
        assert_eq!(rejected.status, ApplicationStatus::Rejected);
        let row = month(&db, "2026-03").await?.unwrap();
        assert_eq!(row.status, MonthStatus::Reserved);
        assert_eq!(row.reserved_label.as_deref(), Some("Acme - Widget"));

        // Once the last approval goes, the month reopens
        update_application(
            &db,
            other.id,
            ApplicationUpdate {
                status: Some(ApplicationStatus::Rejected),
                month_key: None,
            },
        )
        .await?;
        let row = month(&db, "2026-03").await?.unwrap();
        assert_eq!(row.status, MonthStatus::Open);
        assert_eq!(row.reserved_label, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_to_pending_keeps_month_held_by_other_approval() -> Result<()> {
        let db = setup_test_db().await?;
        let vendor = create_test_vendor(&db, "v@example.com", None).await?;
        let app = apply(&db, vendor.id, test_application_input("2026-03")).await?;
        update_application(&db, app.id, approve()).await?;
        force_second_approval(&db, vendor.id, "2026-03").await?;

        let reset = update_application(
            &db,
            app.id,
            ApplicationUpdate {
                status: Some(ApplicationStatus::Pending),
                month_key: None,
            },
        )
        .await?;
        assert_eq!(reset.status, ApplicationStatus::Pending);
        assert_eq!(month(&db, "2026-03").await?.unwrap().status, MonthStatus::Reserved);
        Ok(())
    }

    #[tokio::test]
    async fn test_pending_to_rejected_does_not_touch_month() -> Result<()> {
        let db = setup_test_db().await?;
        let vendor = create_test_vendor(&db, "v@example.com", None).await?;
        let app = apply(&db, vendor.id, test_application_input("2026-03")).await?;

        update_application(
            &db,
            app.id,
            ApplicationUpdate {
                status: Some(ApplicationStatus::Rejected),
                month_key: None,
            },
        )
        .await?;
        assert!(month(&db, "2026-03").await?.is_none());

        let missing = update_application(&db, 999, approve()).await;
        assert!(matches!(missing.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_year_keeps_reservations() -> Result<()> {
        let db = setup_test_db().await?;
        upsert_month(&db, "2026-04", MonthStatus::Reserved, Some("Held".to_string())).await?;

        assert_eq!(ensure_year(&db, 2026).await?, 11);
        assert_eq!(ensure_year(&db, 2026).await?, 0);
        assert_eq!(list_months(&db).await?.len(), 12);
        assert_eq!(month(&db, "2026-04").await?.unwrap().status, MonthStatus::Reserved);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_applications_includes_applicant() -> Result<()> {
        let db = setup_test_db().await?;
        let company = create_test_company(&db, "Acme").await?;
        let vendor = create_test_vendor(&db, "v@acme.test", Some(company.id)).await?;
        apply(&db, vendor.id, test_application_input("2026-03")).await?;

        let listed = list_applications(&db).await?;
        assert_eq!(listed.len(), 1);
        let applicant = listed[0].user.as_ref().unwrap();
        assert_eq!(applicant.email, "v@acme.test");
        assert_eq!(applicant.company.as_ref().unwrap().name, "Acme");
        Ok(())
    }
}
