//! Quote business logic - The vendor's cart of requested products.
//!
//! Each user has at most one working `pending` quote at a time. Items can be
//! added and removed only while the quote is pending; submitting it freezes the
//! quote and the next `add_item` starts a fresh one.

use crate::{
    core::{non_blank, product, user as users},
    entities::{
        Product, Quote, QuoteItem, QuoteStatus, User, product as product_entity, quote,
        quote_item, user,
    },
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{debug, info};

/// A quote line with the requested product.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteLine {
    /// The stored line
    #[serde(flatten)]
    pub item: quote_item::Model,
    /// `None` only if the product row has since disappeared
    pub product: Option<product_entity::Model>,
}

/// A quote with its lines and, for listings, its owner.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteWithItems {
    /// The quote row
    #[serde(flatten)]
    pub quote: quote::Model,
    /// Lines in the order they were added
    pub items: Vec<QuoteLine>,
    /// Owner, included in listings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<users::UserBrief>,
}

async fn load_lines<C>(db: &C, quote_id: i64) -> Result<Vec<QuoteLine>>
where
    C: ConnectionTrait,
{
    let rows = QuoteItem::find()
        .filter(quote_item::Column::QuoteId.eq(quote_id))
        .find_also_related(Product)
        .order_by_asc(quote_item::Column::Id)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(item, product)| QuoteLine { item, product })
        .collect())
}

async fn with_items<C>(db: &C, quote: quote::Model, include_user: bool) -> Result<QuoteWithItems>
where
    C: ConnectionTrait,
{
    let items = load_lines(db, quote.id).await?;
    let user = if include_user {
        users::get_user_brief(db, quote.user_id).await?
    } else {
        None
    };
    Ok(QuoteWithItems { quote, items, user })
}

/// Newest pending quote of a user, created if none exists.
async fn find_or_create_pending<C>(db: &C, user_id: i64) -> Result<quote::Model>
where
    C: ConnectionTrait,
{
    let existing = Quote::find()
        .filter(quote::Column::UserId.eq(user_id))
        .filter(quote::Column::Status.eq(QuoteStatus::Pending))
        .order_by_desc(quote::Column::CreatedAt)
        .order_by_desc(quote::Column::Id)
        .one(db)
        .await?;
    if let Some(quote) = existing {
        return Ok(quote);
    }

    let now = chrono::Utc::now();
    let quote = quote::ActiveModel {
        user_id: Set(user_id),
        name: Set(None),
        status: Set(QuoteStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let quote = quote.insert(db).await?;
    debug!(user_id, quote_id = quote.id, "Opened new pending quote");
    Ok(quote)
}

/// Retrieves a quote with its lines and owner.
pub async fn get_quote_with_items<C>(db: &C, quote_id: i64) -> Result<QuoteWithItems>
where
    C: ConnectionTrait,
{
    let quote = Quote::find_by_id(quote_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Quote", quote_id))?;
    with_items(db, quote, true).await
}

/// Returns the user's working cart, opening one if needed.
pub async fn current_quote(db: &DatabaseConnection, user_id: i64) -> Result<QuoteWithItems> {
    let txn = db.begin().await?;
    let quote = find_or_create_pending(&txn, user_id).await?;
    txn.commit().await?;
    with_items(db, quote, false).await
}

/// Adds a product to the user's pending quote.
///
/// # Errors
/// - [`Error::Validation`] if `qty` is less than 1
/// - [`Error::NotFound`] if the product does not exist or is inactive
pub async fn add_item(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    qty: Option<i32>,
    notes: Option<String>,
) -> Result<quote_item::Model> {
    let qty = qty.unwrap_or(1);
    if qty < 1 {
        return Err(Error::validation("Quantity must be at least 1"));
    }
    product::get_active_product(db, product_id).await?;

    let txn = db.begin().await?;
    let quote = find_or_create_pending(&txn, user_id).await?;
    let item = quote_item::ActiveModel {
        quote_id: Set(quote.id),
        product_id: Set(product_id),
        qty: Set(qty),
        notes: Set(non_blank(notes)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let item = item.insert(&txn).await?;

    let mut touched: quote::ActiveModel = quote.into();
    touched.updated_at = Set(chrono::Utc::now());
    touched.update(&txn).await?;
    txn.commit().await?;

    debug!(user_id, quote_id = item.quote_id, product_id, qty, "Added quote item");
    Ok(item)
}

/// Removes a line from one of the user's pending quotes.
///
/// # Errors
/// - [`Error::NotFound`] if the item does not exist or belongs to another user
/// - [`Error::Validation`] if its quote was already submitted
pub async fn remove_item(db: &DatabaseConnection, user_id: i64, item_id: i64) -> Result<()> {
    let found = QuoteItem::find_by_id(item_id)
        .find_also_related(Quote)
        .one(db)
        .await?;
    let quote = match found {
        Some((_, Some(quote))) if quote.user_id == user_id => quote,
        _ => return Err(Error::not_found("Quote item", item_id)),
    };
    if quote.status != QuoteStatus::Pending {
        return Err(Error::validation("Submitted quotes cannot be changed"));
    }

    QuoteItem::delete_by_id(item_id).exec(db).await?;
    debug!(user_id, quote_id = quote.id, item_id, "Removed quote item");
    Ok(())
}

/// Submits a pending quote, optionally naming it.
///
/// # Errors
/// - [`Error::NotFound`] unless the quote is the user's and still pending
/// - [`Error::Validation`] if the quote has no items
pub async fn submit(
    db: &DatabaseConnection,
    user_id: i64,
    quote_id: i64,
    name: Option<String>,
) -> Result<quote::Model> {
    let quote = Quote::find_by_id(quote_id)
        .filter(quote::Column::UserId.eq(user_id))
        .filter(quote::Column::Status.eq(QuoteStatus::Pending))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Quote", quote_id))?;

    let items = QuoteItem::find()
        .filter(quote_item::Column::QuoteId.eq(quote_id))
        .count(db)
        .await?;
    if items == 0 {
        return Err(Error::validation("Cannot submit an empty quote"));
    }

    let mut quote: quote::ActiveModel = quote.into();
    quote.status = Set(QuoteStatus::Submitted);
    quote.name = Set(non_blank(name));
    quote.updated_at = Set(chrono::Utc::now());
    let quote = quote.update(db).await?;

    info!(user_id, quote_id, items, "Quote submitted");
    Ok(quote)
}

/// Quotes visible to a user: everything from their company, or only their own
/// when they have no company. Newest first.
pub async fn quotes_for_user(db: &DatabaseConnection, user_id: i64) -> Result<Vec<QuoteWithItems>> {
    let owner = users::get_user(db, user_id).await?;
    let query = match owner.company_id {
        Some(company_id) => {
            let colleagues: Vec<i64> = User::find()
                .select_only()
                .column(user::Column::Id)
                .filter(user::Column::CompanyId.eq(company_id))
                .into_tuple()
                .all(db)
                .await?;
            Quote::find().filter(quote::Column::UserId.is_in(colleagues))
        }
        None => Quote::find().filter(quote::Column::UserId.eq(user_id)),
    };
    let quotes = query
        .order_by_desc(quote::Column::CreatedAt)
        .order_by_desc(quote::Column::Id)
        .all(db)
        .await?;

    let mut result = Vec::with_capacity(quotes.len());
    for quote in quotes {
        result.push(with_items(db, quote, true).await?);
    }
    Ok(result)
}

/// Every quote with owner and lines, newest first.
pub async fn all_quotes(db: &DatabaseConnection) -> Result<Vec<QuoteWithItems>> {
    let quotes = Quote::find()
        .order_by_desc(quote::Column::CreatedAt)
        .order_by_desc(quote::Column::Id)
        .all(db)
        .await?;

    let mut result = Vec::with_capacity(quotes.len());
    for quote in quotes {
        result.push(with_items(db, quote, true).await?);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_add_item_creates_pending_quote() -> Result<()> {
        let db = setup_test_db().await?;
        let vendor = create_test_vendor(&db, "v@example.com", None).await?;
        let mug = create_test_product(&db, "Mug", Some(5.0)).await?;
        assert_eq!(Quote::find().count(&db).await?, 0);

        let item = add_item(&db, vendor.id, mug.id, None, Some(" blue ".to_string())).await?;
        assert_eq!(item.qty, 1);
        assert_eq!(item.notes.as_deref(), Some("blue"));

        let second = add_item(&db, vendor.id, mug.id, Some(3), None).await?;
        assert_eq!(second.quote_id, item.quote_id);

        let cart = current_quote(&db, vendor.id).await?;
        assert_eq!(cart.quote.id, item.quote_id);
        assert_eq!(cart.quote.status, QuoteStatus::Pending);
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].product.as_ref().unwrap().name, "Mug");
        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_rejects_bad_input() -> Result<()> {
        let db = setup_test_db().await?;
        let vendor = create_test_vendor(&db, "v@example.com", None).await?;
        let mug = create_test_product(&db, "Mug", Some(5.0)).await?;

        let zero = add_item(&db, vendor.id, mug.id, Some(0), None).await;
        assert!(matches!(zero.unwrap_err(), Error::Validation { .. }));

        let missing = add_item(&db, vendor.id, 999, None, None).await;
        assert!(matches!(missing.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_current_quote_creates_empty_cart_once() -> Result<()> {
        let db = setup_test_db().await?;
        let vendor = create_test_vendor(&db, "v@example.com", None).await?;

        let first = current_quote(&db, vendor.id).await?;
        let second = current_quote(&db, vendor.id).await?;
        assert_eq!(first.quote.id, second.quote.id);
        assert!(first.items.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_lifecycle() -> Result<()> {
        let db = setup_test_db().await?;
        let vendor = create_test_vendor(&db, "v@example.com", None).await?;
        let mug = create_test_product(&db, "Mug", Some(5.0)).await?;

        let empty = current_quote(&db, vendor.id).await?;
        let result = submit(&db, vendor.id, empty.quote.id, None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let item = add_item(&db, vendor.id, mug.id, Some(2), None).await?;
        let submitted = submit(&db, vendor.id, item.quote_id, Some("Fall order".to_string())).await?;
        assert_eq!(submitted.status, QuoteStatus::Submitted);
        assert_eq!(submitted.name.as_deref(), Some("Fall order"));

        // Frozen once submitted
        let again = submit(&db, vendor.id, item.quote_id, None).await;
        assert!(matches!(again.unwrap_err(), Error::NotFound { .. }));
        let removed = remove_item(&db, vendor.id, item.id).await;
        assert!(matches!(removed.unwrap_err(), Error::Validation { .. }));

        // The next add opens a new cart
        let next = add_item(&db, vendor.id, mug.id, None, None).await?;
        assert_ne!(next.quote_id, item.quote_id);
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_item_checks_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_vendor(&db, "owner@example.com", None).await?;
        let other = create_test_vendor(&db, "other@example.com", None).await?;
        let mug = create_test_product(&db, "Mug", Some(5.0)).await?;
        let item = add_item(&db, owner.id, mug.id, None, None).await?;

        let result = remove_item(&db, other.id, item.id).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        remove_item(&db, owner.id, item.id).await?;
        assert!(current_quote(&db, owner.id).await?.items.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_quotes_for_user_shares_within_company() -> Result<()> {
        let db = setup_test_db().await?;
        let acme = create_test_company(&db, "Acme").await?;
        let alice = create_test_vendor(&db, "alice@acme.test", Some(acme.id)).await?;
        let bob = create_test_vendor(&db, "bob@acme.test", Some(acme.id)).await?;
        let loner = create_test_vendor(&db, "solo@example.com", None).await?;
        let mug = create_test_product(&db, "Mug", Some(5.0)).await?;

        add_item(&db, alice.id, mug.id, None, None).await?;
        add_item(&db, bob.id, mug.id, None, None).await?;
        add_item(&db, loner.id, mug.id, None, None).await?;

        let shared = quotes_for_user(&db, alice.id).await?;
        assert_eq!(shared.len(), 2);
        assert!(shared.iter().all(|q| q.user.as_ref().unwrap().company.is_some()));

        let own = quotes_for_user(&db, loner.id).await?;
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].quote.user_id, loner.id);

        assert_eq!(all_quotes(&db).await?.len(), 3);
        Ok(())
    }
}
