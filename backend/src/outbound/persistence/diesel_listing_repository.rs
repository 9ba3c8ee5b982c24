//! PostgreSQL-backed `ListingRepository` implementation using Diesel ORM.
//!
//! Listing a stored item and selling a linked listing both touch two tables;
//! each runs in one transaction with the affected rows locked `FOR UPDATE`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{ListingPersistenceError, ListingRepository, SoldListing};
use crate::domain::{
    InventoryItem, InventoryItemId, InventoryStatus, ListingFilter, ListingId, ListingStatus,
    MarketplaceListing, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{InventoryItemRow, InventoryStatusUpdate, ListingRow, NewListingRow};
use super::pool::{DbPool, PoolError};
use super::schema::{inventory_items, marketplace_listings};

/// Diesel-backed implementation of the `ListingRepository` port.
#[derive(Clone)]
pub struct DieselListingRepository {
    pool: DbPool,
}

impl DieselListingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Transaction failure: either Diesel itself or a business rejection that
/// must roll the transaction back.
#[derive(Debug)]
enum TxError {
    Diesel(DieselError),
    Rejected(ListingPersistenceError),
}

impl From<DieselError> for TxError {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> ListingPersistenceError {
    map_basic_pool_error(error, ListingPersistenceError::connection)
}

fn map_diesel_error(error: DieselError) -> ListingPersistenceError {
    map_basic_diesel_error(
        error,
        ListingPersistenceError::query,
        ListingPersistenceError::connection,
    )
}

fn map_tx_error(error: TxError) -> ListingPersistenceError {
    match error {
        TxError::Diesel(error) => map_diesel_error(error),
        TxError::Rejected(error) => error,
    }
}

fn row_to_listing(row: ListingRow) -> Result<MarketplaceListing, ListingPersistenceError> {
    MarketplaceListing::try_from(row).map_err(ListingPersistenceError::query)
}

fn row_to_item(row: InventoryItemRow) -> Result<InventoryItem, ListingPersistenceError> {
    InventoryItem::try_from(row).map_err(ListingPersistenceError::query)
}

async fn list_item(
    conn: &mut AsyncPgConnection,
    listing: &MarketplaceListing,
    item_id: &InventoryItemId,
    at: DateTime<Utc>,
) -> Result<InventoryItem, TxError> {
    let row: Option<InventoryItemRow> = inventory_items::table
        .filter(inventory_items::id.eq(item_id.as_uuid()))
        .filter(inventory_items::owner_id.eq(listing.seller().as_uuid()))
        .select(InventoryItemRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    let item = row
        .map(row_to_item)
        .transpose()
        .map_err(TxError::Rejected)?
        .ok_or_else(|| TxError::Rejected(ListingPersistenceError::item_not_found(*item_id)))?;

    if !item.status().can_transition_to(InventoryStatus::Listed) {
        return Err(TxError::Rejected(ListingPersistenceError::item_not_listable(
            *item_id,
            item.status(),
        )));
    }

    let updated: InventoryItemRow = diesel::update(
        inventory_items::table.filter(inventory_items::id.eq(item_id.as_uuid())),
    )
    .set(InventoryStatusUpdate {
        status: InventoryStatus::Listed.as_str(),
        updated_at: at,
    })
    .returning(InventoryItemRow::as_returning())
    .get_result(conn)
    .await?;

    diesel::insert_into(marketplace_listings::table)
        .values(NewListingRow::from(listing))
        .execute(conn)
        .await?;

    row_to_item(updated).map_err(TxError::Rejected)
}

async fn sell_listing(
    conn: &mut AsyncPgConnection,
    seller: &UserId,
    id: &ListingId,
    at: DateTime<Utc>,
) -> Result<SoldListing, TxError> {
    let current: ListingRow = marketplace_listings::table
        .filter(marketplace_listings::id.eq(id.as_uuid()))
        .filter(marketplace_listings::seller_id.eq(seller.as_uuid()))
        .select(ListingRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| TxError::Rejected(ListingPersistenceError::listing_not_found(*id)))?;

    if current.status == ListingStatus::Sold.as_str() {
        return Err(TxError::Rejected(ListingPersistenceError::already_sold(*id)));
    }

    let sold: ListingRow = diesel::update(
        marketplace_listings::table.filter(marketplace_listings::id.eq(id.as_uuid())),
    )
    .set(marketplace_listings::status.eq(ListingStatus::Sold.as_str()))
    .returning(ListingRow::as_returning())
    .get_result(conn)
    .await?;

    let item_row = match sold.inventory_item_id {
        None => None,
        Some(item_id) => {
            let updated: Option<InventoryItemRow> = diesel::update(
                inventory_items::table
                    .filter(inventory_items::id.eq(item_id))
                    .filter(inventory_items::status.eq(InventoryStatus::Listed.as_str())),
            )
            .set(InventoryStatusUpdate {
                status: InventoryStatus::Sold.as_str(),
                updated_at: at,
            })
            .returning(InventoryItemRow::as_returning())
            .get_result(conn)
            .await
            .optional()?;

            match updated {
                Some(row) => Some(row),
                // The item moved on without the listing; report it unchanged.
                None => inventory_items::table
                    .filter(inventory_items::id.eq(item_id))
                    .select(InventoryItemRow::as_select())
                    .first(conn)
                    .await
                    .optional()?,
            }
        }
    };

    let listing = row_to_listing(sold).map_err(TxError::Rejected)?;
    let item = item_row
        .map(row_to_item)
        .transpose()
        .map_err(TxError::Rejected)?;
    Ok(SoldListing { listing, item })
}

#[async_trait]
impl ListingRepository for DieselListingRepository {
    async fn list(
        &self,
        filter: &ListingFilter,
    ) -> Result<Vec<MarketplaceListing>, ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = marketplace_listings::table
            .filter(marketplace_listings::status.eq(filter.status.as_str()))
            .into_boxed();
        if let Some(category) = filter.category.as_deref() {
            query = query.filter(marketplace_listings::category.eq(category));
        }
        if let Some(min) = filter.price.min() {
            query = query.filter(marketplace_listings::price.ge(min));
        }
        if let Some(max) = filter.price.max() {
            query = query.filter(marketplace_listings::price.le(max));
        }

        let rows: Vec<ListingRow> = query
            .order((
                marketplace_listings::listed_at.desc(),
                marketplace_listings::id.desc(),
            ))
            .select(ListingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_listing).collect()
    }

    async fn insert(&self, listing: &MarketplaceListing) -> Result<(), ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(marketplace_listings::table)
            .values(NewListingRow::from(listing))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn insert_from_inventory(
        &self,
        listing: &MarketplaceListing,
        item_id: &InventoryItemId,
        at: DateTime<Utc>,
    ) -> Result<InventoryItem, ListingPersistenceError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction(|conn| {
            async move { list_item(conn, listing, item_id, at).await }.scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn mark_sold(
        &self,
        seller: &UserId,
        id: &ListingId,
        at: DateTime<Utc>,
    ) -> Result<SoldListing, ListingPersistenceError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction(|conn| {
            async move { sell_listing(conn, seller, id, at).await }.scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn rejections_pass_through_unchanged() {
        let id = ListingId::random();
        let error = map_tx_error(TxError::Rejected(ListingPersistenceError::already_sold(id)));
        assert_eq!(error, ListingPersistenceError::already_sold(id));
    }

    #[rstest]
    fn diesel_failures_become_query_errors() {
        let error = map_tx_error(TxError::from(DieselError::NotFound));
        assert_eq!(error, ListingPersistenceError::query("record not found"));
    }
}
