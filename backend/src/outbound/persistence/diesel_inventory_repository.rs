//! PostgreSQL-backed `InventoryRepository` implementation using Diesel ORM.
//!
//! Status changes are compare-and-set: the update only matches while the row
//! still carries the status the caller validated against.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{InventoryPersistenceError, InventoryRepository, StatusChange};
use crate::domain::{InventoryItem, InventoryItemId, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{InventoryItemRow, InventoryStatusUpdate, NewInventoryItemRow};
use super::pool::{DbPool, PoolError};
use super::schema::inventory_items;

/// Diesel-backed implementation of the `InventoryRepository` port.
#[derive(Clone)]
pub struct DieselInventoryRepository {
    pool: DbPool,
}

impl DieselInventoryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> InventoryPersistenceError {
    map_basic_pool_error(error, InventoryPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> InventoryPersistenceError {
    map_basic_diesel_error(
        error,
        InventoryPersistenceError::query,
        InventoryPersistenceError::connection,
    )
}

fn row_to_item(row: InventoryItemRow) -> Result<InventoryItem, InventoryPersistenceError> {
    InventoryItem::try_from(row).map_err(InventoryPersistenceError::query)
}

#[async_trait]
impl InventoryRepository for DieselInventoryRepository {
    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<InventoryItem>, InventoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<InventoryItemRow> = inventory_items::table
            .filter(inventory_items::owner_id.eq(owner.as_uuid()))
            .order((inventory_items::created_at.desc(), inventory_items::id.desc()))
            .select(InventoryItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_item).collect()
    }

    async fn find(
        &self,
        owner: &UserId,
        id: &InventoryItemId,
    ) -> Result<Option<InventoryItem>, InventoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<InventoryItemRow> = inventory_items::table
            .filter(inventory_items::id.eq(id.as_uuid()))
            .filter(inventory_items::owner_id.eq(owner.as_uuid()))
            .select(InventoryItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_item).transpose()
    }

    async fn insert_all(&self, items: &[InventoryItem]) -> Result<(), InventoryPersistenceError> {
        if items.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NewInventoryItemRow<'_>> =
            items.iter().map(NewInventoryItemRow::from).collect();

        // A single multi-row INSERT is atomic on its own.
        diesel::insert_into(inventory_items::table)
            .values(&rows)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_status(
        &self,
        change: StatusChange,
    ) -> Result<Option<InventoryItem>, InventoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<InventoryItemRow> = diesel::update(
            inventory_items::table
                .filter(inventory_items::id.eq(change.id.as_uuid()))
                .filter(inventory_items::owner_id.eq(change.owner.as_uuid()))
                .filter(inventory_items::status.eq(change.from.as_str())),
        )
        .set(InventoryStatusUpdate {
            status: change.to.as_str(),
            updated_at: change.at,
        })
        .returning(InventoryItemRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_item).transpose()
    }

    async fn delete(
        &self,
        owner: &UserId,
        id: &InventoryItemId,
    ) -> Result<bool, InventoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Linked listings keep their copy of the data; the foreign key clears
        // `inventory_item_id` on delete.
        let deleted = diesel::delete(
            inventory_items::table
                .filter(inventory_items::id.eq(id.as_uuid()))
                .filter(inventory_items::owner_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
