//! Inventory use-cases: manual creation, lifecycle updates and reads.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    CreateInventoryItemRequest, InventoryCommand, InventoryPersistenceError, InventoryQuery,
    InventoryRepository, StatusChange, UpdateInventoryStatusRequest,
};
use crate::domain::{
    Error, InventoryItem, InventoryItemDraft, InventoryItemId, InventoryStatus,
    InventoryValidationError, UserId,
};

pub(crate) fn map_repository_error(error: InventoryPersistenceError) -> Error {
    match error {
        InventoryPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("inventory repository unavailable: {message}"))
        }
        InventoryPersistenceError::Query { message } => {
            Error::internal(format!("inventory repository error: {message}"))
        }
    }
}

pub(crate) fn map_validation_error(error: InventoryValidationError) -> Error {
    match error {
        InventoryValidationError::EmptyField { field } => {
            Error::invalid_request(format!("missing required field: {field}"))
                .with_details(json!({ "field": field, "code": "missing_field" }))
        }
        other => Error::invalid_request(other.to_string()),
    }
}

fn item_not_found(id: &InventoryItemId) -> Error {
    Error::not_found(format!("inventory item {id} not found"))
}

/// Inventory service implementing [`InventoryCommand`] and [`InventoryQuery`].
#[derive(Clone)]
pub struct InventoryService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> InventoryService<R> {
    /// Create a service over the inventory repository.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

impl<R> InventoryService<R>
where
    R: InventoryRepository,
{
    async fn load(&self, owner: &UserId, id: &InventoryItemId) -> Result<InventoryItem, Error> {
        self.repo
            .find(owner, id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| item_not_found(id))
    }
}

#[async_trait]
impl<R> InventoryCommand for InventoryService<R>
where
    R: InventoryRepository,
{
    async fn create_item(
        &self,
        request: CreateInventoryItemRequest,
    ) -> Result<InventoryItem, Error> {
        let now = self.clock.utc();
        let item = InventoryItem::new(InventoryItemDraft {
            id: InventoryItemId::random(),
            owner: request.owner,
            name: request.name,
            category: request.category,
            description: request.description,
            image_path: request.image_path,
            confidence: request.confidence,
            bbox: None,
            detection_method: request.detection_method,
            status: InventoryStatus::Detected,
            created_at: now,
            updated_at: now,
        })
        .map_err(map_validation_error)?;

        self.repo
            .insert_all(std::slice::from_ref(&item))
            .await
            .map_err(map_repository_error)?;
        info!(item_id = %item.id(), owner = %item.owner(), "added inventory item");
        Ok(item)
    }

    async fn update_status(
        &self,
        request: UpdateInventoryStatusRequest,
    ) -> Result<InventoryItem, Error> {
        let UpdateInventoryStatusRequest { owner, id, status } = request;
        if !status.is_owner_settable() {
            return Err(Error::invalid_request(format!(
                "status '{status}' is set by the marketplace"
            ))
            .with_details(json!({
                "field": "status",
                "value": status.as_str(),
                "code": "marketplace_status",
            })));
        }

        let current = self.load(&owner, &id).await?;
        let from = current.status();
        if !from.can_transition_to(status) {
            return Err(
                Error::conflict(format!("cannot change status from {from} to {status}"))
                    .with_details(json!({
                        "from": from.as_str(),
                        "to": status.as_str(),
                        "code": "invalid_transition",
                    })),
            );
        }

        let change = StatusChange {
            owner,
            id,
            from,
            to: status,
            at: self.clock.utc(),
        };
        self.repo
            .update_status(change)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::conflict("inventory item changed concurrently; reload and retry"))
    }

    async fn delete_item(&self, owner: &UserId, id: &InventoryItemId) -> Result<(), Error> {
        let removed = self
            .repo
            .delete(owner, id)
            .await
            .map_err(map_repository_error)?;
        if removed {
            info!(item_id = %id, "deleted inventory item");
            Ok(())
        } else {
            Err(item_not_found(id))
        }
    }
}

#[async_trait]
impl<R> InventoryQuery for InventoryService<R>
where
    R: InventoryRepository,
{
    async fn list_items(&self, owner: &UserId) -> Result<Vec<InventoryItem>, Error> {
        self.repo
            .list_for_owner(owner)
            .await
            .map_err(map_repository_error)
    }

    async fn get_item(&self, owner: &UserId, id: &InventoryItemId) -> Result<InventoryItem, Error> {
        self.load(owner, id).await
    }
}

#[cfg(test)]
#[path = "inventory_service_tests.rs"]
mod tests;
