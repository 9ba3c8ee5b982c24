//! In-process store implementing the repository ports.
//!
//! Used when no database URL is configured and by integration tests. All
//! state sits behind one mutex, so operations that touch listings and
//! inventory together run in a single critical section and either fully
//! apply or leave the state untouched.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    InventoryPersistenceError, InventoryRepository, ListingPersistenceError, ListingRepository,
    SoldListing, StatusChange, UserPersistenceError, UserRepository,
};
use crate::domain::{
    EmailAddress, InventoryItem, InventoryItemId, InventoryStatus, ListingFilter, ListingId,
    ListingStatus, MarketplaceListing, User, UserId,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    items: HashMap<InventoryItemId, InventoryItem>,
    listings: HashMap<ListingId, MarketplaceListing>,
}

/// Shared in-memory store; clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Option<MutexGuard<'_, State>> {
        self.state.lock().ok()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self
            .lock()
            .ok_or_else(|| UserPersistenceError::query(POISONED))?;
        if state
            .users
            .iter()
            .any(|existing| existing.email().eq_ignore_ascii_case(user.email()))
        {
            return Err(UserPersistenceError::duplicate_email(user.email()));
        }
        state.users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self
            .lock()
            .ok_or_else(|| UserPersistenceError::query(POISONED))?;
        Ok(state.users.iter().find(|user| user.id() == *id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self
            .lock()
            .ok_or_else(|| UserPersistenceError::query(POISONED))?;
        Ok(state
            .users
            .iter()
            .find(|user| user.email().eq_ignore_ascii_case(email.as_ref()))
            .cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self
            .lock()
            .ok_or_else(|| UserPersistenceError::query(POISONED))?;
        Ok(state
            .users
            .iter()
            .filter(|user| user.username() == username)
            .min_by_key(|user| user.created_at())
            .cloned())
    }
}

#[async_trait]
impl InventoryRepository for InMemoryStore {
    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<InventoryItem>, InventoryPersistenceError> {
        let state = self
            .lock()
            .ok_or_else(|| InventoryPersistenceError::query(POISONED))?;
        let mut items: Vec<InventoryItem> = state
            .items
            .values()
            .filter(|item| item.owner() == *owner)
            .cloned()
            .collect();
        items.sort_by_key(|item| Reverse((item.created_at(), *item.id().as_uuid())));
        Ok(items)
    }

    async fn find(
        &self,
        owner: &UserId,
        id: &InventoryItemId,
    ) -> Result<Option<InventoryItem>, InventoryPersistenceError> {
        let state = self
            .lock()
            .ok_or_else(|| InventoryPersistenceError::query(POISONED))?;
        Ok(state
            .items
            .get(id)
            .filter(|item| item.owner() == *owner)
            .cloned())
    }

    async fn insert_all(&self, items: &[InventoryItem]) -> Result<(), InventoryPersistenceError> {
        let mut state = self
            .lock()
            .ok_or_else(|| InventoryPersistenceError::query(POISONED))?;
        let mut seen = HashSet::with_capacity(items.len());
        for item in items {
            if state.items.contains_key(&item.id()) || !seen.insert(item.id()) {
                return Err(InventoryPersistenceError::query(format!(
                    "duplicate inventory item id {}",
                    item.id()
                )));
            }
        }
        for item in items {
            state.items.insert(item.id(), item.clone());
        }
        Ok(())
    }

    async fn update_status(
        &self,
        change: StatusChange,
    ) -> Result<Option<InventoryItem>, InventoryPersistenceError> {
        let mut state = self
            .lock()
            .ok_or_else(|| InventoryPersistenceError::query(POISONED))?;
        let Some(current) = state
            .items
            .get(&change.id)
            .filter(|item| item.owner() == change.owner && item.status() == change.from)
            .cloned()
        else {
            return Ok(None);
        };
        let updated = current.with_status(change.to, change.at);
        state.items.insert(change.id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(
        &self,
        owner: &UserId,
        id: &InventoryItemId,
    ) -> Result<bool, InventoryPersistenceError> {
        let mut state = self
            .lock()
            .ok_or_else(|| InventoryPersistenceError::query(POISONED))?;
        let owned = state.items.get(id).is_some_and(|item| item.owner() == *owner);
        if !owned {
            return Ok(false);
        }
        state.items.remove(id);
        for listing in state.listings.values_mut() {
            if listing.inventory_item_id() == Some(*id) {
                *listing = listing.clone().without_inventory_item();
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl ListingRepository for InMemoryStore {
    async fn list(
        &self,
        filter: &ListingFilter,
    ) -> Result<Vec<MarketplaceListing>, ListingPersistenceError> {
        let state = self
            .lock()
            .ok_or_else(|| ListingPersistenceError::query(POISONED))?;
        let mut listings: Vec<MarketplaceListing> = state
            .listings
            .values()
            .filter(|listing| filter.matches(listing))
            .cloned()
            .collect();
        listings.sort_by_key(|listing| Reverse((listing.listed_at(), *listing.id().as_uuid())));
        Ok(listings)
    }

    async fn insert(&self, listing: &MarketplaceListing) -> Result<(), ListingPersistenceError> {
        let mut state = self
            .lock()
            .ok_or_else(|| ListingPersistenceError::query(POISONED))?;
        state.listings.insert(listing.id(), listing.clone());
        Ok(())
    }

    async fn insert_from_inventory(
        &self,
        listing: &MarketplaceListing,
        item_id: &InventoryItemId,
        at: DateTime<Utc>,
    ) -> Result<InventoryItem, ListingPersistenceError> {
        let mut state = self
            .lock()
            .ok_or_else(|| ListingPersistenceError::query(POISONED))?;
        let item = state
            .items
            .get(item_id)
            .filter(|item| item.owner() == listing.seller())
            .cloned()
            .ok_or_else(|| ListingPersistenceError::item_not_found(*item_id))?;
        if !item.status().can_transition_to(InventoryStatus::Listed) {
            return Err(ListingPersistenceError::item_not_listable(
                *item_id,
                item.status(),
            ));
        }

        let listed = item.with_status(InventoryStatus::Listed, at);
        state.items.insert(*item_id, listed.clone());
        state.listings.insert(listing.id(), listing.clone());
        Ok(listed)
    }

    async fn mark_sold(
        &self,
        seller: &UserId,
        id: &ListingId,
        at: DateTime<Utc>,
    ) -> Result<SoldListing, ListingPersistenceError> {
        let mut state = self
            .lock()
            .ok_or_else(|| ListingPersistenceError::query(POISONED))?;
        let current = state
            .listings
            .get(id)
            .filter(|listing| listing.seller() == *seller)
            .cloned()
            .ok_or_else(|| ListingPersistenceError::listing_not_found(*id))?;
        if current.status() == ListingStatus::Sold {
            return Err(ListingPersistenceError::already_sold(*id));
        }

        let listing = current.with_status(ListingStatus::Sold);
        state.listings.insert(*id, listing.clone());

        let linked = listing
            .inventory_item_id()
            .and_then(|item_id| state.items.get(&item_id).cloned());
        let item = match linked {
            Some(item) if item.status() == InventoryStatus::Listed => {
                let sold = item.with_status(InventoryStatus::Sold, at);
                state.items.insert(sold.id(), sold.clone());
                Some(sold)
            }
            // The item moved on without the listing; report it unchanged.
            other => other,
        };
        Ok(SoldListing { listing, item })
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
