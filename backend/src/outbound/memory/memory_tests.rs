//! Behaviour of the in-memory repositories.

use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{
    DetectionMethod, InventoryItemDraft, ListingDraft, Price, PriceRange, Username,
};

fn at(offset_secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_760_000_000, 0)
        .single()
        .expect("valid timestamp")
        + Duration::seconds(offset_secs)
}

fn user(name: &str, email: &str, offset_secs: i64) -> User {
    User::new(
        UserId::random(),
        Username::new(name).expect("username"),
        EmailAddress::new(email).expect("email"),
        "$argon2id$stub".to_owned(),
        at(offset_secs),
    )
}

fn item(owner: UserId, status: InventoryStatus, offset_secs: i64) -> InventoryItem {
    InventoryItem::new(InventoryItemDraft {
        id: InventoryItemId::random(),
        owner,
        name: "Armchair".to_owned(),
        category: "furniture".to_owned(),
        description: None,
        image_path: None,
        confidence: None,
        bbox: None,
        detection_method: DetectionMethod::Manual,
        status,
        created_at: at(offset_secs),
        updated_at: at(offset_secs),
    })
    .expect("valid item")
}

fn listing(
    seller: UserId,
    price: f64,
    category: &str,
    item: Option<InventoryItemId>,
    offset_secs: i64,
) -> MarketplaceListing {
    MarketplaceListing::new(ListingDraft {
        id: ListingId::random(),
        seller,
        name: "Armchair".to_owned(),
        price: Price::new(price).expect("price"),
        category: category.to_owned(),
        location: "Leeds".to_owned(),
        image: "/uploads/1-chair.jpg".to_owned(),
        status: ListingStatus::Available,
        listed_at: at(offset_secs),
        inventory_item_id: item,
    })
    .expect("valid listing")
}

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

#[rstest]
#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively(store: InMemoryStore) {
    UserRepository::insert(&store, &user("ada", "ada@example.com", 0))
        .await
        .expect("first insert");

    let err = UserRepository::insert(&store, &user("ada2", "ADA@example.com", 1))
        .await
        .expect_err("duplicate");

    assert!(matches!(err, UserPersistenceError::DuplicateEmail { .. }));
}

#[rstest]
#[tokio::test]
async fn username_lookup_returns_oldest_account(store: InMemoryStore) {
    let newer = user("sam", "sam2@example.com", 10);
    let older = user("sam", "sam1@example.com", 0);
    UserRepository::insert(&store, &newer).await.expect("insert");
    UserRepository::insert(&store, &older).await.expect("insert");

    let found = store.find_by_username("sam").await.expect("lookup");

    assert_eq!(found.map(|u| u.id()), Some(older.id()));
}

#[rstest]
#[tokio::test]
async fn inventory_lists_newest_first_and_only_for_owner(store: InMemoryStore) {
    let owner = UserId::random();
    let first = item(owner, InventoryStatus::Detected, 0);
    let second = item(owner, InventoryStatus::Detected, 5);
    let foreign = item(UserId::random(), InventoryStatus::Detected, 9);
    store
        .insert_all(&[first.clone(), second.clone(), foreign])
        .await
        .expect("insert");

    let listed = store.list_for_owner(&owner).await.expect("list");
    let again = store.list_for_owner(&owner).await.expect("list");

    let ids: Vec<_> = listed.iter().map(InventoryItem::id).collect();
    assert_eq!(ids, [second.id(), first.id()]);
    assert_eq!(listed, again);
}

#[rstest]
#[tokio::test]
async fn failing_batch_leaves_no_items_behind(store: InMemoryStore) {
    let owner = UserId::random();
    let existing = item(owner, InventoryStatus::Detected, 0);
    store
        .insert_all(std::slice::from_ref(&existing))
        .await
        .expect("seed");

    let fresh = item(owner, InventoryStatus::Detected, 1);
    let result = store.insert_all(&[fresh.clone(), existing]).await;

    assert!(result.is_err());
    assert_eq!(store.find(&owner, &fresh.id()).await.expect("find"), None);
}

#[rstest]
#[tokio::test]
async fn status_update_requires_expected_current_status(store: InMemoryStore) {
    let owner = UserId::random();
    let stored = item(owner, InventoryStatus::Available, 0);
    store
        .insert_all(std::slice::from_ref(&stored))
        .await
        .expect("seed");

    let stale = store
        .update_status(StatusChange {
            owner,
            id: stored.id(),
            from: InventoryStatus::Detected,
            to: InventoryStatus::Used,
            at: at(30),
        })
        .await
        .expect("update");
    let applied = store
        .update_status(StatusChange {
            owner,
            id: stored.id(),
            from: InventoryStatus::Available,
            to: InventoryStatus::Used,
            at: at(30),
        })
        .await
        .expect("update")
        .expect("applied");

    assert_eq!(stale, None);
    assert_eq!(applied.status(), InventoryStatus::Used);
    assert_eq!(applied.updated_at(), at(30));
}

#[rstest]
#[tokio::test]
async fn listing_from_inventory_marks_item_listed(store: InMemoryStore) {
    let seller = UserId::random();
    let stored = item(seller, InventoryStatus::Detected, 0);
    store
        .insert_all(std::slice::from_ref(&stored))
        .await
        .expect("seed");
    let new_listing = listing(seller, 40.0, "furniture", Some(stored.id()), 5);

    let listed = store
        .insert_from_inventory(&new_listing, &stored.id(), at(5))
        .await
        .expect("listed");

    assert_eq!(listed.status(), InventoryStatus::Listed);
    let all = store.list(&ListingFilter::default()).await.expect("list");
    assert_eq!(all.len(), 1);
}

#[rstest]
#[tokio::test]
async fn rejected_listing_leaves_both_sides_untouched(store: InMemoryStore) {
    let seller = UserId::random();
    let sold = item(seller, InventoryStatus::Sold, 0);
    store
        .insert_all(std::slice::from_ref(&sold))
        .await
        .expect("seed");
    let new_listing = listing(seller, 40.0, "furniture", Some(sold.id()), 5);

    let err = store
        .insert_from_inventory(&new_listing, &sold.id(), at(5))
        .await
        .expect_err("not listable");

    assert_eq!(
        err,
        ListingPersistenceError::item_not_listable(sold.id(), InventoryStatus::Sold)
    );
    assert!(store.list(&ListingFilter::default()).await.expect("list").is_empty());
}

#[rstest]
#[tokio::test]
async fn listing_someone_elses_item_reports_not_found(store: InMemoryStore) {
    let stored = item(UserId::random(), InventoryStatus::Detected, 0);
    store
        .insert_all(std::slice::from_ref(&stored))
        .await
        .expect("seed");
    let new_listing = listing(UserId::random(), 40.0, "furniture", Some(stored.id()), 5);

    let err = store
        .insert_from_inventory(&new_listing, &stored.id(), at(5))
        .await
        .expect_err("foreign item");

    assert_eq!(err, ListingPersistenceError::item_not_found(stored.id()));
}

#[rstest]
#[tokio::test]
async fn filters_compose_category_and_inclusive_price(store: InMemoryStore) {
    let seller = UserId::random();
    for (price, category, offset) in [
        (10.0, "furniture", 0),
        (20.0, "furniture", 1),
        (30.0, "furniture", 2),
        (20.0, "lighting", 3),
    ] {
        ListingRepository::insert(&store, &listing(seller, price, category, None, offset))
            .await
            .expect("insert");
    }
    let filter = ListingFilter {
        category: Some("furniture".to_owned()),
        price: PriceRange::new(Some(10.0), Some(20.0)).expect("range"),
        status: ListingStatus::Available,
    };

    let found = store.list(&filter).await.expect("list");

    let prices: Vec<f64> = found.iter().map(|l| l.price().value()).collect();
    assert_eq!(prices, [20.0, 10.0]);
}

#[rstest]
#[tokio::test]
async fn mark_sold_sells_listing_and_item_together(store: InMemoryStore) {
    let seller = UserId::random();
    let stored = item(seller, InventoryStatus::Available, 0);
    store
        .insert_all(std::slice::from_ref(&stored))
        .await
        .expect("seed");
    let new_listing = listing(seller, 55.0, "furniture", Some(stored.id()), 5);
    store
        .insert_from_inventory(&new_listing, &stored.id(), at(5))
        .await
        .expect("listed");

    let sold = store
        .mark_sold(&seller, &new_listing.id(), at(9))
        .await
        .expect("sold");
    let again = store.mark_sold(&seller, &new_listing.id(), at(10)).await;

    assert_eq!(sold.listing.status(), ListingStatus::Sold);
    assert_eq!(sold.item.map(|i| i.status()), Some(InventoryStatus::Sold));
    assert_eq!(
        again.expect_err("already sold"),
        ListingPersistenceError::already_sold(new_listing.id())
    );
}

#[rstest]
#[tokio::test]
async fn deleting_an_item_unlinks_its_listing(store: InMemoryStore) {
    let seller = UserId::random();
    let stored = item(seller, InventoryStatus::Detected, 0);
    store
        .insert_all(std::slice::from_ref(&stored))
        .await
        .expect("seed");
    let new_listing = listing(seller, 12.5, "decor", Some(stored.id()), 5);
    store
        .insert_from_inventory(&new_listing, &stored.id(), at(5))
        .await
        .expect("listed");

    let deleted = store.delete(&seller, &stored.id()).await.expect("delete");
    let listings = store.list(&ListingFilter::default()).await.expect("list");

    assert!(deleted);
    assert_eq!(listings[0].inventory_item_id(), None);
    assert_eq!(listings[0].name(), "Armchair");
    assert!(!store.delete(&seller, &stored.id()).await.expect("delete"));
}
