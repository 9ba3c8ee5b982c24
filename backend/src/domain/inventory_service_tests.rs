//! Tests for the inventory service.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockInventoryRepository;
use crate::domain::{DetectionMethod, ErrorCode};
use crate::test_support::MutableClock;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 12, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn owner() -> UserId {
    UserId::random()
}

fn item(owner: UserId, status: InventoryStatus) -> InventoryItem {
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
        created_at: now(),
        updated_at: now(),
    })
    .expect("valid item")
}

fn make_service(repo: MockInventoryRepository) -> InventoryService<MockInventoryRepository> {
    InventoryService::new(Arc::new(repo), Arc::new(MutableClock::new(now())))
}

fn create_request(owner: UserId, name: &str) -> CreateInventoryItemRequest {
    CreateInventoryItemRequest {
        owner,
        name: name.to_owned(),
        category: "lighting".to_owned(),
        description: Some("Brass floor lamp".to_owned()),
        image_path: None,
        confidence: None,
        detection_method: DetectionMethod::default(),
    }
}

#[rstest]
#[tokio::test]
async fn create_item_starts_detected(owner: UserId) {
    let mut repo = MockInventoryRepository::new();
    repo.expect_insert_all()
        .withf(|items| items.len() == 1 && items[0].status() == InventoryStatus::Detected)
        .times(1)
        .return_once(|_| Ok(()));

    let item = make_service(repo)
        .create_item(create_request(owner, "Lamp"))
        .await
        .expect("item created");

    assert_eq!(item.owner(), owner);
    assert_eq!(item.detection_method(), DetectionMethod::Manual);
    assert_eq!(item.created_at(), now());
}

#[rstest]
#[tokio::test]
async fn create_item_reports_missing_name(owner: UserId) {
    let mut repo = MockInventoryRepository::new();
    repo.expect_insert_all().never();

    let error = make_service(repo)
        .create_item(create_request(owner, "   "))
        .await
        .expect_err("blank name rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "missing required field: name");
    assert_eq!(
        error.details(),
        Some(&serde_json::json!({ "field": "name", "code": "missing_field" }))
    );
}

#[rstest]
#[case::listed(InventoryStatus::Listed)]
#[case::sold(InventoryStatus::Sold)]
#[case::detected(InventoryStatus::Detected)]
#[tokio::test]
async fn update_status_rejects_marketplace_owned_targets(
    owner: UserId,
    #[case] target: InventoryStatus,
) {
    let mut repo = MockInventoryRepository::new();
    repo.expect_find().never();

    let error = make_service(repo)
        .update_status(UpdateInventoryStatusRequest {
            owner,
            id: InventoryItemId::random(),
            status: target,
        })
        .await
        .expect_err("target rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn update_status_applies_allowed_transition(owner: UserId) {
    let current = item(owner, InventoryStatus::Detected);
    let id = current.id();
    let updated = current
        .clone()
        .with_status(InventoryStatus::Available, now());
    let mut repo = MockInventoryRepository::new();
    repo.expect_find().return_once(move |_, _| Ok(Some(current)));
    repo.expect_update_status()
        .withf(move |change| {
            change.id == id
                && change.from == InventoryStatus::Detected
                && change.to == InventoryStatus::Available
                && change.at == now()
        })
        .times(1)
        .return_once(move |_| Ok(Some(updated)));

    let item = make_service(repo)
        .update_status(UpdateInventoryStatusRequest {
            owner,
            id,
            status: InventoryStatus::Available,
        })
        .await
        .expect("transition allowed");

    assert_eq!(item.status(), InventoryStatus::Available);
}

#[rstest]
#[tokio::test]
async fn update_status_rejects_transition_out_of_listed(owner: UserId) {
    let current = item(owner, InventoryStatus::Listed);
    let id = current.id();
    let mut repo = MockInventoryRepository::new();
    repo.expect_find().return_once(move |_, _| Ok(Some(current)));
    repo.expect_update_status().never();

    let error = make_service(repo)
        .update_status(UpdateInventoryStatusRequest {
            owner,
            id,
            status: InventoryStatus::Available,
        })
        .await
        .expect_err("listed items are locked");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.details().and_then(|d| d.get("code")),
        Some(&serde_json::json!("invalid_transition"))
    );
}

#[rstest]
#[tokio::test]
async fn update_status_reports_lost_race_as_conflict(owner: UserId) {
    let current = item(owner, InventoryStatus::Used);
    let id = current.id();
    let mut repo = MockInventoryRepository::new();
    repo.expect_find().return_once(move |_, _| Ok(Some(current)));
    repo.expect_update_status().return_once(|_| Ok(None));

    let error = make_service(repo)
        .update_status(UpdateInventoryStatusRequest {
            owner,
            id,
            status: InventoryStatus::Available,
        })
        .await
        .expect_err("stale status");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn get_item_of_another_owner_is_not_found(owner: UserId) {
    let mut repo = MockInventoryRepository::new();
    repo.expect_find().return_once(|_, _| Ok(None));

    let error = make_service(repo)
        .get_item(&owner, &InventoryItemId::random())
        .await
        .expect_err("not visible");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case::removed(true, None)]
#[case::missing(false, Some(ErrorCode::NotFound))]
#[tokio::test]
async fn delete_item_maps_outcome(
    owner: UserId,
    #[case] removed: bool,
    #[case] expected: Option<ErrorCode>,
) {
    let mut repo = MockInventoryRepository::new();
    repo.expect_delete().return_once(move |_, _| Ok(removed));

    let result = make_service(repo)
        .delete_item(&owner, &InventoryItemId::random())
        .await;

    assert_eq!(result.err().map(|error| error.code()), expected);
}

#[rstest]
#[tokio::test]
async fn list_items_maps_query_failures_to_internal(owner: UserId) {
    let mut repo = MockInventoryRepository::new();
    repo.expect_list_for_owner()
        .return_once(|_| Err(InventoryPersistenceError::query("syntax error")));

    let error = make_service(repo)
        .list_items(&owner)
        .await
        .expect_err("query failure");

    assert_eq!(error.code(), ErrorCode::InternalError);
}
