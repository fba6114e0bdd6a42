#![forbid(unsafe_code)]

use od_storage::{CreateActivityRequest, DirectoryStore, StoreError};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("od_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn create(store: &mut DirectoryStore, name: &str, parent_id: Option<i64>) -> od_core::model::Activity {
    store
        .create_activity(CreateActivityRequest {
            name: name.to_string(),
            parent_id,
        })
        .expect("create activity")
}

#[test]
fn levels_follow_the_parent_and_stop_at_three() {
    let storage_dir = temp_dir("levels_follow_the_parent_and_stop_at_three");
    let mut store = DirectoryStore::open(&storage_dir).expect("open store");

    let food = create(&mut store, "Food", None);
    assert_eq!(food.level, 1);

    let meat = create(&mut store, "Meat", Some(food.id));
    assert_eq!(meat.level, 2);

    let sausages = create(&mut store, "Sausages", Some(meat.id));
    assert_eq!(sausages.level, 3);

    let err = store
        .create_activity(CreateActivityRequest {
            name: "Smoked".to_string(),
            parent_id: Some(sausages.id),
        })
        .expect_err("fourth level must be rejected");
    assert!(
        matches!(err, StoreError::ActivityDepthExceeded),
        "expected ActivityDepthExceeded, got {err:?}"
    );
}

#[test]
fn unknown_parent_is_rejected_before_any_write() {
    let storage_dir = temp_dir("unknown_parent_is_rejected_before_any_write");
    let mut store = DirectoryStore::open(&storage_dir).expect("open store");

    let err = store
        .create_activity(CreateActivityRequest {
            name: "Orphan".to_string(),
            parent_id: Some(777),
        })
        .expect_err("unknown parent must be rejected");
    assert!(
        matches!(err, StoreError::UnknownParentActivity),
        "expected UnknownParentActivity, got {err:?}"
    );

    assert!(
        store.list_activities().expect("list activities").is_empty(),
        "no activity row may exist after a rejected create"
    );
}

#[test]
fn listing_is_ordered_by_level_then_id() {
    let storage_dir = temp_dir("listing_is_ordered_by_level_then_id");
    let mut store = DirectoryStore::open(&storage_dir).expect("open store");

    // Interleave creates so insertion order differs from the contract order.
    let food = create(&mut store, "Food", None);
    let meat = create(&mut store, "Meat", Some(food.id));
    let cars = create(&mut store, "Cars", None);
    let parts = create(&mut store, "Parts", Some(meat.id));
    let trucks = create(&mut store, "Trucks", Some(cars.id));

    let listed = store.list_activities().expect("list activities");
    let ids = listed.iter().map(|a| a.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![food.id, cars.id, meat.id, trucks.id, parts.id]);

    let levels = listed.iter().map(|a| a.level).collect::<Vec<_>>();
    assert_eq!(levels, vec![1, 1, 2, 2, 3]);
}

#[test]
fn name_lookup_is_case_insensitive_and_returns_every_match() {
    let storage_dir = temp_dir("name_lookup_is_case_insensitive_and_returns_every_match");
    let mut store = DirectoryStore::open(&storage_dir).expect("open store");

    let food = create(&mut store, "Food", None);
    let cars = create(&mut store, "Cars", None);
    let under_food = create(&mut store, "Delivery", Some(food.id));
    let under_cars = create(&mut store, "delivery", Some(cars.id));

    let matches = store
        .activities_by_name("DELIVERY")
        .expect("activities by name");
    let ids = matches.iter().map(|a| a.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![under_food.id, under_cars.id]);

    assert!(
        store
            .activities_by_name("nothing-here")
            .expect("activities by name")
            .is_empty()
    );
}

#[test]
fn links_mirror_the_stored_parent_pointers() {
    let storage_dir = temp_dir("links_mirror_the_stored_parent_pointers");
    let mut store = DirectoryStore::open(&storage_dir).expect("open store");

    let food = create(&mut store, "Food", None);
    let meat = create(&mut store, "Meat", Some(food.id));

    let links = store.activity_links().expect("activity links");
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].id, food.id);
    assert_eq!(links[0].parent_id, None);
    assert_eq!(links[1].id, meat.id);
    assert_eq!(links[1].parent_id, Some(food.id));
}
