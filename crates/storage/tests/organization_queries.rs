#![forbid(unsafe_code)]

use od_core::geo;
use od_core::model::Activity;
use od_storage::{
    CreateActivityRequest, CreateBuildingRequest, CreateOrganizationRequest, DirectoryStore,
};
use std::collections::BTreeSet;
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

fn building(store: &mut DirectoryStore, address: &str, lat: f64, lon: f64) -> i64 {
    store
        .create_building(CreateBuildingRequest {
            address: address.to_string(),
            latitude: lat,
            longitude: lon,
        })
        .expect("create building")
        .id
}

fn activity(store: &mut DirectoryStore, name: &str, parent_id: Option<i64>) -> Activity {
    store
        .create_activity(CreateActivityRequest {
            name: name.to_string(),
            parent_id,
        })
        .expect("create activity")
}

fn organization(
    store: &mut DirectoryStore,
    name: &str,
    building_id: i64,
    phones: &[&str],
    activity_ids: &[i64],
) -> i64 {
    store
        .create_organization(CreateOrganizationRequest {
            name: name.to_string(),
            building_id,
            phone_numbers: phones.iter().map(|p| p.to_string()).collect(),
            activity_ids: activity_ids.to_vec(),
        })
        .expect("create organization")
        .organization
        .id
}

#[test]
fn get_organization_returns_the_fully_hydrated_record() {
    let storage_dir = temp_dir("get_organization_returns_the_fully_hydrated_record");
    let mut store = DirectoryStore::open(&storage_dir).expect("open store");

    let building_id = building(&mut store, "Lenina 1, office 3", 55.7558, 37.6173);
    let food = activity(&mut store, "Food", None);
    let meat = activity(&mut store, "Meat", Some(food.id));

    let org_id = organization(
        &mut store,
        "Butcher Yard",
        building_id,
        &["2-222-222", "8-923-666-13-13"],
        &[meat.id, food.id],
    );

    let record = store
        .get_organization(org_id)
        .expect("get organization")
        .expect("organization exists");

    assert_eq!(record.organization.name, "Butcher Yard");
    assert_eq!(record.building.id, building_id);
    assert_eq!(record.building.address, "Lenina 1, office 3");

    let numbers = record.phones.iter().map(|p| p.number.as_str()).collect::<Vec<_>>();
    assert_eq!(numbers, vec!["2-222-222", "8-923-666-13-13"]);

    // Activities come back ordered by (level, id).
    let activity_ids = record.activities.iter().map(|a| a.id).collect::<Vec<_>>();
    assert_eq!(activity_ids, vec![food.id, meat.id]);

    assert!(
        store
            .get_organization(org_id + 1000)
            .expect("get organization")
            .is_none()
    );
}

#[test]
fn name_search_is_case_insensitive_substring_ordered_by_id() {
    let storage_dir = temp_dir("name_search_is_case_insensitive_substring_ordered_by_id");
    let mut store = DirectoryStore::open(&storage_dir).expect("open store");

    let building_id = building(&mut store, "Bluchera 32/1", 55.76, 37.62);
    let first = organization(&mut store, "Magazin Produkty", building_id, &[], &[]);
    let second = organization(&mut store, "Veles Magazin", building_id, &[], &[]);
    organization(&mut store, "Auto World", building_id, &[], &[]);

    let upper = store
        .search_organizations_by_name("MAGAZIN")
        .expect("search");
    let lower = store
        .search_organizations_by_name("magazin")
        .expect("search");

    let upper_ids = upper.iter().map(|r| r.organization.id).collect::<Vec<_>>();
    let lower_ids = lower.iter().map(|r| r.organization.id).collect::<Vec<_>>();
    assert_eq!(upper_ids, vec![first, second]);
    assert_eq!(upper_ids, lower_ids);

    assert!(
        store
            .search_organizations_by_name("no such name")
            .expect("search")
            .is_empty()
    );
}

#[test]
fn building_listing_filters_on_the_building_id() {
    let storage_dir = temp_dir("building_listing_filters_on_the_building_id");
    let mut store = DirectoryStore::open(&storage_dir).expect("open store");

    let here = building(&mut store, "Mira 10", 55.77, 37.64);
    let there = building(&mut store, "Lenina 1", 55.7558, 37.6173);

    let a = organization(&mut store, "First", here, &[], &[]);
    organization(&mut store, "Elsewhere", there, &[], &[]);
    let b = organization(&mut store, "Second", here, &[], &[]);

    let records = store.organizations_in_building(here).expect("list");
    let ids = records.iter().map(|r| r.organization.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![a, b]);

    assert!(
        store
            .organizations_in_building(there + 1000)
            .expect("list")
            .is_empty()
    );
}

#[test]
fn activity_set_query_deduplicates_and_orders_by_id() {
    let storage_dir = temp_dir("activity_set_query_deduplicates_and_orders_by_id");
    let mut store = DirectoryStore::open(&storage_dir).expect("open store");

    let building_id = building(&mut store, "Lenina 1", 55.7558, 37.6173);
    let food = activity(&mut store, "Food", None);
    let meat = activity(&mut store, "Meat", Some(food.id));
    let dairy = activity(&mut store, "Dairy", Some(food.id));

    // Linked to two activities in the set; must come back once.
    let both = organization(
        &mut store,
        "Horns and Hooves",
        building_id,
        &[],
        &[meat.id, dairy.id],
    );
    let meat_only = organization(&mut store, "Butcher Yard", building_id, &[], &[meat.id]);

    let set: BTreeSet<i64> = [meat.id, dairy.id].into_iter().collect();
    let records = store.organizations_by_activities(&set).expect("query");
    let ids = records.iter().map(|r| r.organization.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![both, meat_only]);

    let empty: BTreeSet<i64> = BTreeSet::new();
    assert!(store.organizations_by_activities(&empty).expect("query").is_empty());
}

#[test]
fn box_query_finds_buildings_inside_and_misses_outside() {
    let storage_dir = temp_dir("box_query_finds_buildings_inside_and_misses_outside");
    let mut store = DirectoryStore::open(&storage_dir).expect("open store");

    let moscow = building(&mut store, "Red Square 1", 55.751244, 37.618423);
    let org_id = organization(&mut store, "Central Kiosk", moscow, &[], &[]);

    let close = geo::bounding_box(55.751244, 37.618423, 200.0, 200.0);
    let found = store.organizations_in_box(&close).expect("box query");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].organization.id, org_id);

    let far = geo::bounding_box(0.0, 0.0, 100.0, 100.0);
    assert!(store.organizations_in_box(&far).expect("box query").is_empty());
}
