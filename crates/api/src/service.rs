#![forbid(unsafe_code)]

use crate::dto::{
    ActivityCreate, ActivityOut, BuildingCreate, BuildingOut, OrganizationCreate, OrganizationOut,
};
use od_core::{geo, hierarchy};
use od_storage::{
    CreateActivityRequest, CreateBuildingRequest, CreateOrganizationRequest, DirectoryStore,
    StoreError,
};
use std::collections::BTreeSet;

/// Query/mutation service over the entity store. Composes the store's
/// entity reads with the pure hierarchy and geo engines; every method is a
/// fresh query against the store, there is no in-process cache.
pub struct DirectoryService {
    store: DirectoryStore,
}

impl DirectoryService {
    pub fn new(store: DirectoryStore) -> Self {
        Self { store }
    }

    pub fn list_buildings(&self) -> Result<Vec<BuildingOut>, StoreError> {
        let buildings = self.store.list_buildings()?;
        Ok(buildings.into_iter().map(BuildingOut::from).collect())
    }

    pub fn create_building(&mut self, request: BuildingCreate) -> Result<BuildingOut, StoreError> {
        let building = self.store.create_building(CreateBuildingRequest {
            address: request.address,
            latitude: request.latitude,
            longitude: request.longitude,
        })?;
        Ok(building.into())
    }

    pub fn list_activities(&self) -> Result<Vec<ActivityOut>, StoreError> {
        let activities = self.store.list_activities()?;
        Ok(activities.into_iter().map(ActivityOut::from).collect())
    }

    pub fn create_activity(&mut self, request: ActivityCreate) -> Result<ActivityOut, StoreError> {
        let activity = self.store.create_activity(CreateActivityRequest {
            name: request.name,
            parent_id: request.parent_id,
        })?;
        Ok(activity.into())
    }

    pub fn get_organization(&self, id: i64) -> Result<Option<OrganizationOut>, StoreError> {
        Ok(self.store.get_organization(id)?.map(OrganizationOut::from))
    }

    pub fn search_organizations(&self, name: &str) -> Result<Vec<OrganizationOut>, StoreError> {
        let records = self.store.search_organizations_by_name(name)?;
        Ok(records.into_iter().map(OrganizationOut::from).collect())
    }

    pub fn organizations_in_building(
        &self,
        building_id: i64,
    ) -> Result<Vec<OrganizationOut>, StoreError> {
        let records = self.store.organizations_in_building(building_id)?;
        Ok(records.into_iter().map(OrganizationOut::from).collect())
    }

    /// Organizations tagged with the activity or any of its descendants.
    /// An unknown activity id yields an empty result, not an error.
    pub fn organizations_by_activity(
        &self,
        activity_id: i64,
    ) -> Result<Vec<OrganizationOut>, StoreError> {
        let roots = BTreeSet::from([activity_id]);
        self.organizations_by_activity_roots(&roots)
    }

    /// Matches activity nodes by name (case-insensitive, names are not
    /// unique), then unions the descendant closures of every match. A single
    /// match takes the single-root path; several matches expand together so
    /// that descendants of each matching branch are included.
    pub fn organizations_by_activity_name(
        &self,
        name: &str,
    ) -> Result<Vec<OrganizationOut>, StoreError> {
        let matches = self.store.activities_by_name(name)?;

        if matches.is_empty() {
            return Ok(Vec::new());
        }
        if let [only] = matches.as_slice() {
            return self.organizations_by_activity(only.id);
        }

        let roots: BTreeSet<i64> = matches.iter().map(|activity| activity.id).collect();
        self.organizations_by_activity_roots(&roots)
    }

    pub fn organizations_in_area(
        &self,
        center_lat: f64,
        center_lon: f64,
        width_m: f64,
        height_m: f64,
    ) -> Result<Vec<OrganizationOut>, StoreError> {
        let bbox = geo::bounding_box(center_lat, center_lon, width_m, height_m);
        let records = self.store.organizations_in_box(&bbox)?;
        Ok(records.into_iter().map(OrganizationOut::from).collect())
    }

    pub fn create_organization(
        &mut self,
        request: OrganizationCreate,
    ) -> Result<OrganizationOut, StoreError> {
        let record = self.store.create_organization(CreateOrganizationRequest {
            name: request.name,
            building_id: request.building_id,
            phone_numbers: request.phone_numbers,
            activity_ids: request.activity_ids,
        })?;
        Ok(record.into())
    }

    fn organizations_by_activity_roots(
        &self,
        roots: &BTreeSet<i64>,
    ) -> Result<Vec<OrganizationOut>, StoreError> {
        let links = self.store.activity_links()?;
        let closure = hierarchy::descendant_closure(roots, &links);
        let records = self.store.organizations_by_activities(&closure)?;
        Ok(records.into_iter().map(OrganizationOut::from).collect())
    }
}
