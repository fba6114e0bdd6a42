#![forbid(unsafe_code)]

use od_core::model::{Activity, Building, OrganizationRecord, Phone};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingOut {
    pub id: i64,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Building> for BuildingOut {
    fn from(value: Building) -> Self {
        Self {
            id: value.id,
            address: value.address,
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityOut {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub level: i64,
}

impl From<Activity> for ActivityOut {
    fn from(value: Activity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            parent_id: value.parent_id,
            level: value.level,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneOut {
    pub id: i64,
    pub number: String,
}

impl From<Phone> for PhoneOut {
    fn from(value: Phone) -> Self {
        Self {
            id: value.id,
            number: value.number,
        }
    }
}

/// The hydrated organization shape handed to clients: the building, phones,
/// and activities are always fully materialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrganizationOut {
    pub id: i64,
    pub name: String,
    pub building: BuildingOut,
    pub phones: Vec<PhoneOut>,
    pub activities: Vec<ActivityOut>,
}

impl From<OrganizationRecord> for OrganizationOut {
    fn from(value: OrganizationRecord) -> Self {
        Self {
            id: value.organization.id,
            name: value.organization.name,
            building: value.building.into(),
            phones: value.phones.into_iter().map(PhoneOut::from).collect(),
            activities: value.activities.into_iter().map(ActivityOut::from).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BuildingCreate {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ActivityCreate {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct OrganizationCreate {
    pub name: String,
    pub building_id: i64,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    #[serde(default)]
    pub activity_ids: Vec<i64>,
}
