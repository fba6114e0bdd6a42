#![forbid(unsafe_code)]

#[derive(Clone, Debug, PartialEq)]
pub struct CreateBuildingRequest {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateActivityRequest {
    pub name: String,
    pub parent_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateOrganizationRequest {
    pub name: String,
    pub building_id: i64,
    pub phone_numbers: Vec<String>,
    pub activity_ids: Vec<i64>,
}
