#![forbid(unsafe_code)]

pub mod geo;
pub mod hierarchy;

pub mod model {
    /// A building that organizations are located in. Coordinates are decimal
    /// degrees (WGS84), signed.
    #[derive(Clone, Debug, PartialEq)]
    pub struct Building {
        pub id: i64,
        pub address: String,
        pub latitude: f64,
        pub longitude: f64,
    }

    /// A node of the activity taxonomy. `level` is 1 for roots and
    /// `parent.level + 1` otherwise, never above `hierarchy::MAX_LEVEL`.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Activity {
        pub id: i64,
        pub name: String,
        pub parent_id: Option<i64>,
        pub level: i64,
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Organization {
        pub id: i64,
        pub name: String,
        pub building_id: i64,
    }

    /// Phone numbers are stored verbatim; no normalization.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Phone {
        pub id: i64,
        pub number: String,
        pub organization_id: i64,
    }

    /// An organization with its building, phones, and activities fully
    /// materialized. This is the value handed across the service boundary.
    #[derive(Clone, Debug, PartialEq)]
    pub struct OrganizationRecord {
        pub organization: Organization,
        pub building: Building,
        pub phones: Vec<Phone>,
        pub activities: Vec<Activity>,
    }

    /// One parent-pointer edge of the activity forest, as stored.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ActivityLink {
        pub id: i64,
        pub parent_id: Option<i64>,
    }
}
