#![forbid(unsafe_code)]

pub const METERS_PER_DEGREE_LAT: f64 = 111_000.0;

/// Latitude/longitude rectangle, inclusive on all four edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.min_lat
            && latitude <= self.max_lat
            && longitude >= self.min_lon
            && longitude <= self.max_lon
    }
}

/// Equirectangular approximation of a `width_m` x `height_m` rectangle
/// centered on a point: one degree of latitude is a constant 111000 m and a
/// degree of longitude shrinks by cos(latitude). Near the poles the cosine
/// term vanishes and the longitude half-width grows without bound; the value
/// is propagated as computed, not clamped.
pub fn bounding_box(center_lat: f64, center_lon: f64, width_m: f64, height_m: f64) -> BoundingBox {
    let half_height_deg = (height_m / 2.0) / METERS_PER_DEGREE_LAT;
    let half_width_deg = (width_m / 2.0) / (METERS_PER_DEGREE_LAT * center_lat.to_radians().cos());

    BoundingBox {
        min_lat: center_lat - half_height_deg,
        max_lat: center_lat + half_height_deg,
        min_lon: center_lon - half_width_deg,
        max_lon: center_lon + half_width_deg,
    }
}
