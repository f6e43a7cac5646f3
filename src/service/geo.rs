use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mean Earth radius used for the great-circle distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    #[schema(example = 6.673)]
    pub latitude: f64,
    #[schema(example = json!(-0.52))]
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCheck {
    pub within_range: bool,
    pub distance_km: f64,
}

/// Haversine distance in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// A report is in range when it lies on or inside the radius.
pub fn check(reported: GeoPoint, premises: GeoPoint, radius_km: f64) -> GeoCheck {
    let distance_km = haversine_km(reported, premises);
    GeoCheck {
        within_range: distance_km <= radius_km,
        distance_km,
    }
}
