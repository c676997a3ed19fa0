//! Geofence evaluation.
//!
//! Computes great-circle distances between geographic coordinates and
//! classifies positions against a configured circular zone. The math here is
//! pure: inputs are assumed valid (range checks live at the ingestion
//! boundaries) and no error conditions exist.

use crate::api::{Coordinate, GeofenceZone, ZoneClassification};

/// Mean Earth radius in meters used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Compute the great-circle distance between two coordinates in meters.
///
/// Uses the haversine formula on a spherical Earth model, which is accurate
/// to well under a meter at geofence scales (hundreds of meters).
///
/// # Arguments
///
/// * `a` - First coordinate
/// * `b` - Second coordinate
///
/// # Returns
///
/// Distance in meters. Zero for identical coordinates; symmetric in its
/// arguments.
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Classify a position against a geofence zone.
///
/// The boundary is inclusive: a point exactly `radius_m` meters from the
/// center counts as inside. There is no hysteresis; each classification is
/// independent.
pub fn classify(point: &Coordinate, zone: &GeofenceZone) -> ZoneClassification {
    let distance_m = distance_meters(point, &zone.center);
    ZoneClassification {
        distance_m,
        inside_zone: distance_m <= zone.radius_m,
    }
}
