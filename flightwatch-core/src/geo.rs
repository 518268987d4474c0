//! Watched region geometry — bounds-by-point and great-circle distance.

use serde::Serialize;

const EARTH_RADIUS_KM: f64 = 6371.0;
const EARTH_RADIUS_M: f64 = EARTH_RADIUS_KM * 1000.0;

/// Circular region: center point plus radius in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Region {
    pub lat: f64,
    pub lon: f64,
    pub radius_m: f64,
}

/// Bounding box in degrees, named after the feed's query parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// North edge.
    pub tl_y: f64,
    /// South edge.
    pub br_y: f64,
    /// West edge.
    pub tl_x: f64,
    /// East edge.
    pub br_x: f64,
}

impl Bounds {
    /// `north,south,west,east` with four decimals, as the zone feed expects.
    pub fn to_query(&self) -> String {
        format!(
            "{:.4},{:.4},{:.4},{:.4}",
            self.tl_y, self.br_y, self.tl_x, self.br_x
        )
    }
}

impl Region {
    pub fn new(lat: f64, lon: f64, radius_m: f64) -> Self {
        Region { lat, lon, radius_m }
    }

    /// Square around the center whose half-side is the radius.
    ///
    /// Corners are found by walking the half-diagonal from the center at
    /// bearings 225° (south-west) and 45° (north-east).
    pub fn bounds(&self) -> Bounds {
        let half_side_km = self.radius_m.abs() / 1000.0;
        let diagonal = (2.0 * half_side_km.powi(2)).sqrt() / EARTH_RADIUS_KM;

        let (sw_lat, sw_lon) = destination(self.lat, self.lon, diagonal, 225.0);
        let (ne_lat, ne_lon) = destination(self.lat, self.lon, diagonal, 45.0);

        Bounds {
            tl_y: ne_lat,
            br_y: sw_lat,
            tl_x: sw_lon,
            br_x: ne_lon,
        }
    }

    /// Whether a point lies within the circle (not just the bounding square).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        haversine_m(self.lat, self.lon, lat, lon) <= self.radius_m
    }
}

/// Point reached from (lat, lon) after `angular` radians along `bearing_deg`.
fn destination(lat: f64, lon: f64, angular: f64, bearing_deg: f64) -> (f64, f64) {
    let lat = lat.to_radians();
    let lon = lon.to_radians();
    let bearing = bearing_deg.to_radians();

    let dest_lat =
        (lat.sin() * angular.cos() + lat.cos() * angular.sin() * bearing.cos()).asin();
    let dest_lon = lon
        + (bearing.sin() * angular.sin() * lat.cos())
            .atan2(angular.cos() - lat.sin() * dest_lat.sin());

    (dest_lat.to_degrees(), dest_lon.to_degrees())
}

/// Great-circle distance in meters.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    EARTH_RADIUS_M * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
