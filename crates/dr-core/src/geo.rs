//! Geographic coordinate type and spatial utilities.
//!
//! Fragment files carry `x` (longitude) and `y` (latitude) as JSON doubles,
//! so `GeoPoint` keeps `f64` and hands them to the map layer unchanged.

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from the fragment convention: `x` is longitude, `y` latitude.
    #[inline]
    pub fn from_xy(x: f64, y: f64) -> Self {
        Self { lat: y, lon: x }
    }

    /// `(lat, lon)` pair, the order map widgets expect.
    #[inline]
    pub fn lat_lon(self) -> (f64, f64) {
        (self.lat, self.lon)
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
