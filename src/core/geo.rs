use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Web Mercator projection constants
const EARTH_RADIUS: f64 = 6378137.0;
pub(crate) const MAX_LATITUDE: f64 = 85.0511287798;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are finite and within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }

    /// Brings a longitude into -180..180, as reached by going around the globe
    pub fn wrap_lng(lng: f64) -> f64 {
        if (-180.0..=180.0).contains(&lng) {
            lng
        } else {
            (lng + 180.0).rem_euclid(360.0) - 180.0
        }
    }

    /// Clamps latitude to the range Web Mercator can represent
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Converts to Web Mercator projection (EPSG:3857)
    pub fn to_mercator(&self) -> Point {
        let x = self.lng.to_radians() * EARTH_RADIUS;
        let lat = Self::clamp_lat(self.lat);
        let y = ((PI / 4.0 + lat.to_radians() / 2.0).tan().ln()) * EARTH_RADIUS;
        Point::new(x, y)
    }

    /// Creates LatLng from Web Mercator coordinates
    pub fn from_mercator(point: Point) -> Self {
        let lng = (point.x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (point.y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
        Self::new(lat, lng)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a bounding box of geographical coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        let within_lat = point.lat >= self.south_west.lat && point.lat <= self.north_east.lat;
        let within_lng = if self.crosses_180th_meridian() {
            point.lng >= self.south_west.lng || point.lng <= self.north_east.lng
        } else {
            point.lng >= self.south_west.lng && point.lng <= self.north_east.lng
        };
        within_lat && within_lng
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// Whether the box wraps around the antimeridian (west edge east of the east edge)
    pub fn crosses_180th_meridian(&self) -> bool {
        self.south_west.lng > self.north_east.lng
    }

    /// The part of the box west of the antimeridian; the box itself if it does not wrap.
    pub fn western_part(&self) -> LatLngBounds {
        if self.crosses_180th_meridian() {
            LatLngBounds::from_coords(
                self.south_west.lat,
                self.south_west.lng,
                self.north_east.lat,
                180.0,
            )
        } else {
            self.clone()
        }
    }

    /// Checks that both corners are valid and south-west is not north of north-east
    pub fn is_valid(&self) -> bool {
        self.south_west.is_valid()
            && self.north_east.is_valid()
            && self.south_west.lat <= self.north_east.lat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(40.7128, -74.0060);
        assert_eq!(coord.lat, 40.7128);
        assert_eq!(coord.lng, -74.0060);
        assert!(coord.is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
        assert!(!LatLng::new(91.0, 0.0).is_valid());
    }

    #[test]
    fn test_wrap_lng() {
        assert_eq!(LatLng::wrap_lng(180.0), 180.0);
        assert_eq!(LatLng::wrap_lng(-180.0), -180.0);
        assert!((LatLng::wrap_lng(181.5) - -178.5).abs() < 1e-9);
        assert!((LatLng::wrap_lng(-190.0) - 170.0).abs() < 1e-9);
        assert!(LatLng::wrap_lng(f64::NAN).is_nan());
    }

    #[test]
    fn test_mercator_round_trip() {
        let berlin = LatLng::new(52.52, 13.405);
        let back = LatLng::from_mercator(berlin.to_mercator());

        assert!((back.lat - berlin.lat).abs() < 1e-9);
        assert!((back.lng - berlin.lng).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = LatLngBounds::from_coords(40.0, -75.0, 41.0, -73.0);
        let point_inside = LatLng::new(40.5, -74.0);
        let point_outside = LatLng::new(42.0, -74.0);

        assert!(bounds.contains(&point_inside));
        assert!(!bounds.contains(&point_outside));
    }

    #[test]
    fn test_bounds_across_antimeridian() {
        let bounds = LatLngBounds::from_coords(-10.0, 170.0, 10.0, -170.0);
        assert!(bounds.crosses_180th_meridian());
        assert!(bounds.contains(&LatLng::new(0.0, 179.0)));
        assert!(bounds.contains(&LatLng::new(0.0, -179.0)));
        assert!(!bounds.contains(&LatLng::new(0.0, 0.0)));

        let west = bounds.western_part();
        assert_eq!(west.north_east.lng, 180.0);
        assert!(!west.crosses_180th_meridian());
    }
}
