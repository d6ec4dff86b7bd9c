use crate::core::geo::{LatLng, LatLngBounds, Point};
use serde::{Deserialize, Serialize};

const EARTH_RADIUS: f64 = 6378137.0;

/// The current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(0.0, 22.0),
            size,
        }
    }

    /// Projects a LatLng to world pixel coordinates at the given zoom level (EPSG:3857)
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let z = zoom.unwrap_or(self.zoom);
        let scale = 256.0 * 2_f64.powf(z);
        let mercator = lat_lng.to_mercator();
        let world = 2.0 * std::f64::consts::PI * EARTH_RADIUS;

        let pixel_x = (mercator.x + world / 2.0) / world * scale;
        let pixel_y = (-mercator.y + world / 2.0) / world * scale;

        Point::new(pixel_x, pixel_y)
    }

    /// Unprojects world pixel coordinates back to LatLng at the given zoom level
    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        let z = zoom.unwrap_or(self.zoom);
        let scale = 256.0 * 2_f64.powf(z);
        let world = 2.0 * std::f64::consts::PI * EARTH_RADIUS;

        let x = (pixel.x / scale) * world - world / 2.0;
        let y = world / 2.0 - (pixel.y / scale) * world;

        LatLng::from_mercator(Point::new(x, y))
    }

    /// Converts screen pixel coordinates (container relative) to geographical coordinates
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let origin = self
            .project(&self.center, None)
            .subtract(&Point::new(self.size.x / 2.0, self.size.y / 2.0));
        self.unproject(&origin.add(pixel), None)
    }

    /// Gets the displayed area in geographical coordinates.
    ///
    /// A view across the antimeridian yields a box whose west edge is east of
    /// its east edge. A view wider than the world spans all longitudes.
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.pixel_to_lat_lng(&Point::new(self.size.x, self.size.y));

        let (west, east) = if se.lng - nw.lng >= 360.0 {
            (-180.0, 180.0)
        } else {
            (LatLng::wrap_lng(nw.lng), LatLng::wrap_lng(se.lng))
        };
        LatLngBounds::from_coords(se.lat, west, nw.lat, east)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_creation() {
        let viewport = Viewport::new(
            LatLng::new(40.7128, -74.0060),
            10.0,
            Point::new(800.0, 600.0),
        );

        assert_eq!(viewport.zoom, 10.0);
        assert_eq!(viewport.center.lat, 40.7128);
        assert_eq!(viewport.size.x, 800.0);
    }

    #[test]
    fn test_coordinate_conversion() {
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 1.0, Point::new(512.0, 512.0));

        let center_lat_lng = viewport.pixel_to_lat_lng(&Point::new(256.0, 256.0));

        assert!((center_lat_lng.lat - 0.0).abs() < 0.01);
        assert!((center_lat_lng.lng - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_bounds_surround_center() {
        let center = LatLng::new(52.5163, 13.3777);
        let viewport = Viewport::new(center, 16.0, Point::new(400.0, 300.0));
        let bounds = viewport.bounds();

        assert!(bounds.contains(&center));
        assert!(bounds.south_west.lat < bounds.north_east.lat);
        assert!(bounds.south_west.lng < bounds.north_east.lng);
    }

    #[test]
    fn test_bounds_across_antimeridian() {
        let viewport = Viewport::new(LatLng::new(0.0, 179.999), 16.0, Point::new(800.0, 600.0));
        let bounds = viewport.bounds();

        assert!(bounds.is_valid());
        assert!(bounds.crosses_180th_meridian());
        assert!(bounds.south_west.lng > 179.9);
        assert!(bounds.north_east.lng < -179.9);
        assert!(bounds.contains(&LatLng::new(0.0, 179.999)));
    }

    #[test]
    fn test_bounds_of_whole_world() {
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 0.0, Point::new(1024.0, 256.0));
        let bounds = viewport.bounds();

        assert_eq!(bounds.south_west.lng, -180.0);
        assert_eq!(bounds.north_east.lng, 180.0);
        assert!(!bounds.crosses_180th_meridian());
    }
}
