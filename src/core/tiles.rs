//! Slippy-map tile grid at a fixed zoom level.
//!
//! Quests are pulled from the store tile by tile, so the pin layer keeps its
//! bookkeeping in [`Tile`]s and [`TilesRect`]s rather than in raw coordinates.

use crate::core::{
    constants::NOT_THE_NEXT_TILE,
    geo::{LatLng, LatLngBounds},
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// One cell of the tile grid. The zoom level is implied by the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
}

impl Tile {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Creates the tile containing a LatLng at the given zoom level
    pub fn from_lat_lng(lat_lng: &LatLng, zoom: u8) -> Self {
        let lat_rad = LatLng::clamp_lat(lat_lng.lat).to_radians();
        let n = 2_f64.powi(zoom as i32);
        let max_index = n - 1.0;

        let x = ((lat_lng.lng + 180.0) / 360.0 * n).floor().clamp(0.0, max_index) as u32;
        let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n)
            .floor()
            .clamp(0.0, max_index) as u32;

        Self::new(x, y)
    }

    /// Converts the tile to the LatLng of its north-west corner
    pub fn to_lat_lng(&self, zoom: u8) -> LatLng {
        LatLng::new(tile_row_to_lat(self.y, zoom), tile_column_to_lng(self.x, zoom))
    }
}

fn tile_column_to_lng(x: u32, zoom: u8) -> f64 {
    let n = 2_f64.powi(zoom as i32);
    x as f64 / n * 360.0 - 180.0
}

fn tile_row_to_lat(y: u32, zoom: u8) -> f64 {
    let n = 2_f64.powi(zoom as i32);
    (PI * (1.0 - 2.0 * y as f64 / n)).sinh().atan().to_degrees()
}

/// Axis-aligned, inclusive rectangle of tiles. `top` is the northern row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilesRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl TilesRect {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left: left.min(right),
            top: top.min(bottom),
            right: left.max(right),
            bottom: top.max(bottom),
        }
    }

    /// Rectangle consisting of a single tile
    pub fn of_tile(tile: Tile) -> Self {
        Self::new(tile.x, tile.y, tile.x, tile.y)
    }

    /// Minimal rectangle of tiles at `zoom` that covers `bounds`.
    ///
    /// A box wrapping around the antimeridian is reduced to its western part.
    pub fn enclosing(bounds: &LatLngBounds, zoom: u8) -> Self {
        let bounds = bounds.western_part();
        let (mut south, mut west) = (bounds.south_west.lat, bounds.south_west.lng);
        let (mut north, mut east) = (bounds.north_east.lat, bounds.north_east.lng);

        // a box that exactly fits a tiles rect touches the neighbouring tiles
        if north - south > 2.0 * NOT_THE_NEXT_TILE {
            south += NOT_THE_NEXT_TILE;
            north -= NOT_THE_NEXT_TILE;
        }
        if east - west > 2.0 * NOT_THE_NEXT_TILE {
            west += NOT_THE_NEXT_TILE;
            east -= NOT_THE_NEXT_TILE;
        }

        let min = Tile::from_lat_lng(&LatLng::new(south, west), zoom);
        let max = Tile::from_lat_lng(&LatLng::new(north, east), zoom);
        Self::new(min.x, max.y, max.x, min.y)
    }

    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    /// Number of tiles in the rectangle
    pub fn size(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn contains(&self, tile: &Tile) -> bool {
        tile.x >= self.left && tile.x <= self.right && tile.y >= self.top && tile.y <= self.bottom
    }

    /// All member tiles, row by row from north to south
    pub fn tiles(&self) -> impl Iterator<Item = Tile> {
        let (left, right) = (self.left, self.right);
        (self.top..=self.bottom).flat_map(move |y| (left..=right).map(move |x| Tile::new(x, y)))
    }

    /// Geographic area covered by the rectangle.
    ///
    /// Edges are shared with the neighbouring tiles, so there are no gaps between
    /// the boxes of adjacent rectangles.
    pub fn to_bounding_box(&self, zoom: u8) -> LatLngBounds {
        LatLngBounds::from_coords(
            tile_row_to_lat(self.bottom + 1, zoom),
            tile_column_to_lng(self.left, zoom),
            tile_row_to_lat(self.top, zoom),
            tile_column_to_lng(self.right + 1, zoom),
        )
    }
}

/// Minimal rectangle covering all given tiles, `None` if there are none.
pub fn min_tile_rect<'a, I>(tiles: I) -> Option<TilesRect>
where
    I: IntoIterator<Item = &'a Tile>,
{
    let mut iter = tiles.into_iter();
    let first = iter.next()?;
    let mut rect = TilesRect::of_tile(*first);
    for tile in iter {
        rect.left = rect.left.min(tile.x);
        rect.right = rect.right.max(tile.x);
        rect.top = rect.top.min(tile.y);
        rect.bottom = rect.bottom.max(tile.y);
    }
    Some(rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_of_lat_lng() {
        // Brandenburg Gate
        let tile = Tile::from_lat_lng(&LatLng::new(52.5163, 13.3777), 14);
        assert_eq!(tile, Tile::new(8800, 5373));
    }

    #[test]
    fn test_tile_index_is_clamped() {
        let tile = Tile::from_lat_lng(&LatLng::new(-90.0, 180.0), 2);
        assert_eq!(tile, Tile::new(3, 3));
    }

    #[test]
    fn test_size_and_enumeration() {
        let rect = TilesRect::new(10, 20, 12, 21);
        assert_eq!(rect.size(), 6);

        let tiles: Vec<_> = rect.tiles().collect();
        assert_eq!(
            tiles,
            vec![
                Tile::new(10, 20),
                Tile::new(11, 20),
                Tile::new(12, 20),
                Tile::new(10, 21),
                Tile::new(11, 21),
                Tile::new(12, 21),
            ]
        );
    }

    #[test]
    fn test_min_tile_rect() {
        assert_eq!(min_tile_rect(&Vec::<Tile>::new()), None);
        assert_eq!(
            min_tile_rect(&[Tile::new(3, 4)]),
            Some(TilesRect::new(3, 4, 3, 4))
        );
        assert_eq!(
            min_tile_rect(&[Tile::new(5, 1), Tile::new(3, 4), Tile::new(4, 2)]),
            Some(TilesRect::new(3, 1, 5, 4))
        );
    }

    #[test]
    fn test_bounding_box_round_trip() {
        let rect = TilesRect::new(8800, 5373, 8801, 5374);
        let bbox = rect.to_bounding_box(14);

        assert!(bbox.south_west.lat < bbox.north_east.lat);
        assert!(bbox.south_west.lng < bbox.north_east.lng);
        assert_eq!(TilesRect::enclosing(&bbox, 14), rect);
    }

    #[test]
    fn test_enclosing_point_is_single_tile() {
        let point = LatLng::new(52.5163, 13.3777);
        let bbox = LatLngBounds::new(point, point);
        let rect = TilesRect::enclosing(&bbox, 14);

        assert_eq!(rect.size(), 1);
        assert!(rect.contains(&Tile::from_lat_lng(&point, 14)));
    }

    #[test]
    fn test_enclosing_across_antimeridian_uses_western_part() {
        let bbox = LatLngBounds::from_coords(0.0, 179.99, 0.01, -179.99);
        let rect = TilesRect::enclosing(&bbox, 14);

        assert_eq!(rect.right, (1 << 14) - 1);
        assert!(rect.left > 16000);
    }
}
