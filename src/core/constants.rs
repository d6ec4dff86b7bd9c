//! Core constants for the quest pin layer.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Zoom level of the tile grid used to bound incremental quest fetches.
pub const TILES_ZOOM: u8 = 14;

/// Quests are not shown at all when the map is zoomed out further than this.
pub const MIN_QUEST_ZOOM: f64 = 14.0;

/// A displayed tile rectangle larger than this is not fetched at all.
pub const MAX_FETCH_TILES: usize = 4;

/// Upper bound of the importance score handed to the rendering surface.
pub const IMPORTANCE_RANGE: i64 = 100_000;

/// Largest configurable importance range; an importance never exceeds twice the range.
pub const MAX_IMPORTANCE_RANGE: i64 = i64::MAX / 2;

/// Highest zoom level a tile grid may be configured at.
pub const MAX_TILES_ZOOM: u8 = 22;

/// Moves the north-east corner of a bbox slightly inward so that a bbox
/// ending exactly on a tile border does not include the next tile.
pub const NOT_THE_NEXT_TILE: f64 = 1e-7;

/// Marker property keys understood by the rendering surface.
pub const MARKER_TYPE: &str = "type";
pub const MARKER_KIND: &str = "kind";
pub const MARKER_IMPORTANCE: &str = "importance";
pub const MARKER_QUEST_GROUP: &str = "quest_group";
pub const MARKER_QUEST_ID: &str = "quest_id";
