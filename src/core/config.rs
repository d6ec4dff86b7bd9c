//! Configuration of the quest pin layer
//!
//! The layer does not read any global preference store. A [`QuestPinConfig`]
//! is built by the host (from a profile, a JSON document or by hand) and
//! handed to the cache when it is constructed.

use crate::core::constants::{
    IMPORTANCE_RANGE, MAX_FETCH_TILES, MAX_IMPORTANCE_RANGE, MAX_TILES_ZOOM, MIN_QUEST_ZOOM,
    TILES_ZOOM,
};
use crate::{QuestPinError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum QuestPinProfile {
    /// The defaults of the quest map
    Standard,
    /// Fetches only single tiles, for slow stores
    Conservative,
    Custom(QuestPinConfig),
}

impl QuestPinProfile {
    pub fn resolve(&self) -> QuestPinConfig {
        match self {
            Self::Standard => QuestPinConfig {
                tiles_zoom: TILES_ZOOM,
                min_zoom: MIN_QUEST_ZOOM,
                max_fetch_tiles: MAX_FETCH_TILES,
                importance_range: IMPORTANCE_RANGE,
                initially_visible: true,
            },
            Self::Conservative => QuestPinConfig {
                tiles_zoom: TILES_ZOOM,
                min_zoom: MIN_QUEST_ZOOM + 1.0,
                max_fetch_tiles: 1,
                importance_range: IMPORTANCE_RANGE,
                initially_visible: true,
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

impl Default for QuestPinProfile {
    fn default() -> Self {
        Self::Standard
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestPinConfig {
    /// Zoom level of the tile grid quests are fetched by
    pub tiles_zoom: u8,
    /// Below this map zoom no quests are fetched
    pub min_zoom: f64,
    /// Displayed tile rectangles with more tiles than this are skipped
    pub max_fetch_tiles: usize,
    /// Upper bound of marker importance values
    pub importance_range: i64,
    pub initially_visible: bool,
}

impl Default for QuestPinConfig {
    fn default() -> Self {
        QuestPinProfile::default().resolve()
    }
}

impl QuestPinConfig {
    /// Parses a (partial) JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: QuestPinConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tiles_zoom > MAX_TILES_ZOOM {
            return Err(QuestPinError::Config(format!(
                "tiles_zoom {} exceeds {}",
                self.tiles_zoom, MAX_TILES_ZOOM
            )));
        }
        if self.max_fetch_tiles == 0 {
            return Err(QuestPinError::Config(
                "max_fetch_tiles must be at least 1".to_string(),
            ));
        }
        if self.importance_range <= 0 || self.importance_range > MAX_IMPORTANCE_RANGE {
            return Err(QuestPinError::Config(format!(
                "importance_range must be in 1..={}, got {}",
                MAX_IMPORTANCE_RANGE, self.importance_range
            )));
        }
        if !self.min_zoom.is_finite() {
            return Err(QuestPinError::Config("min_zoom must be finite".to_string()));
        }
        Ok(())
    }
}
