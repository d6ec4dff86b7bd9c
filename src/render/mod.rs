//! Render-ready quest pins and the surface they are pushed to

use crate::core::constants::{
    MARKER_IMPORTANCE, MARKER_KIND, MARKER_QUEST_GROUP, MARKER_QUEST_ID, MARKER_TYPE,
};
use crate::core::geo::{LatLng, Point};
use crate::prelude::HashMap;
use crate::quest::{Quest, QuestGroup, QuestId, QuestKey};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One pin on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: LatLng,
    /// `position` in Web Mercator metres, as consumed by the map renderer
    pub projected: Point,
    /// Icon key of the quest type
    pub kind: String,
    pub importance: i64,
    pub quest_group: QuestGroup,
    pub quest_id: QuestId,
}

impl Marker {
    pub fn new(
        position: LatLng,
        kind: impl Into<String>,
        importance: i64,
        quest_group: QuestGroup,
        quest_id: QuestId,
    ) -> Self {
        Self {
            position,
            projected: position.to_mercator(),
            kind: kind.into(),
            importance,
            quest_group,
            quest_id,
        }
    }

    /// One marker per valid position of the quest. Invalid positions are skipped.
    pub fn for_quest(quest: &Quest, group: QuestGroup, kind: &str, importance: i64) -> Vec<Marker> {
        quest
            .marker_locations
            .iter()
            .filter(|position| {
                let valid = position.is_valid();
                if !valid {
                    log::warn!(
                        "skipping pin of {} quest {} at invalid position {:?}",
                        group,
                        quest.id,
                        position
                    );
                }
                valid
            })
            .map(|position| Marker::new(*position, kind, importance, group, quest.id))
            .collect()
    }

    pub fn quest_key(&self) -> QuestKey {
        QuestKey::new(self.quest_group, self.quest_id)
    }

    /// Feature properties as understood by the map renderer
    pub fn properties(&self) -> HashMap<String, String> {
        let mut properties = HashMap::default();
        properties.insert(MARKER_TYPE.to_string(), "point".to_string());
        properties.insert(MARKER_KIND.to_string(), self.kind.clone());
        properties.insert(MARKER_IMPORTANCE.to_string(), self.importance.to_string());
        properties.insert(MARKER_QUEST_GROUP.to_string(), self.quest_group.name().to_string());
        properties.insert(MARKER_QUEST_ID.to_string(), self.quest_id.to_string());
        properties
    }
}

/// The map layer quest pins are drawn on.
///
/// Every call replaces what the layer shows; it never receives partial updates.
pub trait PinLayer: Send + Sync {
    fn set_features(&self, markers: Vec<Marker>);

    fn clear(&self);
}

#[derive(Debug, Default)]
struct RecordedFeatures {
    features: Vec<Marker>,
    set_calls: usize,
    clear_calls: usize,
}

/// Pin layer that just remembers what it was told to show
#[derive(Debug, Default)]
pub struct MemoryPinLayer {
    state: Mutex<RecordedFeatures>,
}

impl MemoryPinLayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RecordedFeatures> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Currently shown markers
    pub fn features(&self) -> Vec<Marker> {
        self.lock().features.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_calls(&self) -> usize {
        self.lock().set_calls
    }

    pub fn clear_calls(&self) -> usize {
        self.lock().clear_calls
    }
}

impl PinLayer for MemoryPinLayer {
    fn set_features(&self, markers: Vec<Marker>) {
        let mut state = self.lock();
        state.features = markers;
        state.set_calls += 1;
    }

    fn clear(&self) {
        let mut state = self.lock();
        state.features.clear();
        state.clear_calls += 1;
    }
}
