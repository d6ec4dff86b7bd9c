//! Quests as seen by the pin layer
//!
//! Only what is needed to place a quest on the map is modelled here: its id,
//! its type (for the icon and the draw order), the group it belongs to and the
//! positions its pins go to.

pub mod order;

pub use order::QuestTypeOrder;

use crate::core::{
    constants::{MARKER_QUEST_GROUP, MARKER_QUEST_ID},
    geo::LatLng,
};
use crate::prelude::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Stable identifier of a quest within its group
pub type QuestId = i64;

/// Coarse classification of quests; ids are only unique within a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuestGroup {
    #[serde(rename = "OSM")]
    Osm,
    #[serde(rename = "OSM_NOTE")]
    OsmNote,
}

impl QuestGroup {
    pub const ALL: [QuestGroup; 2] = [QuestGroup::Osm, QuestGroup::OsmNote];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Osm => "OSM",
            Self::OsmNote => "OSM_NOTE",
        }
    }
}

impl fmt::Display for QuestGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QuestGroup {
    type Err = crate::QuestPinError;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|group| group.name() == s)
            .ok_or_else(|| crate::QuestPinError::UnknownQuestGroup(s.to_string()))
    }
}

/// Reference to an icon resource, resolved to an icon key by an `IconResolver`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconRef(pub u32);

impl fmt::Display for IconRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The category a quest belongs to. Its name identifies it towards the store.
pub trait QuestType: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn icon(&self) -> IconRef;
}

/// Quest type defined by data only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedQuestType {
    pub name: String,
    pub icon: IconRef,
}

impl NamedQuestType {
    pub fn new(name: impl Into<String>, icon: IconRef) -> Self {
        Self {
            name: name.into(),
            icon,
        }
    }

    pub fn shared(name: impl Into<String>, icon: IconRef) -> Arc<dyn QuestType> {
        Arc::new(Self::new(name, icon))
    }
}

impl QuestType for NamedQuestType {
    fn name(&self) -> &str {
        &self.name
    }

    fn icon(&self) -> IconRef {
        self.icon
    }
}

#[derive(Debug, Clone)]
pub struct Quest {
    pub id: QuestId,
    pub quest_type: Arc<dyn QuestType>,
    /// Where the pins of this quest go, usually one position
    pub marker_locations: Vec<LatLng>,
}

impl Quest {
    pub fn new(id: QuestId, quest_type: Arc<dyn QuestType>, marker_locations: Vec<LatLng>) -> Self {
        Self {
            id,
            quest_type,
            marker_locations,
        }
    }

    pub fn type_name(&self) -> &str {
        self.quest_type.name()
    }
}

/// A quest together with the group it was found in
#[derive(Debug, Clone)]
pub struct QuestAndGroup {
    pub quest: Quest,
    pub group: QuestGroup,
}

impl QuestAndGroup {
    pub fn new(quest: Quest, group: QuestGroup) -> Self {
        Self { quest, group }
    }

    pub fn key(&self) -> QuestKey {
        QuestKey::new(self.group, self.quest.id)
    }
}

/// Identifies a quest across groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestKey {
    pub group: QuestGroup,
    pub id: QuestId,
}

impl QuestKey {
    pub fn new(group: QuestGroup, id: QuestId) -> Self {
        Self { group, id }
    }

    /// Recovers the quest a tapped pin belongs to from the pin's properties
    pub fn from_properties(properties: &HashMap<String, String>) -> Option<Self> {
        let group = properties.get(MARKER_QUEST_GROUP)?.parse().ok()?;
        let id = properties.get(MARKER_QUEST_ID)?.parse().ok()?;
        Some(Self::new(group, id))
    }
}
