//! In-memory quest source
//!
//! Keeps quests in an R-tree of their pin positions. Hosts without a database
//! and the tests use it as the backing store of the pin cache.

use crate::core::geo::{LatLng, LatLngBounds};
use crate::prelude::{Arc, HashMap};
use crate::quest::{Quest, QuestAndGroup, QuestGroup, QuestId, QuestKey};
use crate::source::listeners::{ListenerRegistry, SubscriptionId};
use crate::source::{VisibleQuestListener, VisibleQuestsSource};
use crate::Result;
use async_trait::async_trait;
use rstar::{RTree, RTreeObject, AABB};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One pin position of a quest, indexed as `[lng, lat]`
#[derive(Debug, Clone, PartialEq)]
struct PinEntry {
    key: QuestKey,
    position: [f64; 2],
}

impl PinEntry {
    fn new(key: QuestKey, position: &LatLng) -> Self {
        Self {
            key,
            position: [position.lng, position.lat],
        }
    }
}

impl RTreeObject for PinEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

#[derive(Default)]
struct Index {
    tree: RTree<PinEntry>,
    quests: HashMap<QuestKey, Quest>,
}

impl Index {
    /// Positions that are not valid coordinates are left out of the tree
    fn insert(&mut self, key: QuestKey, quest: Quest) {
        self.remove(&key);
        for position in quest.marker_locations.iter().filter(|p| p.is_valid()) {
            self.tree.insert(PinEntry::new(key, position));
        }
        self.quests.insert(key, quest);
    }

    fn remove(&mut self, key: &QuestKey) -> Option<Quest> {
        let quest = self.quests.remove(key)?;
        for position in quest.marker_locations.iter().filter(|p| p.is_valid()) {
            self.tree.remove(&PinEntry::new(*key, position));
        }
        Some(quest)
    }
}

/// Visible quests held in memory, notifying subscribers about every change
#[derive(Default)]
pub struct MemoryQuestSource {
    index: Mutex<Index>,
    listeners: ListenerRegistry<dyn VisibleQuestListener>,
}

impl MemoryQuestSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Index> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds or replaces quests of `group` and tells the subscribers
    pub fn add_quests(&self, quests: Vec<Quest>, group: QuestGroup) {
        self.update(quests, &[], group);
    }

    /// Removes quests of `group` and tells the subscribers
    pub fn remove_quests(&self, ids: &[QuestId], group: QuestGroup) {
        self.update(Vec::new(), ids, group);
    }

    /// Applies a batch of changes to one group, then notifies all subscribers once
    pub fn update(&self, added: Vec<Quest>, removed: &[QuestId], group: QuestGroup) {
        {
            let mut index = self.lock();
            for id in removed {
                index.remove(&QuestKey::new(group, *id));
            }
            for quest in &added {
                index.insert(QuestKey::new(group, quest.id), quest.clone());
            }
        }
        log::debug!(
            "{} quests added, {} removed in group {}",
            added.len(),
            removed.len(),
            group
        );
        self.listeners
            .for_each(|listener| listener.on_updated_visible_quests(&added, removed, group));
    }

    pub fn get(&self, key: &QuestKey) -> Option<Quest> {
        self.lock().quests.get(key).cloned()
    }

    /// Number of quests held
    pub fn len(&self) -> usize {
        self.lock().quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn query(&self, bbox: &LatLngBounds, quest_types: &[String]) -> Vec<QuestAndGroup> {
        let envelopes = if bbox.crosses_180th_meridian() {
            vec![
                envelope(bbox.south_west.lat, bbox.south_west.lng, bbox.north_east.lat, 180.0),
                envelope(bbox.south_west.lat, -180.0, bbox.north_east.lat, bbox.north_east.lng),
            ]
        } else {
            vec![envelope(
                bbox.south_west.lat,
                bbox.south_west.lng,
                bbox.north_east.lat,
                bbox.north_east.lng,
            )]
        };

        let index = self.lock();
        let mut keys: Vec<QuestKey> = envelopes
            .iter()
            .flat_map(|env| index.tree.locate_in_envelope_intersecting(env))
            .map(|entry| entry.key)
            .collect();
        keys.sort();
        keys.dedup();

        keys.into_iter()
            .filter_map(|key| {
                let quest = index.quests.get(&key)?;
                quest_types
                    .iter()
                    .any(|name| name == quest.type_name())
                    .then(|| QuestAndGroup::new(quest.clone(), key.group))
            })
            .collect()
    }
}

fn envelope(south: f64, west: f64, north: f64, east: f64) -> AABB<[f64; 2]> {
    AABB::from_corners([west, south], [east, north])
}

#[async_trait]
impl VisibleQuestsSource for MemoryQuestSource {
    async fn get_all_visible(
        &self,
        bbox: &LatLngBounds,
        quest_types: &[String],
    ) -> Result<Vec<QuestAndGroup>> {
        Ok(self.query(bbox, quest_types))
    }

    fn subscribe(&self, listener: Arc<dyn VisibleQuestListener>) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}
