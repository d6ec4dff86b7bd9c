//! Collaborators the pin cache pulls its data from
//!
//! The quest store, the user's quest type selection and the icon resources
//! live outside of this crate. They are consumed through the traits below.

pub mod listeners;
pub mod memory;

use crate::core::geo::LatLngBounds;
use crate::prelude::{Arc, HashMap};
use crate::quest::{IconRef, Quest, QuestAndGroup, QuestGroup, QuestId, QuestType};
use crate::{QuestPinError, Result};
use async_trait::async_trait;
use listeners::SubscriptionId;
use std::sync::{Mutex, PoisonError};

/// Supplies the quest types that are currently enabled, in the order they should
/// be drawn (first = on top). Queried again on every activation.
pub trait OrderedQuestTypesProvider: Send + Sync {
    fn get(&self) -> Vec<Arc<dyn QuestType>>;
}

/// Receives quests that became visible or invisible elsewhere in the app
pub trait VisibleQuestListener: Send + Sync {
    fn on_updated_visible_quests(&self, added: &[Quest], removed: &[QuestId], group: QuestGroup);
}

/// Backing store of the quests that are currently visible to the user
#[async_trait]
pub trait VisibleQuestsSource: Send + Sync {
    /// All visible quests of the given types with a position within `bbox`
    async fn get_all_visible(
        &self,
        bbox: &LatLngBounds,
        quest_types: &[String],
    ) -> Result<Vec<QuestAndGroup>>;

    fn subscribe(&self, listener: Arc<dyn VisibleQuestListener>) -> SubscriptionId;

    /// Returns whether the subscription existed
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// Turns icon references into the icon keys the rendering surface knows
pub trait IconResolver: Send + Sync {
    fn resolve(&self, icon: IconRef) -> Result<String>;
}

/// Quest types fixed by the host, replaceable at runtime
#[derive(Default)]
pub struct StaticQuestTypesProvider {
    types: Mutex<Vec<Arc<dyn QuestType>>>,
}

impl StaticQuestTypesProvider {
    pub fn new(types: Vec<Arc<dyn QuestType>>) -> Self {
        Self {
            types: Mutex::new(types),
        }
    }

    /// Takes effect on the next activation of the cache
    pub fn set(&self, types: Vec<Arc<dyn QuestType>>) {
        *self.types.lock().unwrap_or_else(PoisonError::into_inner) = types;
    }
}

impl OrderedQuestTypesProvider for StaticQuestTypesProvider {
    fn get(&self) -> Vec<Arc<dyn QuestType>> {
        self.types
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Icon resolver backed by a lookup table
#[derive(Debug, Clone, Default)]
pub struct StaticIconResolver {
    names: HashMap<IconRef, String>,
}

impl StaticIconResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, icon: IconRef, name: impl Into<String>) -> Self {
        self.insert(icon, name);
        self
    }

    pub fn insert(&mut self, icon: IconRef, name: impl Into<String>) {
        self.names.insert(icon, name.into());
    }
}

impl IconResolver for StaticIconResolver {
    fn resolve(&self, icon: IconRef) -> Result<String> {
        self.names
            .get(&icon)
            .cloned()
            .ok_or(QuestPinError::IconNotFound(icon))
    }
}
