use crate::prelude::HashMap;
use crate::quest::{QuestGroup, QuestId, QuestKey};
use crate::render::Marker;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct StoreState {
    /// Bumped by every `clear`; fetches started in an older session are dropped
    session: u64,
    groups: HashMap<QuestGroup, HashMap<QuestId, Vec<Marker>>>,
}

impl StoreState {
    fn replace(&mut self, key: QuestKey, markers: Vec<Marker>) {
        if markers.is_empty() {
            self.remove(&key);
        } else {
            self.groups.entry(key.group).or_default().insert(key.id, markers);
        }
    }

    fn remove(&mut self, key: &QuestKey) -> Option<Vec<Marker>> {
        self.groups.get_mut(&key.group)?.remove(&key.id)
    }
}

/// Markers of all quests in memory: quest group → quest id → markers.
///
/// Writing a quest replaces all of its markers at once; an empty marker list
/// removes the quest.
#[derive(Debug, Default)]
pub struct PinStore {
    state: Mutex<StoreState>,
}

impl PinStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session(&self) -> u64 {
        self.lock().session
    }

    pub fn replace(&self, key: QuestKey, markers: Vec<Marker>) {
        self.lock().replace(key, markers);
    }

    pub fn remove(&self, key: &QuestKey) -> Option<Vec<Marker>> {
        self.lock().remove(key)
    }

    /// Replaces the given quests and removes `removed`, in one critical section
    pub fn apply<I>(&self, replaced: I, removed: &[QuestKey])
    where
        I: IntoIterator<Item = (QuestKey, Vec<Marker>)>,
    {
        let mut state = self.lock();
        for (key, markers) in replaced {
            state.replace(key, markers);
        }
        for key in removed {
            state.remove(key);
        }
    }

    /// Like [`apply`](Self::apply), but only if the store was not cleared since `session`.
    ///
    /// Returns whether the changes were applied.
    pub fn apply_in_session<I>(&self, session: u64, replaced: I, removed: &[QuestKey]) -> bool
    where
        I: IntoIterator<Item = (QuestKey, Vec<Marker>)>,
    {
        let mut state = self.lock();
        if state.session != session {
            return false;
        }
        for (key, markers) in replaced {
            state.replace(key, markers);
        }
        for key in removed {
            state.remove(key);
        }
        true
    }

    /// Replaces the given quests only if the store was not cleared since `session`.
    ///
    /// Returns whether the entries were merged.
    pub fn merge_in_session<I>(&self, session: u64, entries: I) -> bool
    where
        I: IntoIterator<Item = (QuestKey, Vec<Marker>)>,
    {
        let mut state = self.lock();
        if state.session != session {
            return false;
        }
        for (key, markers) in entries {
            state.replace(key, markers);
        }
        true
    }

    /// Drops all markers and starts a new session, which is returned
    pub fn clear(&self) -> u64 {
        let mut state = self.lock();
        state.groups.clear();
        state.session += 1;
        state.session
    }

    /// Snapshot of all markers
    pub fn markers(&self) -> Vec<Marker> {
        self.lock()
            .groups
            .values()
            .flat_map(|by_id| by_id.values().flatten().cloned())
            .collect()
    }

    pub fn markers_for(&self, key: &QuestKey) -> Option<Vec<Marker>> {
        self.lock().groups.get(&key.group)?.get(&key.id).cloned()
    }

    pub fn contains(&self, key: &QuestKey) -> bool {
        self.lock()
            .groups
            .get(&key.group)
            .is_some_and(|by_id| by_id.contains_key(&key.id))
    }

    /// Number of quests with markers
    pub fn len(&self) -> usize {
        self.lock().groups.values().map(|by_id| by_id.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
