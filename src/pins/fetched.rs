use crate::core::tiles::{Tile, TilesRect};
use crate::prelude::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The tiles whose quests have already been pulled into memory
#[derive(Debug, Default)]
pub struct FetchedTiles {
    tiles: Mutex<HashSet<Tile>>,
}

impl FetchedTiles {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Tile>> {
        self.tiles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Tiles of `rect` that have not been fetched yet, row by row
    pub fn unfetched(&self, rect: &TilesRect) -> Vec<Tile> {
        let tiles = self.lock();
        rect.tiles().filter(|tile| !tiles.contains(tile)).collect()
    }

    pub fn mark(&self, tiles: &[Tile]) {
        self.lock().extend(tiles.iter().copied());
    }

    pub fn contains(&self, tile: &Tile) -> bool {
        self.lock().contains(tile)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
