//! # questpin
//!
//! Keeps the quest pins of a map view in memory.
//!
//! The [`ViewportQuestCache`] is told when a new area comes into view and
//! independently pulls the quests of the surrounding (zoom 14) tiles from a
//! [`VisibleQuestsSource`], holding them as render-ready [`Marker`]s. Quests
//! that become visible or get solved elsewhere are merged in through the
//! source's listener registry. Fetches run in the background and a tile is
//! never pulled twice while the cache is active.

pub mod core;
pub mod pins;
pub mod prelude;
pub mod quest;
pub mod render;
pub mod runtime;
pub mod source;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{QuestPinConfig, QuestPinProfile},
    geo::{LatLng, LatLngBounds, Point},
    tiles::{min_tile_rect, Tile, TilesRect},
    viewport::Viewport,
};

pub use quest::{
    IconRef, NamedQuestType, Quest, QuestAndGroup, QuestGroup, QuestId, QuestKey, QuestType,
    QuestTypeOrder,
};

pub use pins::{
    cache::{CacheState, ViewportQuestCache},
    fetched::FetchedTiles,
    store::PinStore,
};

pub use render::{Marker, MemoryPinLayer, PinLayer};

pub use source::{
    listeners::{ListenerRegistry, SubscriptionId},
    memory::MemoryQuestSource,
    IconResolver, OrderedQuestTypesProvider, StaticIconResolver, StaticQuestTypesProvider,
    VisibleQuestListener, VisibleQuestsSource,
};

pub use traits::{Configurable, ViewportAware};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, QuestPinError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum QuestPinError {
    #[error("Quest source error: {0}")]
    Source(String),

    #[error("No icon found for {0}")]
    IconNotFound(IconRef),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Unknown quest group: {0}")]
    UnknownQuestGroup(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Error type alias for convenience
pub type Error = QuestPinError;

/// Installs `env_logger` as the `log` backend, configured from `RUST_LOG`.
///
/// Calling it more than once is harmless.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
