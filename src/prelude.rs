//! Prelude module for common questpin types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use questpin::prelude::*;`

pub use crate::core::{
    config::{QuestPinConfig, QuestPinProfile},
    geo::{LatLng, LatLngBounds, Point},
    tiles::{Tile, TilesRect},
    viewport::Viewport,
};

pub use crate::quest::{
    IconRef, NamedQuestType, Quest, QuestAndGroup, QuestGroup, QuestId, QuestKey, QuestType,
    QuestTypeOrder,
};

pub use crate::pins::cache::{CacheState, ViewportQuestCache};

pub use crate::render::{Marker, MemoryPinLayer, PinLayer};

pub use crate::source::{
    memory::MemoryQuestSource, IconResolver, OrderedQuestTypesProvider, StaticIconResolver,
    StaticQuestTypesProvider, VisibleQuestListener, VisibleQuestsSource,
};

pub use crate::runtime::{AsyncHandle, AsyncSpawner, InlineSpawner};

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::spawners::tokio_impl::TokioSpawner;

pub use crate::traits::{Configurable, ViewportAware};

pub use crate::{QuestPinError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub use futures::Future;

pub use std::pin::Pin;
