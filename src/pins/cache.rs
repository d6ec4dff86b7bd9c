//! The quest pin layer of a map view.
//!
//! [`ViewportQuestCache`] is told when a new area is in view and independently
//! pulls the quests of the surrounding tiles from the quest source, holding
//! them in memory as markers. Quests that appear or get solved while the map is
//! shown arrive through the source's listener registry.
//!
//! Only tile bookkeeping and marker bookkeeping happen on the caller's thread.
//! The store query runs on the injected [`AsyncSpawner`] and merges its result
//! into the shared marker table when it completes.

use crate::core::config::QuestPinConfig;
use crate::core::geo::LatLngBounds;
use crate::core::tiles::{min_tile_rect, Tile, TilesRect};
use crate::core::viewport::Viewport;
use crate::pins::{fetched::FetchedTiles, store::PinStore};
use crate::prelude::{Arc, HashMap};
use crate::quest::{Quest, QuestAndGroup, QuestGroup, QuestId, QuestKey, QuestTypeOrder};
use crate::render::{Marker, PinLayer};
use crate::runtime::{spawn, AsyncHandle, AsyncSpawner};
use crate::source::listeners::SubscriptionId;
use crate::source::{
    IconResolver, OrderedQuestTypesProvider, VisibleQuestListener, VisibleQuestsSource,
};
use crate::traits::{Configurable, ViewportAware};
use crate::{QuestPinError, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lifecycle of the cache, driven by explicit calls of the map view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheState {
    Inactive,
    Active,
}

struct Surface {
    layer: Option<Arc<dyn PinLayer>>,
    visible: bool,
}

/// State reachable from background fetches and from the quest source
struct Shared {
    store: PinStore,
    fetched: FetchedTiles,
    surface: Mutex<Surface>,
    order: Mutex<Arc<QuestTypeOrder>>,
    icons: Arc<dyn IconResolver>,
    active: AtomicBool,
}

impl Shared {
    fn surface(&self) -> MutexGuard<'_, Surface> {
        self.surface.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn order(&self) -> Arc<QuestTypeOrder> {
        self.order
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_order(&self, order: QuestTypeOrder) {
        *self.order.lock().unwrap_or_else(PoisonError::into_inner) = Arc::new(order);
    }

    /// Markers of one quest; none if its icon cannot be resolved
    fn markers_of(&self, quest: &Quest, group: QuestGroup, order: &QuestTypeOrder) -> Vec<Marker> {
        let kind = match self.icons.resolve(quest.quest_type.icon()) {
            Ok(kind) => kind,
            Err(e) => {
                log::warn!("skipping {} quest {}: {}", group, quest.id, e);
                return Vec::new();
            }
        };
        let importance = order.importance(quest.type_name(), quest.id);
        Marker::for_quest(quest, group, &kind, importance)
    }

    fn merge_fetched(&self, session: u64, order: &QuestTypeOrder, quests: Vec<QuestAndGroup>) {
        let count = quests.len();
        let entries: Vec<_> = quests
            .iter()
            .map(|q| (q.key(), self.markers_of(&q.quest, q.group, order)))
            .collect();

        if !self.store.merge_in_session(session, entries) {
            log::debug!("dropping {} quests fetched before the pin layer was cleared", count);
            return;
        }
        log::debug!("merged {} fetched quests", count);
        self.render();
    }

    /// Applies changes reported while active. Dropped if the store is cleared
    /// while the markers are being built.
    fn apply_changes(&self, added: &[Quest], removed: &[QuestId], group: QuestGroup) {
        // session first: a deactivation clears the store only after dropping `active`
        let session = self.store.session();
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        let order = self.order();
        let replaced: Vec<_> = added
            .iter()
            .map(|quest| (QuestKey::new(group, quest.id), self.markers_of(quest, group, &order)))
            .collect();
        let removed: Vec<_> = removed.iter().map(|id| QuestKey::new(group, *id)).collect();

        if !self.store.apply_in_session(session, replaced, &removed) {
            log::debug!(
                "dropping {} quest changes of a cleared pin layer",
                added.len() + removed.len()
            );
            return;
        }
        self.render();
    }

    /// Pushes the complete marker set to the layer, or clears it if hidden
    fn render(&self) {
        let surface = self.surface();
        let Some(layer) = surface.layer.as_ref() else {
            return;
        };
        if surface.visible {
            layer.set_features(self.store.markers());
        } else {
            layer.clear();
        }
    }

    fn clear(&self) {
        self.store.clear();
        self.fetched.clear();
        if let Some(layer) = self.surface().layer.as_ref() {
            layer.clear();
        }
    }
}

impl VisibleQuestListener for Shared {
    fn on_updated_visible_quests(&self, added: &[Quest], removed: &[QuestId], group: QuestGroup) {
        self.apply_changes(added, removed, group);
    }
}

/// Keeps the quest pins of the visible map area in memory.
///
/// Call [`activate`](Self::activate) whenever the map view (re)starts,
/// [`on_viewport_changed`](Self::on_viewport_changed) whenever the camera
/// moves and [`deactivate`](Self::deactivate) when the view stops. While
/// active, each tile at `tiles_zoom` is fetched at most once.
pub struct ViewportQuestCache {
    shared: Arc<Shared>,
    quest_types: Arc<dyn OrderedQuestTypesProvider>,
    source: Arc<dyn VisibleQuestsSource>,
    spawner: Arc<dyn AsyncSpawner>,
    config: QuestPinConfig,
    state: CacheState,
    /// last processed rect of tiles
    last_rect: Option<TilesRect>,
    last_view: Option<(f64, LatLngBounds)>,
    subscription: Option<SubscriptionId>,
    pending: Vec<Box<dyn AsyncHandle>>,
}

impl ViewportQuestCache {
    pub fn new(
        quest_types: Arc<dyn OrderedQuestTypesProvider>,
        source: Arc<dyn VisibleQuestsSource>,
        icons: Arc<dyn IconResolver>,
        spawner: Arc<dyn AsyncSpawner>,
        config: QuestPinConfig,
    ) -> Result<Self> {
        config.validate()?;
        let shared = Arc::new(Shared {
            store: PinStore::new(),
            fetched: FetchedTiles::new(),
            surface: Mutex::new(Surface {
                layer: None,
                visible: config.initially_visible,
            }),
            order: Mutex::new(Arc::new(QuestTypeOrder::new(config.importance_range))),
            icons,
            active: AtomicBool::new(false),
        });

        Ok(Self {
            shared,
            quest_types,
            source,
            spawner,
            config,
            state: CacheState::Inactive,
            last_rect: None,
            last_view: None,
            subscription: None,
            pending: Vec::new(),
        })
    }

    pub fn with_layer(self, layer: Arc<dyn PinLayer>) -> Self {
        self.set_layer(Some(layer));
        self
    }

    /// Starts a new session.
    ///
    /// The quest store and the quest type selection may have changed while the
    /// view was away, so everything held in memory is dropped and the last
    /// known viewport is pulled again.
    pub fn activate(&mut self) {
        let types = self.quest_types.get();
        self.shared.set_order(QuestTypeOrder::from_types_with_range(
            &types,
            self.config.importance_range,
        ));
        self.reset();

        self.shared.active.store(true, Ordering::SeqCst);
        if self.subscription.is_none() {
            let listener: Arc<dyn VisibleQuestListener> = self.shared.clone();
            self.subscription = Some(self.source.subscribe(listener));
        }
        self.state = CacheState::Active;
        log::info!("quest pin layer active with {} quest types", types.len());

        if let Some((zoom, area)) = self.last_view.clone() {
            self.on_viewport_changed(zoom, &area);
        }
    }

    /// Drops all pins and cancels outstanding fetches. Calling it again is a no-op.
    pub fn deactivate(&mut self) {
        self.shared.active.store(false, Ordering::SeqCst);
        self.reset();
        if let Some(id) = self.subscription.take() {
            self.source.unsubscribe(id);
        }
        if self.state == CacheState::Active {
            log::info!("quest pin layer inactive");
        }
        self.state = CacheState::Inactive;
    }

    fn reset(&mut self) {
        for handle in self.pending.drain(..) {
            handle.cancel();
        }
        self.shared.clear();
        self.last_rect = None;
    }

    /// The camera moved. `area` is the displayed area at map zoom `zoom`.
    pub fn on_viewport_changed(&mut self, zoom: f64, area: &LatLngBounds) {
        if let Err(e) = self.refresh_view(zoom, area) {
            log::warn!("ignoring displayed area: {}", e);
        }
    }

    fn refresh_view(&mut self, zoom: f64, area: &LatLngBounds) -> Result<()> {
        self.last_view = Some((zoom, area.clone()));
        if self.state != CacheState::Active {
            return Ok(());
        }
        if !zoom.is_finite() || zoom < self.config.min_zoom {
            return Ok(());
        }
        if !area.is_valid() {
            return Err(QuestPinError::InvalidCoordinates(format!("{:?}", area)));
        }

        let rect = TilesRect::enclosing(area, self.config.tiles_zoom);
        if self.last_rect != Some(rect) {
            self.last_rect = Some(rect);
            self.update_quests_in_rect(rect);
        }
        Ok(())
    }

    /// Quests became visible or invisible elsewhere in the app
    pub fn on_quests_changed(&self, added: &[Quest], removed: &[QuestId], group: QuestGroup) {
        self.shared.apply_changes(added, removed, group);
    }

    /// Issues one fetch for the tiles of `rect` not in memory yet. Returns whether it did.
    fn update_quests_in_rect(&mut self, rect: TilesRect) -> bool {
        // area too big -> skip
        if rect.size() > self.config.max_fetch_tiles {
            log::debug!("not fetching {} tiles at once", rect.size());
            return false;
        }
        let tiles = self.shared.fetched.unfetched(&rect);
        let Some(min_rect) = min_tile_rect(&tiles) else {
            return false;
        };

        let bbox = min_rect.to_bounding_box(self.config.tiles_zoom);
        let order = self.shared.order();
        let quest_types = order.type_names().to_vec();
        let session = self.shared.store.session();
        let shared = self.shared.clone();
        let source = self.source.clone();

        log::debug!("fetching quests of {} tiles in {:?}", tiles.len(), min_rect);
        let handle = spawn(self.spawner.as_ref(), async move {
            match source.get_all_visible(&bbox, &quest_types).await {
                Ok(quests) => shared.merge_fetched(session, &order, quests),
                Err(e) => log::warn!("fetching quests in {:?} failed: {}", bbox, e),
            }
        });
        self.pending.retain(|pending| !pending.is_finished());
        self.pending.push(handle);

        self.shared.fetched.mark(&tiles);
        true
    }

    /// Shows or hides the pins without touching what is held in memory
    pub fn set_visible(&self, visible: bool) {
        {
            let mut surface = self.shared.surface();
            if surface.visible == visible {
                return;
            }
            surface.visible = visible;
        }
        self.shared.render();
    }

    pub fn is_visible(&self) -> bool {
        self.shared.surface().visible
    }

    /// Attaches the layer pins are drawn on, or detaches it with `None`
    pub fn set_layer(&self, layer: Option<Arc<dyn PinLayer>>) {
        {
            let mut surface = self.shared.surface();
            let unchanged = match (&surface.layer, &layer) {
                (Some(current), Some(new)) => {
                    Arc::as_ptr(current) as *const () == Arc::as_ptr(new) as *const ()
                }
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                return;
            }
            surface.layer = layer;
        }
        self.shared.render();
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == CacheState::Active
    }

    /// Snapshot of all markers held in memory
    pub fn markers(&self) -> Vec<Marker> {
        self.shared.store.markers()
    }

    pub fn markers_for(&self, key: &QuestKey) -> Option<Vec<Marker>> {
        self.shared.store.markers_for(key)
    }

    /// Number of quests with pins in memory
    pub fn quest_count(&self) -> usize {
        self.shared.store.len()
    }

    pub fn fetched_tile_count(&self) -> usize {
        self.shared.fetched.len()
    }

    pub fn is_tile_fetched(&self, tile: &Tile) -> bool {
        self.shared.fetched.contains(tile)
    }

    pub fn last_rect(&self) -> Option<TilesRect> {
        self.last_rect
    }

    /// Fetches issued in this session that have not completed yet
    pub fn pending_fetches(&self) -> usize {
        self.pending.iter().filter(|h| !h.is_finished()).count()
    }

    /// The quest a tapped pin belongs to, if it is still shown
    pub fn quest_key_for(&self, properties: &HashMap<String, String>) -> Option<QuestKey> {
        let key = QuestKey::from_properties(properties)?;
        self.shared.store.contains(&key).then_some(key)
    }
}

impl ViewportAware for ViewportQuestCache {
    fn on_viewport(&mut self, viewport: &Viewport) -> Result<()> {
        self.refresh_view(viewport.zoom, &viewport.bounds())
    }

    fn requires_viewport_updates(&self) -> bool {
        self.is_active()
    }
}

impl Configurable for ViewportQuestCache {
    type Config = QuestPinConfig;

    fn config(&self) -> &QuestPinConfig {
        &self.config
    }

    /// Takes effect immediately; an active cache starts a new session
    fn set_config(&mut self, config: QuestPinConfig) -> Result<()> {
        Self::validate_config(&config)?;
        self.config = config;
        if self.is_active() {
            self.activate();
        }
        Ok(())
    }

    fn validate_config(config: &QuestPinConfig) -> Result<()> {
        config.validate()
    }
}

impl Drop for ViewportQuestCache {
    fn drop(&mut self) {
        self.deactivate();
        self.set_layer(None);
    }
}
