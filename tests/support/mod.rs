#![allow(dead_code)]

use async_trait::async_trait;
use questpin::runtime::{AsyncHandle, AsyncSpawner, BoxedTask};
use questpin::{
    IconRef, LatLng, LatLngBounds, MemoryPinLayer, MemoryQuestSource, NamedQuestType, Quest,
    QuestAndGroup, QuestId, QuestPinConfig, QuestPinError, QuestType, StaticIconResolver,
    StaticQuestTypesProvider, SubscriptionId, Tile, TilesRect, ViewportQuestCache,
    VisibleQuestListener, VisibleQuestsSource,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// The Brandenburg Gate is in this zoom 14 tile
pub const X: u32 = 8800;
pub const Y: u32 = 5373;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn road() -> Arc<dyn QuestType> {
    NamedQuestType::shared("AddRoadName", IconRef(1))
}

pub fn housenumber() -> Arc<dyn QuestType> {
    NamedQuestType::shared("AddHousenumber", IconRef(2))
}

pub fn note() -> Arc<dyn QuestType> {
    NamedQuestType::shared("OsmNoteQuest", IconRef(3))
}

pub fn icons() -> StaticIconResolver {
    StaticIconResolver::new()
        .with(IconRef(1), "ic_quest_street")
        .with(IconRef(2), "ic_quest_housenumber")
        .with(IconRef(3), "ic_quest_notes")
}

/// Displayed area covering exactly the given zoom 14 tiles
pub fn area(left: u32, top: u32, right: u32, bottom: u32) -> LatLngBounds {
    TilesRect::new(left, top, right, bottom).to_bounding_box(14)
}

pub fn center_of(x: u32, y: u32) -> LatLng {
    TilesRect::of_tile(Tile::new(x, y)).to_bounding_box(14).center()
}

pub fn quest(id: QuestId, quest_type: Arc<dyn QuestType>, x: u32, y: u32) -> Quest {
    Quest::new(id, quest_type, vec![center_of(x, y)])
}

/// Memory source that records every query and can be told to fail
#[derive(Default)]
pub struct CountingSource {
    pub inner: MemoryQuestSource,
    queries: Mutex<Vec<LatLngBounds>>,
    failing: AtomicBool,
}

impl CountingSource {
    pub fn queries(&self) -> Vec<LatLngBounds> {
        self.queries.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl VisibleQuestsSource for CountingSource {
    async fn get_all_visible(
        &self,
        bbox: &LatLngBounds,
        quest_types: &[String],
    ) -> questpin::Result<Vec<QuestAndGroup>> {
        self.queries.lock().unwrap().push(bbox.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(QuestPinError::Source("database is locked".to_string()));
        }
        self.inner.get_all_visible(bbox, quest_types).await
    }

    fn subscribe(&self, listener: Arc<dyn VisibleQuestListener>) -> SubscriptionId {
        self.inner.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.unsubscribe(id)
    }
}

/// Queues tasks and runs them even if they were cancelled in the meantime,
/// like a store query that is already past the point of no return
#[derive(Default)]
pub struct StubbornSpawner {
    queue: Mutex<Vec<BoxedTask>>,
}

impl StubbornSpawner {
    pub fn run_all(&self) -> usize {
        let tasks = std::mem::take(&mut *self.queue.lock().unwrap());
        let count = tasks.len();
        for task in tasks {
            futures::executor::block_on(task);
        }
        count
    }
}

struct NeverFinished;

impl AsyncHandle for NeverFinished {
    fn is_finished(&self) -> bool {
        false
    }

    fn cancel(&self) {}
}

impl AsyncSpawner for StubbornSpawner {
    fn spawn_boxed(&self, future: BoxedTask) -> Box<dyn AsyncHandle> {
        self.queue.lock().unwrap().push(future);
        Box::new(NeverFinished)
    }
}

pub struct Fixture {
    pub source: Arc<CountingSource>,
    pub layer: Arc<MemoryPinLayer>,
    pub types: Arc<StaticQuestTypesProvider>,
    pub cache: ViewportQuestCache,
}

pub fn fixture(spawner: Arc<dyn AsyncSpawner>) -> Fixture {
    fixture_with(spawner, QuestPinConfig::default())
}

pub fn fixture_with(spawner: Arc<dyn AsyncSpawner>, config: QuestPinConfig) -> Fixture {
    init();
    let source = Arc::new(CountingSource::default());
    let layer = Arc::new(MemoryPinLayer::new());
    let types = Arc::new(StaticQuestTypesProvider::new(vec![road(), housenumber(), note()]));
    let cache = ViewportQuestCache::new(
        types.clone(),
        source.clone(),
        Arc::new(icons()),
        spawner,
        config,
    )
    .unwrap()
    .with_layer(layer.clone());

    Fixture {
        source,
        layer,
        types,
        cache,
    }
}
