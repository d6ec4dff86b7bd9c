//! The cache running its fetches on a Tokio runtime
#![cfg(feature = "tokio-runtime")]

mod support;

use questpin::runtime::spawners::tokio_impl::TokioSpawner;
use questpin::QuestGroup;
use std::sync::Arc;
use std::time::Duration;
use support::*;

async fn settle(f: &Fixture) {
    for _ in 0..100 {
        if f.cache.pending_fetches() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("fetches did not complete");
}

#[tokio::test]
async fn test_background_fetch_fills_the_layer() {
    let mut f = fixture(Arc::new(TokioSpawner::current().unwrap()));
    f.source.inner.add_quests(
        vec![quest(1, road(), X, Y), quest(2, housenumber(), X + 1, Y)],
        QuestGroup::Osm,
    );
    f.cache.activate();

    f.cache.on_viewport_changed(15.0, &area(X, Y, X + 1, Y));
    // tiles are taken before the query has answered
    assert_eq!(f.cache.fetched_tile_count(), 2);

    settle(&f).await;
    assert_eq!(f.source.query_count(), 1);
    assert_eq!(f.cache.quest_count(), 2);
    assert_eq!(f.layer.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pans_while_fetching() {
    let mut f = fixture(Arc::new(TokioSpawner::current().unwrap()));
    for x in 0..6 {
        f.source
            .inner
            .add_quests(vec![quest(x as i64, road(), X + x, Y)], QuestGroup::Osm);
    }
    f.cache.activate();

    for x in 0..5 {
        f.cache.on_viewport_changed(15.0, &area(X + x, Y, X + x + 1, Y));
    }
    settle(&f).await;

    assert_eq!(f.source.query_count(), 5);
    assert_eq!(f.cache.fetched_tile_count(), 6);
    assert_eq!(f.cache.quest_count(), 6);
}

#[tokio::test]
async fn test_deactivate_aborts_background_fetch() {
    let mut f = fixture(Arc::new(TokioSpawner::current().unwrap()));
    f.source.inner.add_quests(vec![quest(1, road(), X, Y)], QuestGroup::Osm);
    f.cache.activate();
    f.cache.on_viewport_changed(15.0, &area(X, Y, X, Y));

    // current-thread runtime: the task has not been polled yet
    f.cache.deactivate();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(f.cache.markers().is_empty());
    assert!(f.layer.is_empty());
    assert_eq!(f.source.query_count(), 0);
}
