//! Cart reconciliation against a scripted backend.

mod common;

use common::{FakeBackend, product, shoe};
use shopchat::cart::{CartSyncEngine, Phase, RefreshOutcome};
use shopchat::conversation::ConversationStore;
use shopchat::core::error::ShopError;
use shopchat::models::Message;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn engine_for(backend: &Arc<FakeBackend>) -> CartSyncEngine {
    CartSyncEngine::new(backend.clone(), None)
}

#[tokio::test]
async fn test_out_of_order_refreshes_keep_the_newest_snapshot() {
    let backend = Arc::new(FakeBackend::default());
    let engine = engine_for(&backend);

    let gate1 = backend.hold_next_fetch();
    let gate2 = backend.hold_next_fetch();

    let r1 = tokio::spawn(engine.refresh());
    backend.wait_for_fetches(1).await;
    let r2 = tokio::spawn(engine.refresh());
    backend.wait_for_fetches(2).await;
    assert_eq!(engine.phase(), Phase::Refreshing);

    let newer = vec![product("b", "Belt", 25.0)];
    let older = vec![product("a", "Scarf", 15.0), product("c", "Cap", 12.0)];

    gate2.send(Ok(newer.clone())).unwrap();
    assert_eq!(r2.await.unwrap(), RefreshOutcome::Applied);

    gate1.send(Ok(older)).unwrap();
    assert_eq!(r1.await.unwrap(), RefreshOutcome::Stale);

    assert_eq!(engine.snapshot(), newer);
    assert_eq!(engine.displayed_count(), 1);
    assert_eq!(engine.phase(), Phase::Idle);
}

#[tokio::test]
async fn test_add_item_bumps_count_synchronously() {
    let backend = Arc::new(FakeBackend::with_catalog(vec![shoe()]));
    let engine = engine_for(&backend);

    let before = engine.displayed_count();
    let gate = backend.hold_next_fetch();
    let handle = engine.add_item(&shoe()).unwrap();
    assert_eq!(engine.displayed_count(), before + 1);
    assert!(engine.view().optimistic_pending);

    gate.send(Ok(vec![shoe()])).unwrap();
    handle.await.unwrap().unwrap();
    assert_eq!(engine.snapshot(), vec![shoe()]);
    assert!(!engine.view().optimistic_pending);
}

#[tokio::test]
async fn test_unrelated_refresh_does_not_settle_pending_add() {
    let backend = Arc::new(FakeBackend::with_catalog(vec![shoe()]));
    let engine = engine_for(&backend);

    let post = backend.hold_next_add();
    let handle = engine.add_item(&shoe()).unwrap();

    // A poll lands while the add's POST is still outstanding.
    assert_eq!(engine.refresh().await, RefreshOutcome::Applied);
    let view = engine.view();
    assert!(view.optimistic_pending);
    assert_eq!(view.displayed_count, 0);

    post.send(()).unwrap();
    handle.await.unwrap().unwrap();
    let view = engine.view();
    assert!(!view.optimistic_pending);
    assert_eq!(view.displayed_count, 1);
    assert_eq!(engine.snapshot(), vec![shoe()]);
}

#[tokio::test]
async fn test_failed_add_settles_the_overlay() {
    let backend = Arc::new(FakeBackend::with_catalog(vec![shoe()]));
    backend.fail_add.store(true, Ordering::SeqCst);
    let engine = engine_for(&backend);

    let handle = engine.add_item(&shoe()).unwrap();
    assert!(engine.view().optimistic_pending);
    assert!(handle.await.unwrap().is_err());
    assert!(!engine.view().optimistic_pending);
    assert_eq!(engine.displayed_count(), 1);
}

#[tokio::test]
async fn test_failed_add_is_reported_without_rollback() {
    let backend = Arc::new(FakeBackend::with_catalog(vec![shoe()]));
    backend.fail_add.store(true, Ordering::SeqCst);
    let engine = engine_for(&backend);

    let handle = engine.add_item(&shoe()).unwrap();
    assert_eq!(engine.displayed_count(), 1);

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(ShopError::Api { status: 500, .. })));
    assert_eq!(engine.displayed_count(), 1);
    assert!(engine.snapshot().is_empty());
    assert_eq!(backend.fetches(), 0);
}

#[tokio::test]
async fn test_add_item_without_id_is_rejected() {
    let backend = Arc::new(FakeBackend::default());
    let engine = engine_for(&backend);

    let mut nameless = shoe();
    nameless.id = "  ".to_string();
    assert!(matches!(
        engine.add_item(&nameless),
        Err(ShopError::Input(_))
    ));
    assert_eq!(engine.displayed_count(), 0);
}

#[tokio::test]
async fn test_failed_remove_still_refreshes() {
    let backend = Arc::new(FakeBackend::default());
    backend.set_cart(vec![shoe()]);
    let engine = engine_for(&backend);
    engine.refresh().await;
    assert_eq!(engine.displayed_count(), 1);

    backend.fail_remove.store(true, Ordering::SeqCst);
    let fetches_before = backend.fetches();
    let result = engine.remove_item("shoe").await.unwrap();

    assert!(result.is_err());
    assert_eq!(backend.fetches(), fetches_before + 1);
    assert_eq!(engine.snapshot(), vec![shoe()]);
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let backend = Arc::new(FakeBackend::default());
    backend.set_cart(vec![shoe()]);
    let engine = engine_for(&backend);
    assert_eq!(engine.refresh().await, RefreshOutcome::Applied);

    backend.fail_fetch.store(true, Ordering::SeqCst);
    assert_eq!(engine.refresh().await, RefreshOutcome::Failed);
    assert_eq!(engine.snapshot(), vec![shoe()]);
    assert_eq!(engine.displayed_count(), 1);
}

#[tokio::test]
async fn test_checkout_clears_synchronously_even_if_reset_fails() {
    let backend = Arc::new(FakeBackend::default());
    backend.set_cart(vec![shoe(), product("hat", "Hat", 20.0)]);
    backend.fail_reset.store(true, Ordering::SeqCst);
    let engine = engine_for(&backend);
    engine.refresh().await;

    let mut conversation = ConversationStore::new();
    conversation.append(Message::user("I need shoes"));

    let epoch = engine.checkout(&mut conversation);
    assert_eq!(epoch, 1);
    assert!(engine.snapshot().is_empty());
    assert_eq!(engine.displayed_count(), 0);
    assert_eq!(conversation.len(), 1);
    assert!(conversation.history().is_empty());

    while backend.resets() == 0 {
        tokio::task::yield_now().await;
    }
    assert_eq!(engine.displayed_count(), 0);
}

#[tokio::test]
async fn test_refresh_from_previous_epoch_is_discarded() {
    let backend = Arc::new(FakeBackend::default());
    let engine = engine_for(&backend);
    assert_eq!(engine.epoch(), 0);

    let gate = backend.hold_next_fetch();
    let stale = tokio::spawn(engine.refresh());
    backend.wait_for_fetches(1).await;

    let mut conversation = ConversationStore::new();
    engine.checkout(&mut conversation);
    assert_eq!(engine.epoch(), 1);

    gate.send(Ok(vec![shoe()])).unwrap();
    assert_eq!(stale.await.unwrap(), RefreshOutcome::Stale);
    assert!(engine.snapshot().is_empty());
    assert_eq!(engine.displayed_count(), 0);
}

#[tokio::test]
async fn test_add_then_remove_converges_to_server_truth() {
    let backend = Arc::new(FakeBackend::with_catalog(vec![shoe()]));
    let engine = engine_for(&backend);
    assert_eq!(engine.displayed_count(), 0);

    let added = engine.add_item(&shoe()).unwrap();
    assert_eq!(engine.displayed_count(), 1);
    added.await.unwrap().unwrap();
    assert_eq!(engine.snapshot(), vec![shoe()]);
    assert_eq!(engine.displayed_count(), 1);

    let gate = backend.hold_next_fetch();
    let removed = engine.remove_item("shoe");
    assert_eq!(engine.displayed_count(), 1);

    backend.wait_for_fetches(2).await;
    assert!(backend.cart().is_empty());
    assert_eq!(engine.displayed_count(), 1);

    gate.send(Ok(backend.cart())).unwrap();
    removed.await.unwrap().unwrap();
    assert!(engine.snapshot().is_empty());
    assert_eq!(engine.displayed_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_poller_refreshes_on_interval_and_stops_on_drop() {
    let backend = Arc::new(FakeBackend::default());
    backend.set_cart(vec![shoe()]);
    let engine = CartSyncEngine::new(backend.clone(), Some(Duration::from_secs(2)));
    assert!(engine.is_polling());
    assert_eq!(engine.displayed_count(), 0);

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(engine.displayed_count(), 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(backend.fetches(), 2);

    drop(engine);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(backend.fetches(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_scheduled_refresh_waits_for_delay() {
    let backend = Arc::new(FakeBackend::default());
    backend.set_cart(vec![shoe()]);
    let engine = engine_for(&backend);

    let handle = engine.schedule_refresh(Duration::from_millis(100));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(backend.fetches(), 0);

    assert_eq!(handle.await.unwrap(), RefreshOutcome::Applied);
    assert_eq!(engine.displayed_count(), 1);
}
