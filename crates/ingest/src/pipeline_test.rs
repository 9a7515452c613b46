//! Tests for the update pipeline

use super::*;
use std::time::Duration;

use lotd_store::Lot;

fn test_store(capacity: u32, occupied: u32) -> Arc<LotStore> {
    Arc::new(LotStore::new(
        vec![Lot::new("LOT-A", capacity, occupied)],
        Duration::from_secs(300),
    ))
}

/// Poll the store until the expected free count appears or time runs out
async fn wait_for_free(store: &LotStore, expected: u32) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if store.snapshot("LOT-A").unwrap().free == expected {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "free count never reached {expected}"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn test_update_applied_by_worker() {
    let store = test_store(10, 0);
    let cancel = CancellationToken::new();
    let pipeline = UpdatePipeline::start(Arc::clone(&store), 3, 16, cancel.clone());

    pipeline
        .sender()
        .send(SensorUpdate {
            lot_id: "LOT-A".into(),
            delta: 4,
        })
        .await
        .unwrap();

    wait_for_free(&store, 6).await;

    cancel.cancel();
    pipeline.join().await;
}

#[tokio::test]
async fn test_unknown_lot_is_swallowed() {
    let store = test_store(10, 0);
    let cancel = CancellationToken::new();
    let pipeline = UpdatePipeline::start(Arc::clone(&store), 1, 16, cancel.clone());

    let sender = pipeline.sender();
    sender
        .send(SensorUpdate {
            lot_id: "LOT-X".into(),
            delta: 5,
        })
        .await
        .unwrap();
    sender
        .send(SensorUpdate {
            lot_id: "LOT-A".into(),
            delta: 1,
        })
        .await
        .unwrap();

    // The unknown-lot update did not kill the worker
    wait_for_free(&store, 9).await;

    cancel.cancel();
    pipeline.join().await;
}

#[tokio::test]
async fn test_burst_of_updates_all_land() {
    let store = test_store(100, 0);
    let cancel = CancellationToken::new();
    let pipeline = UpdatePipeline::start(Arc::clone(&store), 3, 8, cancel.clone());

    let sender = pipeline.sender();
    for _ in 0..50 {
        sender
            .send(SensorUpdate {
                lot_id: "LOT-A".into(),
                delta: 1,
            })
            .await
            .unwrap();
    }

    wait_for_free(&store, 50).await;

    cancel.cancel();
    pipeline.join().await;
}

#[tokio::test]
async fn test_workers_stop_on_cancel() {
    let store = test_store(10, 0);
    let cancel = CancellationToken::new();
    let pipeline = UpdatePipeline::start(store, 2, 16, cancel.clone());

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), pipeline.join())
        .await
        .expect("workers did not stop after cancellation");
}

#[test]
fn test_worker_count_clamped() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        let store = test_store(10, 0);
        let cancel = CancellationToken::new();
        let pipeline = UpdatePipeline::start(store, 0, 0, cancel.clone());
        assert_eq!(pipeline.worker_count(), 1);
        cancel.cancel();
        pipeline.join().await;
    });
}
