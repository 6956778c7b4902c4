//! Queue-draining tests: several concurrent producers, one router.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Call, RecordingDevice};
use midi2joy_core::{
    event_channel, parse_rules, run_router, EventRouter, InputEvent, MappingTable, RouterStats,
};

fn started_router(rules: &[&str]) -> EventRouter<RecordingDevice> {
    let rules = parse_rules(rules.iter().copied()).unwrap();
    let table = Arc::new(MappingTable::from_rules(&rules).unwrap());
    let mut router = EventRouter::new(table, RecordingDevice::new());
    router.start().unwrap();
    router
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_producers_are_all_routed() {
    let mut router = started_router(&["0,0-99,1,1", "1,0,2,x"]);
    let (tx, mut rx) = event_channel();

    // One producer per simulated input port, each on its own thread
    let producers: Vec<_> = (0..4)
        .map(|port| {
            let tx = tx.clone();
            std::thread::spawn(move || {
                for identifier in 0..25 {
                    let event = InputEvent::new(0, port * 25 + identifier, 127);
                    tx.send(event).unwrap();
                }
            })
        })
        .collect();
    drop(tx);
    for producer in producers {
        producer.join().unwrap();
    }

    let stats = run_router(&mut router, &mut rx, std::future::pending()).await;

    assert_eq!(
        stats,
        RouterStats {
            routed: 100,
            ..RouterStats::default()
        }
    );
    let mut buttons: Vec<u32> = router
        .device()
        .writes()
        .into_iter()
        .map(|call| match call {
            Call::SetButton(1, button, true) => button,
            other => panic!("unexpected call {other:?}"),
        })
        .collect();
    buttons.sort_unstable();
    assert_eq!(buttons, (1..=100).collect::<Vec<u32>>());
}

#[tokio::test]
async fn per_source_order_is_preserved() {
    let mut router = started_router(&["1,0,2,x"]);
    let (tx, mut rx) = event_channel();

    for value in [0, 127, 64, 1] {
        tx.send(InputEvent::new(1, 0, value)).unwrap();
    }
    drop(tx);

    run_router(&mut router, &mut rx, std::future::pending()).await;

    let values: Vec<i32> = router
        .device()
        .writes()
        .into_iter()
        .map(|call| match call {
            Call::SetAxis(2, _, value) => value,
            other => panic!("unexpected call {other:?}"),
        })
        .collect();
    assert_eq!(values, vec![0, 32767, 16513, 258]);
}

#[tokio::test]
async fn stats_count_every_outcome() {
    let mut router = started_router(&["0,14,1,x"]);
    let (tx, mut rx) = event_channel();

    tx.send(InputEvent::new(0, 14, 127)).unwrap();
    tx.send(InputEvent::new(0, 15, 127)).unwrap();
    tx.send(InputEvent::new(0, 14, 300)).unwrap();
    drop(tx);

    let stats = run_router(&mut router, &mut rx, std::future::pending()).await;

    assert_eq!(stats.routed, 1);
    assert_eq!(stats.ignored, 1);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.total(), 3);
}

#[tokio::test]
async fn shutdown_stops_draining() {
    let mut router = started_router(&["0,14,1,x"]);
    let (tx, mut rx) = event_channel();

    let stats = run_router(
        &mut router,
        &mut rx,
        tokio::time::sleep(Duration::from_millis(20)),
    )
    .await;

    assert_eq!(stats.total(), 0);
    // The sender is still alive; only the shutdown signal ended the loop
    assert!(!tx.is_closed());
}
