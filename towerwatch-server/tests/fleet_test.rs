use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;
use towerwatch_api::{LogKind, ObserverMessage};
use towerwatch_server::configs::Fleet;

use crate::common::mock_app::MockApp;

mod common;

fn cleared_logs(logs: &[towerwatch_api::LogEntry]) -> usize {
    logs.iter()
        .filter(|entry| entry.msg.starts_with("CALL BUTTON cleared"))
        .count()
}

#[tokio::test(start_paused = true)]
async fn test_demo_call_clears_after_delay() {
    let app = MockApp::new();

    app.fleet.demo_call(Some("GOLD COAST GC1006".into())).await.unwrap();
    assert_eq!(app.fleet.snapshot().await.unwrap().stats.alarms, 1);

    tokio::time::sleep(Duration::from_millis(14_000)).await;
    assert_eq!(app.fleet.snapshot().await.unwrap().stats.alarms, 1);

    tokio::time::sleep(Duration::from_millis(2_000)).await;
    let snapshot = app.fleet.snapshot().await.unwrap();
    assert_eq!(snapshot.stats.alarms, 0);
    assert_eq!(cleared_logs(&snapshot.logs), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stale_clear_is_ignored() {
    let app = MockApp::new();

    app.fleet.demo_call(Some("GOLD COAST GC1006".into())).await.unwrap();
    app.fleet
        .telemetry(
            "tower/GOLD COAST GC1006/event/call".into(),
            br#"{"input":0,"state":0}"#.to_vec(),
        )
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(16_000)).await;
    let snapshot = app.fleet.snapshot().await.unwrap();
    assert_eq!(snapshot.stats.alarms, 0);
    assert_eq!(cleared_logs(&snapshot.logs), 0);
}

#[tokio::test(start_paused = true)]
async fn test_led_expires_on_sweep() {
    let app = MockApp::with_fleet(Fleet {
        sweep_interval_ms: 500,
        ..Fleet::default()
    });
    let request = serde_json::from_value(serde_json::json!({ "mode": "preset", "preset": "flags", "durationSec": 2 })).unwrap();

    app.fleet.apply_led("PR1001".into(), request).await.unwrap();
    let mut observer = app.fleet.subscribe().await.unwrap();

    tokio::time::sleep(Duration::from_millis(3_500)).await;

    let snapshot = app.fleet.snapshot().await.unwrap();
    assert_eq!(snapshot.towers[0].led.preset, "");

    let mut updates = 0;
    loop {
        match observer.receiver.try_recv() {
            Ok(ObserverMessage::TowerUpdate { tower }) => {
                assert_eq!(tower.id, "PERTH PR1001");
                updates += 1;
            }
            Ok(_) | Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    assert_eq!(updates, 1);
}

#[tokio::test]
async fn test_observer_receives_init_then_updates() {
    let app = MockApp::new();

    let mut observer = app.fleet.subscribe().await.unwrap();
    match &observer.init {
        ObserverMessage::Init { data } => assert_eq!(data.towers.len(), common::mock_app::TOWERS),
        other => panic!("unexpected init message {other:?}"),
    }

    app.fleet
        .telemetry(
            "tower/BRISBANE%20BN1005/event/status".into(),
            br#"{"online":false,"signal":2}"#.to_vec(),
        )
        .await
        .unwrap();

    match observer.receiver.recv().await.unwrap() {
        ObserverMessage::Log { entry } => {
            assert_eq!(entry.kind, LogKind::Mqtt);
            assert_eq!(entry.msg, "Status update BRISBANE BN1005 online=false signal=2");
        }
        other => panic!("unexpected message {other:?}"),
    }
    match observer.receiver.recv().await.unwrap() {
        ObserverMessage::TowerUpdate { tower } => assert!(!tower.online),
        other => panic!("unexpected message {other:?}"),
    }
    match observer.receiver.recv().await.unwrap() {
        ObserverMessage::Stats { stats } => assert_eq!(stats.offline, 1),
        other => panic!("unexpected message {other:?}"),
    }
}

#[tokio::test]
async fn test_bad_payload_is_logged() {
    let app = MockApp::new();

    app.fleet
        .telemetry("tower/PERTH PR1001/event/io".into(), b"[1,2,3]".to_vec())
        .await
        .unwrap();

    let snapshot = app.fleet.snapshot().await.unwrap();
    let last = snapshot.logs.last().unwrap();
    assert_eq!(last.kind, LogKind::Error);
    assert!(last.msg.starts_with("Bad payload on tower/PERTH PR1001/event/io"));
}
