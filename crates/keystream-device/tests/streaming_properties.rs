//! Integration tests for the streaming pipeline.
//!
//! # Purpose
//!
//! These tests drive `run` / `stream_events` through the public API with the
//! scripted input source and the recording connector, and check the frames
//! a server would have received:
//!
//! - Sequence numbers are exactly 0, 1, 2, … in classification order.
//! - Every frame carries the configured identity.
//! - Auto-repeat transitions produce no frame and consume no number.
//! - A send failure on event N means event N+1 is never attempted.
//! - An input failure after K events leaves exactly K events transmitted.
//! - Connect failures honour the retry policy and end in `ConnectError`.

use std::path::Path;
use std::time::Duration;

use keystream_core::{KeyState, RawInputTransition};
use keystream_device::application::{run, stream_events, DeviceSession, RunSummary};
use keystream_device::domain::{ConnectPolicy, DeviceConfig};
use keystream_device::infrastructure::input_source::ScriptedInputSource;
use keystream_device::infrastructure::network::RecordingConnector;
use keystream_device::StreamError;
use keystream_core::DeviceIdentity;
use serde_json::Value;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn config(device_id: &str) -> DeviceConfig {
    DeviceConfig {
        server_url: "ws://collector.test:4000".to_string(),
        device_id: DeviceIdentity::new(device_id),
        ..Default::default()
    }
}

fn parse(frames: &[String]) -> Vec<Value> {
    frames
        .iter()
        .map(|f| serde_json::from_str(f).expect("frames must be JSON"))
        .collect()
}

fn typing(keys: &[&str]) -> Vec<RawInputTransition> {
    keys.iter()
        .flat_map(|k| {
            [
                RawInputTransition::new(*k, KeyState::Down),
                RawInputTransition::new(*k, KeyState::Hold),
                RawInputTransition::new(*k, KeyState::Up),
            ]
        })
        .collect()
}

// ── Ordering and identity ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_sequence_numbers_are_gapless_and_ordered() {
    // Arrange
    let connector = RecordingConnector::new();
    let keys = ["KEY_H", "KEY_E", "KEY_L", "KEY_L", "KEY_O"];
    let source = ScriptedInputSource::new(typing(&keys)).then_fail();

    // Act
    let result = run(
        &config("dev-A"),
        &connector,
        |_: &Path| Ok(source),
        std::future::pending(),
    )
    .await;

    // Assert
    assert!(matches!(result, Err(StreamError::ReadError(_))));
    let frames = parse(&connector.frames());
    assert_eq!(frames[0]["role"], "device");

    let events = &frames[1..];
    assert_eq!(events.len(), keys.len() * 2, "one down + one up per key");
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event["seq"], i as u64);
        let expected_type = if i % 2 == 0 { "keydown" } else { "keyup" };
        assert_eq!(event["type"], expected_type);
        assert_eq!(event["code"], keys[i / 2]);
        assert!(event["char"].is_null());
    }

    let timestamps: Vec<u64> = events.iter().map(|e| e["ts"].as_u64().unwrap()).collect();
    assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_identity_is_constant_across_all_frames() {
    let connector = RecordingConnector::new();
    let source = ScriptedInputSource::new(typing(&["KEY_1", "KEY_2", "KEY_3"])).then_fail();

    let _ = run(
        &config("kiosk-9"),
        &connector,
        |_: &Path| Ok(source),
        std::future::pending(),
    )
    .await;

    for frame in parse(&connector.frames()) {
        assert_eq!(frame["deviceId"], "kiosk-9");
    }
}

#[tokio::test]
async fn test_press_hold_release_scenario() {
    // Arrange
    let connector = RecordingConnector::new();
    let source = ScriptedInputSource::new(vec![
        RawInputTransition::new("A", KeyState::Down),
        RawInputTransition::new("A", KeyState::Hold),
        RawInputTransition::new("A", KeyState::Up),
    ])
    .then_fail();

    // Act
    let _ = run(
        &config("dev-A"),
        &connector,
        |_: &Path| Ok(source),
        std::future::pending(),
    )
    .await;

    // Assert
    let frames = parse(&connector.frames());
    assert_eq!(frames.len(), 3);
    assert_eq!(
        frames[0],
        serde_json::json!({"role":"device","deviceId":"dev-A"})
    );
    assert_eq!(frames[1]["seq"], 0);
    assert_eq!(frames[1]["type"], "keydown");
    assert_eq!(frames[2]["seq"], 1, "the hold must not consume a number");
    assert_eq!(frames[2]["type"], "keyup");
}

// ── Failure handling ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_send_failure_on_event_n_stops_before_n_plus_one() {
    // Arrange: send index 0 is the handshake, so index 3 is event seq=2
    let connector = RecordingConnector::new().failing_send_at(3);
    let session = DeviceSession::open(&connector, &config("dev-A"))
        .await
        .unwrap();
    let source = ScriptedInputSource::new(typing(&["KEY_A", "KEY_B", "KEY_C", "KEY_D"]));

    // Act
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        stream_events(session, source, 64, std::future::pending()),
    )
    .await
    .expect("run must end after a send failure");

    // Assert
    assert!(matches!(result, Err(StreamError::SendError { what: "event", .. })));
    assert_eq!(connector.send_attempts(), 4, "handshake + seq 0, 1, 2");
    assert_eq!(connector.frames().len(), 3);
    assert!(connector.was_closed());
}

#[tokio::test]
async fn test_input_failure_after_k_events_transmits_exactly_k() {
    // Arrange: K = 6 edges, then the device disappears
    let connector = RecordingConnector::new();
    let source = ScriptedInputSource::new(typing(&["KEY_X", "KEY_Y", "KEY_Z"])).then_fail();

    // Act
    let result = run(
        &config("dev-A"),
        &connector,
        |_: &Path| Ok(source),
        std::future::pending(),
    )
    .await;

    // Assert
    assert!(matches!(result, Err(StreamError::ReadError(_))));
    assert_eq!(connector.frames().len(), 1 + 6);
    assert!(connector.was_closed());
}

#[tokio::test]
async fn test_connect_failure_without_retry_is_fatal() {
    let connector = RecordingConnector::new().failing_connects(1);
    let source = ScriptedInputSource::new(Vec::new());

    let result = run(
        &config("dev-A"),
        &connector,
        |_: &Path| Ok(source),
        std::future::pending(),
    )
    .await;

    assert!(matches!(result, Err(StreamError::ConnectError { .. })));
    assert_eq!(connector.connect_attempts(), 1);
    assert!(connector.frames().is_empty());
}

#[tokio::test]
async fn test_connect_retry_policy_recovers_transient_failures() {
    // Arrange: two refusals, three attempts allowed
    let connector = RecordingConnector::new().failing_connects(2);
    let cfg = DeviceConfig {
        connect_policy: ConnectPolicy {
            attempts: 3,
            backoff: Duration::from_millis(5),
        },
        ..config("dev-A")
    };

    // Act
    let session = DeviceSession::open(&connector, &cfg).await;

    // Assert
    assert!(session.is_ok());
    assert_eq!(connector.connect_attempts(), 3);
    assert_eq!(connector.frames().len(), 1, "handshake sent once");
}

#[tokio::test]
async fn test_connect_retry_policy_gives_up_after_last_attempt() {
    let connector = RecordingConnector::new().failing_connects(10);
    let cfg = DeviceConfig {
        connect_policy: ConnectPolicy {
            attempts: 2,
            backoff: Duration::from_millis(5),
        },
        ..config("dev-A")
    };

    let result = DeviceSession::open(&connector, &cfg).await;

    assert!(matches!(result, Err(StreamError::ConnectError { .. })));
    assert_eq!(connector.connect_attempts(), 2);
}

#[tokio::test]
async fn test_clean_shutdown_reports_events_sent() {
    let connector = RecordingConnector::new();
    let source = ScriptedInputSource::new(typing(&["KEY_A"]));

    let summary = run(
        &config("dev-A"),
        &connector,
        |_: &Path| Ok(source),
        tokio::time::sleep(Duration::from_millis(200)),
    )
    .await
    .expect("shutdown is not an error");

    assert_eq!(summary, RunSummary { events_sent: 2 });
    assert!(connector.was_closed());
}
