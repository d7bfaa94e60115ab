//! End-to-end tests for the tracing layer: real `tracing` macros and
//! nested spans flowing through [`ShipperLayer`] to a loopback UDP
//! collector. Subscribers are scoped with `with_default` so tests never
//! fight over the global default.

use std::net::UdpSocket;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;
use uuid::Uuid;

use tracing_log_shipper::config::ServiceIdentity;
use tracing_log_shipper::layer::ShipperLayer;
use tracing_log_shipper::sender::LogSender;

fn collector() -> (UdpSocket, String) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let url = format!("udp://{}", socket.local_addr().unwrap());
    (socket, url)
}

fn recv_json(socket: &UdpSocket) -> serde_json::Value {
    let mut buf = [0u8; 4096];
    let n = socket.recv(&mut buf).unwrap();
    serde_json::from_slice(&buf[..n]).unwrap()
}

fn identity() -> ServiceIdentity {
    ServiceIdentity {
        service_uuid: Uuid::new_v4(),
        service_name: "user-service".to_string(),
        service_type: "api".to_string(),
        node_id: "node-7".to_string(),
    }
}

async fn shipping_sender(url: &str) -> Arc<LogSender> {
    let sender = Arc::new(LogSender::new(url, identity()).unwrap());
    sender.start_async().await.unwrap();
    sender
}

#[tokio::test]
async fn events_carry_the_full_wire_shape() {
    let (socket, url) = collector();
    let sender = shipping_sender(&url).await;
    let subscriber = Registry::default().with(ShipperLayer::new(sender, Level::INFO));

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("plain event");
    });

    let doc = recv_json(&socket);
    let expected = [
        "name", "msg", "args", "levelname", "levelno", "pathname", "filename",
        "module", "lineno", "funcName", "created", "msecs", "relativeCreated",
        "thread", "threadName", "processName", "process", "stack_info",
        "exc_info", "exc_text", "chain", "service_uuid", "service_name",
        "service_type", "node_id",
    ];
    let obj = doc.as_object().unwrap();
    for key in expected {
        assert!(obj.contains_key(key), "missing wire key {key}");
    }
    assert_eq!(doc["msg"], "plain event");
    assert_eq!(doc["args"], serde_json::json!([]));
    assert!(doc["exc_info"].is_null());
    assert!(doc["stack_info"].is_null());
    assert_eq!(doc["levelname"], "INFO");
    assert_eq!(doc["levelno"], 20);
    assert_eq!(doc["service_name"], "user-service");
    assert_eq!(doc["service_type"], "api");
    assert_eq!(doc["node_id"], "node-7");
}

#[tokio::test]
async fn nested_spans_become_a_chain_prefix() {
    let (socket, url) = collector();
    let sender = shipping_sender(&url).await;
    let subscriber = Registry::default().with(ShipperLayer::new(sender, Level::INFO));

    tracing::subscriber::with_default(subscriber, || {
        let outer = tracing::info_span!("handle_request");
        let _outer = outer.enter();
        let inner = tracing::info_span!("load_profile");
        let _inner = inner.enter();
        tracing::info!("profile loaded");
    });

    let doc = recv_json(&socket);
    assert_eq!(doc["msg"], "[handle_request:load_profile] profile loaded");
    assert_eq!(
        doc["chain"],
        serde_json::json!(["handle_request", "load_profile"])
    );
    assert_eq!(doc["funcName"], "load_profile");
}

#[tokio::test]
async fn events_outside_spans_have_no_chain() {
    let (socket, url) = collector();
    let sender = shipping_sender(&url).await;
    let subscriber = Registry::default().with(ShipperLayer::new(sender, Level::INFO));

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("no scope");
    });

    let doc = recv_json(&socket);
    assert_eq!(doc["msg"], "no scope");
    assert!(doc["chain"].is_null());
    assert!(doc["funcName"].is_null());
}

#[tokio::test]
async fn levels_map_to_collector_names_and_numbers() {
    let (socket, url) = collector();
    let sender = shipping_sender(&url).await;
    let subscriber = Registry::default().with(ShipperLayer::new(sender, Level::TRACE));

    tracing::subscriber::with_default(subscriber, || {
        tracing::error!("e");
        tracing::warn!("w");
        tracing::debug!("d");
        tracing::trace!("t");
    });

    for (levelname, levelno, msg) in [
        ("ERROR", 40, "e"),
        ("WARNING", 30, "w"),
        ("DEBUG", 10, "d"),
        ("TRACE", 5, "t"),
    ] {
        let doc = recv_json(&socket);
        assert_eq!(doc["levelname"], levelname);
        assert_eq!(doc["levelno"], levelno);
        assert_eq!(doc["msg"], msg);
    }
}

#[tokio::test]
async fn events_below_the_minimum_level_are_filtered() {
    let (socket, url) = collector();
    let sender = shipping_sender(&url).await;
    let layer = ShipperLayer::new(sender, Level::ERROR);
    let total = Arc::clone(&layer.total_events);
    let shipped = Arc::clone(&layer.shipped_events);
    let subscriber = Registry::default().with(layer);

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("too quiet");
        tracing::error!("loud enough");
    });

    let doc = recv_json(&socket);
    assert_eq!(doc["msg"], "loud enough");
    assert_eq!(total.load(std::sync::atomic::Ordering::Relaxed), 2);
    assert_eq!(shipped.load(std::sync::atomic::Ordering::Relaxed), 1);

    let mut buf = [0u8; 64];
    assert!(socket.recv(&mut buf).is_err());
}

#[tokio::test]
async fn structured_fields_fold_into_the_message() {
    let (socket, url) = collector();
    let sender = shipping_sender(&url).await;
    let subscriber = Registry::default().with(ShipperLayer::new(sender, Level::INFO));

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(user_id = 42, retries = 3, "request finished");
    });

    let doc = recv_json(&socket);
    let msg = doc["msg"].as_str().unwrap();
    assert!(msg.starts_with("request finished"), "msg was {msg:?}");
    assert!(msg.contains("user_id=42"));
    assert!(msg.contains("retries=3"));
}
