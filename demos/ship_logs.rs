//! Full wiring demo: sender from the environment, global tracing
//! subscriber, instrumented spans, lifecycle hooks.

use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{info, info_span, warn};
use uuid::Uuid;

use tracing_log_shipper::component::ServiceComponent;
use tracing_log_shipper::env::LOG_SHIPPER_URL_ENV;
use tracing_log_shipper::init::{identity_from_env, init_tracing, sender_from_env};

fn spawn_collector() {
    let socket = std::net::UdpSocket::bind("127.0.0.1:9999").expect("bind collector");
    std::thread::spawn(move || {
        let mut buf = [0u8; 4096];
        while let Ok(n) = socket.recv(&mut buf) {
            if let Ok(doc) = serde_json::from_slice::<serde_json::Value>(&buf[..n]) {
                println!("collector got: {} {}", doc["levelname"], doc["msg"]);
            }
        }
    });
}

#[tokio::main]
async fn main() {
    // Local collector on the default destination, unless the env points
    // elsewhere.
    if std::env::var(LOG_SHIPPER_URL_ENV).is_err() {
        spawn_collector();
    }

    let identity = identity_from_env(Uuid::new_v4());
    let sender = sender_from_env(identity).expect("build sender from env");
    init_tracing(Arc::clone(&sender));

    // Events fired before init are buffered, not lost.
    info!("service starting");

    sender.on_async_init().await.expect("async init");

    {
        let span = info_span!("handle_order");
        let _guard = span.enter();
        info!(order_id = 1234, "order accepted");
        warn!(order_id = 1234, "inventory low");
    }

    sender.on_async_cleanup().await.expect("async cleanup");
    info!("service stopping");

    sleep(Duration::from_millis(300)).await;
}
