//! Raw `LogSender` lifecycle walk-through against a local printing
//! collector: emit before init, start, sync fallback, emit after, close.

use std::sync::Arc;
use tokio::time::{sleep, Duration};
use uuid::Uuid;

use tracing_log_shipper::config::ServiceIdentity;
use tracing_log_shipper::record::LogRecord;
use tracing_log_shipper::sender::LogSender;

fn spawn_collector() -> String {
    let socket = std::net::UdpSocket::bind("127.0.0.1:0").expect("bind collector");
    let url = format!("udp://{}", socket.local_addr().expect("local addr"));
    std::thread::spawn(move || {
        let mut buf = [0u8; 4096];
        while let Ok(n) = socket.recv(&mut buf) {
            match serde_json::from_slice::<serde_json::Value>(&buf[..n]) {
                Ok(doc) => println!("collector got: {} {}", doc["levelname"], doc["msg"]),
                Err(_) => println!("collector got {} undecodable bytes", n),
            }
        }
    });
    url
}

#[tokio::main]
async fn main() {
    let url = spawn_collector();

    let identity = ServiceIdentity {
        service_uuid: Uuid::new_v4(),
        service_name: "demo".to_string(),
        service_type: "example".to_string(),
        node_id: "local".to_string(),
    };
    let sender = Arc::new(LogSender::new(&url, identity).expect("parse log url"));

    // Emitted before any channel exists; buffered until start_async.
    sender
        .emit(&LogRecord::new("demo", "INFO", 20, "emitted before init"))
        .expect("emit");
    sender
        .emit(&LogRecord::new("demo", "INFO", 20, "also buffered"))
        .expect("emit");
    println!("pending before start: {}", sender.pending_len());

    sender.start_async().await.expect("start async channel");
    println!("pending after start: {}", sender.pending_len());

    sender
        .emit(&LogRecord::new("demo", "INFO", 20, "sent over the async channel"))
        .expect("emit");

    // Shutdown path: close the async channel, fall back to blocking sends.
    sender.close();
    sender.stop_and_fallback_to_sync().expect("sync fallback");
    sender
        .emit(&LogRecord::new("demo", "WARNING", 30, "sent during teardown"))
        .expect("emit");

    sender.close();

    // Give the collector thread time to print everything.
    sleep(Duration::from_millis(300)).await;
}
