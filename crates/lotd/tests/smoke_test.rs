//! Smoke tests for the lotd server
//!
//! These spin up the real listeners on high fixed ports and drive them with
//! the client stubs, end to end: line protocol, framed RPC, sensor ingest,
//! and pub/sub delivery.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use lotd_client::{ClientError, RpcClient, SensorClient, SubscriberClient};
use lotd_ingest::UpdatePipeline;
use lotd_pubsub::SubscriptionEngine;
use lotd_server::{ListenAddrs, spawn_listeners};
use lotd_store::{ChangeListener, Lot, LotStore};

/// One running server stack bound to `base_port..base_port+3`
struct TestServer {
    cancel: CancellationToken,
    base_port: u16,
}

impl TestServer {
    async fn start(base_port: u16, lots: Vec<Lot>, reservation_timeout: Duration) -> Self {
        let cancel = CancellationToken::new();
        let store = Arc::new(LotStore::new(lots, reservation_timeout));
        let engine = Arc::new(SubscriptionEngine::new(Arc::clone(&store), 100));
        store.set_listener(Arc::clone(&engine) as Arc<dyn ChangeListener>);

        let pipeline = UpdatePipeline::start(Arc::clone(&store), 3, 64, cancel.clone());

        let addrs = ListenAddrs {
            line: format!("127.0.0.1:{}", base_port),
            rpc: format!("127.0.0.1:{}", base_port + 1),
            sensor: format!("127.0.0.1:{}", base_port + 2),
            pubsub: format!("127.0.0.1:{}", base_port + 3),
        };
        spawn_listeners(addrs, store, engine, pipeline.sender(), &cancel);

        let server = Self { cancel, base_port };
        server.wait_until_up().await;
        server
    }

    fn line_addr(&self) -> String {
        format!("127.0.0.1:{}", self.base_port)
    }

    fn rpc_addr(&self) -> String {
        format!("127.0.0.1:{}", self.base_port + 1)
    }

    fn sensor_addr(&self) -> String {
        format!("127.0.0.1:{}", self.base_port + 2)
    }

    fn pubsub_addr(&self) -> String {
        format!("127.0.0.1:{}", self.base_port + 3)
    }

    /// Retry-connect until every listener accepts
    async fn wait_until_up(&self) {
        for port in self.base_port..=self.base_port + 3 {
            let addr = format!("127.0.0.1:{port}");
            let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
            loop {
                if TcpStream::connect(&addr).await.is_ok() {
                    break;
                }
                assert!(
                    tokio::time::Instant::now() < deadline,
                    "listener on {addr} never came up"
                );
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Line-protocol helper: send one command, read one response line
struct LineClient {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: tokio::net::tcp::OwnedWriteHalf,
}

impl LineClient {
    async fn connect(addr: &str) -> Self {
        let stream = TcpStream::connect(addr).await.expect("line connect failed");
        let (read_half, writer) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer,
        }
    }

    async fn send(&mut self, command: &str) -> String {
        self.writer
            .write_all(format!("{command}\n").as_bytes())
            .await
            .expect("line write failed");
        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .await
            .expect("line read failed");
        line.trim_end().to_string()
    }
}

fn default_lots() -> Vec<Lot> {
    vec![Lot::new("LOT-A", 2, 0), Lot::new("LOT-B", 30, 5)]
}

#[tokio::test]
async fn test_line_protocol_end_to_end() {
    let server = TestServer::start(52100, default_lots(), Duration::from_secs(300)).await;
    let mut client = LineClient::connect(&server.line_addr()).await;

    assert_eq!(client.send("PING").await, "PONG");

    let lots: serde_json::Value = client.send("LOTS").await.parse().unwrap();
    assert_eq!(lots[0]["id"], "LOT-A");
    assert_eq!(lots[1]["free"], 25);

    assert_eq!(client.send("AVAIL LOT-A").await, "2");
    assert_eq!(client.send("AVAIL LOT-X").await, "ERROR: Unknown lot");

    // The full reservation scenario over the wire
    assert_eq!(client.send("RESERVE LOT-A X").await, "OK");
    assert_eq!(client.send("RESERVE LOT-A Y").await, "OK");
    assert_eq!(client.send("RESERVE LOT-A Z").await, "FULL");
    assert_eq!(client.send("RESERVE LOT-A X").await, "EXISTS");
    assert_eq!(client.send("CANCEL LOT-A X").await, "OK");
    assert_eq!(client.send("RESERVE LOT-A Z").await, "OK");
    assert_eq!(client.send("AVAIL LOT-A").await, "0");
    assert_eq!(client.send("CANCEL LOT-A W").await, "NOT_FOUND");

    // Malformed input errors without closing the connection
    assert_eq!(client.send("FROB").await, "ERROR: Unknown command: FROB");
    assert_eq!(client.send("PING").await, "PONG");
}

#[tokio::test]
async fn test_rpc_end_to_end() {
    let server = TestServer::start(52200, default_lots(), Duration::from_secs(300)).await;
    let mut client = RpcClient::connect(server.rpc_addr()).await.unwrap();

    let lots = client.get_lots().await.unwrap();
    assert_eq!(lots.len(), 2);
    assert_eq!(lots[0].id, "LOT-A");
    assert_eq!(lots[1].free, 25);

    assert_eq!(client.get_availability("LOT-B").await.unwrap(), 25);

    assert!(client.reserve("LOT-A", "CAR-1").await.unwrap());
    assert!(!client.reserve("LOT-A", "CAR-1").await.unwrap());
    assert_eq!(client.get_availability("LOT-A").await.unwrap(), 1);

    assert!(client.cancel("LOT-A", "CAR-1").await.unwrap());
    assert!(!client.cancel("LOT-A", "CAR-1").await.unwrap());

    // Unknown lot is a visible error, and the connection survives it
    let err = client.get_availability("LOT-X").await.unwrap_err();
    assert!(matches!(err, ClientError::Rpc(message) if message == "Unknown lot: LOT-X"));
    assert_eq!(client.get_availability("LOT-A").await.unwrap(), 2);
}

#[tokio::test]
async fn test_sensor_updates_apply_asynchronously() {
    let server = TestServer::start(52300, default_lots(), Duration::from_secs(300)).await;
    let mut sensor = SensorClient::connect(server.sensor_addr()).await.unwrap();
    let mut rpc = RpcClient::connect(server.rpc_addr()).await.unwrap();

    // ACK comes back even for an unknown lot
    sensor.send("LOT-NOPE", 1).await.unwrap();

    sensor.send("LOT-B", 3).await.unwrap();

    // ACK precedes application; poll until the workers catch up
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if rpc.get_availability("LOT-B").await.unwrap() == 22 {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "sensor delta never applied"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_pubsub_receives_sensor_and_reservation_events() {
    let server = TestServer::start(52400, default_lots(), Duration::from_secs(300)).await;

    let mut subscriber = SubscriberClient::connect(server.pubsub_addr()).await.unwrap();
    let subscription_id = subscriber.subscribe("LOT-B").await.unwrap();
    assert!(subscription_id > 0);

    // A sensor delta on the watched lot produces an event with the new free
    // count: 30 - 5 - 0 = 25, +2 occupied -> 23
    let mut sensor = SensorClient::connect(server.sensor_addr()).await.unwrap();
    sensor.send("LOT-B", 2).await.unwrap();

    let event = timeout(Duration::from_secs(2), subscriber.next_event())
        .await
        .expect("no event within timeout")
        .unwrap();
    assert_eq!(event.lot_id, "LOT-B");
    assert_eq!(event.free, 23);

    // A reservation also moves the free count and fans out
    let mut rpc = RpcClient::connect(server.rpc_addr()).await.unwrap();
    assert!(rpc.reserve("LOT-B", "CAR-9").await.unwrap());

    let event = timeout(Duration::from_secs(2), subscriber.next_event())
        .await
        .expect("no event within timeout")
        .unwrap();
    assert_eq!(event.lot_id, "LOT-B");
    assert_eq!(event.free, 22);
}

#[tokio::test]
async fn test_pubsub_clamp_publishes_single_zero_event() {
    // Capacity 2, occupied 0; +5 clamps occupied to 2 and publishes free=0
    let server = TestServer::start(52500, vec![Lot::new("LOT-A", 2, 0)], Duration::from_secs(300)).await;

    let mut subscriber = SubscriberClient::connect(server.pubsub_addr()).await.unwrap();
    subscriber.subscribe("LOT-A").await.unwrap();

    let mut sensor = SensorClient::connect(server.sensor_addr()).await.unwrap();
    sensor.send("LOT-A", 5).await.unwrap();

    let event = timeout(Duration::from_secs(2), subscriber.next_event())
        .await
        .expect("no event within timeout")
        .unwrap();
    assert_eq!(event.free, 0);

    // Exactly one event: a second delta confirms nothing else was queued
    sensor.send("LOT-A", -1).await.unwrap();
    let event = timeout(Duration::from_secs(2), subscriber.next_event())
        .await
        .expect("no event within timeout")
        .unwrap();
    assert_eq!(event.free, 1);
}

#[tokio::test]
async fn test_subscribe_unknown_lot_and_guessed_unsubscribe() {
    let server = TestServer::start(52600, default_lots(), Duration::from_secs(300)).await;

    let mut subscriber = SubscriberClient::connect(server.pubsub_addr()).await.unwrap();
    let err = subscriber.subscribe("LOT-X").await.unwrap_err();
    assert!(matches!(err, ClientError::Rpc(message) if message == "Unknown lot: LOT-X"));

    // No subscription was registered: unsubscribing a guessed id is false
    assert!(!subscriber.unsubscribe(12345).await.unwrap());
}

#[tokio::test]
async fn test_subscriber_disconnect_leaves_others_running() {
    let server = TestServer::start(52700, default_lots(), Duration::from_secs(300)).await;

    let mut doomed = SubscriberClient::connect(server.pubsub_addr()).await.unwrap();
    doomed.subscribe("LOT-B").await.unwrap();
    drop(doomed);

    let mut survivor = SubscriberClient::connect(server.pubsub_addr()).await.unwrap();
    survivor.subscribe("LOT-B").await.unwrap();

    let mut sensor = SensorClient::connect(server.sensor_addr()).await.unwrap();
    sensor.send("LOT-B", 1).await.unwrap();

    let event = timeout(Duration::from_secs(2), survivor.next_event())
        .await
        .expect("surviving subscriber got no event")
        .unwrap();
    assert_eq!(event.free, 24);
}

#[tokio::test]
async fn test_subscribe_on_rpc_channel_is_rejected() {
    let server = TestServer::start(52800, default_lots(), Duration::from_secs(300)).await;
    let mut client = RpcClient::connect(server.rpc_addr()).await.unwrap();

    let err = client
        .call("subscribe", vec![serde_json::json!("LOT-A")])
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Rpc(message) if message.contains("pub/sub")));
}

#[tokio::test]
async fn test_reservation_expiry_over_the_wire() {
    let server = TestServer::start(52900, default_lots(), Duration::from_millis(100)).await;
    let mut client = RpcClient::connect(server.rpc_addr()).await.unwrap();

    assert!(client.reserve("LOT-A", "CAR-1").await.unwrap());
    assert_eq!(client.get_availability("LOT-A").await.unwrap(), 1);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(client.get_availability("LOT-A").await.unwrap(), 2);
}
