//! End-to-end test of the WebSocket transport against a local tungstenite server.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use futures::SinkExt;
use skybook_gateway::FlightId;
use skybook_price_feed::{ConnectionState, FeedConfig, PriceFeed, WebSocketConnector};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

#[tokio::test]
async fn receives_updates_and_reconnects_after_server_drop() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws/prices", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        // First session: one malformed frame, one update, then drop the socket.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text("garbage".into())).await.unwrap();
        ws.send(Message::Text(
            r#"{"flightId":"FL001","newPrice":321.5,"timestamp":"2025-03-01T12:00:00Z"}"#.into(),
        ))
        .await
        .unwrap();
        drop(ws);

        // Second session after the reconnect delay.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text(
            r#"{"flightId":"FL002","newPrice":99,"timestamp":"2025-03-01T12:00:05+01:00"}"#.into(),
        ))
        .await
        .unwrap();
        ws
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let feed = PriceFeed::spawn(
        FeedConfig {
            url,
            reconnect_delay: Duration::from_millis(50),
        },
        Arc::new(WebSocketConnector),
        tx,
    );

    let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("first update in time")
        .unwrap();
    assert_eq!(first.flight_id, FlightId::from("FL001"));
    assert_eq!(first.new_price.cents(), 32_150);

    let second = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("second update after reconnect")
        .unwrap();
    assert_eq!(second.flight_id, FlightId::from("FL002"));
    assert_eq!(feed.state(), ConnectionState::Open);

    let _ws = server.await.unwrap();
    feed.shutdown().await;
}

#[tokio::test]
async fn refused_connection_keeps_retrying() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws/prices", listener.local_addr().unwrap());
    drop(listener);

    let (tx, _rx) = mpsc::unbounded_channel();
    let feed = PriceFeed::spawn(
        FeedConfig {
            url,
            reconnect_delay: Duration::from_millis(20),
        },
        Arc::new(WebSocketConnector),
        tx,
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_ne!(feed.state(), ConnectionState::Open);
    feed.shutdown().await;
}
