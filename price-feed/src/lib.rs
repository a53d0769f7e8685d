//! # SkyBook Price Feed
//!
//! A single long-lived subscription to the live price push channel.
//!
//! The subscriber owns its connection and reconnect timer; it never touches booking state.
//! Parsed [`PriceUpdate`](skybook_gateway::PriceUpdate)s are handed over on an unbounded
//! channel in receipt order, and the consumer decides what to do with them.
//!
//! ## Example
//!
//! ```no_run
//! use skybook_price_feed::{FeedConfig, PriceFeed, WebSocketConnector};
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//!
//! # async fn example() {
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! let feed = PriceFeed::spawn(FeedConfig::default(), Arc::new(WebSocketConnector), tx);
//!
//! while let Some(update) = rx.recv().await {
//!     println!("{} -> {:?}", update.flight_id, update.new_price);
//! }
//!
//! feed.shutdown().await;
//! # }
//! ```

pub mod connection;
pub mod feed;
pub mod websocket;

pub use connection::{ConnectionState, FeedConnection, FeedConnector, FeedError};
pub use feed::{FeedConfig, PriceFeed, PriceFeedHandle};
pub use websocket::WebSocketConnector;
