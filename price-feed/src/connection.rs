//! Connection seam between the reconnect loop and the transport

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Errors from the push channel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// Handshake failed (refused, DNS, bad URL)
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The open connection failed while reading
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server closed the connection
    #[error("Connection closed")]
    Closed,
}

/// Connection state of the price feed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Not connected; a reconnect may be scheduled
    #[default]
    Disconnected,
    /// Handshake in progress
    Connecting,
    /// Receiving updates
    Open,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Open => "open",
        })
    }
}

/// Opens connections to the push channel
#[async_trait]
pub trait FeedConnector: Send + Sync {
    /// Perform the handshake with `url`
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Connect`] if the handshake fails.
    async fn connect(&self, url: &str) -> Result<Box<dyn FeedConnection>, FeedError>;
}

/// An open push channel
#[async_trait]
pub trait FeedConnection: Send {
    /// Wait for the next text message
    ///
    /// Returns `None` once the server has closed the connection.
    async fn next_message(&mut self) -> Option<Result<String, FeedError>>;

    /// Close the connection from the client side
    async fn close(&mut self);
}
