//! WebSocket transport (tokio-tungstenite)

use crate::connection::{FeedConnection, FeedConnector, FeedError};
use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

/// Connects to a `ws://` or `wss://` price endpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl FeedConnector for WebSocketConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn FeedConnection>, FeedError> {
        let (stream, response) = connect_async(url)
            .await
            .map_err(|e| FeedError::Connect(e.to_string()))?;

        tracing::debug!(status = %response.status(), "WebSocket handshake complete");
        Ok(Box::new(WebSocketConnection { stream }))
    }
}

struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl FeedConnection for WebSocketConnection {
    async fn next_message(&mut self) -> Option<Result<String, FeedError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => tracing::warn!("Dropping non-UTF-8 binary message"),
                },
                Ok(Message::Close(frame)) => {
                    tracing::debug!(?frame, "Server closed price feed");
                    return None;
                },
                // Pongs are queued by tungstenite itself
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {},
                Err(e) => return Some(Err(FeedError::Transport(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            tracing::debug!(error = %e, "WebSocket close handshake failed");
        }
    }
}
