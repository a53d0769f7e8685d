//! Reconnect loop
//!
//! ```text
//!              spawn / delay elapsed
//! Disconnected ─────────────────────► Connecting
//!      ▲                                  │ handshake ok
//!      │ error / close                    ▼
//!      └────────────────────────────── Open ──► parse, forward
//! ```
//!
//! The delay between attempts is flat. Shutdown is observed in every state.

use crate::connection::{ConnectionState, FeedConnection, FeedConnector, FeedError};
use skybook_gateway::PriceUpdate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Price feed settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Push channel endpoint
    pub url: String,
    /// Delay before every reconnect attempt
    pub reconnect_delay: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8080/ws/prices".to_string(),
            reconnect_delay: Duration::from_millis(3000),
        }
    }
}

/// The live price subscription
pub struct PriceFeed;

impl PriceFeed {
    /// Start the subscription
    ///
    /// Parsed updates are sent to `updates` in receipt order. The loop stops when the
    /// returned handle is shut down or dropped, or when `updates` is closed.
    #[must_use]
    pub fn spawn(
        config: FeedConfig,
        connector: Arc<dyn FeedConnector>,
        updates: mpsc::UnboundedSender<PriceUpdate>,
    ) -> PriceFeedHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

        let task = tokio::spawn(
            Subscriber {
                config,
                connector,
                updates,
                state: state_tx,
                shutdown: shutdown_rx,
            }
            .run(),
        );

        PriceFeedHandle {
            shutdown: shutdown_tx,
            state: state_rx,
            task: Some(task),
        }
    }
}

/// Owner of a running subscription
///
/// Dropping the handle aborts the loop; [`shutdown`](Self::shutdown) also closes the open
/// connection cleanly.
pub struct PriceFeedHandle {
    shutdown: watch::Sender<bool>,
    state: watch::Receiver<ConnectionState>,
    task: Option<JoinHandle<()>>,
}

impl PriceFeedHandle {
    /// Current connection state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch connection state changes
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Stop the subscription
    ///
    /// Cancels a pending reconnect, closes the open connection and waits for the loop to
    /// exit. No reconnect happens afterwards.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Price feed task ended abnormally");
            }
        }
        tracing::info!("Price feed stopped");
    }
}

impl Drop for PriceFeedHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct Subscriber {
    config: FeedConfig,
    connector: Arc<dyn FeedConnector>,
    updates: mpsc::UnboundedSender<PriceUpdate>,
    state: watch::Sender<ConnectionState>,
    shutdown: watch::Receiver<bool>,
}

/// Why a session ended
enum SessionEnd {
    Disconnected(FeedError),
    Stop,
}

impl Subscriber {
    async fn run(mut self) {
        tracing::info!(url = %self.config.url, "Starting price feed");

        loop {
            self.set_state(ConnectionState::Connecting);

            let connected = tokio::select! {
                biased;
                _ = self.shutdown.changed() => break,
                result = self.connector.connect(&self.config.url) => result,
            };

            match connected {
                Ok(connection) => {
                    self.set_state(ConnectionState::Open);
                    tracing::info!("Price feed connected");

                    match self.session(connection).await {
                        SessionEnd::Stop => break,
                        SessionEnd::Disconnected(error) => {
                            tracing::warn!(error = %error, "Price feed disconnected");
                        },
                    }
                },
                Err(error) => {
                    tracing::warn!(error = %error, "Price feed connection failed");
                },
            }

            self.set_state(ConnectionState::Disconnected);
            tracing::debug!(
                delay_ms = u64::try_from(self.config.reconnect_delay.as_millis()).unwrap_or(u64::MAX),
                "Scheduling price feed reconnect"
            );

            tokio::select! {
                biased;
                _ = self.shutdown.changed() => break,
                () = tokio::time::sleep(self.config.reconnect_delay) => {},
            }
        }

        self.set_state(ConnectionState::Disconnected);
    }

    async fn session(&mut self, mut connection: Box<dyn FeedConnection>) -> SessionEnd {
        let end = loop {
            let message = tokio::select! {
                biased;
                _ = self.shutdown.changed() => break SessionEnd::Stop,
                message = connection.next_message() => message,
            };

            match message {
                Some(Ok(text)) => {
                    if !self.forward(&text) {
                        break SessionEnd::Stop;
                    }
                },
                Some(Err(error)) => return SessionEnd::Disconnected(error),
                None => return SessionEnd::Disconnected(FeedError::Closed),
            }
        };

        if tokio::time::timeout(CLOSE_TIMEOUT, connection.close()).await.is_err() {
            tracing::debug!("Timed out closing price feed connection");
        }
        end
    }

    /// Parse and forward one message; returns false once nobody is listening
    fn forward(&self, text: &str) -> bool {
        let update = match serde_json::from_str::<PriceUpdate>(text) {
            Ok(update) => update,
            Err(error) => {
                tracing::warn!(error = %error, "Dropping malformed price update");
                return true;
            },
        };

        tracing::trace!(flight_id = %update.flight_id, "Price update received");
        if self.updates.send(update).is_err() {
            tracing::debug!("Price update receiver dropped, stopping feed");
            return false;
        }
        true
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            tracing::debug!(from = %current, to = %state, "Price feed state change");
            *current = state;
            true
        });
    }
}
