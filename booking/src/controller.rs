//! Application shell for the booking flow.
//!
//! [`BookingFlowController`] owns the step store and the single price-feed subscription.
//! The subscription lives as long as the controller, not any one step.
//!
//! # Lifecycle
//!
//! 1. [`mount`](BookingFlowController::mount): create the store, start the price feed and
//!    the task forwarding its updates into the store
//! 2. Views send actions through [`send`](BookingFlowController::send)
//! 3. [`unmount`](BookingFlowController::unmount): stop the feed (no reconnect afterwards),
//!    stop forwarding, drain or abort in-flight requests

use crate::config::Config;
use crate::flow::{BookingAction, BookingEnvironment, BookingReducer, BookingState};
use crate::views::StepView;
use skybook_core::environment::{Clock, SystemClock};
use skybook_gateway::{Booking, BookingId, FlightGateway, GatewayError, HttpGateway, RetryPolicy};
use skybook_price_feed::{
    ConnectionState, FeedConfig, FeedConnector, PriceFeed, PriceFeedHandle, WebSocketConnector,
};
use skybook_runtime::{EffectHandle, Store, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// The step store
pub type BookingStore = Store<BookingState, BookingAction, BookingEnvironment, BookingReducer>;

/// Owner of the booking flow and its live price subscription
pub struct BookingFlowController {
    store: BookingStore,
    gateway: Arc<dyn FlightGateway>,
    feed: PriceFeedHandle,
    forwarder: JoinHandle<()>,
    shutdown_timeout: Duration,
}

impl BookingFlowController {
    /// Mount against the HTTP gateway and WebSocket feed named in `config`
    ///
    /// Idempotent reads are retried `config.api.read_retries` times; booking creation
    /// and search never are.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the HTTP client cannot be built from `config`.
    pub fn connect(config: &Config) -> Result<Self, GatewayError> {
        let retry = RetryPolicy::builder()
            .max_retries(usize::try_from(config.api.read_retries).unwrap_or(usize::MAX))
            .build();
        let gateway = HttpGateway::new(&config.api.base_url, config.api.request_timeout)?
            .with_read_retry(retry);

        Ok(Self::mount(
            config,
            Arc::new(gateway),
            Arc::new(WebSocketConnector),
        ))
    }

    /// Mount with explicit gateway and feed transport
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn mount(
        config: &Config,
        gateway: Arc<dyn FlightGateway>,
        connector: Arc<dyn FeedConnector>,
    ) -> Self {
        Self::mount_with_clock(config, gateway, connector, Arc::new(SystemClock))
    }

    /// Mount with an explicit clock; search dates are checked against its day
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn mount_with_clock(
        config: &Config,
        gateway: Arc<dyn FlightGateway>,
        connector: Arc<dyn FeedConnector>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        tracing::info!(
            api = %config.api.base_url,
            feed = %config.price_feed.url,
            "Mounting booking flow"
        );

        let environment = BookingEnvironment::new(Arc::clone(&gateway), clock)
            .with_price_flash(config.price_flash);
        let store = Store::new(BookingState::new(), BookingReducer::new(), environment);

        let (updates_tx, mut updates_rx) = mpsc::unbounded_channel();
        let feed = PriceFeed::spawn(
            FeedConfig {
                url: config.price_feed.url.clone(),
                reconnect_delay: config.price_feed.reconnect_delay,
            },
            connector,
            updates_tx,
        );

        // Updates are sent one at a time so the store sees them in receipt order
        let forward_to = store.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(update) = updates_rx.recv().await {
                tracing::trace!(flight_id = %update.flight_id, "Forwarding price update");
                if forward_to
                    .send(BookingAction::PriceUpdated(update))
                    .await
                    .is_err()
                {
                    break;
                }
            }
            tracing::debug!("Price update forwarding stopped");
        });

        Self {
            store,
            gateway,
            feed,
            forwarder,
            shutdown_timeout: config.shutdown_timeout,
        }
    }

    /// Send a view action to the flow
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once unmounting has begun.
    pub async fn send(&self, action: BookingAction) -> Result<EffectHandle, StoreError> {
        tracing::debug!(action = action.name(), "Dispatching");
        self.store.send(action).await
    }

    /// Send and wait until the remote call it starts, and its outcome, are applied
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once unmounting has begun.
    pub async fn send_and_wait(&self, action: BookingAction) -> Result<(), StoreError> {
        let mut handle = self.send(action).await?;
        handle.wait().await;
        Ok(())
    }

    /// Read the flow state through a closure
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&BookingState) -> T,
    {
        self.store.state(f).await
    }

    /// Copy of the flow state
    pub async fn snapshot(&self) -> BookingState {
        self.store.state(Clone::clone).await
    }

    /// View model for the current step
    pub async fn view(&self) -> Option<StepView> {
        self.store.state(StepView::from_state).await
    }

    /// Price feed connection state
    #[must_use]
    pub fn feed_state(&self) -> ConnectionState {
        self.feed.state()
    }

    /// Watch price feed connection changes
    #[must_use]
    pub fn subscribe_feed_state(&self) -> watch::Receiver<ConnectionState> {
        self.feed.subscribe_state()
    }

    /// Look up an existing booking
    ///
    /// # Errors
    ///
    /// Returns the gateway failure; [`GatewayError::user_message`] is suitable for display.
    pub async fn fetch_booking(&self, id: &BookingId) -> Result<Booking, GatewayError> {
        tracing::info!(booking_id = %id, "Fetching booking");
        self.gateway.get_booking(id).await.inspect_err(|e| {
            tracing::warn!(booking_id = %id, error = %e, "Booking lookup failed");
        })
    }

    /// Cancel an existing booking
    ///
    /// # Errors
    ///
    /// Returns the gateway failure; [`GatewayError::user_message`] is suitable for display.
    pub async fn cancel_booking(&self, id: &BookingId) -> Result<(), GatewayError> {
        tracing::info!(booking_id = %id, "Cancelling booking");
        self.gateway.cancel_booking(id).await.inspect_err(|e| {
            tracing::warn!(booking_id = %id, error = %e, "Booking cancellation failed");
        })
    }

    /// Tear down: close the feed, stop forwarding, then drain in-flight effects
    ///
    /// No reconnect attempt happens after this starts.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effects were still running after the
    /// configured grace period and had to be aborted.
    pub async fn unmount(self) -> Result<(), StoreError> {
        tracing::info!("Unmounting booking flow");

        self.feed.shutdown().await;
        // The feed dropped its sender, so the forwarder drains and exits
        if let Err(e) = self.forwarder.await {
            tracing::warn!(error = %e, "Price forwarder ended abnormally");
        }

        self.store.shutdown(self.shutdown_timeout).await
    }
}
