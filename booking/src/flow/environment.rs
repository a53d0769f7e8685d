//! Environment for the booking reducer.

use skybook_core::environment::Clock;
use skybook_gateway::FlightGateway;
use std::sync::Arc;
use std::time::Duration;

/// Default lifetime of the "price updating" flag
pub const DEFAULT_PRICE_FLASH: Duration = Duration::from_millis(2000);

/// Dependencies the booking reducer builds its effects from.
///
/// Production wires an `HttpGateway` and `SystemClock`; tests use `MockGateway` and
/// `FixedClock`.
#[derive(Clone)]
pub struct BookingEnvironment {
    gateway: Arc<dyn FlightGateway>,
    clock: Arc<dyn Clock>,
    price_flash: Duration,
}

impl BookingEnvironment {
    /// Create an environment with the default price flash duration
    #[must_use]
    pub fn new(gateway: Arc<dyn FlightGateway>, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            clock,
            price_flash: DEFAULT_PRICE_FLASH,
        }
    }

    /// Override how long a repriced flight stays flagged
    #[must_use]
    pub fn with_price_flash(mut self, duration: Duration) -> Self {
        self.price_flash = duration;
        self
    }

    /// Remote Gateway
    #[must_use]
    pub fn gateway(&self) -> Arc<dyn FlightGateway> {
        Arc::clone(&self.gateway)
    }

    /// Clock used for "today" in search validation
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// How long a repriced flight stays flagged
    #[must_use]
    pub const fn price_flash(&self) -> Duration {
        self.price_flash
    }
}
