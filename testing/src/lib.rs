//! # SkyBook Testing
//!
//! Testing utilities for the SkyBook booking flow.
//!
//! This crate provides:
//! - [`ReducerTest`], a Given-When-Then harness for reducers, plus effect assertions
//! - Mock implementations of the environment seams (`FixedClock`, [`MockGateway`],
//!   [`MockFeedConnector`])
//! - Domain fixtures (flights, seat grids, passengers, payment)
//!
//! ## Example
//!
//! ```ignore
//! use skybook_testing::{MockGateway, fixtures};
//! use skybook_runtime::Store;
//!
//! #[tokio::test]
//! async fn search_advances_to_flight_list() {
//!     let gateway = MockGateway::new();
//!     gateway.push_search(Ok(vec![fixtures::flight("FL001", 29_999)]));
//!
//!     let store = Store::new(BookingState::default(), BookingReducer::new(), env(gateway));
//!     let mut handle = store.send(BookingAction::SubmitSearch { params }).await?;
//!     handle.wait().await;
//!
//!     assert_eq!(store.state(|s| s.flights.len()).await, 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use skybook_core::environment::Clock;

mod feed_mock;
pub mod fixtures;
mod gateway_mock;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    pub use crate::feed_mock::{MockFeedConnector, MockFeedServer};
    pub use crate::gateway_mock::{GatewayCall, MockGateway};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use skybook_testing::mocks::FixedClock;
    /// use skybook_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-03-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-03-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Install a `tracing` subscriber that writes through the test harness
///
/// Honours `RUST_LOG`; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, GatewayCall, MockFeedConnector, MockFeedServer, MockGateway, test_clock};
pub use reducer_test::{ReducerTest, assertions};
