//! # SkyBook Gateway
//!
//! Client side of the flight booking API.
//!
//! ## Example
//!
//! ```no_run
//! use skybook_gateway::{FlightGateway, HttpGateway, SearchParams, CabinClass};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = HttpGateway::new("http://localhost:8080/api", Duration::from_secs(30))?;
//!
//! let flights = gateway
//!     .search_flights(&SearchParams {
//!         origin: "JFK".into(),
//!         destination: "LAX".into(),
//!         departure_date: "2025-03-14".parse()?,
//!         return_date: None,
//!         passengers: 2,
//!         cabin_class: CabinClass::Economy,
//!     })
//!     .await?;
//!
//! println!("{} flights", flights.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - Typed wire model (`Flight`, `Seat`, `Booking`, ...) with camelCase JSON
//! - Prices as integer cents ([`Money`])
//! - One automatic retry for idempotent `GET`s; search and booking creation are sent once

pub mod client;
pub mod error;
pub mod retry;
pub mod types;

// Re-export main types for convenience
pub use client::{FlightGateway, HttpGateway};
pub use error::GatewayError;
pub use retry::RetryPolicy;
pub use types::{
    Airport, BillingAddress, Booking, BookingId, BookingStatus, CabinClass, CreateBookingRequest,
    Flight, FlightId, Money, Passenger, PaymentInfo, PriceUpdate, SearchParams, Seat, SeatId,
    SeatStatus, SeatType, Title,
};
