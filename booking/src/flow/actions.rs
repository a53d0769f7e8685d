//! Actions for the booking flow.

use crate::flow::state::RequestId;
use skybook_gateway::{
    Booking, Flight, FlightId, Passenger, PaymentInfo, PriceUpdate, SearchParams, Seat, SeatId,
};

/// Every input the booking reducer understands.
///
/// View intents come from the step views; `*Succeeded` / `*Failed` / `SeatsLoaded` are
/// fed back by gateway effects and carry the [`RequestId`] they answer; `PriceUpdated`
/// comes from the price feed.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingAction {
    // ========== Search ==========
    /// Submit a validated search draft
    SubmitSearch {
        /// Search parameters
        params: SearchParams,
    },

    /// Search response
    SearchSucceeded {
        /// Request being answered
        request: RequestId,
        /// Flights in response order
        flights: Vec<Flight>,
    },

    /// Search failure
    SearchFailed {
        /// Request being answered
        request: RequestId,
        /// User-facing message
        message: String,
    },

    // ========== Flight selection ==========
    /// Pick a flight from the held list
    SelectFlight {
        /// Flight id
        flight_id: FlightId,
    },

    // ========== Seat selection ==========
    /// Seat map response
    SeatsLoaded {
        /// Request being answered
        request: RequestId,
        /// Seats as returned by the gateway
        seats: Vec<Seat>,
    },

    /// Seat map failure
    SeatsFailed {
        /// Request being answered
        request: RequestId,
        /// User-facing message
        message: String,
    },

    /// Fetch the seat map again after a failure
    RetrySeats,

    /// The seat map view's full selection, in click order
    SeatSelectionChanged {
        /// Selected seat ids
        seats: Vec<SeatId>,
    },

    /// Confirm the current selection
    ConfirmSeats,

    /// Back from seat selection to the flight list
    BackToFlights,

    // ========== Passengers ==========
    /// Submit the passenger forms
    SubmitPassengers {
        /// One record per passenger, lead passenger first
        passengers: Vec<Passenger>,
    },

    /// Back from passenger details to seat selection
    BackToSeats,

    // ========== Payment ==========
    /// Submit payment and create the booking
    SubmitPayment {
        /// Card and billing details; never stored in state
        payment: PaymentInfo,
    },

    /// Booking created
    BookingSucceeded {
        /// Request being answered
        request: RequestId,
        /// Server record
        booking: Booking,
    },

    /// Booking creation failed
    BookingFailed {
        /// Request being answered
        request: RequestId,
        /// User-facing message
        message: String,
    },

    /// Back from payment to passenger details
    BackToPassengers,

    // ========== Confirmation ==========
    /// Discard everything and start a new search
    BookAnother,

    // ========== Notices & prices ==========
    /// Dismiss the blocking notice
    DismissNotice,

    /// A price update from the live feed
    PriceUpdated(PriceUpdate),

    /// Clear the "price updating" flag set by a `PriceUpdated`
    PriceFlashExpired {
        /// Flight whose flag to clear
        flight_id: FlightId,
        /// Flag generation; a newer update keeps the flag set
        generation: u64,
    },
}

impl BookingAction {
    /// Short name for logging (no payload, so payment details never reach the log)
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SubmitSearch { .. } => "submit_search",
            Self::SearchSucceeded { .. } => "search_succeeded",
            Self::SearchFailed { .. } => "search_failed",
            Self::SelectFlight { .. } => "select_flight",
            Self::SeatsLoaded { .. } => "seats_loaded",
            Self::SeatsFailed { .. } => "seats_failed",
            Self::RetrySeats => "retry_seats",
            Self::SeatSelectionChanged { .. } => "seat_selection_changed",
            Self::ConfirmSeats => "confirm_seats",
            Self::BackToFlights => "back_to_flights",
            Self::SubmitPassengers { .. } => "submit_passengers",
            Self::BackToSeats => "back_to_seats",
            Self::SubmitPayment { .. } => "submit_payment",
            Self::BookingSucceeded { .. } => "booking_succeeded",
            Self::BookingFailed { .. } => "booking_failed",
            Self::BackToPassengers => "back_to_passengers",
            Self::BookAnother => "book_another",
            Self::DismissNotice => "dismiss_notice",
            Self::PriceUpdated(_) => "price_updated",
            Self::PriceFlashExpired { .. } => "price_flash_expired",
        }
    }
}
