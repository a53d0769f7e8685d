//! Booking flow state: the current wizard step and the held flight list.
//!
//! Each [`Step`] variant carries only the data meaningful at that step, so a state like
//! "passengers present while still on search" cannot be expressed.

use skybook_gateway::{Booking, Flight, FlightId, Money, Passenger, SearchParams, Seat};
use std::collections::HashMap;
use std::fmt;

/// Identity of one outstanding remote request
///
/// A response is applied only if the current step is still waiting for the same id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    /// Wrap a raw id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// A search waiting for its response
#[derive(Clone, Debug, PartialEq)]
pub struct PendingSearch {
    /// Request the response must carry
    pub request: RequestId,
    /// Parameters that were submitted
    pub params: SearchParams,
}

/// Seat map as fetched for the selected flight
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SeatMap {
    /// Fetch `request` in flight
    Loading {
        /// Request the response must carry
        request: RequestId,
    },
    /// Seats sorted by row, then column
    Loaded(Vec<Seat>),
    /// The fetch failed; the user may retry
    Failed {
        /// User-facing message
        message: String,
    },
}

impl SeatMap {
    /// Loaded seats, empty while loading or failed
    #[must_use]
    pub fn seats(&self) -> &[Seat] {
        match self {
            Self::Loaded(seats) => seats,
            Self::Loading { .. } | Self::Failed { .. } => &[],
        }
    }

    /// The request this map is waiting on, if any
    #[must_use]
    pub const fn pending(&self) -> Option<RequestId> {
        match self {
            Self::Loading { request } => Some(*request),
            Self::Loaded(_) | Self::Failed { .. } => None,
        }
    }
}

/// Discriminant of [`Step`], for logging and view routing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// `search`
    Search,
    /// `select-flight`
    SelectFlight,
    /// `select-seats`
    SelectSeats,
    /// `passenger-details`
    PassengerDetails,
    /// `payment`
    Payment,
    /// `confirmation`
    Confirmation,
}

impl StepKind {
    /// Wire-style name (`select-seats`)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::SelectFlight => "select-flight",
            Self::SelectSeats => "select-seats",
            Self::PassengerDetails => "passenger-details",
            Self::Payment => "payment",
            Self::Confirmation => "confirmation",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The wizard step together with everything committed so far
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Entering search parameters
    Search {
        /// Search in flight
        pending: Option<PendingSearch>,
        /// Failure of the last search
        error: Option<String>,
    },
    /// Choosing from the held flight list
    SelectFlight {
        /// Parameters of the search that produced the list
        params: SearchParams,
    },
    /// Choosing seats on the selected flight
    SelectSeats {
        /// Committed search
        params: SearchParams,
        /// Selected flight
        flight: Flight,
        /// Fetched seat map
        seat_map: SeatMap,
        /// Current selection, in click order
        selected: Vec<Seat>,
    },
    /// Entering passenger details
    PassengerDetails {
        /// Committed search
        params: SearchParams,
        /// Selected flight
        flight: Flight,
        /// Committed seats
        seats: Vec<Seat>,
        /// Previously submitted passengers, when coming back from payment
        prefill: Option<Vec<Passenger>>,
    },
    /// Entering payment; the booking request may be in flight
    Payment {
        /// Committed search
        params: SearchParams,
        /// Selected flight
        flight: Flight,
        /// Committed seats
        seats: Vec<Seat>,
        /// Committed passengers
        passengers: Vec<Passenger>,
        /// Booking request in flight
        pending: Option<RequestId>,
        /// Failure of the last booking attempt
        error: Option<String>,
    },
    /// Booking created
    Confirmation {
        /// Committed search
        params: SearchParams,
        /// Booked flight
        flight: Flight,
        /// Booked seats
        seats: Vec<Seat>,
        /// Booked passengers
        passengers: Vec<Passenger>,
        /// Server response
        booking: Booking,
    },
}

impl Default for Step {
    fn default() -> Self {
        Self::Search {
            pending: None,
            error: None,
        }
    }
}

impl Step {
    /// Which step this is
    #[must_use]
    pub const fn kind(&self) -> StepKind {
        match self {
            Self::Search { .. } => StepKind::Search,
            Self::SelectFlight { .. } => StepKind::SelectFlight,
            Self::SelectSeats { .. } => StepKind::SelectSeats,
            Self::PassengerDetails { .. } => StepKind::PassengerDetails,
            Self::Payment { .. } => StepKind::Payment,
            Self::Confirmation { .. } => StepKind::Confirmation,
        }
    }

    /// Committed search parameters, once a search has succeeded
    #[must_use]
    pub const fn params(&self) -> Option<&SearchParams> {
        match self {
            Self::Search { .. } => None,
            Self::SelectFlight { params }
            | Self::SelectSeats { params, .. }
            | Self::PassengerDetails { params, .. }
            | Self::Payment { params, .. }
            | Self::Confirmation { params, .. } => Some(params),
        }
    }

    /// Selected flight, from seat selection onward
    #[must_use]
    pub const fn flight(&self) -> Option<&Flight> {
        match self {
            Self::Search { .. } | Self::SelectFlight { .. } => None,
            Self::SelectSeats { flight, .. }
            | Self::PassengerDetails { flight, .. }
            | Self::Payment { flight, .. }
            | Self::Confirmation { flight, .. } => Some(flight),
        }
    }

    /// Selected flight in the steps where its price may still change
    pub(crate) fn repriceable_flight_mut(&mut self) -> Option<&mut Flight> {
        match self {
            Self::SelectSeats { flight, .. }
            | Self::PassengerDetails { flight, .. }
            | Self::Payment { flight, .. } => Some(flight),
            Self::Search { .. } | Self::SelectFlight { .. } | Self::Confirmation { .. } => None,
        }
    }
}

/// Everything the booking flow controller owns
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BookingState {
    /// Current step
    pub step: Step,
    /// Flights from the last successful search, in response order
    pub flights: Vec<Flight>,
    /// Blocking notice from a rejected input, shown until dismissed
    pub notice: Option<String>,
    price_flash: HashMap<FlightId, u64>,
    next_request: u64,
    next_flash: u64,
}

impl BookingState {
    /// Fresh state on the search step
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state with the given step and flight list
    #[must_use]
    pub fn with_step(step: Step, flights: Vec<Flight>) -> Self {
        Self {
            step,
            flights,
            ..Self::default()
        }
    }

    /// Returns true while the flight's "price updating" flag is set
    #[must_use]
    pub fn is_price_updating(&self, flight_id: &FlightId) -> bool {
        self.price_flash.contains_key(flight_id)
    }

    /// Held flight by id
    #[must_use]
    pub fn flight(&self, flight_id: &FlightId) -> Option<&Flight> {
        self.flights.iter().find(|f| &f.id == flight_id)
    }

    /// Replace the held list wholesale; flags from the previous list are dropped
    pub(crate) fn replace_flights(&mut self, flights: Vec<Flight>) {
        self.flights = flights;
        self.price_flash.clear();
    }

    pub(crate) fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    pub(crate) fn flash_price(&mut self, flight_id: FlightId) -> u64 {
        self.next_flash += 1;
        self.price_flash.insert(flight_id, self.next_flash);
        self.next_flash
    }

    pub(crate) fn expire_flash(&mut self, flight_id: &FlightId, generation: u64) -> bool {
        if self.price_flash.get(flight_id) == Some(&generation) {
            self.price_flash.remove(flight_id);
            true
        } else {
            false
        }
    }

    /// Back to an empty search step; request ids keep counting up
    pub(crate) fn reset(&mut self) {
        self.step = Step::default();
        self.flights.clear();
        self.notice = None;
        self.price_flash.clear();
    }
}

/// Payable total: fare × passengers plus every seat's extra charge
#[must_use]
pub fn total_price(flight: &Flight, passengers: u32, seats: &[Seat]) -> Money {
    flight
        .price
        .saturating_mul(passengers)
        .saturating_add(seats.iter().map(Seat::extra_price).sum())
}
