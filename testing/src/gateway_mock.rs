//! Scripted in-memory `FlightGateway`

use async_trait::async_trait;
use skybook_gateway::{
    Booking, BookingId, CreateBookingRequest, Flight, FlightGateway, FlightId, GatewayError,
    SearchParams, Seat,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A call recorded by [`MockGateway`]
#[derive(Clone, Debug, PartialEq)]
pub enum GatewayCall {
    /// `search_flights`
    SearchFlights(SearchParams),
    /// `get_flight`
    GetFlight(FlightId),
    /// `get_seats`
    GetSeats(FlightId),
    /// `create_booking` (payment omitted)
    CreateBooking {
        /// Flight being booked
        flight_id: FlightId,
        /// Passenger count
        passengers: usize,
        /// Seat labels, in request order
        seats: Vec<String>,
    },
    /// `get_booking`
    GetBooking(BookingId),
    /// `cancel_booking`
    CancelBooking(BookingId),
}

#[derive(Default)]
struct Script {
    search: VecDeque<Result<Vec<Flight>, GatewayError>>,
    flight: VecDeque<Result<Flight, GatewayError>>,
    seats: VecDeque<Result<Vec<Seat>, GatewayError>>,
    create: VecDeque<Result<Booking, GatewayError>>,
    booking: VecDeque<Result<Booking, GatewayError>>,
    cancel: VecDeque<Result<(), GatewayError>>,
    latency: Duration,
    calls: Vec<GatewayCall>,
}

/// Gateway that answers from per-operation queues and records every call
///
/// An operation with an empty queue fails with `GatewayError::Transport`. Clones share
/// the same script.
///
/// # Example
///
/// ```ignore
/// let gateway = MockGateway::new();
/// gateway.push_search(Ok(vec![flight("FL001", 29_999)]));
///
/// let env = BookingEnvironment::new(Arc::new(gateway.clone()), ...);
/// ```
#[derive(Clone, Default)]
pub struct MockGateway {
    script: Arc<Mutex<Script>>,
}

impl MockGateway {
    /// Create a gateway with nothing scripted
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `latency`
    pub fn set_latency(&self, latency: Duration) {
        self.script().latency = latency;
    }

    /// Queue a `search_flights` result
    pub fn push_search(&self, result: Result<Vec<Flight>, GatewayError>) {
        self.script().search.push_back(result);
    }

    /// Queue a `get_flight` result
    pub fn push_flight(&self, result: Result<Flight, GatewayError>) {
        self.script().flight.push_back(result);
    }

    /// Queue a `get_seats` result
    pub fn push_seats(&self, result: Result<Vec<Seat>, GatewayError>) {
        self.script().seats.push_back(result);
    }

    /// Queue a `create_booking` result
    pub fn push_create_booking(&self, result: Result<Booking, GatewayError>) {
        self.script().create.push_back(result);
    }

    /// Queue a `get_booking` result
    pub fn push_booking(&self, result: Result<Booking, GatewayError>) {
        self.script().booking.push_back(result);
    }

    /// Queue a `cancel_booking` result
    pub fn push_cancel(&self, result: Result<(), GatewayError>) {
        self.script().cancel.push_back(result);
    }

    /// Calls received so far
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.script().calls.clone()
    }

    /// Number of calls received so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.script().calls.len()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn respond<T>(
        &self,
        call: GatewayCall,
        pick: impl FnOnce(&mut Script) -> Option<Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        let (latency, result) = {
            let mut script = self.script();
            script.calls.push(call);
            (script.latency, pick(&mut script))
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        result.unwrap_or_else(|| Err(GatewayError::Transport("no scripted response".into())))
    }
}

#[async_trait]
impl FlightGateway for MockGateway {
    async fn search_flights(&self, params: &SearchParams) -> Result<Vec<Flight>, GatewayError> {
        self.respond(GatewayCall::SearchFlights(params.clone()), |s| {
            s.search.pop_front()
        })
        .await
    }

    async fn get_flight(&self, id: &FlightId) -> Result<Flight, GatewayError> {
        self.respond(GatewayCall::GetFlight(id.clone()), |s| s.flight.pop_front())
            .await
    }

    async fn get_seats(&self, flight_id: &FlightId) -> Result<Vec<Seat>, GatewayError> {
        self.respond(GatewayCall::GetSeats(flight_id.clone()), |s| {
            s.seats.pop_front()
        })
        .await
    }

    async fn create_booking(&self, request: &CreateBookingRequest) -> Result<Booking, GatewayError> {
        let call = GatewayCall::CreateBooking {
            flight_id: request.flight_id.clone(),
            passengers: request.passengers.len(),
            seats: request.seats.iter().map(Seat::label).collect(),
        };
        self.respond(call, |s| s.create.pop_front()).await
    }

    async fn get_booking(&self, id: &BookingId) -> Result<Booking, GatewayError> {
        self.respond(GatewayCall::GetBooking(id.clone()), |s| s.booking.pop_front())
            .await
    }

    async fn cancel_booking(&self, id: &BookingId) -> Result<(), GatewayError> {
        self.respond(GatewayCall::CancelBooking(id.clone()), |s| {
            s.cancel.pop_front()
        })
        .await
    }
}
