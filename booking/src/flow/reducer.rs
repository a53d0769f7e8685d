//! Reducer for the booking flow.
//!
//! Owns every step transition and the price merge. Remote calls are described as
//! effects; their outcomes come back as actions tagged with the [`RequestId`] they answer
//! and are dropped unless the current step is still waiting for that id.

use crate::flow::state::{PendingSearch, RequestId, SeatMap, Step};
use crate::flow::validation::{
    ValidationError, validate_passengers, validate_payment, validate_search, validate_seat_count,
};
use crate::flow::{BookingAction, BookingEnvironment, BookingState};
use skybook_core::effect::{Effect, EffectId};
use skybook_core::reducer::Reducer;
use skybook_core::{SmallVec, smallvec};
use skybook_gateway::{
    CreateBookingRequest, Flight, FlightId, Passenger, PaymentInfo, PriceUpdate, SearchParams, Seat,
    SeatId,
};

/// Cancellation group of the seat map fetch
///
/// Every transition out of `select-seats` cancels it.
pub const SEAT_FETCH: EffectId = EffectId::new("seat_fetch");

type Effects = SmallVec<[Effect<BookingAction>; 4]>;

/// Reducer for the booking wizard
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Create a new booking reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for BookingReducer {
    type State = BookingState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        tracing::trace!(action = action.name(), step = %state.step.kind(), "Reducing booking action");

        match action {
            BookingAction::SubmitSearch { params } => submit_search(state, params, env),
            BookingAction::SearchSucceeded { request, flights } => {
                search_succeeded(state, request, flights)
            },
            BookingAction::SearchFailed { request, message } => {
                search_failed(state, request, message)
            },
            BookingAction::SelectFlight { flight_id } => select_flight(state, &flight_id, env),
            BookingAction::SeatsLoaded { request, seats } => seats_loaded(state, request, seats),
            BookingAction::SeatsFailed { request, message } => {
                seats_failed(state, request, message)
            },
            BookingAction::RetrySeats => retry_seats(state, env),
            BookingAction::SeatSelectionChanged { seats } => change_selection(state, &seats),
            BookingAction::ConfirmSeats => confirm_seats(state),
            BookingAction::BackToFlights => back_to_flights(state),
            BookingAction::SubmitPassengers { passengers } => {
                submit_passengers(state, passengers)
            },
            BookingAction::BackToSeats => back_to_seats(state, env),
            BookingAction::SubmitPayment { payment } => submit_payment(state, payment, env),
            BookingAction::BookingSucceeded { request, booking } => {
                match std::mem::take(&mut state.step) {
                    Step::Payment {
                        params,
                        flight,
                        seats,
                        passengers,
                        pending: Some(pending),
                        ..
                    } if pending == request => {
                        tracing::info!(
                            booking_id = %booking.id,
                            reference = %booking.booking_reference,
                            "Booking confirmed"
                        );
                        state.step = Step::Confirmation {
                            params,
                            flight,
                            seats,
                            passengers,
                            booking,
                        };
                        smallvec![Effect::None]
                    },
                    other => {
                        state.step = other;
                        stale(state, request, "booking")
                    },
                }
            },
            BookingAction::BookingFailed { request, message } => {
                match &mut state.step {
                    Step::Payment { pending, error, .. } if *pending == Some(request) => {
                        *pending = None;
                        *error = Some(message);
                        smallvec![Effect::None]
                    },
                    _ => stale(state, request, "booking"),
                }
            },
            BookingAction::BackToPassengers => back_to_passengers(state),
            BookingAction::BookAnother => {
                if matches!(state.step, Step::Confirmation { .. }) {
                    tracing::info!("Starting a new booking");
                    state.reset();
                    smallvec![Effect::None]
                } else {
                    ignored(state, "book_another")
                }
            },
            BookingAction::DismissNotice => {
                state.notice = None;
                smallvec![Effect::None]
            },
            BookingAction::PriceUpdated(update) => apply_price_update(state, update, env),
            BookingAction::PriceFlashExpired {
                flight_id,
                generation,
            } => {
                state.expire_flash(&flight_id, generation);
                smallvec![Effect::None]
            },
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn ignored(state: &BookingState, action: &'static str) -> Effects {
    tracing::debug!(action, step = %state.step.kind(), "Action not valid in current step; ignoring");
    smallvec![Effect::None]
}

fn stale(state: &BookingState, request: RequestId, what: &'static str) -> Effects {
    tracing::debug!(%request, step = %state.step.kind(), "Discarding stale {what} response");
    smallvec![Effect::None]
}

fn reject(state: &mut BookingState, error: &ValidationError) -> Effects {
    tracing::info!(step = %state.step.kind(), reason = %error, "Transition blocked");
    state.notice = Some(error.to_string());
    smallvec![Effect::None]
}

fn fetch_seats(env: &BookingEnvironment, request: RequestId, flight_id: FlightId) -> Effect<BookingAction> {
    let gateway = env.gateway();
    Effect::future(async move {
        match gateway.get_seats(&flight_id).await {
            Ok(seats) => Some(BookingAction::SeatsLoaded { request, seats }),
            Err(error) => {
                tracing::warn!(%flight_id, %error, "Seat map fetch failed");
                Some(BookingAction::SeatsFailed {
                    request,
                    message: error.user_message(),
                })
            },
        }
    })
    .cancellable(SEAT_FETCH)
}

// ============================================================================
// Search
// ============================================================================

fn submit_search(
    state: &mut BookingState,
    params: SearchParams,
    env: &BookingEnvironment,
) -> Effects {
    match &state.step {
        Step::Search { pending: None, .. } => {},
        Step::Search {
            pending: Some(pending),
            ..
        } => {
            tracing::debug!(request = %pending.request, "Search already in flight; ignoring submit");
            return smallvec![Effect::None];
        },
        _ => return ignored(state, "submit_search"),
    }

    if let Err(error) = validate_search(&params, env.clock().now().date_naive()) {
        return reject(state, &error);
    }

    let request = state.next_request_id();
    tracing::info!(
        %request,
        origin = %params.origin,
        destination = %params.destination,
        passengers = params.passengers,
        "Searching flights"
    );

    state.notice = None;
    state.step = Step::Search {
        pending: Some(PendingSearch {
            request,
            params: params.clone(),
        }),
        error: None,
    };

    let gateway = env.gateway();
    smallvec![Effect::future(async move {
        match gateway.search_flights(&params).await {
            Ok(flights) => Some(BookingAction::SearchSucceeded { request, flights }),
            Err(error) => {
                tracing::warn!(%error, "Flight search failed");
                Some(BookingAction::SearchFailed {
                    request,
                    message: error.user_message(),
                })
            },
        }
    })]
}

fn search_succeeded(
    state: &mut BookingState,
    request: RequestId,
    flights: Vec<Flight>,
) -> Effects {
    let answered = match &mut state.step {
        Step::Search { pending, .. } => pending.take_if(|p| p.request == request),
        _ => None,
    };
    let Some(PendingSearch { params, .. }) = answered else {
        return stale(state, request, "search");
    };

    tracing::info!(%request, flights = flights.len(), "Search completed");
    state.replace_flights(flights);
    state.step = Step::SelectFlight { params };
    smallvec![Effect::None]
}

fn search_failed(state: &mut BookingState, request: RequestId, message: String) -> Effects {
    match &mut state.step {
        Step::Search { pending, error }
            if pending.as_ref().is_some_and(|p| p.request == request) =>
        {
            *pending = None;
            *error = Some(message);
            smallvec![Effect::None]
        },
        _ => stale(state, request, "search"),
    }
}

// ============================================================================
// Flight & seat selection
// ============================================================================

fn select_flight(
    state: &mut BookingState,
    flight_id: &FlightId,
    env: &BookingEnvironment,
) -> Effects {
    let Step::SelectFlight { params } = &state.step else {
        return ignored(state, "select_flight");
    };
    let Some(flight) = state.flight(flight_id).cloned() else {
        tracing::warn!(%flight_id, "Selected flight is not in the held list; ignoring");
        return smallvec![Effect::None];
    };
    let params = params.clone();

    let request = state.next_request_id();
    tracing::info!(%flight_id, %request, "Flight selected; fetching seat map");

    state.notice = None;
    state.step = Step::SelectSeats {
        params,
        flight,
        seat_map: SeatMap::Loading { request },
        selected: Vec::new(),
    };
    smallvec![fetch_seats(env, request, flight_id.clone())]
}

fn seats_loaded(state: &mut BookingState, request: RequestId, mut seats: Vec<Seat>) -> Effects {
    let Step::SelectSeats {
        seat_map, selected, ..
    } = &mut state.step
    else {
        return stale(state, request, "seat map");
    };
    if seat_map.pending() != Some(request) {
        return stale(state, request, "seat map");
    }

    seats.sort_by_key(|seat| (seat.row, seat.column));

    // Selection carried back from passenger details survives only where still free
    let kept: Vec<Seat> = selected
        .iter()
        .filter_map(|prev| {
            seats
                .iter()
                .find(|seat| seat.id == prev.id && !seat.is_occupied())
                .cloned()
        })
        .collect();
    if kept.len() != selected.len() {
        tracing::info!(
            dropped = selected.len() - kept.len(),
            "Previously selected seats are no longer available"
        );
    }

    tracing::debug!(%request, seats = seats.len(), "Seat map loaded");
    *selected = kept;
    *seat_map = SeatMap::Loaded(seats);
    smallvec![Effect::None]
}

fn seats_failed(state: &mut BookingState, request: RequestId, message: String) -> Effects {
    match &mut state.step {
        Step::SelectSeats { seat_map, .. } if seat_map.pending() == Some(request) => {
            *seat_map = SeatMap::Failed { message };
            smallvec![Effect::None]
        },
        _ => stale(state, request, "seat map"),
    }
}

fn retry_seats(state: &mut BookingState, env: &BookingEnvironment) -> Effects {
    let flight_id = match &state.step {
        Step::SelectSeats {
            flight,
            seat_map: SeatMap::Failed { .. },
            ..
        } => flight.id.clone(),
        _ => return ignored(state, "retry_seats"),
    };

    let request = state.next_request_id();
    if let Step::SelectSeats { seat_map, .. } = &mut state.step {
        *seat_map = SeatMap::Loading { request };
    }
    smallvec![fetch_seats(env, request, flight_id)]
}

fn change_selection(state: &mut BookingState, ids: &[SeatId]) -> Effects {
    let Step::SelectSeats {
        params,
        seat_map: SeatMap::Loaded(available),
        selected,
        ..
    } = &mut state.step
    else {
        return ignored(state, "seat_selection_changed");
    };

    let max = params.passengers;
    if usize::try_from(max).is_ok_and(|max| ids.len() > max) {
        let error = ValidationError::SeatLimit { max };
        return reject(state, &error);
    }

    let mut next: Vec<Seat> = Vec::with_capacity(ids.len());
    for id in ids {
        if next.iter().any(|seat| &seat.id == id) {
            continue;
        }
        match available.iter().find(|seat| &seat.id == id) {
            Some(seat) if !seat.is_occupied() => next.push(seat.clone()),
            Some(seat) => {
                let error = ValidationError::SeatUnavailable(seat.label());
                return reject(state, &error);
            },
            None => {
                let error = ValidationError::SeatUnavailable(id.to_string());
                return reject(state, &error);
            },
        }
    }

    tracing::debug!(selected = next.len(), max, "Seat selection changed");
    *selected = next;
    smallvec![Effect::None]
}

fn confirm_seats(state: &mut BookingState) -> Effects {
    let Step::SelectSeats {
        params,
        seat_map,
        selected,
        ..
    } = &state.step
    else {
        return ignored(state, "confirm_seats");
    };
    let not_ready = match seat_map {
        SeatMap::Loaded(_) => None,
        SeatMap::Loading { .. } => Some(ValidationError::SeatMapLoading),
        SeatMap::Failed { .. } => Some(ValidationError::SeatMapFailed),
    };
    if let Some(error) = not_ready {
        return reject(state, &error);
    }
    if let Err(error) = validate_seat_count(selected.len(), params.passengers) {
        return reject(state, &error);
    }

    match std::mem::take(&mut state.step) {
        Step::SelectSeats {
            params,
            flight,
            selected,
            ..
        } => {
            tracing::info!(seats = selected.len(), "Seats confirmed");
            state.notice = None;
            state.step = Step::PassengerDetails {
                params,
                flight,
                seats: selected,
                prefill: None,
            };
            smallvec![Effect::Cancel(SEAT_FETCH)]
        },
        other => {
            state.step = other;
            smallvec![Effect::None]
        },
    }
}

fn back_to_flights(state: &mut BookingState) -> Effects {
    match std::mem::take(&mut state.step) {
        Step::SelectSeats { params, .. } => {
            state.notice = None;
            state.step = Step::SelectFlight { params };
            smallvec![Effect::Cancel(SEAT_FETCH)]
        },
        other => {
            state.step = other;
            ignored(state, "back_to_flights")
        },
    }
}

// ============================================================================
// Passengers
// ============================================================================

fn submit_passengers(state: &mut BookingState, passengers: Vec<Passenger>) -> Effects {
    let Step::PassengerDetails { params, .. } = &state.step else {
        return ignored(state, "submit_passengers");
    };
    if let Err(error) = validate_passengers(&passengers, params.passengers) {
        return reject(state, &error);
    }

    // Contact details belong to the lead passenger only
    let passengers: Vec<Passenger> = passengers
        .into_iter()
        .enumerate()
        .map(|(index, mut passenger)| {
            if index > 0 {
                passenger.email = None;
                passenger.phone = None;
            }
            passenger
        })
        .collect();

    match std::mem::take(&mut state.step) {
        Step::PassengerDetails {
            params,
            flight,
            seats,
            ..
        } => {
            tracing::info!(passengers = passengers.len(), "Passenger details submitted");
            state.notice = None;
            state.step = Step::Payment {
                params,
                flight,
                seats,
                passengers,
                pending: None,
                error: None,
            };
        },
        other => state.step = other,
    }
    smallvec![Effect::None]
}

fn back_to_seats(state: &mut BookingState, env: &BookingEnvironment) -> Effects {
    if !matches!(state.step, Step::PassengerDetails { .. }) {
        return ignored(state, "back_to_seats");
    }
    let request = state.next_request_id();

    match std::mem::take(&mut state.step) {
        Step::PassengerDetails {
            params,
            flight,
            seats,
            ..
        } => {
            let flight_id = flight.id.clone();
            state.notice = None;
            state.step = Step::SelectSeats {
                params,
                flight,
                seat_map: SeatMap::Loading { request },
                selected: seats,
            };
            smallvec![fetch_seats(env, request, flight_id)]
        },
        other => {
            state.step = other;
            smallvec![Effect::None]
        },
    }
}

// ============================================================================
// Payment
// ============================================================================

fn submit_payment(
    state: &mut BookingState,
    payment: PaymentInfo,
    env: &BookingEnvironment,
) -> Effects {
    let (flight_id, passengers, seats) = match &state.step {
        Step::Payment {
            pending: Some(request),
            ..
        } => {
            tracing::debug!(%request, "Booking already in flight; ignoring duplicate submit");
            return smallvec![Effect::None];
        },
        Step::Payment {
            flight,
            seats,
            passengers,
            ..
        } => (flight.id.clone(), passengers.clone(), seats.clone()),
        _ => return ignored(state, "submit_payment"),
    };

    if let Err(error) = validate_payment(&payment) {
        return reject(state, &error);
    }

    let request = state.next_request_id();
    if let Step::Payment { pending, error, .. } = &mut state.step {
        *pending = Some(request);
        *error = None;
    }
    state.notice = None;
    tracing::info!(%request, %flight_id, seats = seats.len(), "Creating booking");

    let gateway = env.gateway();
    let body = CreateBookingRequest {
        flight_id,
        passengers,
        seats,
        payment,
    };
    smallvec![Effect::future(async move {
        match gateway.create_booking(&body).await {
            Ok(booking) => Some(BookingAction::BookingSucceeded { request, booking }),
            Err(error) => {
                tracing::warn!(%error, "Booking creation failed");
                Some(BookingAction::BookingFailed {
                    request,
                    message: error.user_message(),
                })
            },
        }
    })]
}

fn back_to_passengers(state: &mut BookingState) -> Effects {
    match std::mem::take(&mut state.step) {
        Step::Payment {
            params,
            flight,
            seats,
            passengers,
            pending: None,
            ..
        } => {
            state.notice = None;
            state.step = Step::PassengerDetails {
                params,
                flight,
                seats,
                prefill: Some(passengers),
            };
            smallvec![Effect::None]
        },
        other => {
            state.step = other;
            ignored(state, "back_to_passengers")
        },
    }
}

// ============================================================================
// Live prices
// ============================================================================

fn apply_price_update(
    state: &mut BookingState,
    update: PriceUpdate,
    env: &BookingEnvironment,
) -> Effects {
    let PriceUpdate {
        flight_id,
        new_price,
        ..
    } = update;

    let Some(held) = state.flights.iter_mut().find(|f| f.id == flight_id) else {
        tracing::trace!(%flight_id, "Price update for a flight not held; ignoring");
        return smallvec![Effect::None];
    };
    let previous = held.price;
    held.price = new_price;

    if let Some(selected) = state
        .step
        .repriceable_flight_mut()
        .filter(|selected| selected.id == flight_id)
    {
        selected.price = new_price;
    }

    if previous == new_price {
        return smallvec![Effect::None];
    }

    tracing::debug!(
        %flight_id,
        old_cents = previous.cents(),
        new_cents = new_price.cents(),
        "Price updated"
    );
    let generation = state.flash_price(flight_id.clone());
    smallvec![Effect::Delay {
        duration: env.price_flash(),
        action: Box::new(BookingAction::PriceFlashExpired {
            flight_id,
            generation,
        }),
    }]
}
