//! Confirmation step: read-only booking summary

use crate::flow::{BookingAction, BookingState, Step};
use skybook_gateway::Seat;

/// What the confirmation step shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationView {
    /// `Booking Confirmed!`
    pub title: &'static str,
    /// Server-assigned booking id
    pub booking_id: String,
    /// Reference the traveller quotes (`SKY4F2A9`)
    pub booking_reference: String,
    /// `American Airlines AA100`
    pub flight: String,
    /// `New York → Los Angeles`
    pub route: String,
    /// `Passengers: 2`
    pub passengers: String,
    /// `Seats: 1A, 2C`
    pub seats: String,
}

impl ConfirmationView {
    /// View model for the current state, `None` on other steps
    #[must_use]
    pub fn from_state(state: &BookingState) -> Option<Self> {
        let Step::Confirmation {
            flight,
            seats,
            passengers,
            booking,
            ..
        } = &state.step
        else {
            return None;
        };

        let mut seats: Vec<&Seat> = seats.iter().collect();
        seats.sort_by_key(|seat| (seat.row, seat.column));
        let labels = seats.iter().map(|seat| seat.label()).collect::<Vec<_>>();

        Some(Self {
            title: "Booking Confirmed!",
            booking_id: booking.id.to_string(),
            booking_reference: booking.booking_reference.clone(),
            flight: format!("{} {}", flight.airline, flight.flight_number),
            route: format!("{} → {}", flight.origin.city, flight.destination.city),
            passengers: format!("Passengers: {}", passengers.len()),
            seats: format!("Seats: {}", labels.join(", ")),
        })
    }

    /// `Book Another Flight`
    #[must_use]
    pub const fn book_another_label() -> &'static str {
        "Book Another Flight"
    }

    /// Action for the reset button
    #[must_use]
    pub const fn book_another() -> BookingAction {
        BookingAction::BookAnother
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::flow::{BookingEnvironment, BookingReducer, RequestId, total_price};
    use skybook_core::reducer::Reducer;
    use skybook_gateway::{CreateBookingRequest, SeatStatus};
    use skybook_testing::{MockGateway, fixtures, test_clock};
    use std::sync::Arc;

    #[test]
    fn booking_round_trips_to_confirmation() {
        let flight = fixtures::flight("FL001", 29_999);
        let seats = vec![
            fixtures::seat("12C", SeatStatus::Available, None),
            fixtures::seat("2F", SeatStatus::Available, Some(2_500)),
            fixtures::seat("12A", SeatStatus::Available, Some(2_500)),
        ];
        let passengers: Vec<_> = (0..3).map(fixtures::passenger).collect();
        let request = RequestId::new(7);
        let mut state = BookingState::with_step(
            Step::Payment {
                params: fixtures::search_params(3),
                flight: flight.clone(),
                seats: seats.clone(),
                passengers: passengers.clone(),
                pending: Some(request),
                error: None,
            },
            vec![flight.clone()],
        );

        let booking = fixtures::booking_for(
            &CreateBookingRequest {
                flight_id: flight.id.clone(),
                passengers,
                seats: seats.clone(),
                payment: fixtures::payment(),
            },
            total_price(&flight, 3, &seats),
        );
        let env = BookingEnvironment::new(Arc::new(MockGateway::new()), Arc::new(test_clock()));
        let _ = BookingReducer::new().reduce(
            &mut state,
            BookingAction::BookingSucceeded { request, booking },
            &env,
        );

        let view = ConfirmationView::from_state(&state).unwrap();
        assert_eq!(view.title, "Booking Confirmed!");
        assert_eq!(view.booking_id, "BK-1001");
        assert_eq!(view.booking_reference, "SKY4F2A9");
        assert_eq!(view.flight, "American Airlines AA100");
        assert_eq!(view.passengers, "Passengers: 3");
        assert_eq!(view.seats, "Seats: 2F, 12A, 12C");
        assert_eq!(ConfirmationView::book_another(), BookingAction::BookAnother);
    }

    #[test]
    fn hidden_before_booking() {
        assert!(ConfirmationView::from_state(&BookingState::new()).is_none());
    }
}
