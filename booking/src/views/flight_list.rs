//! Flight list step: one card per held flight

use crate::flow::{BookingAction, BookingState, Step};
use crate::format;
use skybook_gateway::{Flight, FlightId};

/// One flight card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightCard {
    /// Flight to select when the card is clicked
    pub flight_id: FlightId,
    /// Airline name
    pub airline: String,
    /// Flight number (`AA100`)
    pub flight_number: String,
    /// Logo URL, if the airline has one
    pub logo: Option<String>,
    /// Badge shown when there is no logo (`AM`)
    pub badge: String,
    /// `08:00 AM`
    pub departure_time: String,
    /// `11:30 AM`
    pub arrival_time: String,
    /// Origin airport code
    pub origin_code: String,
    /// Origin city
    pub origin_city: String,
    /// Destination airport code
    pub destination_code: String,
    /// Destination city
    pub destination_city: String,
    /// `6h 30m`
    pub duration: String,
    /// `Non-stop` / `1 stop`
    pub stops: String,
    /// Layover airport codes, in order
    pub layovers: Vec<String>,
    /// Per-person fare (`$299.99`)
    pub price: String,
    /// Cabin class label
    pub cabin_class: &'static str,
    /// `42 seats left`
    pub seats_left: String,
    /// Price just changed; purely cosmetic
    pub price_updating: bool,
}

impl FlightCard {
    /// Build the card for `flight`
    #[must_use]
    pub fn new(flight: &Flight, price_updating: bool) -> Self {
        Self {
            flight_id: flight.id.clone(),
            airline: flight.airline.clone(),
            flight_number: flight.flight_number.clone(),
            logo: flight.logo().map(str::to_string),
            badge: format::airline_badge(&flight.airline),
            departure_time: format::time(&flight.departure_time),
            arrival_time: format::time(&flight.arrival_time),
            origin_code: flight.origin.code.clone(),
            origin_city: flight.origin.city.clone(),
            destination_code: flight.destination.code.clone(),
            destination_city: flight.destination.city.clone(),
            duration: format::duration(flight.duration),
            stops: format::stops(flight.stops),
            layovers: flight
                .layovers
                .iter()
                .flatten()
                .map(|airport| airport.code.clone())
                .collect(),
            price: format::price(flight.price, &flight.currency),
            cabin_class: flight.cabin_class.label(),
            seats_left: format::seats_left(flight.available_seats),
            price_updating,
        }
    }

    /// Action sent when the card is clicked
    #[must_use]
    pub fn select(&self) -> BookingAction {
        BookingAction::SelectFlight {
            flight_id: self.flight_id.clone(),
        }
    }
}

/// What the flight list step shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightListView {
    /// `2 flights found`
    pub heading: String,
    /// Cards in response order
    pub cards: Vec<FlightCard>,
}

impl FlightListView {
    /// View model for the current state, `None` on other steps
    #[must_use]
    pub fn from_state(state: &BookingState) -> Option<Self> {
        if !matches!(state.step, Step::SelectFlight { .. }) {
            return None;
        }

        let cards = state
            .flights
            .iter()
            .map(|flight| FlightCard::new(flight, state.is_price_updating(&flight.id)))
            .collect::<Vec<_>>();
        let heading = match cards.len() {
            1 => "1 flight found".to_string(),
            n => format!("{n} flights found"),
        };
        Some(Self { heading, cards })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use skybook_gateway::Airport;
    use skybook_testing::fixtures;

    fn state() -> BookingState {
        BookingState::with_step(
            Step::SelectFlight {
                params: fixtures::search_params(1),
            },
            vec![fixtures::flight("FL001", 29_999), fixtures::flight("FL002", 123_450)],
        )
    }

    #[test]
    fn cards_follow_list_order_and_format() {
        let view = FlightListView::from_state(&state()).unwrap();
        assert_eq!(view.heading, "2 flights found");

        let card = &view.cards[1];
        assert_eq!(card.flight_id, FlightId::from("FL002"));
        assert_eq!(card.price, "$1,234.50");
        assert_eq!(card.badge, "AM");
        assert_eq!(card.logo, None);
        assert_eq!(card.departure_time, "08:00 AM");
        assert_eq!(card.arrival_time, "11:30 AM");
        assert_eq!(card.duration, "6h 30m");
        assert_eq!(card.stops, "Non-stop");
        assert_eq!(card.seats_left, "42 seats left");
        assert_eq!(card.cabin_class, "Economy");
        assert!(!card.price_updating);
    }

    #[test]
    fn clicking_a_card_selects_its_flight() {
        let view = FlightListView::from_state(&state()).unwrap();
        assert_eq!(
            view.cards[0].select(),
            BookingAction::SelectFlight {
                flight_id: FlightId::from("FL001")
            }
        );
    }

    #[test]
    fn layovers_are_listed() {
        let mut flight = fixtures::flight("FL003", 10_000);
        flight.stops = 1;
        flight.layovers = Some(vec![Airport {
            code: "ORD".into(),
            name: "O'Hare".into(),
            city: "Chicago".into(),
            country: "USA".into(),
        }]);
        let card = FlightCard::new(&flight, true);
        assert_eq!(card.stops, "1 stop");
        assert_eq!(card.layovers, vec!["ORD"]);
        assert!(card.price_updating);
    }

    #[test]
    fn hidden_on_other_steps() {
        assert!(FlightListView::from_state(&BookingState::new()).is_none());
    }
}
