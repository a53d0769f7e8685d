//! View models for each wizard step.
//!
//! Every view is derived from a [`BookingState`] snapshot plus, for the form steps, its own
//! uncommitted draft. Views never mutate flow state; they hand back [`BookingAction`]s for
//! the controller to send.
//!
//! [`BookingAction`]: crate::flow::BookingAction

pub mod confirmation;
pub mod flight_list;
pub mod passenger;
pub mod payment;
pub mod search;
pub mod seat_map;

pub use confirmation::ConfirmationView;
pub use flight_list::{FlightCard, FlightListView};
pub use passenger::PassengerForm;
pub use payment::{PaymentForm, PaymentView};
pub use search::{SearchDraft, SearchView};
pub use seat_map::{SeatCell, SeatClick, SeatMapView, SeatRow, SeatSlot, SeatState};

use crate::flow::{BookingState, StepKind};

/// The view for whichever step is current
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepView {
    /// Search form
    Search(SearchView),
    /// Flight cards
    FlightList(FlightListView),
    /// Seat grid
    SeatMap(SeatMapView),
    /// Passenger forms
    Passengers(PassengerForm),
    /// Payment form
    Payment(PaymentView),
    /// Booking summary
    Confirmation(ConfirmationView),
}

impl StepView {
    /// Route `state` to its step's view
    #[must_use]
    pub fn from_state(state: &BookingState) -> Option<Self> {
        match state.step.kind() {
            StepKind::Search => SearchView::from_state(state).map(Self::Search),
            StepKind::SelectFlight => FlightListView::from_state(state).map(Self::FlightList),
            StepKind::SelectSeats => SeatMapView::from_state(state).map(Self::SeatMap),
            StepKind::PassengerDetails => PassengerForm::from_state(state).map(Self::Passengers),
            StepKind::Payment => PaymentView::from_state(state).map(Self::Payment),
            StepKind::Confirmation => ConfirmationView::from_state(state).map(Self::Confirmation),
        }
    }
}
