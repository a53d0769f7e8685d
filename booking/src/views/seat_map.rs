//! Seat selection step.
//!
//! [`SeatMapView`] holds the local selection set. Every accepted click yields the full
//! selection as a [`BookingAction::SeatSelectionChanged`]; the reducer re-checks it
//! before committing.

use crate::flow::validation::ValidationError;
use crate::flow::{BookingAction, BookingState, SeatMap, Step};
use crate::format;
use skybook_gateway::{Money, Seat, SeatId, SeatType};
use std::collections::BTreeMap;

/// Column after which the aisle gap is drawn
const AISLE_AFTER: char = 'C';

/// How a seat is drawn; also the legend entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeatState {
    /// Free to pick
    Available,
    /// In the local selection
    Selected,
    /// Taken
    Occupied,
}

impl SeatState {
    /// Legend entries, in display order
    pub const LEGEND: [(Self, &'static str); 3] = [
        (Self::Available, "Available"),
        (Self::Selected, "Selected"),
        (Self::Occupied, "Occupied"),
    ];
}

/// One seat as drawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatCell {
    /// Seat to toggle on click
    pub id: SeatId,
    /// `12A`
    pub label: String,
    /// Window, middle or aisle
    pub seat_type: SeatType,
    /// Drawn state
    pub state: SeatState,
    /// `Seat 12A - window`
    pub tooltip: String,
    /// Extra charge, when the seat has one
    pub extra_price: Option<String>,
}

/// A slot in a seat row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatSlot {
    /// A seat
    Seat(SeatCell),
    /// Gap between seat blocks
    Aisle,
}

/// One cabin row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatRow {
    /// Row number
    pub number: u32,
    /// Seats left to right, with aisle gaps
    pub slots: Vec<SeatSlot>,
}

/// Outcome of clicking a seat
#[derive(Debug, Clone, PartialEq)]
pub enum SeatClick {
    /// Selection changed; send this to the controller
    Changed(BookingAction),
    /// Selection full; show this notice
    Rejected(String),
    /// Occupied or unknown seat
    Ignored,
}

/// Seat map with its local selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatMapView {
    seats: Vec<Seat>,
    max_selections: u32,
    selected: Vec<SeatId>,
    currency: String,
    /// `American Airlines AA100 - JFK → LAX`
    pub heading: String,
    /// Seat map still loading
    pub loading: bool,
    /// Seat map failed to load; offer a retry
    pub error: Option<String>,
}

impl SeatMapView {
    /// View model for the current state, `None` on other steps
    ///
    /// The local selection starts from the step's committed selection.
    #[must_use]
    pub fn from_state(state: &BookingState) -> Option<Self> {
        let Step::SelectSeats {
            params,
            flight,
            seat_map,
            selected,
        } = &state.step
        else {
            return None;
        };

        let selected: Vec<SeatId> = selected.iter().map(|seat| seat.id.clone()).collect();
        let mut view = Self::new(seat_map.seats(), params.passengers, &selected);
        view.currency.clone_from(&flight.currency);
        view.heading = format!(
            "{} {} - {} → {}",
            flight.airline, flight.flight_number, flight.origin.code, flight.destination.code
        );
        view.loading = matches!(seat_map, SeatMap::Loading { .. });
        view.error = match seat_map {
            SeatMap::Failed { message } => Some(message.clone()),
            SeatMap::Loading { .. } | SeatMap::Loaded(_) => None,
        };
        Some(view)
    }

    /// A standalone seat map over `seats`
    #[must_use]
    pub fn new(seats: &[Seat], max_selections: u32, selected: &[SeatId]) -> Self {
        let mut seats = seats.to_vec();
        seats.sort_by_key(|seat| (seat.row, seat.column));
        Self {
            seats,
            max_selections,
            selected: selected.to_vec(),
            currency: "USD".to_string(),
            heading: String::new(),
            loading: false,
            error: None,
        }
    }

    /// Toggle `seat_id` in the local selection
    pub fn click(&mut self, seat_id: &SeatId) -> SeatClick {
        let Some(seat) = self.seats.iter().find(|seat| &seat.id == seat_id) else {
            return SeatClick::Ignored;
        };
        if seat.is_occupied() {
            return SeatClick::Ignored;
        }

        if let Some(position) = self.selected.iter().position(|id| id == seat_id) {
            self.selected.remove(position);
        } else if self.is_full() {
            let notice = ValidationError::SeatLimit {
                max: self.max_selections,
            };
            return SeatClick::Rejected(notice.to_string());
        } else {
            self.selected.push(seat_id.clone());
        }

        SeatClick::Changed(BookingAction::SeatSelectionChanged {
            seats: self.selected.clone(),
        })
    }

    fn is_full(&self) -> bool {
        usize::try_from(self.max_selections).is_ok_and(|max| self.selected.len() >= max)
    }

    fn state_of(&self, seat: &Seat) -> SeatState {
        if self.selected.contains(&seat.id) {
            SeatState::Selected
        } else if seat.is_occupied() {
            SeatState::Occupied
        } else {
            SeatState::Available
        }
    }

    /// Rows in ascending order, seats by column, with an aisle after column C
    #[must_use]
    pub fn rows(&self) -> Vec<SeatRow> {
        let mut rows: BTreeMap<u32, Vec<&Seat>> = BTreeMap::new();
        for seat in &self.seats {
            rows.entry(seat.row).or_default().push(seat);
        }

        rows.into_iter()
            .map(|(number, seats)| {
                let mut slots = Vec::with_capacity(seats.len() + 1);
                for (index, seat) in seats.iter().enumerate() {
                    slots.push(SeatSlot::Seat(self.cell(seat)));
                    if seat.column == AISLE_AFTER && index + 1 < seats.len() {
                        slots.push(SeatSlot::Aisle);
                    }
                }
                SeatRow { number, slots }
            })
            .collect()
    }

    fn cell(&self, seat: &Seat) -> SeatCell {
        let label = seat.label();
        SeatCell {
            id: seat.id.clone(),
            tooltip: format!("Seat {label} - {}", seat.seat_type),
            label,
            seat_type: seat.seat_type,
            state: self.state_of(seat),
            extra_price: seat
                .price
                .filter(|price| *price > Money::ZERO)
                .map(|price| format::price(price, &self.currency)),
        }
    }

    /// `Selected: 1 / 2`
    #[must_use]
    pub fn summary(&self) -> String {
        format!("Selected: {} / {}", self.selected.len(), self.max_selections)
    }

    /// Selected labels in click order (`12A, 12B`)
    #[must_use]
    pub fn selected_labels(&self) -> String {
        self.selected
            .iter()
            .filter_map(|id| self.seats.iter().find(|seat| &seat.id == id))
            .map(Seat::label)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Continue is offered only once the selection is complete
    #[must_use]
    pub fn can_continue(&self) -> bool {
        !self.loading
            && usize::try_from(self.max_selections).is_ok_and(|max| self.selected.len() == max)
    }
}
