//! Search step: form draft and view model

use crate::flow::validation::{MAX_PASSENGERS, MIN_PASSENGERS, ValidationError};
use crate::flow::{BookingAction, BookingState, Step};
use chrono::NaiveDate;
use skybook_gateway::{CabinClass, SearchParams};

/// Uncommitted search form input
///
/// Dates are kept as typed (`YYYY-MM-DD`) and only parsed on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDraft {
    /// Origin airport
    pub origin: String,
    /// Destination airport
    pub destination: String,
    /// Departure date as typed
    pub departure_date: String,
    /// Return date as typed; blank for one-way
    pub return_date: String,
    /// Travellers, always within `MIN_PASSENGERS..=MAX_PASSENGERS`
    passengers: u32,
    /// Cabin class
    pub cabin_class: CabinClass,
}

impl Default for SearchDraft {
    fn default() -> Self {
        Self {
            origin: String::new(),
            destination: String::new(),
            departure_date: String::new(),
            return_date: String::new(),
            passengers: MIN_PASSENGERS,
            cabin_class: CabinClass::Economy,
        }
    }
}

impl SearchDraft {
    /// Empty draft: one passenger, economy
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected passenger count
    #[must_use]
    pub const fn passengers(&self) -> u32 {
        self.passengers
    }

    /// Pick a passenger count; out-of-range values are clamped to the selectable range
    pub fn set_passengers(&mut self, passengers: u32) {
        self.passengers = passengers.clamp(MIN_PASSENGERS, MAX_PASSENGERS);
    }

    /// Options for the passenger selector (`1 Passenger`, `2 Passengers`, ...)
    #[must_use]
    pub fn passenger_options() -> Vec<(u32, String)> {
        (MIN_PASSENGERS..=MAX_PASSENGERS)
            .map(|n| {
                let noun = if n == 1 { "Passenger" } else { "Passengers" };
                (n, format!("{n} {noun}"))
            })
            .collect()
    }

    /// Options for the class selector
    #[must_use]
    pub fn class_options() -> Vec<(CabinClass, &'static str)> {
        CabinClass::ALL.iter().map(|c| (*c, c.label())).collect()
    }

    /// Parse the draft into search parameters
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for blank required fields, unparseable dates, or a
    /// return date before departure.
    pub fn to_params(&self) -> Result<SearchParams, ValidationError> {
        let origin = self.origin.trim();
        if origin.is_empty() {
            return Err(ValidationError::Required("Origin"));
        }
        let destination = self.destination.trim();
        if destination.is_empty() {
            return Err(ValidationError::Required("Destination"));
        }
        let departure_date = match self.departure_date.trim() {
            "" => return Err(ValidationError::Required("Departure date")),
            raw => parse_date(raw, "Departure date")?,
        };
        let return_date = match self.return_date.trim() {
            "" => None,
            raw => Some(parse_date(raw, "Return date")?),
        };
        if return_date.is_some_and(|ret| ret < departure_date) {
            return Err(ValidationError::ReturnBeforeDeparture);
        }

        Ok(SearchParams {
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_date,
            return_date,
            passengers: self.passengers,
            cabin_class: self.cabin_class,
        })
    }

    /// The action to send for this draft
    ///
    /// # Errors
    ///
    /// See [`SearchDraft::to_params`].
    pub fn submit(&self) -> Result<BookingAction, ValidationError> {
        self.to_params()
            .map(|params| BookingAction::SubmitSearch { params })
    }
}

fn parse_date(raw: &str, field: &'static str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate(field))
}

/// What the search step shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchView {
    /// Inputs and submit disabled while a search is in flight
    pub busy: bool,
    /// Submit button text
    pub submit_label: &'static str,
    /// Failure of the last search
    pub error: Option<String>,
}

impl SearchView {
    /// View model for the current state, `None` on other steps
    #[must_use]
    pub fn from_state(state: &BookingState) -> Option<Self> {
        let Step::Search { pending, error } = &state.step else {
            return None;
        };
        let busy = pending.is_some();
        Some(Self {
            busy,
            submit_label: if busy { "Searching..." } else { "Search Flights" },
            error: error.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::flow::{PendingSearch, RequestId};
    use skybook_testing::fixtures;

    fn filled() -> SearchDraft {
        let mut draft = SearchDraft::new();
        draft.origin = " JFK ".into();
        draft.destination = "LAX".into();
        draft.departure_date = "2025-03-14".into();
        draft.set_passengers(2);
        draft
    }

    #[test]
    fn draft_becomes_submit_action() {
        let action = filled().submit().unwrap();
        assert_eq!(
            action,
            BookingAction::SubmitSearch {
                params: fixtures::search_params(2)
            }
        );
    }

    #[test]
    fn passenger_count_is_clamped() {
        let mut draft = SearchDraft::new();
        draft.set_passengers(12);
        assert_eq!(draft.passengers(), 8);
        draft.set_passengers(0);
        assert_eq!(draft.passengers(), 1);

        let options = SearchDraft::passenger_options();
        assert_eq!(options.len(), 8);
        assert_eq!(options[0].1, "1 Passenger");
        assert_eq!(options[7].1, "8 Passengers");
    }

    #[test]
    fn dates_are_checked() {
        let mut draft = filled();
        draft.departure_date = "14/03/2025".into();
        assert_eq!(
            draft.submit(),
            Err(ValidationError::InvalidDate("Departure date"))
        );

        let mut draft = filled();
        draft.return_date = "2025-03-10".into();
        assert_eq!(draft.submit(), Err(ValidationError::ReturnBeforeDeparture));

        let mut draft = filled();
        draft.departure_date.clear();
        assert_eq!(
            draft.submit(),
            Err(ValidationError::Required("Departure date"))
        );
    }

    #[test]
    fn view_is_busy_while_searching() {
        let idle = SearchView::from_state(&BookingState::new()).unwrap();
        assert!(!idle.busy);
        assert_eq!(idle.submit_label, "Search Flights");

        let searching = BookingState::with_step(
            Step::Search {
                pending: Some(PendingSearch {
                    request: RequestId::new(1),
                    params: fixtures::search_params(1),
                }),
                error: None,
            },
            Vec::new(),
        );
        let busy = SearchView::from_state(&searching).unwrap();
        assert!(busy.busy);
        assert_eq!(busy.submit_label, "Searching...");
    }
}
