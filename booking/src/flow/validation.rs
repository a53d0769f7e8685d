//! Step guards.
//!
//! Guard failures block a transition locally and never reach the network. Their
//! `Display` text is the notice shown to the user.

use chrono::NaiveDate;
use skybook_gateway::{Passenger, PaymentInfo, SearchParams};
use thiserror::Error;

/// Fewest travellers a search may ask for
pub const MIN_PASSENGERS: u32 = 1;
/// Most travellers a search may ask for
pub const MAX_PASSENGERS: u32 = 8;

/// A step guard rejected the input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required search or payment field is blank
    #[error("{0} is required")]
    Required(&'static str),

    /// A date field that is not `YYYY-MM-DD`
    #[error("{0} must be a date (YYYY-MM-DD)")]
    InvalidDate(&'static str),

    /// Passenger count outside `MIN_PASSENGERS..=MAX_PASSENGERS`
    #[error("Passengers must be between {MIN_PASSENGERS} and {MAX_PASSENGERS}")]
    PassengerCount(u32),

    /// Departure date earlier than today
    #[error("Departure date cannot be in the past")]
    DepartureInPast,

    /// Return date earlier than departure
    #[error("Return date cannot be before the departure date")]
    ReturnBeforeDeparture,

    /// Seat confirm with the wrong number of seats
    #[error("Please select {required} seat(s)")]
    SeatCount {
        /// Seats the search asked for
        required: u32,
        /// Seats currently selected
        selected: usize,
    },

    /// Seat confirm before the seat map has arrived
    #[error("Seat map is still loading")]
    SeatMapLoading,

    /// Seat confirm after the seat map failed to load
    #[error("Seat map could not be loaded. Please retry.")]
    SeatMapFailed,

    /// Selecting beyond the passenger count
    #[error("You can only select {max} seat(s)")]
    SeatLimit {
        /// Passenger count
        max: u32,
    },

    /// A seat that is occupied or not on the map
    #[error("Seat {0} is not available")]
    SeatUnavailable(String),

    /// Number of passenger records differs from the search
    #[error("Expected {expected} passenger(s), got {actual}")]
    PassengerList {
        /// Passenger count of the search
        expected: u32,
        /// Records submitted
        actual: usize,
    },

    /// A required passenger field is blank
    #[error("Passenger {number}: {field} is required")]
    PassengerField {
        /// 1-based passenger number
        number: usize,
        /// Field label
        field: &'static str,
    },
}

// Search endpoints only; whitespace alone counts as missing
fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Search guard: endpoints present, passenger count in range, departure not before
/// `today`, return not before departure
///
/// # Errors
///
/// Returns the first failing rule.
pub fn validate_search(params: &SearchParams, today: NaiveDate) -> Result<(), ValidationError> {
    if blank(&params.origin) {
        return Err(ValidationError::Required("Origin"));
    }
    if blank(&params.destination) {
        return Err(ValidationError::Required("Destination"));
    }
    if !(MIN_PASSENGERS..=MAX_PASSENGERS).contains(&params.passengers) {
        return Err(ValidationError::PassengerCount(params.passengers));
    }
    if params.departure_date < today {
        return Err(ValidationError::DepartureInPast);
    }
    if params
        .return_date
        .is_some_and(|ret| ret < params.departure_date)
    {
        return Err(ValidationError::ReturnBeforeDeparture);
    }
    Ok(())
}

/// Seat confirm guard: exactly one seat per passenger
///
/// # Errors
///
/// Returns [`ValidationError::SeatCount`] when the counts differ.
pub fn validate_seat_count(selected: usize, required: u32) -> Result<(), ValidationError> {
    if u32::try_from(selected).ok() == Some(required) {
        Ok(())
    } else {
        Err(ValidationError::SeatCount { required, selected })
    }
}

/// Passenger guard
///
/// Every passenger needs first name, last name, date of birth and passport number; the
/// first passenger also needs email and phone.
///
/// A field passes when it is non-empty; whitespace is left to the server.
///
/// # Errors
///
/// Returns the first failing passenger and field.
pub fn validate_passengers(
    passengers: &[Passenger],
    expected: u32,
) -> Result<(), ValidationError> {
    if u32::try_from(passengers.len()).ok() != Some(expected) {
        return Err(ValidationError::PassengerList {
            expected,
            actual: passengers.len(),
        });
    }

    for (index, passenger) in passengers.iter().enumerate() {
        let number = index + 1;
        let missing = |field| ValidationError::PassengerField { number, field };

        if passenger.first_name.is_empty() {
            return Err(missing("first name"));
        }
        if passenger.last_name.is_empty() {
            return Err(missing("last name"));
        }
        if passenger.date_of_birth.is_empty() {
            return Err(missing("date of birth"));
        }
        if passenger.passport_number.is_empty() {
            return Err(missing("passport number"));
        }
        if index == 0 {
            if passenger.email.as_deref().is_none_or(str::is_empty) {
                return Err(missing("email"));
            }
            if passenger.phone.as_deref().is_none_or(str::is_empty) {
                return Err(missing("phone"));
            }
        }
    }
    Ok(())
}

/// Payment guard: every card and billing field filled in
///
/// # Errors
///
/// Returns the first blank field.
pub fn validate_payment(payment: &PaymentInfo) -> Result<(), ValidationError> {
    let address = &payment.billing_address;
    let fields = [
        ("Card number", payment.card_number.as_str()),
        ("Cardholder name", payment.card_holder.as_str()),
        ("Expiry date", payment.expiry_date.as_str()),
        ("CVV", payment.cvv.as_str()),
        ("Street", address.street.as_str()),
        ("City", address.city.as_str()),
        ("State", address.state.as_str()),
        ("ZIP code", address.zip_code.as_str()),
        ("Country", address.country.as_str()),
    ];

    match fields.into_iter().find(|(_, value)| value.is_empty()) {
        Some((label, _)) => Err(ValidationError::Required(label)),
        None => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use skybook_testing::fixtures;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn search_rules() {
        assert_eq!(validate_search(&fixtures::search_params(2), today()), Ok(()));

        let mut params = fixtures::search_params(1);
        params.origin = "  ".into();
        assert_eq!(validate_search(&params, today()), Err(ValidationError::Required("Origin")));

        let mut params = fixtures::search_params(9);
        assert_eq!(validate_search(&params, today()), Err(ValidationError::PassengerCount(9)));
        params.passengers = 0;
        assert_eq!(validate_search(&params, today()), Err(ValidationError::PassengerCount(0)));

        let mut params = fixtures::search_params(1);
        params.return_date = NaiveDate::from_ymd_opt(2025, 3, 13);
        assert_eq!(
            validate_search(&params, today()),
            Err(ValidationError::ReturnBeforeDeparture)
        );
        params.return_date = Some(params.departure_date);
        assert_eq!(validate_search(&params, today()), Ok(()));
    }

    #[test]
    fn departure_may_be_today_but_not_earlier() {
        let mut params = fixtures::search_params(1);
        params.departure_date = today();
        assert_eq!(validate_search(&params, today()), Ok(()));
        params.departure_date = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        assert_eq!(
            validate_search(&params, today()),
            Err(ValidationError::DepartureInPast)
        );
    }

    #[test]
    fn seat_count_message_names_required_count() {
        let err = validate_seat_count(1, 2).unwrap_err();
        assert_eq!(err.to_string(), "Please select 2 seat(s)");
        assert_eq!(validate_seat_count(2, 2), Ok(()));
    }

    #[test]
    fn first_passenger_needs_contact_details() {
        let mut passengers = vec![fixtures::passenger(0), fixtures::passenger(1)];
        assert_eq!(validate_passengers(&passengers, 2), Ok(()));

        passengers[0].phone = Some(String::new());
        assert_eq!(
            validate_passengers(&passengers, 2).unwrap_err().to_string(),
            "Passenger 1: phone is required"
        );
    }

    #[test]
    fn later_passengers_need_no_contact_details() {
        let mut passengers = vec![fixtures::passenger(0), fixtures::passenger(1)];
        passengers[1].email = None;
        passengers[1].passport_number.clear();
        assert_eq!(
            validate_passengers(&passengers, 2),
            Err(ValidationError::PassengerField {
                number: 2,
                field: "passport number"
            })
        );
    }

    #[test]
    fn whitespace_counts_as_filled_for_passengers_and_payment() {
        let mut passengers = vec![fixtures::passenger(0)];
        passengers[0].first_name = " ".into();
        passengers[0].phone = Some("  ".into());
        assert_eq!(validate_passengers(&passengers, 1), Ok(()));

        let mut payment = fixtures::payment();
        payment.billing_address.state = " ".into();
        assert_eq!(validate_payment(&payment), Ok(()));
    }

    #[test]
    fn passenger_list_must_match_search() {
        assert_eq!(
            validate_passengers(&[fixtures::passenger(0)], 2),
            Err(ValidationError::PassengerList {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn payment_fields_are_required() {
        assert_eq!(validate_payment(&fixtures::payment()), Ok(()));

        let mut payment = fixtures::payment();
        payment.billing_address.zip_code.clear();
        assert_eq!(
            validate_payment(&payment),
            Err(ValidationError::Required("ZIP code"))
        );
    }
}
