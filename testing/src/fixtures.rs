//! Test data builders for the booking domain

#![allow(clippy::expect_used)] // Hardcoded fixture data

use chrono::{DateTime, NaiveDate};
use skybook_gateway::{
    Airport, BillingAddress, Booking, BookingId, BookingStatus, CabinClass, CreateBookingRequest,
    Flight, FlightId, Money, Passenger, PaymentInfo, PriceUpdate, SearchParams, Seat, SeatId,
    SeatStatus, SeatType, Title,
};

/// JFK → LAX search for `passengers` travellers in economy
///
/// # Panics
///
/// Never; the dates are hardcoded.
#[must_use]
pub fn search_params(passengers: u32) -> SearchParams {
    SearchParams {
        origin: "JFK".into(),
        destination: "LAX".into(),
        departure_date: NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date"),
        return_date: None,
        passengers,
        cabin_class: CabinClass::Economy,
    }
}

/// Airport fixture
#[must_use]
pub fn airport(code: &str, city: &str) -> Airport {
    Airport {
        code: code.into(),
        name: format!("{city} International"),
        city: city.into(),
        country: "USA".into(),
    }
}

/// Non-stop JFK → LAX flight priced at `price_cents` USD
///
/// # Panics
///
/// Never; the timestamps are hardcoded.
#[must_use]
pub fn flight(id: &str, price_cents: u64) -> Flight {
    Flight {
        id: FlightId::from(id),
        flight_number: "AA100".into(),
        airline: "American Airlines".into(),
        airline_logo: None,
        origin: airport("JFK", "New York"),
        destination: airport("LAX", "Los Angeles"),
        departure_time: DateTime::parse_from_rfc3339("2025-03-14T08:00:00-05:00")
            .expect("valid timestamp"),
        arrival_time: DateTime::parse_from_rfc3339("2025-03-14T11:30:00-08:00")
            .expect("valid timestamp"),
        duration: 390,
        price: Money::from_cents(price_cents),
        currency: "USD".into(),
        stops: 0,
        layovers: None,
        available_seats: 42,
        cabin_class: CabinClass::Economy,
    }
}

/// A seat; `label` is `{row}{column}` (`12A`)
///
/// Columns A/F are windows, C/D aisles, the rest middles.
///
/// # Panics
///
/// Panics if `label` is not a row number followed by one column letter.
#[must_use]
pub fn seat(label: &str, status: SeatStatus, price_cents: Option<u64>) -> Seat {
    let column = label.chars().last().expect("seat label has a column");
    let row = label[..label.len() - column.len_utf8()]
        .parse()
        .expect("seat label starts with a row number");

    Seat {
        id: SeatId::new(format!("seat-{label}")),
        row,
        column,
        seat_type: match column {
            'A' | 'F' => SeatType::Window,
            'C' | 'D' => SeatType::Aisle,
            _ => SeatType::Middle,
        },
        status,
        price: price_cents.map(Money::from_cents),
    }
}

/// A full `rows` × A–F cabin; labels in `occupied` are taken, window seats cost $25 extra
#[must_use]
pub fn seat_grid(rows: u32, occupied: &[&str]) -> Vec<Seat> {
    (1..=rows)
        .flat_map(|row| ['A', 'B', 'C', 'D', 'E', 'F'].map(move |column| format!("{row}{column}")))
        .map(|label| {
            let status = if occupied.contains(&label.as_str()) {
                SeatStatus::Occupied
            } else {
                SeatStatus::Available
            };
            let extra = matches!(label.chars().last(), Some('A' | 'F')).then_some(2_500);
            seat(&label, status, extra)
        })
        .collect()
}

/// Fully filled passenger; index 0 carries contact details
#[must_use]
pub fn passenger(index: usize) -> Passenger {
    Passenger {
        id: format!("passenger-{}", index + 1),
        title: Title::Mr,
        first_name: format!("Traveller{}", index + 1),
        last_name: "Smith".into(),
        date_of_birth: "1985-06-15".into(),
        email: (index == 0).then(|| "lead@example.com".to_string()),
        phone: (index == 0).then(|| "+1 555 0100".to_string()),
        passport_number: format!("P{:07}", index + 1),
        nationality: Some("US".into()),
    }
}

/// Filled, valid payment form
#[must_use]
pub fn payment() -> PaymentInfo {
    PaymentInfo {
        card_number: "4111 1111 1111 1111".into(),
        card_holder: "Lead Smith".into(),
        expiry_date: "12/27".into(),
        cvv: "123".into(),
        billing_address: BillingAddress {
            street: "1 Main St".into(),
            city: "New York".into(),
            state: "NY".into(),
            zip_code: "10001".into(),
            country: "USA".into(),
        },
    }
}

/// The booking a server would return for `request`
///
/// # Panics
///
/// Never; the timestamp is hardcoded.
#[must_use]
pub fn booking_for(request: &CreateBookingRequest, total: Money) -> Booking {
    Booking {
        id: BookingId::from("BK-1001"),
        flight_id: request.flight_id.clone(),
        passengers: request.passengers.clone(),
        seats: request.seats.clone(),
        total_price: total,
        currency: "USD".into(),
        status: BookingStatus::Confirmed,
        booking_reference: "SKY4F2A9".into(),
        created_at: DateTime::parse_from_rfc3339("2025-03-01T12:00:00Z").expect("valid timestamp"),
    }
}

/// A confirmed booking with one passenger and seat 12A
#[must_use]
pub fn booking() -> Booking {
    let request = CreateBookingRequest {
        flight_id: FlightId::from("FL001"),
        passengers: vec![passenger(0)],
        seats: vec![seat("12A", SeatStatus::Selected, None)],
        payment: payment(),
    };
    booking_for(&request, Money::from_cents(29_999))
}

/// Price update for `flight_id`
///
/// # Panics
///
/// Never; the timestamp is hardcoded.
#[must_use]
pub fn price_update(flight_id: &str, new_price_cents: u64) -> PriceUpdate {
    PriceUpdate {
        flight_id: FlightId::from(flight_id),
        new_price: Money::from_cents(new_price_cents),
        timestamp: DateTime::parse_from_rfc3339("2025-03-01T12:00:00Z").expect("valid timestamp"),
    }
}
