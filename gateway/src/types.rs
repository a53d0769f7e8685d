//! Wire data model shared by the HTTP gateway, the price feed and the booking flow.
//!
//! JSON field names are camelCase; see the `serde` attributes.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from any string
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the id as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a flight
    FlightId
);
string_id!(
    /// Unique identifier for a seat on a flight
    SeatId
);
string_id!(
    /// Internal booking id (distinct from the human-readable booking reference)
    BookingId
);

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// A non-negative amount in minor units (cents)
///
/// Serialized as a decimal number (`299.99`), the way the API sends prices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Money(u64);

impl Money {
    /// Zero
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Returns the whole units (rounded down)
    #[must_use]
    pub const fn whole(&self) -> u64 {
        self.0 / 100
    }

    /// Returns the cents part (`0..100`)
    #[must_use]
    pub const fn fraction(&self) -> u64 {
        self.0 % 100
    }

    /// Adds two amounts, saturating at the maximum
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Multiplies by a quantity, saturating at the maximum
    #[must_use]
    pub const fn saturating_mul(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as u64))
    }
}

/// Error for decimal amounts that cannot be represented as [`Money`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid amount: {0}")]
pub struct InvalidAmount(pub f64);

impl TryFrom<f64> for Money {
    type Error = InvalidAmount;

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn try_from(amount: f64) -> Result<Self, Self::Error> {
        let cents = (amount * 100.0).round();
        if !cents.is_finite() || cents < 0.0 || cents > u64::MAX as f64 {
            return Err(InvalidAmount(amount));
        }
        Ok(Self(cents as u64))
    }
}

impl From<Money> for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from(money: Money) -> Self {
        money.0 as f64 / 100.0
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

// ============================================================================
// Flights
// ============================================================================

/// Fare tier, fixed per search
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CabinClass {
    /// Economy
    #[default]
    Economy,
    /// Business
    Business,
    /// First
    First,
}

impl CabinClass {
    /// All cabin classes, in display order
    pub const ALL: [Self; 3] = [Self::Economy, Self::Business, Self::First];

    /// Display label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Economy => "Economy",
            Self::Business => "Business",
            Self::First => "First Class",
        }
    }
}

/// An airport
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    /// IATA code (`JFK`)
    pub code: String,
    /// Airport name
    pub name: String,
    /// City
    pub city: String,
    /// Country
    pub country: String,
}

/// A flight offer from a search result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    /// Flight id
    pub id: FlightId,
    /// Marketing flight number (`AA100`)
    pub flight_number: String,
    /// Airline name
    pub airline: String,
    /// Logo URL; the API sends an empty string when there is none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline_logo: Option<String>,
    /// Departure airport
    pub origin: Airport,
    /// Arrival airport
    pub destination: Airport,
    /// Departure time, in the departure airport's offset
    pub departure_time: DateTime<FixedOffset>,
    /// Arrival time, in the arrival airport's offset
    pub arrival_time: DateTime<FixedOffset>,
    /// Duration in minutes
    pub duration: u32,
    /// Fare per passenger; replaced by price updates
    pub price: Money,
    /// ISO currency code
    pub currency: String,
    /// Number of stops
    pub stops: u32,
    /// Layover airports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layovers: Option<Vec<Airport>>,
    /// Seats still for sale
    pub available_seats: u32,
    /// Cabin class of this offer
    #[serde(rename = "class")]
    pub cabin_class: CabinClass,
}

impl Flight {
    /// Logo URL, if the API sent a non-empty one
    #[must_use]
    pub fn logo(&self) -> Option<&str> {
        self.airline_logo.as_deref().filter(|logo| !logo.is_empty())
    }
}

/// Search request body
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Origin airport code
    pub origin: String,
    /// Destination airport code
    pub destination: String,
    /// Outbound date
    pub departure_date: NaiveDate,
    /// Return date for round trips
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    /// Passenger count (at least one)
    pub passengers: u32,
    /// Cabin class
    #[serde(rename = "class")]
    pub cabin_class: CabinClass,
}

// ============================================================================
// Seats
// ============================================================================

/// Seat position in the row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatType {
    /// Window seat
    Window,
    /// Middle seat
    Middle,
    /// Aisle seat
    Aisle,
}

impl fmt::Display for SeatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Window => "window",
            Self::Middle => "middle",
            Self::Aisle => "aisle",
        })
    }
}

/// Seat availability
///
/// The server only reports `available` and `occupied`; `selected` is a client-side
/// projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    /// Free
    Available,
    /// Taken
    Occupied,
    /// Chosen by this client
    Selected,
}

/// A seat on a flight
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// Seat id
    pub id: SeatId,
    /// Row number, starting at 1
    pub row: u32,
    /// Column letter
    pub column: char,
    /// Position
    #[serde(rename = "type")]
    pub seat_type: SeatType,
    /// Availability
    pub status: SeatStatus,
    /// Extra charge for the seat
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
}

impl Seat {
    /// Seat label (`12A`)
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}{}", self.row, self.column)
    }

    /// Extra charge, zero when the seat has none
    #[must_use]
    pub fn extra_price(&self) -> Money {
        self.price.unwrap_or(Money::ZERO)
    }

    /// Returns true if the server reports the seat as taken
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.status == SeatStatus::Occupied
    }
}

// ============================================================================
// Passengers & Payment
// ============================================================================

/// Passenger title
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Title {
    /// Mr
    #[default]
    Mr,
    /// Mrs
    Mrs,
    /// Ms
    Ms,
    /// Dr
    Dr,
}

impl Title {
    /// All titles, in display order
    pub const ALL: [Self; 4] = [Self::Mr, Self::Mrs, Self::Ms, Self::Dr];
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mr => "Mr",
            Self::Mrs => "Mrs",
            Self::Ms => "Ms",
            Self::Dr => "Dr",
        })
    }
}

/// A travelling passenger
///
/// Only the first passenger of a booking carries `email` and `phone`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    /// Client-assigned id (`passenger-1`)
    pub id: String,
    /// Title
    pub title: Title,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Date of birth (`YYYY-MM-DD`)
    pub date_of_birth: String,
    /// Contact email (first passenger only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone (first passenger only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Passport number
    #[serde(default)]
    pub passport_number: String,
    /// Nationality
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
}

/// Billing address of the card holder
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingAddress {
    /// Street
    pub street: String,
    /// City
    pub city: String,
    /// State
    pub state: String,
    /// Postal code
    pub zip_code: String,
    /// Country
    pub country: String,
}

/// Card details sent with a booking request
///
/// Never stored in flow state. `Debug` redacts everything but the last four digits.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    /// Card number, as typed (space-grouped)
    pub card_number: String,
    /// Name on the card
    pub card_holder: String,
    /// Expiry (`MM/YY`)
    pub expiry_date: String,
    /// Security code
    pub cvv: String,
    /// Billing address
    pub billing_address: BillingAddress,
}

impl fmt::Debug for PaymentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits: Vec<char> = self.card_number.chars().filter(char::is_ascii_digit).collect();
        let last_four: String = digits[digits.len().saturating_sub(4)..].iter().collect();

        f.debug_struct("PaymentInfo")
            .field("card_number", &format_args!("**** {last_four}"))
            .field("card_holder", &self.card_holder)
            .field("expiry_date", &"<redacted>")
            .field("cvv", &"<redacted>")
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// Booking lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting confirmation
    Pending,
    /// Confirmed
    Confirmed,
    /// Cancelled
    Cancelled,
}

/// Body of `POST /bookings`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Flight being booked
    pub flight_id: FlightId,
    /// Passengers, in form order
    pub passengers: Vec<Passenger>,
    /// Seats, one per passenger
    pub seats: Vec<Seat>,
    /// Card details
    pub payment: PaymentInfo,
}

/// A booking created by the server
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Internal id
    pub id: BookingId,
    /// Booked flight
    pub flight_id: FlightId,
    /// Passengers
    pub passengers: Vec<Passenger>,
    /// Seats
    pub seats: Vec<Seat>,
    /// Amount charged
    pub total_price: Money,
    /// ISO currency code
    pub currency: String,
    /// Status
    pub status: BookingStatus,
    /// Human-readable reference (`SKY4F2A9`)
    pub booking_reference: String,
    /// Creation time
    pub created_at: DateTime<FixedOffset>,
}

// ============================================================================
// Price feed
// ============================================================================

/// A price change pushed by the price feed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdate {
    /// Flight whose price changed
    pub flight_id: FlightId,
    /// New fare per passenger
    pub new_price: Money,
    /// When the server produced the update
    pub timestamp: DateTime<FixedOffset>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn money_parses_decimal_prices() {
        let price: Money = serde_json::from_str("299.99").unwrap();
        assert_eq!(price.cents(), 29_999);
        assert_eq!(serde_json::to_string(&Money::from_cents(45_050)).unwrap(), "450.5");
    }

    #[test]
    fn money_rejects_negative_amounts() {
        assert!(serde_json::from_str::<Money>("-1.0").is_err());
    }

    #[test]
    fn seat_uses_wire_names() {
        let seat: Seat = serde_json::from_str(
            r#"{"id":"s-12A","row":12,"column":"A","type":"window","status":"available","price":25}"#,
        )
        .unwrap();
        assert_eq!(seat.label(), "12A");
        assert_eq!(seat.seat_type, SeatType::Window);
        assert_eq!(seat.extra_price(), Money::from_cents(2_500));
    }

    #[test]
    fn seat_without_price_has_zero_extra() {
        let seat: Seat = serde_json::from_str(
            r#"{"id":"s-1C","row":1,"column":"C","type":"aisle","status":"occupied"}"#,
        )
        .unwrap();
        assert_eq!(seat.price, None);
        assert_eq!(seat.extra_price(), Money::ZERO);
        assert!(seat.is_occupied());
    }

    #[test]
    fn search_params_serialize_camel_case() {
        let params = SearchParams {
            origin: "JFK".into(),
            destination: "LAX".into(),
            departure_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            return_date: None,
            passengers: 2,
            cabin_class: CabinClass::Economy,
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "origin": "JFK",
                "destination": "LAX",
                "departureDate": "2025-03-14",
                "passengers": 2,
                "class": "economy"
            })
        );
    }

    #[test]
    fn empty_logo_is_treated_as_missing() {
        let json = serde_json::json!({
            "id": "FL001",
            "flightNumber": "AA100",
            "airline": "American Airlines",
            "airlineLogo": "",
            "origin": {"code": "JFK", "name": "John F. Kennedy", "city": "New York", "country": "USA"},
            "destination": {"code": "LAX", "name": "Los Angeles Intl", "city": "Los Angeles", "country": "USA"},
            "departureTime": "2025-03-14T08:00:00-05:00",
            "arrivalTime": "2025-03-14T11:30:00-08:00",
            "duration": 390,
            "price": 299.99,
            "currency": "USD",
            "stops": 0,
            "availableSeats": 42,
            "class": "economy"
        });
        let flight: Flight = serde_json::from_value(json).unwrap();
        assert_eq!(flight.logo(), None);
        assert_eq!(flight.price, Money::from_cents(29_999));
        assert_eq!(flight.layovers, None);
    }

    #[test]
    fn payment_debug_redacts_card() {
        let payment = PaymentInfo {
            card_number: "4111 1111 1111 1234".into(),
            card_holder: "Ada Lovelace".into(),
            expiry_date: "12/27".into(),
            cvv: "123".into(),
            billing_address: BillingAddress::default(),
        };
        let debug = format!("{payment:?}");
        assert!(debug.contains("**** 1234"));
        assert!(!debug.contains("4111"));
        assert!(!debug.contains("123\""));
        assert!(!debug.contains("12/27"));
    }

    #[test]
    fn price_update_parses_server_timestamp() {
        let update: PriceUpdate = serde_json::from_str(
            r#"{"flightId":"FL001","newPrice":412.5,"timestamp":"2025-03-14T10:15:30.123456789Z"}"#,
        )
        .unwrap();
        assert_eq!(update.flight_id, FlightId::from("FL001"));
        assert_eq!(update.new_price, Money::from_cents(41_250));
    }
}
