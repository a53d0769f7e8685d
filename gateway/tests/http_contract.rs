//! HTTP contract tests for `HttpGateway` against a mock API server.

#![allow(clippy::unwrap_used)] // Test code

use serde_json::{Value, json};
use skybook_gateway::{
    BillingAddress, BookingId, BookingStatus, CabinClass, CreateBookingRequest, FlightGateway,
    FlightId, GatewayError, HttpGateway, Money, Passenger, PaymentInfo, RetryPolicy, SearchParams,
    Seat, SeatId, SeatStatus, SeatType, Title,
};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn flight_json(id: &str, price: f64) -> Value {
    json!({
        "id": id,
        "flightNumber": "AA100",
        "airline": "American Airlines",
        "airlineLogo": "",
        "origin": {"code": "JFK", "name": "John F. Kennedy International", "city": "New York", "country": "USA"},
        "destination": {"code": "LAX", "name": "Los Angeles International", "city": "Los Angeles", "country": "USA"},
        "departureTime": "2025-03-14T08:00:00-05:00",
        "arrivalTime": "2025-03-14T11:30:00-08:00",
        "duration": 390,
        "price": price,
        "currency": "USD",
        "stops": 0,
        "availableSeats": 42,
        "class": "economy"
    })
}

fn booking_json() -> Value {
    json!({
        "id": "BK-1",
        "flightId": "FL001",
        "passengers": [{
            "id": "passenger-1",
            "title": "Ms",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "dateOfBirth": "1990-12-10",
            "email": "ada@example.com",
            "phone": "+1 555 0100",
            "passportNumber": "X1234567"
        }],
        "seats": [{"id": "s-12A", "row": 12, "column": "A", "type": "window", "status": "available"}],
        "totalPrice": 299.99,
        "currency": "USD",
        "status": "confirmed",
        "bookingReference": "SKY4F2A9",
        "createdAt": "2025-03-01T12:00:00Z"
    })
}

fn search_params() -> SearchParams {
    SearchParams {
        origin: "JFK".into(),
        destination: "LAX".into(),
        departure_date: "2025-03-14".parse().unwrap(),
        return_date: None,
        passengers: 2,
        cabin_class: CabinClass::Economy,
    }
}

async fn gateway(server: &MockServer) -> HttpGateway {
    HttpGateway::new(&format!("{}/api", server.uri()), Duration::from_secs(5))
        .unwrap()
        .with_read_retry(
            RetryPolicy::builder()
                .max_retries(1)
                .initial_delay(Duration::from_millis(1))
                .build(),
        )
}

#[tokio::test]
async fn search_posts_params_and_decodes_flights() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/flights/search"))
        .and(body_json(json!({
            "origin": "JFK",
            "destination": "LAX",
            "departureDate": "2025-03-14",
            "passengers": 2,
            "class": "economy"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([flight_json("FL001", 299.99), flight_json("FL002", 349.0)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let flights = gateway(&server).await.search_flights(&search_params()).await.unwrap();

    assert_eq!(flights.len(), 2);
    assert_eq!(flights[0].id, FlightId::from("FL001"));
    assert_eq!(flights[1].price, Money::from_cents(34_900));
}

#[tokio::test]
async fn search_failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/flights/search"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "Failed to search flights"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let error = gateway(&server)
        .await
        .search_flights(&search_params())
        .await
        .unwrap_err();

    assert_eq!(
        error,
        GatewayError::Status {
            status: 500,
            message: "Failed to search flights".into()
        }
    );
}

#[tokio::test]
async fn seat_fetch_retries_once_after_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/flights/FL001/seats"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/flights/FL001/seats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "s-1A", "row": 1, "column": "A", "type": "window", "status": "available", "price": 25},
            {"id": "s-1B", "row": 1, "column": "B", "type": "middle", "status": "occupied"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let seats = gateway(&server)
        .await
        .get_seats(&FlightId::from("FL001"))
        .await
        .unwrap();

    assert_eq!(seats.len(), 2);
    assert_eq!(seats[0].price, Some(Money::from_cents(2_500)));
    assert_eq!(seats[1].status, SeatStatus::Occupied);
}

#[tokio::test]
async fn not_found_is_surfaced_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/flights/NOPE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Flight not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let error = gateway(&server)
        .await
        .get_flight(&FlightId::from("NOPE"))
        .await
        .unwrap_err();

    assert_eq!(error.user_message(), "Flight not found");
}

#[tokio::test]
async fn create_booking_accepts_created_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/bookings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(booking_json()))
        .expect(1)
        .mount(&server)
        .await;

    let request = CreateBookingRequest {
        flight_id: FlightId::from("FL001"),
        passengers: vec![Passenger {
            id: "passenger-1".into(),
            title: Title::Ms,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            date_of_birth: "1990-12-10".into(),
            email: Some("ada@example.com".into()),
            phone: Some("+1 555 0100".into()),
            passport_number: "X1234567".into(),
            nationality: None,
        }],
        seats: vec![Seat {
            id: SeatId::from("s-12A"),
            row: 12,
            column: 'A',
            seat_type: SeatType::Window,
            status: SeatStatus::Selected,
            price: None,
        }],
        payment: PaymentInfo {
            card_number: "4111 1111 1111 1111".into(),
            card_holder: "Ada Lovelace".into(),
            expiry_date: "12/27".into(),
            cvv: "123".into(),
            billing_address: BillingAddress::default(),
        },
    };

    let booking = gateway(&server).await.create_booking(&request).await.unwrap();

    assert_eq!(booking.id, BookingId::from("BK-1"));
    assert_eq!(booking.booking_reference, "SKY4F2A9");
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.total_price, Money::from_cents(29_999));

    let received = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["flightId"], "FL001");
    assert_eq!(body["payment"]["cardNumber"], "4111 1111 1111 1111");
    assert_eq!(body["seats"][0]["column"], "A");
}

#[tokio::test]
async fn get_and_cancel_booking() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bookings/BK-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/bookings/BK-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "Booking cancelled successfully"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server).await;
    let id = BookingId::from("BK-1");

    let booking = gateway.get_booking(&id).await.unwrap();
    assert_eq!(booking.passengers.len(), 1);

    tokio_test::assert_ok!(gateway.cancel_booking(&id).await);
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/flights/FL001"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let error = gateway(&server)
        .await
        .get_flight(&FlightId::from("FL001"))
        .await
        .unwrap_err();

    assert!(matches!(error, GatewayError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let gateway = HttpGateway::new("http://127.0.0.1:9/api", Duration::from_millis(500))
        .unwrap()
        .with_read_retry(RetryPolicy::none());

    let error = gateway.get_flight(&FlightId::from("FL001")).await.unwrap_err();

    assert!(matches!(error, GatewayError::Transport(_)));
    assert!(error.is_retryable());
}
