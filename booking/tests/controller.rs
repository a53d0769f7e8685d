//! End-to-end runs of the booking flow through the controller, with a scripted gateway
//! and price feed.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code

use skybook::flow::{SeatMap, StepKind};
use skybook::views::{ConfirmationView, StepView};
use skybook::{BookingAction, BookingFlowController, Config, Step};
use skybook_gateway::{BookingId, FlightId, GatewayError, Money, SeatId};
use skybook_price_feed::ConnectionState;
use skybook_testing::{GatewayCall, MockFeedConnector, MockGateway, fixtures, test_clock};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

fn config() -> Config {
    let mut config = Config::default();
    config.price_feed.url = "ws://prices.test/ws/prices".into();
    config.price_feed.reconnect_delay = Duration::from_millis(100);
    config.price_flash = Duration::from_millis(500);
    config.shutdown_timeout = Duration::from_secs(1);
    config
}

fn mount(gateway: &MockGateway, connector: &MockFeedConnector) -> BookingFlowController {
    skybook_testing::init_tracing();
    BookingFlowController::mount_with_clock(
        &config(),
        Arc::new(gateway.clone()),
        Arc::new(connector.clone()),
        Arc::new(test_clock()),
    )
}

/// Poll `check` until it holds, failing after a generous (virtual) deadline
async fn eventually<F>(controller: &BookingFlowController, check: F)
where
    F: Fn(&skybook::BookingState) -> bool + Copy,
{
    tokio::time::timeout(Duration::from_secs(30), async {
        while !controller.state(check).await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition reached in time");
}

async fn search(controller: &BookingFlowController, passengers: u32) {
    assert_ok!(
        controller
            .send_and_wait(BookingAction::SubmitSearch {
                params: fixtures::search_params(passengers),
            })
            .await
    );
}

#[tokio::test(start_paused = true)]
async fn books_a_flight_end_to_end() {
    let gateway = MockGateway::new();
    gateway.push_search(Ok(vec![
        fixtures::flight("FL001", 29_999),
        fixtures::flight("FL002", 19_999),
    ]));
    gateway.push_seats(Ok(fixtures::seat_grid(3, &["1B"])));
    gateway.push_create_booking(Ok(fixtures::booking()));
    let controller = mount(&gateway, &MockFeedConnector::new());

    search(&controller, 2).await;
    assert_eq!(controller.state(|s| s.step.kind()).await, StepKind::SelectFlight);
    assert_eq!(controller.state(|s| s.flights.len()).await, 2);

    controller
        .send_and_wait(BookingAction::SelectFlight {
            flight_id: FlightId::from("FL001"),
        })
        .await
        .unwrap();
    controller
        .send(BookingAction::SeatSelectionChanged {
            seats: vec![SeatId::from("seat-2C"), SeatId::from("seat-1A")],
        })
        .await
        .unwrap();
    controller.send(BookingAction::ConfirmSeats).await.unwrap();
    assert_eq!(
        controller.state(|s| s.step.kind()).await,
        StepKind::PassengerDetails
    );

    controller
        .send(BookingAction::SubmitPassengers {
            passengers: vec![fixtures::passenger(0), fixtures::passenger(1)],
        })
        .await
        .unwrap();
    controller
        .send_and_wait(BookingAction::SubmitPayment {
            payment: fixtures::payment(),
        })
        .await
        .unwrap();

    let Some(StepView::Confirmation(confirmation)) = controller.view().await else {
        panic!("expected confirmation");
    };
    assert_eq!(
        confirmation,
        ConfirmationView {
            title: "Booking Confirmed!",
            booking_id: "BK-1001".into(),
            booking_reference: "SKY4F2A9".into(),
            flight: "American Airlines AA100".into(),
            route: confirmation.route.clone(),
            passengers: "Passengers: 2".into(),
            seats: "Seats: 1A, 2C".into(),
        }
    );

    assert_eq!(
        gateway.calls(),
        vec![
            GatewayCall::SearchFlights(fixtures::search_params(2)),
            GatewayCall::GetSeats(FlightId::from("FL001")),
            GatewayCall::CreateBooking {
                flight_id: FlightId::from("FL001"),
                passengers: 2,
                // Click order; only the confirmation view sorts
                seats: vec!["2C".into(), "1A".into()],
            },
        ]
    );

    controller.send(BookingAction::BookAnother).await.unwrap();
    let state = controller.snapshot().await;
    assert_eq!(state.step.kind(), StepKind::Search);
    assert!(state.flights.is_empty());

    assert_ok!(controller.unmount().await);
}

#[tokio::test(start_paused = true)]
async fn search_failure_stays_on_search_with_message() {
    let gateway = MockGateway::new();
    gateway.push_search(Err(GatewayError::Transport("connection reset".into())));
    let controller = mount(&gateway, &MockFeedConnector::new());

    search(&controller, 1).await;

    let step = controller.state(|s| s.step.clone()).await;
    let Step::Search { pending, error } = step else {
        panic!("expected search step, got {}", step.kind());
    };
    assert!(pending.is_none());
    assert_eq!(
        error.as_deref(),
        Some("Could not reach the booking service. Please check your connection and try again.")
    );

    assert_ok!(controller.unmount().await);
}

#[tokio::test(start_paused = true)]
async fn live_prices_patch_the_held_list() {
    let gateway = MockGateway::new();
    gateway.push_search(Ok(vec![
        fixtures::flight("FL001", 29_999),
        fixtures::flight("FL002", 19_999),
    ]));
    let connector = MockFeedConnector::new();
    let server = connector.accept_next();
    let controller = mount(&gateway, &connector);

    let mut feed_state = controller.subscribe_feed_state();
    feed_state
        .wait_for(|s| *s == ConnectionState::Open)
        .await
        .unwrap();
    search(&controller, 1).await;

    server.send_update(&fixtures::price_update("FL002", 18_500));
    server.send_update(&fixtures::price_update("FL999", 1));
    server.send_update(&fixtures::price_update("FL002", 17_500));

    eventually(&controller, |s| {
        s.flight(&FlightId::from("FL002"))
            .is_some_and(|f| f.price == Money::from_cents(17_500))
    })
    .await;

    let state = controller.snapshot().await;
    assert!(state.is_price_updating(&FlightId::from("FL002")));
    assert_eq!(
        state.flight(&FlightId::from("FL001")).unwrap().price,
        Money::from_cents(29_999)
    );
    assert_eq!(state.flights.len(), 2);

    // The flag clears once the flash delay has passed
    eventually(&controller, |s| !s.is_price_updating(&FlightId::from("FL002"))).await;

    assert_ok!(controller.unmount().await);
    assert!(server.closed_by_client());
}

#[tokio::test(start_paused = true)]
async fn seat_response_after_leaving_the_step_is_discarded() {
    let gateway = MockGateway::new();
    gateway.push_search(Ok(vec![fixtures::flight("FL001", 29_999)]));
    gateway.push_seats(Ok(fixtures::seat_grid(2, &[])));
    let controller = mount(&gateway, &MockFeedConnector::new());
    search(&controller, 1).await;

    gateway.set_latency(Duration::from_secs(2));
    let mut fetch = controller
        .send(BookingAction::SelectFlight {
            flight_id: FlightId::from("FL001"),
        })
        .await
        .unwrap();
    assert!(
        controller
            .state(|s| matches!(
                s.step,
                Step::SelectSeats {
                    seat_map: SeatMap::Loading { .. },
                    ..
                }
            ))
            .await
    );

    controller.send(BookingAction::BackToFlights).await.unwrap();
    fetch.wait().await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(controller.state(|s| s.step.kind()).await, StepKind::SelectFlight);
    assert_ok!(controller.unmount().await);
}

#[tokio::test(start_paused = true)]
async fn unmount_stops_reconnecting() {
    let connector = MockFeedConnector::new();
    let controller = mount(&MockGateway::new(), &connector);

    tokio::time::timeout(Duration::from_secs(30), async {
        while connector.connect_attempts() < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("feed keeps retrying");
    assert_eq!(controller.feed_state(), ConnectionState::Disconnected);

    assert_ok!(controller.unmount().await);
    let attempts = connector.connect_attempts();

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(connector.connect_attempts(), attempts);
    assert!(
        connector
            .attempted_urls()
            .iter()
            .all(|url| url == "ws://prices.test/ws/prices")
    );
}

#[tokio::test(start_paused = true)]
async fn looks_up_and_cancels_bookings() {
    let gateway = MockGateway::new();
    gateway.push_booking(Ok(fixtures::booking()));
    gateway.push_cancel(Ok(()));
    let controller = mount(&gateway, &MockFeedConnector::new());
    let id = BookingId::from("BK-1001");

    let booking = controller.fetch_booking(&id).await.unwrap();
    assert_eq!(booking.booking_reference, "SKY4F2A9");
    assert_ok!(controller.cancel_booking(&id).await);

    // Nothing scripted for the second cancel
    let error = controller.cancel_booking(&id).await.unwrap_err();
    assert!(error.is_retryable());

    assert_eq!(
        gateway.calls(),
        vec![
            GatewayCall::GetBooking(id.clone()),
            GatewayCall::CancelBooking(id.clone()),
            GatewayCall::CancelBooking(id),
        ]
    );
    assert_ok!(controller.unmount().await);
}
