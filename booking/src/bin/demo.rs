//! `SkyBook` demo
//!
//! Walks the booking flow end to end against the configured API, printing each step's
//! view. Point `SKYBOOK_API_BASE_URL` and `SKYBOOK_PRICE_FEED_URL` at a running backend.

use anyhow::{Context, bail};
use skybook::views::{
    PassengerForm, PaymentForm, SearchDraft, SeatClick, SeatMapView, SeatSlot, SeatState,
    StepView,
};
use skybook::{BookingAction, BookingFlowController, Config, Step, StepKind};
use skybook_gateway::CabinClass;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,skybook=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== SkyBook: Booking Flow Demo ===\n");

    let config = Config::from_env().context("loading configuration")?;
    println!("API:        {}", config.api.base_url);
    println!("Price feed: {}\n", config.price_feed.url);

    let controller = BookingFlowController::connect(&config)?;
    let outcome = run(&controller).await;

    println!("\nPrice feed was {}", controller.feed_state());
    controller.unmount().await?;
    outcome
}

async fn run(controller: &BookingFlowController) -> anyhow::Result<()> {
    // Search
    let mut draft = SearchDraft::new();
    draft.origin = "JFK".into();
    draft.destination = "LAX".into();
    draft.departure_date = (chrono::Utc::now().date_naive() + chrono::Days::new(14))
        .format("%Y-%m-%d")
        .to_string();
    draft.set_passengers(2);
    draft.cabin_class = CabinClass::Economy;

    println!(">>> Searching {} → {}", draft.origin, draft.destination);
    controller.send_and_wait(draft.submit()?).await?;

    let Some(StepView::FlightList(list)) = controller.view().await else {
        return stopped(controller).await;
    };
    println!("{}", list.heading);
    for card in &list.cards {
        println!(
            "  {} {}  {} → {}  {}  {}  {}",
            card.airline,
            card.flight_number,
            card.departure_time,
            card.arrival_time,
            card.duration,
            card.stops,
            card.price
        );
    }
    let Some(card) = list.cards.first() else {
        bail!("no flights to book");
    };

    // Seats
    println!("\n>>> Selecting {} {}", card.airline, card.flight_number);
    controller.send_and_wait(card.select()).await?;

    let mut seat_map = controller
        .state(SeatMapView::from_state)
        .await
        .context("expected the seat step")?;
    if let Some(error) = &seat_map.error {
        bail!("seat map unavailable: {error}");
    }
    println!("{}", seat_map.heading);

    let free: Vec<_> = seat_map
        .rows()
        .into_iter()
        .flat_map(|row| row.slots)
        .filter_map(|slot| match slot {
            SeatSlot::Seat(cell) if cell.state == SeatState::Available => Some(cell.id),
            _ => None,
        })
        .collect();
    for seat in free.iter().take(usize::try_from(draft.passengers())?) {
        match seat_map.click(seat) {
            SeatClick::Changed(action) => {
                controller.send(action).await?;
            },
            SeatClick::Rejected(notice) => println!("  ! {notice}"),
            SeatClick::Ignored => {},
        }
    }
    println!("{}  [{}]", seat_map.summary(), seat_map.selected_labels());
    controller.send(BookingAction::ConfirmSeats).await?;

    // Passengers
    let mut form = controller
        .state(PassengerForm::from_state)
        .await
        .context("expected the passenger step")?;
    for (index, heading) in form.headings().iter().enumerate() {
        let Some(passenger) = form.passenger_mut(index) else {
            continue;
        };
        passenger.first_name = format!("Demo{}", index + 1);
        passenger.last_name = "Traveller".into();
        passenger.date_of_birth = "1990-01-01".into();
        passenger.passport_number = format!("X{:07}", index + 1);
        if PassengerForm::asks_contact(index) {
            passenger.email = Some("demo@example.com".into());
            passenger.phone = Some("+1 555 0100".into());
        }
        println!("\n>>> {heading}: {} {}", passenger.first_name, passenger.last_name);
    }
    controller.send(form.submit()?).await?;

    // Payment
    if let Some(StepView::Payment(payment)) = controller.view().await {
        println!("\nTotal Amount: {}", payment.total);
        println!("({})", payment.notice);
    }
    let mut payment = PaymentForm::new();
    payment.set_card_number("4111111111111111");
    payment.set_card_holder("Demo Traveller");
    payment.set_expiry_date("12/30");
    payment.set_cvv("123");
    let address = payment.billing_address_mut();
    address.street = "1 Main St".into();
    address.city = "New York".into();
    address.state = "NY".into();
    address.zip_code = "10001".into();
    address.country = "USA".into();

    println!("\n>>> Completing booking");
    controller.send_and_wait(payment.submit()?).await?;

    // Confirmation
    let Some(StepView::Confirmation(confirmation)) = controller.view().await else {
        return stopped(controller).await;
    };
    println!("\n{}", confirmation.title);
    println!("  Booking Reference: {}", confirmation.booking_reference);
    println!("  {}", confirmation.flight);
    println!("  {}", confirmation.route);
    println!("  {}", confirmation.passengers);
    println!("  {}", confirmation.seats);

    Ok(())
}

async fn stopped(controller: &BookingFlowController) -> anyhow::Result<()> {
    let (step, reason) = controller
        .state(|s| {
            let reason = match &s.step {
                Step::Search { error, .. } | Step::Payment { error, .. } => error.clone(),
                _ => None,
            };
            (s.step.kind(), reason.or_else(|| s.notice.clone()))
        })
        .await;

    if step == StepKind::Search {
        bail!("search did not complete: {}", reason.unwrap_or_default());
    }
    bail!(
        "flow stopped at {step}: {}",
        reason.unwrap_or_else(|| "no details".into())
    )
}
