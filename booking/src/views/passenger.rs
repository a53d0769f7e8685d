//! Passenger details step

use crate::flow::validation::{ValidationError, validate_passengers};
use crate::flow::{BookingAction, BookingState, Step};
use skybook_gateway::{Passenger, Title};

/// Back button text
pub const BACK_LABEL: &str = "Back to Seats";
/// Continue button text
pub const CONTINUE_LABEL: &str = "Continue to Payment";

/// One form per passenger, in seat order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassengerForm {
    passengers: Vec<Passenger>,
}

fn blank_passenger(number: usize) -> Passenger {
    Passenger {
        id: format!("passenger-{number}"),
        title: Title::default(),
        first_name: String::new(),
        last_name: String::new(),
        date_of_birth: String::new(),
        email: (number == 1).then(String::new),
        phone: (number == 1).then(String::new),
        passport_number: String::new(),
        nationality: None,
    }
}

impl PassengerForm {
    /// `count` empty forms; only the first asks for contact details
    #[must_use]
    pub fn new(count: u32) -> Self {
        let count = usize::try_from(count).unwrap_or_default();
        Self {
            passengers: (1..=count).map(blank_passenger).collect(),
        }
    }

    /// Form for the current state, `None` on other steps
    ///
    /// Coming back from payment, the previously submitted passengers are restored.
    #[must_use]
    pub fn from_state(state: &BookingState) -> Option<Self> {
        match &state.step {
            Step::PassengerDetails {
                prefill: Some(passengers),
                ..
            } => Some(Self {
                passengers: passengers.clone(),
            }),
            Step::PassengerDetails { params, .. } => Some(Self::new(params.passengers)),
            _ => None,
        }
    }

    /// Section headings (`Passenger 1`, ...)
    #[must_use]
    pub fn headings(&self) -> Vec<String> {
        (1..=self.passengers.len())
            .map(|number| format!("Passenger {number}"))
            .collect()
    }

    /// Title options
    #[must_use]
    pub const fn title_options() -> [Title; 4] {
        Title::ALL
    }

    /// Current input
    #[must_use]
    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    /// Edit passenger `index` (zero-based)
    pub fn passenger_mut(&mut self, index: usize) -> Option<&mut Passenger> {
        self.passengers.get_mut(index)
    }

    /// Whether the lead passenger's contact fields are shown for `index`
    #[must_use]
    pub const fn asks_contact(index: usize) -> bool {
        index == 0
    }

    /// Whether continue is enabled
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.check().is_ok()
    }

    /// Validate without submitting
    ///
    /// # Errors
    ///
    /// Returns the first passenger field that is missing.
    pub fn check(&self) -> Result<(), ValidationError> {
        let expected = u32::try_from(self.passengers.len()).unwrap_or(u32::MAX);
        validate_passengers(&self.passengers, expected)
    }

    /// The action to send for this form
    ///
    /// # Errors
    ///
    /// See [`PassengerForm::check`].
    pub fn submit(&self) -> Result<BookingAction, ValidationError> {
        self.check()?;
        Ok(BookingAction::SubmitPassengers {
            passengers: self.passengers.clone(),
        })
    }

    /// Action for the back button
    #[must_use]
    pub const fn back() -> BookingAction {
        BookingAction::BackToSeats
    }
}
