//! Payment step.
//!
//! Card details live only in the [`PaymentForm`] draft and the submit action; the flow
//! state never holds them.

use crate::flow::validation::{ValidationError, validate_payment};
use crate::flow::{BookingAction, BookingState, Step, total_price};
use crate::format::{self, CVV_MAX_LEN, EXPIRY_MAX_LEN};
use skybook_gateway::{BillingAddress, PaymentInfo};

/// Shown above the form
pub const DEMO_NOTICE: &str = "This is a demo payment form. No actual charges will be made.";

/// Uncommitted payment input
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PaymentForm {
    info: PaymentInfo,
}

impl std::fmt::Debug for PaymentForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentForm").field("info", &self.info).finish()
    }
}

impl PaymentForm {
    /// Empty form
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current input
    #[must_use]
    pub const fn info(&self) -> &PaymentInfo {
        &self.info
    }

    /// Card number, regrouped into blocks of four as typed
    pub fn set_card_number(&mut self, input: &str) {
        self.info.card_number = format::card_number(input);
    }

    /// Name on the card
    pub fn set_card_holder(&mut self, input: &str) {
        self.info.card_holder = input.to_string();
    }

    /// Expiry (`MM/YY`)
    pub fn set_expiry_date(&mut self, input: &str) {
        self.info.expiry_date = format::cap(input, EXPIRY_MAX_LEN);
    }

    /// Security code
    pub fn set_cvv(&mut self, input: &str) {
        self.info.cvv = format::cap(input, CVV_MAX_LEN);
    }

    /// Billing address fields
    pub const fn billing_address_mut(&mut self) -> &mut BillingAddress {
        &mut self.info.billing_address
    }

    /// The action to send for this form
    ///
    /// # Errors
    ///
    /// Returns the first blank field.
    pub fn submit(&self) -> Result<BookingAction, ValidationError> {
        validate_payment(&self.info)?;
        Ok(BookingAction::SubmitPayment {
            payment: self.info.clone(),
        })
    }
}

/// What the payment step shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentView {
    /// `Total Amount:` value
    pub total: String,
    /// Booking request in flight; the form and both buttons are disabled
    pub processing: bool,
    /// Submit button text
    pub submit_label: &'static str,
    /// Back button text
    pub back_label: &'static str,
    /// Simulated-payment notice
    pub notice: &'static str,
    /// Failure of the last booking attempt
    pub error: Option<String>,
}

impl PaymentView {
    /// View model for the current state, `None` on other steps
    #[must_use]
    pub fn from_state(state: &BookingState) -> Option<Self> {
        let Step::Payment {
            params,
            flight,
            seats,
            pending,
            error,
            ..
        } = &state.step
        else {
            return None;
        };

        let processing = pending.is_some();
        let total = total_price(flight, params.passengers, seats);
        Some(Self {
            total: format::price(total, &flight.currency),
            processing,
            submit_label: if processing {
                "Processing..."
            } else {
                "Complete Booking"
            },
            back_label: "Back to Passengers",
            notice: DEMO_NOTICE,
            error: error.clone(),
        })
    }

    /// Action for the back button, `None` while processing
    #[must_use]
    pub const fn back(&self) -> Option<BookingAction> {
        if self.processing {
            None
        } else {
            Some(BookingAction::BackToPassengers)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::flow::RequestId;
    use skybook_gateway::SeatStatus;
    use skybook_testing::fixtures;

    fn payment_step(pending: Option<RequestId>) -> BookingState {
        let flight = fixtures::flight("FL001", 29_999);
        BookingState::with_step(
            Step::Payment {
                params: fixtures::search_params(2),
                flight: flight.clone(),
                seats: vec![
                    fixtures::seat("1A", SeatStatus::Available, Some(2_500)),
                    fixtures::seat("1B", SeatStatus::Available, None),
                ],
                passengers: vec![fixtures::passenger(0), fixtures::passenger(1)],
                pending,
                error: None,
            },
            vec![flight],
        )
    }

    #[test]
    fn inputs_are_shaped_as_typed() {
        let mut form = PaymentForm::new();
        form.set_card_number("4111111111111111999");
        form.set_expiry_date("12/2027");
        form.set_cvv("12345");

        assert_eq!(form.info().card_number, "4111 1111 1111 1111");
        assert_eq!(form.info().expiry_date, "12/20");
        assert_eq!(form.info().cvv, "1234");
    }

    #[test]
    fn submit_requires_every_field() {
        let mut form = PaymentForm::new();
        form.set_card_number("4111 1111 1111 1111");
        form.set_card_holder("Lead Smith");
        form.set_expiry_date("12/27");
        form.set_cvv("123");
        assert_eq!(form.submit(), Err(ValidationError::Required("Street")));

        *form.billing_address_mut() = fixtures::payment().billing_address;
        assert_eq!(
            form.submit().unwrap(),
            BookingAction::SubmitPayment {
                payment: fixtures::payment()
            }
        );
    }

    #[test]
    fn debug_keeps_card_details_out() {
        let mut form = PaymentForm::new();
        form.set_card_number("4111 1111 1111 1234");
        form.set_cvv("987");
        let rendered = format!("{form:?}");
        assert!(rendered.contains("**** 1234"));
        assert!(!rendered.contains("4111"));
        assert!(!rendered.contains("987"));
    }

    #[test]
    fn view_shows_total_and_busy_state() {
        let idle = PaymentView::from_state(&payment_step(None)).unwrap();
        // 2 x $299.99 + $25.00 window seat
        assert_eq!(idle.total, "$624.98");
        assert_eq!(idle.submit_label, "Complete Booking");
        assert_eq!(idle.back(), Some(BookingAction::BackToPassengers));
        assert_eq!(idle.notice, DEMO_NOTICE);

        let busy = PaymentView::from_state(&payment_step(Some(RequestId::new(4)))).unwrap();
        assert!(busy.processing);
        assert_eq!(busy.submit_label, "Processing...");
        assert_eq!(busy.back(), None);
    }
}
