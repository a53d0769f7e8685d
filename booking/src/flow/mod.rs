//! The booking wizard's step state machine.
//!
//! # Steps
//!
//! ```text
//! search → select-flight → select-seats → passenger-details → payment → confirmation
//!            ↑                  │ ↑               │ ↑             │            │
//!            └──── back ────────┘ └──── back ─────┘ └─── back ────┘            │
//! search ←──────────────────────── book another ────────────────────────────────┘
//! ```
//!
//! Forward transitions are guarded (see [`validation`]); guard failures set
//! [`BookingState::notice`] and leave the step unchanged. Remote calls are effects built
//! from the [`BookingEnvironment`]'s gateway.

pub mod actions;
pub mod environment;
pub mod reducer;
pub mod state;
pub mod validation;

pub use actions::BookingAction;
pub use environment::BookingEnvironment;
pub use reducer::{BookingReducer, SEAT_FETCH};
pub use state::{BookingState, PendingSearch, RequestId, SeatMap, Step, StepKind, total_price};
pub use validation::ValidationError;
