//! # `SkyBook`
//!
//! Multi-step flight booking flow: search, pick a flight, pick seats, enter passengers,
//! pay, confirm. Flight prices on screen follow a live push feed for as long as the flow
//! is mounted.
//!
//! ## Layout
//!
//! - [`flow`]: the step state machine (state, actions, reducer, guards)
//! - [`views`]: view models and form drafts for each step
//! - [`controller`]: mounts the store and the price feed and tears them down
//! - [`config`]: environment-driven settings
//! - [`format`]: display formatting shared by the views
//!
//! ## Example
//!
//! ```no_run
//! use skybook::{BookingFlowController, Config};
//! use skybook::views::SearchDraft;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let controller = BookingFlowController::connect(&Config::from_env()?)?;
//!
//! let mut draft = SearchDraft::new();
//! draft.origin = "JFK".into();
//! draft.destination = "LAX".into();
//! draft.departure_date = "2030-03-14".into();
//! controller.send_and_wait(draft.submit()?).await?;
//!
//! controller.unmount().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod flow;
pub mod format;
pub mod views;

pub use config::{Config, ConfigError};
pub use controller::{BookingFlowController, BookingStore};
pub use flow::{BookingAction, BookingEnvironment, BookingReducer, BookingState, Step, StepKind};
