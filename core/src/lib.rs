//! # SkyBook Core
//!
//! The functional core of the booking flow.
//!
//! Every piece of client state in SkyBook is owned by a reducer. User input, remote
//! responses and price-feed events all arrive as *actions*; the reducer mutates state in
//! place and returns *effects* that describe the I/O to perform next. The runtime
//! (`skybook-runtime`) executes those effects and feeds the actions they produce back in.
//!
//! ## Core Concepts
//!
//! - **State**: the data a feature owns (for the booking flow: current step + flight list)
//! - **Action**: every input the reducer understands (view intents and remote outcomes)
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: a description of a side effect, never its execution
//! - **Environment**: injected dependencies (gateway, clock)
//!
//! ## Example
//!
//! ```ignore
//! use skybook_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! impl Reducer for BookingReducer {
//!     type State = BookingState;
//!     type Action = BookingAction;
//!     type Environment = BookingEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut BookingState,
//!         action: BookingAction,
//!         env: &BookingEnvironment,
//!     ) -> SmallVec<[Effect<BookingAction>; 4]> {
//!         match action {
//!             BookingAction::BackToFlights => {
//!                 state.step = Step::SelectFlight { /* ... */ };
//!                 smallvec![Effect::Cancel(SEAT_FETCH)]
//!             }
//!             _ => smallvec![Effect::None],
//!         }
//!     }
//! }
//! ```

pub use smallvec::{SmallVec, smallvec};

/// Reducer module - the trait every feature's business logic implements
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait
    ///
    /// Reducers are deterministic: given the same state, action and environment they make
    /// the same state change and describe the same effects. All I/O lives in the returned
    /// effects.
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer owns
    /// - `Action`: The inputs it processes
    /// - `Environment`: The injected dependencies effects are built from
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Implementations must not block and must not panic; guard failures are
        /// recorded in state instead.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions
///
/// Effects are values. The runtime decides when and where they run; reducers and tests
/// only ever inspect them.
pub mod effect {
    use std::fmt;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Identifier used to group effects for cancellation
    ///
    /// Effects wrapped in [`Effect::Cancellable`] with the same id are aborted together
    /// by [`Effect::Cancel`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EffectId(&'static str);

    impl EffectId {
        /// Create an effect id from a static name
        #[must_use]
        pub const fn new(name: &'static str) -> Self {
            Self(name)
        }

        /// The name this id was created with
        #[must_use]
        pub const fn name(&self) -> &'static str {
            self.0
        }
    }

    impl fmt::Display for EffectId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    /// Boxed future produced by [`Effect::Future`]
    pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type effects feed back into the reducer
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Dispatch an action after a delay
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after the delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// If the future resolves to `Some(action)` the action is fed back into the reducer.
        Future(EffectFuture<Action>),

        /// Run `effect` so that a later [`Effect::Cancel`] with the same id aborts it
        Cancellable {
            /// Cancellation group
            id: EffectId,
            /// The effect to run
            effect: Box<Effect<Action>>,
        },

        /// Abort every in-flight effect registered under the id
        ///
        /// Cancelling an id with nothing in flight is a no-op.
        Cancel(EffectId),
    }

    impl<Action> fmt::Debug for Effect<Action>
    where
        Action: fmt::Debug,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Cancellable { id, effect } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .field("effect", effect)
                    .finish(),
                Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap an async block that may produce a follow-up action
        #[must_use]
        pub fn future<F>(fut: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Make this effect cancellable under `id`
        #[must_use]
        pub fn cancellable(self, id: EffectId) -> Effect<Action> {
            Effect::Cancellable {
                id,
                effect: Box::new(self),
            }
        }

        /// Returns true for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }

        /// Returns true if this effect (or a nested one) cancels `id`
        #[must_use]
        pub fn cancels(&self, id: EffectId) -> bool {
            match self {
                Effect::Cancel(cancelled) => *cancelled == id,
                Effect::Parallel(effects) => effects.iter().any(|e| e.cancels(id)),
                _ => false,
            }
        }

        /// Returns true if this effect (or a nested one) is registered under `id`
        #[must_use]
        pub fn is_cancellable_as(&self, id: EffectId) -> bool {
            match self {
                Effect::Cancellable { id: registered, .. } => *registered == id,
                Effect::Parallel(effects) => effects.iter().any(|e| e.is_cancellable_as(id)),
                _ => false,
            }
        }
    }
}

/// Environment module - dependency traits shared by every feature
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time for deterministic tests
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Production
    /// let clock = SystemClock;
    ///
    /// // Tests
    /// let clock = FixedClock::new(test_time());
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
