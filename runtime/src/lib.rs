//! # SkyBook Runtime
//!
//! The imperative shell around a reducer.
//!
//! ## Core Components
//!
//! - **Store**: owns the state, serialises reducer calls and executes effects
//! - **Effect execution**: futures and delays run on tokio; the actions they produce are
//!   fed back into the reducer in completion order
//! - **Cancellation**: effects registered with [`Effect::Cancellable`] are aborted by
//!   [`Effect::Cancel`]
//! - **Completion tracking**: [`EffectHandle`] resolves once an action's effects, and the
//!   effects of the actions they fed back, have finished
//!
//! ## Example
//!
//! ```ignore
//! use skybook_runtime::Store;
//!
//! let store = Store::new(BookingState::default(), BookingReducer::new(), environment);
//!
//! let mut handle = store.send(BookingAction::SubmitSearch { params }).await?;
//! handle.wait().await;
//!
//! let step = store.state(|s| s.step.kind()).await;
//! ```

use skybook_core::{
    effect::{Effect, EffectId},
    reducer::Reducer,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio::task::AbortHandle;

pub use error::StoreError;
pub use store::Store;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// The remaining effects were aborted.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for effects tracked by an [`EffectHandle`](crate::EffectHandle)
        #[error("Timeout waiting for effects")]
        Timeout,
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send`]. Tracking cascades: an action produced by a tracked effect
/// is dispatched with the same tracking, so `wait()` covers the whole chain
/// (`SubmitSearch` → search request → `SearchSucceeded`).
#[derive(Clone)]
pub struct EffectHandle {
    completion: watch::Receiver<usize>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let (tx, rx) = watch::channel(0);
        (
            Self { completion: rx },
            EffectTracking {
                pending: Arc::new(tx),
            },
        )
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (_tx, rx) = watch::channel(0);
        Self { completion: rx }
    }

    /// Number of tracked effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        *self.completion.borrow()
    }

    /// Wait until every tracked effect has finished or been cancelled
    pub async fn wait(&mut self) {
        let _ = self.completion.wait_for(|pending| *pending == 0).await;
    }

    /// Wait for all tracked effects with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if effects are still running when the timeout expires.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending())
            .finish()
    }
}

/// Internal: tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    pending: Arc<watch::Sender<usize>>,
}

impl EffectTracking {
    fn increment(&self) {
        self.pending.send_modify(|pending| *pending += 1);
    }

    fn decrement(&self) {
        self.pending
            .send_modify(|pending| *pending = pending.saturating_sub(1));
    }
}

/// Internal: RAII guard owned by every effect task
///
/// Dropped when the task finishes, panics or is aborted. The store-wide counter is
/// released before the handle's, so a woken `EffectHandle::wait` never observes a stale
/// `pending_effects`.
struct TaskGuard {
    tracking: EffectTracking,
    store_pending: Arc<AtomicUsize>,
}

impl TaskGuard {
    fn acquire(tracking: &EffectTracking, store_pending: &Arc<AtomicUsize>) -> Self {
        tracking.increment();
        store_pending.fetch_add(1, Ordering::SeqCst);
        Self {
            tracking: tracking.clone(),
            store_pending: Arc::clone(store_pending),
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.store_pending.fetch_sub(1, Ordering::SeqCst);
        self.tracking.decrement();
    }
}

/// Internal: abort handles of spawned effect tasks
#[derive(Default)]
struct InFlight {
    all: Vec<AbortHandle>,
    by_id: HashMap<EffectId, Vec<AbortHandle>>,
}

impl InFlight {
    fn register(&mut self, id: Option<EffectId>, task: &tokio::task::JoinHandle<()>) {
        self.all.retain(|handle| !handle.is_finished());
        self.all.push(task.abort_handle());

        if let Some(id) = id {
            let group = self.by_id.entry(id).or_default();
            group.retain(|handle| !handle.is_finished());
            group.push(task.abort_handle());
        }
    }

    fn take(&mut self, id: EffectId) -> Vec<AbortHandle> {
        self.by_id.remove(&id).unwrap_or_default()
    }

    fn take_all(&mut self) -> Vec<AbortHandle> {
        self.by_id.clear();
        std::mem::take(&mut self.all)
    }
}

/// Store module - the runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicUsize, Duration, Effect, EffectHandle, EffectId, EffectTracking,
        InFlight, Mutex, Ordering, PoisonError, Reducer, RwLock, StoreError, TaskGuard,
    };
    use futures::future::BoxFuture;
    use std::future::Future;
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; reducer calls are serialised on the write lock)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop and cancellation)
    ///
    /// Cloning a store is cheap; clones share state and in-flight effects.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        in_flight: Arc<Mutex<InFlight>>,
        /// Actions produced by effects, for observers (controllers, tests)
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// The action broadcast holds 64 actions; slow observers lag rather than block.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(initial_state, reducer, environment, 64)
        }

        /// Create a store with a custom action broadcast capacity
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                in_flight: Arc::new(Mutex::new(InFlight::default())),
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Calls the reducer
        /// 3. Starts the returned effects
        ///
        /// Returns once effects are started, not finished; use the returned
        /// [`EffectHandle`] to wait for them.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejecting action: store is shutting down");
                return Err(StoreError::ShutdownInProgress);
            }

            let (handle, tracking) = EffectHandle::new();
            self.dispatch(action, tracking).await;
            Ok(handle)
        }

        /// Read state through a closure
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Subscribe to actions produced by effects
        ///
        /// Only feedback actions are broadcast, not the actions passed to [`send`](Self::send).
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Number of effect tasks currently running
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Returns true once [`shutdown`](Self::shutdown) has been called
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }

        /// Stop accepting actions and wait for running effects
        ///
        /// Effects still running when `timeout` expires are aborted. Actions produced by
        /// effects after shutdown began are dropped.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] with the number of effects that had to
        /// be aborted.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating store shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);

            let start = tokio::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    metrics::counter!("store.shutdown.completed").increment(1);
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    let handles = self.lock_in_flight().take_all();
                    for handle in &handles {
                        handle.abort();
                    }
                    tracing::warn!(
                        pending_effects = pending,
                        "Shutdown timeout: aborting remaining effects"
                    );
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Reduce one action and start its effects
        ///
        /// Boxed because effect tasks call back into it.
        fn dispatch(&self, action: A, tracking: EffectTracking) -> BoxFuture<'_, ()> {
            Box::pin(async move {
                let effects = {
                    let mut state = self.state.write().await;
                    self.reducer.reduce(&mut state, action, &self.environment)
                };

                for effect in effects {
                    self.execute(effect, &tracking, None);
                }
            })
        }

        fn execute(&self, effect: Effect<A>, tracking: &EffectTracking, cancel_id: Option<EffectId>) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute(effect, tracking, cancel_id);
                    }
                },
                Effect::Cancellable { id, effect } => {
                    tracing::trace!(effect_id = %id, "Registering cancellable effect");
                    self.execute(*effect, tracking, Some(id));
                },
                Effect::Cancel(id) => self.cancel(id),
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    self.spawn_tracked(tracking, cancel_id, fut);
                },
                Effect::Delay { duration, action } => {
                    tracing::trace!("Executing Effect::Delay (duration: {:?})", duration);
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                    self.spawn_tracked(tracking, cancel_id, async move {
                        tokio::time::sleep(duration).await;
                        Some(*action)
                    });
                },
            }
        }

        fn spawn_tracked<F>(&self, tracking: &EffectTracking, cancel_id: Option<EffectId>, fut: F)
        where
            F: Future<Output = Option<A>> + Send + 'static,
        {
            let guard = TaskGuard::acquire(tracking, &self.pending_effects);
            let feedback_tracking = tracking.clone();
            let store = self.clone();

            let task = tokio::spawn(async move {
                let _guard = guard;

                let Some(action) = fut.await else {
                    tracing::trace!("Effect completed with no action");
                    return;
                };

                if store.shutdown.load(Ordering::Acquire) {
                    tracing::debug!("Dropping feedback action: store is shutting down");
                    return;
                }

                let _ = store.action_broadcast.send(action.clone());
                store.dispatch(action, feedback_tracking).await;
            });

            self.lock_in_flight().register(cancel_id, &task);
        }

        fn cancel(&self, id: EffectId) {
            let handles = self.lock_in_flight().take(id);
            let mut aborted = 0_u64;
            for handle in handles {
                if !handle.is_finished() {
                    handle.abort();
                    aborted += 1;
                }
            }

            if aborted > 0 {
                tracing::debug!(effect_id = %id, aborted, "Cancelled in-flight effects");
                metrics::counter!("store.effects.cancelled").increment(aborted);
            }
        }

        fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, InFlight> {
            self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                in_flight: Arc::clone(&self.in_flight),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}
