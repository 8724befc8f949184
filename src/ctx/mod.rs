//! Execution context: a cancellation signal paired with an injected clock.
//!
//! The context should be passed down the call stack and awaited together
//! with every suspending call: instead of "awaiting new data", you "await
//! new data OR the context getting canceled". This gives every primitive in
//! the crate a uniform cooperative-shutdown story. Functions which read the
//! system clock directly are non-hermetic, so time is read through the
//! context as well, which lets tests substitute a manual clock.
use crate::{
    error::{Interrupted, OrInterrupted},
    signal, time,
};
use std::{fmt, future::Future, sync::Arc};

mod clock;
mod testonly;
#[cfg(test)]
mod tests;

pub use clock::*;
pub use testonly::*;

/// Handle on an execution context.
/// Cheap to clone; all clones observe the same cancellation signal.
pub struct Ctx(Arc<Inner>);

/// Inner representation of the context.
struct Inner {
    clock: Clock,
    /// Signal sent once this context is canceled.
    canceled: Arc<signal::Once>,
}

/// Constructs a top-level context with the realtime clock.
/// Should be called only at the start of the `main()` function of the binary.
pub fn root() -> Ctx {
    Ctx(Arc::new(Inner {
        clock: RealClock.into(),
        canceled: Arc::new(signal::Once::new()),
    }))
}

impl fmt::Debug for Ctx {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("Ctx").finish_non_exhaustive()
    }
}

impl Clone for Ctx {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl Ctx {
    /// Cancels the context: every pending and future `wait()` call
    /// on any clone resolves to `Interrupted`.
    pub fn cancel(&self) {
        self.0.canceled.send();
    }

    /// Awaits until this context gets canceled.
    pub async fn canceled(&self) {
        self.0.canceled.cancel_safe_recv().await;
    }

    /// Checks if this context is still active (i.e., not canceled).
    pub fn is_active(&self) -> bool {
        !self.0.canceled.try_recv()
    }

    /// Awaits until the provided future `fut` completes, or the context gets
    /// canceled. `fut` is required to be cancel-safe.
    pub async fn wait<F: Future>(&self, fut: F) -> OrInterrupted<F::Output> {
        tokio::select! {
            output = fut => Ok(output),
            () = self.0.canceled.cancel_safe_recv() => Err(Interrupted),
        }
    }

    /// Current time according to the monotone clock.
    pub fn now(&self) -> time::Instant {
        self.0.clock.now()
    }

    /// Waits for a specific time.
    pub async fn sleep(&self, d: time::Duration) -> OrInterrupted<()> {
        self.wait(self.0.clock.sleep(d)).await
    }
}
