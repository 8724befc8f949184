//! Non-global clock, owned by [`crate::ctx::Ctx`].
//! Functions which use the system clock directly are non-hermetic, which
//! makes them effectively non-deterministic and hard to test. Primitives in
//! this crate read time and sleep through the context's clock instead, so
//! that tests can substitute [`ManualClock`] and control time explicitly.
use crate::time;
use once_cell::sync::Lazy;
use std::{
    fmt,
    sync::{Arc, Mutex},
};
use tokio::sync::watch;

// Instant doesn't have a deterministic constructor.
// However since Instant is not convertible to a unix timestamp,
// we can snapshot Instant::now() once and treat it as a constant.
// All observable effects will be then deterministic.
static FAKE_CLOCK_MONO_START: Lazy<time::Instant> = Lazy::new(time::Instant::now);

/// Realtime clock.
#[derive(Clone)]
pub struct RealClock;

impl RealClock {
    /// Current time according to the monotone clock.
    pub fn now(&self) -> time::Instant {
        // We use `now()` from tokio, so that `tokio::time::pause()`
        // works in tests.
        tokio::time::Instant::now().into_std().into()
    }
}

struct ManualState {
    /// `mono` keeps the current time of the monotonic clock.
    /// It is wrapped in watch::Sender, so that the value can
    /// be observed from the clock::sleep() futures.
    mono: watch::Sender<time::Instant>,
    /// We need to keep it so that mono.send() always succeeds.
    _mono_recv: watch::Receiver<time::Instant>,
    /// Whether time should be auto advanced at sleep() calls.
    /// Effectively makes sleep() calls non-blocking.
    advance_on_sleep: bool,
}

impl fmt::Debug for ManualState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ManualState")
            .field("advance_on_sleep", &self.advance_on_sleep)
            .finish()
    }
}

/// Fake clock which supports manually advancing the time.
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<Mutex<ManualState>>);

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Constructs a manual clock set to a default value of now.
    pub fn new() -> Self {
        let (mono, _mono_recv) = watch::channel(*FAKE_CLOCK_MONO_START);
        Self(Arc::new(Mutex::new(ManualState {
            mono,
            _mono_recv,
            advance_on_sleep: false,
        })))
    }

    /// Current time according to the monotone clock.
    pub fn now(&self) -> time::Instant {
        *self.0.lock().unwrap().mono.borrow()
    }

    /// Advances the monotonic clock by `d`.
    pub fn advance(&self, d: time::Duration) {
        let this = self.0.lock().unwrap();
        assert!(d >= time::Duration::ZERO);
        if d == time::Duration::ZERO {
            return;
        }
        let now = *this.mono.borrow();
        this.mono.send(now + d).unwrap();
    }

    /// Advances the monotonic clock to `t`.
    /// Noop if `t` is already in the past.
    pub fn advance_until(&self, t: time::Instant) {
        let this = self.0.lock().unwrap();
        let now = *this.mono.borrow();
        if t <= now {
            return;
        }
        this.mono.send(t).unwrap();
    }

    /// Enables auto advancing time on sleep.
    /// Affects only sleep calls started AFTER this call.
    pub fn set_advance_on_sleep(&self) {
        self.0.lock().unwrap().advance_on_sleep = true;
    }
}

/// An abstract clock.
/// We use a concrete enum rather than a trait to
/// avoid abstract method call in runtime.
#[derive(Clone)]
pub enum Clock {
    /// Realtime clock.
    Real(RealClock),
    /// Manual clock.
    Manual(ManualClock),
}

impl From<RealClock> for Clock {
    fn from(c: RealClock) -> Self {
        Self::Real(c)
    }
}

impl From<ManualClock> for Clock {
    fn from(c: ManualClock) -> Self {
        Self::Manual(c)
    }
}

impl Clock {
    /// Current time according to the monotone clock.
    pub fn now(&self) -> time::Instant {
        match self {
            Self::Real(c) => c.now(),
            Self::Manual(c) => c.now(),
        }
    }

    /// Blocks until `d` passes.
    /// Cancel-safe.
    pub(crate) async fn sleep(&self, d: time::Duration) {
        match self {
            Self::Real(_) => tokio::time::sleep(d.try_into().unwrap()).await,
            Self::Manual(manual) => {
                if manual.0.lock().unwrap().advance_on_sleep {
                    manual.advance(d);
                    return;
                }
                let mut watch = manual.0.lock().unwrap().mono.subscribe();
                let t = *watch.borrow() + d;
                while *watch.borrow() < t {
                    watch.changed().await.unwrap();
                }
            }
        }
    }
}
