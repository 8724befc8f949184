//! Error taxonomy shared by every primitive in this crate.
use std::fmt::Display;

/// Error returned when an operation was cut short by the cooperative
/// cancellation protocol: either the context got canceled, or a lock
/// checkpoint yielded to queued waiters.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("interrupted")]
pub struct Interrupted;

/// Wraps a result with `Interrupted` as an error.
pub type OrInterrupted<T> = Result<T, Interrupted>;

/// anyhow::Error + "interrupted" variant.
/// The interruption variant must stay distinguishable from operational
/// failures all the way up the stack: the retry layer stops (rather than
/// retries) on it, and callers must never mistake it for success.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Operation was interrupted before completion.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
    /// Any other operational failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Error {
    /// Checks whether this is a cooperative interruption.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Error::Interrupted(_))
    }
}

/// Trait complementary to `anyhow::Context` which allows for
/// adding context to error types which contain `anyhow::Error`.
///
/// If an error type implements both `Wrap` and `From<anyhow::Error>`
/// you should be careful to NOT use `context()` instead of `wrap()`,
/// because `context()` will just hide all the error details.
pub trait Wrap: Sized {
    /// Appends context `c` to the error.
    fn wrap<C: Display + Send + Sync + 'static>(self, c: C) -> Self {
        self.with_wrap(|| c)
    }
    /// Appends context `f()` to the error.
    fn with_wrap<C: Display + Send + Sync + 'static, F: FnOnce() -> C>(self, f: F) -> Self;
}

impl<T, E: Wrap> Wrap for Result<T, E> {
    fn with_wrap<C: Display + Send + Sync + 'static, F: FnOnce() -> C>(self, f: F) -> Self {
        self.map_err(|err| err.with_wrap(f))
    }
}

impl Wrap for Error {
    fn with_wrap<C: Display + Send + Sync + 'static, F: FnOnce() -> C>(self, f: F) -> Self {
        match self {
            Error::Internal(err) => Error::Internal(err.context(f())),
            err => err,
        }
    }
}
