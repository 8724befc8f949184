//! Concurrent fan-out which aggregates partial failures.
//!
//! Unlike a short-circuiting join, [`join_all`] always lets every task run
//! to completion: individual failures are collected on the side and reported
//! together once the whole batch is done, so a caller can tell exactly which
//! tasks failed and still observe the results of the ones that did not.
use crate::{
    ctx,
    error::{Error, OrInterrupted},
};
use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
};


/// A task runnable by [`join_all`].
pub type Task<T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send>>;

/// Boxes a future into a [`Task`].
pub fn task<T, F>(f: F) -> Task<T>
where
    F: Future<Output = Result<T, Error>> + Send + 'static,
{
    Box::pin(f)
}

/// Aggregate of every individual task failure of a [`join_all`] batch.
#[derive(Debug)]
pub struct AggregateError<T> {
    /// Individual failures, ordered by completion time. Never empty.
    pub failures: Vec<Error>,
    /// Per-task results aligned to the input order; `None` for the tasks
    /// which failed.
    pub results: Vec<Option<T>>,
}

impl<T> AggregateError<T> {
    /// The failure which completed first.
    pub fn first(&self) -> &Error {
        &self.failures[0]
    }
}

impl<T> fmt::Display for AggregateError<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{} of {} tasks failed: {}",
            self.failures.len(),
            self.results.len(),
            self.failures[0],
        )
    }
}

impl<T: fmt::Debug> std::error::Error for AggregateError<T> {}

/// Runs every task concurrently and waits for all of them, even when some
/// fail. All-success yields the task results in input order; otherwise every
/// failure is reported through [`AggregateError`], together with the results
/// of the successful tasks. Canceling `ctx` abandons the wait (the outer
/// `Interrupted`), while a panicking task is propagated as a panic.
pub async fn join_all<T: Send + 'static>(
    ctx: &ctx::Ctx,
    tasks: Vec<Task<T>>,
) -> OrInterrupted<Result<Vec<T>, AggregateError<T>>> {
    // Failures are pushed in completion order; results keep the input order.
    let failures = Arc::new(Mutex::new(Vec::new()));
    let handles: Vec<_> = tasks
        .into_iter()
        .map(|task| {
            let failures = failures.clone();
            tokio::spawn(async move {
                match task.await {
                    Ok(v) => Some(v),
                    Err(err) => {
                        failures.lock().unwrap().push(err);
                        None
                    }
                }
            })
        })
        .collect();
    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        // A task panic propagates here, like in any other join.
        results.push(ctx.wait(handle).await?.unwrap());
    }
    // All handles are joined, so this is the last reference.
    let failures = Arc::try_unwrap(failures).ok().unwrap().into_inner().unwrap();
    if failures.is_empty() {
        // No failure recorded, so every slot is filled.
        Ok(Ok(results.into_iter().map(|v| v.unwrap()).collect()))
    } else {
        Ok(Err(AggregateError { failures, results }))
    }
}
