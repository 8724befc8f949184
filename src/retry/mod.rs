//! Bounded retry with interruption-aware semantics.
//!
//! A cooperative interruption raised inside the retried operation (for
//! example by a lock checkpoint) is not an attempt failure: it must not be
//! retried, must not run failure hooks, and must reach the caller verbatim,
//! exactly once. Only operational failures consume attempts.
use crate::{ctx, error::Error, time};
use std::future::Future;


/// Invokes `op` up to `times` attempts, stopping at the first success.
/// `times == 0` still runs the operation once.
///
/// An `Interrupted` outcome aborts the remaining attempts immediately and is
/// reported to the caller as-is. Any other failure is retried up to the
/// bound; after the last attempt it is surfaced unchanged.
pub async fn retry<T, Fut>(
    ctx: &ctx::Ctx,
    times: usize,
    op: impl FnMut() -> Fut,
) -> Result<T, Error>
where
    Fut: Future<Output = Result<T, Error>>,
{
    retry_with_delay(ctx, times, time::Duration::ZERO, op, |_: &anyhow::Error| async {}).await
}

/// Like [`retry`], with a fixed inter-attempt delay and an `on_failure` hook.
///
/// After every failed attempt (interruptions excluded, the final attempt
/// included) `on_failure` runs to completion. When attempts remain, the
/// `delay` then elapses on the context clock before the next one. A
/// successful attempt completes immediately, with no trailing delay.
/// Canceling `ctx` during the delay interrupts the whole call.
pub async fn retry_with_delay<T, Fut, OnFailure, OnFailureFut>(
    ctx: &ctx::Ctx,
    times: usize,
    delay: time::Duration,
    mut op: impl FnMut() -> Fut,
    mut on_failure: OnFailure,
) -> Result<T, Error>
where
    Fut: Future<Output = Result<T, Error>>,
    OnFailure: FnMut(&anyhow::Error) -> OnFailureFut,
    OnFailureFut: Future<Output = ()>,
{
    let times = times.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            // Interruption is not a retryable failure: no attempt is
            // charged, no hook runs, and the signal reaches the caller
            // unchanged.
            Err(Error::Interrupted(err)) => return Err(err.into()),
            Err(Error::Internal(err)) => {
                tracing::debug!(attempt, "attempt failed: {err:#}");
                on_failure(&err).await;
                if attempt >= times {
                    return Err(err.into());
                }
                attempt += 1;
                if delay > time::Duration::ZERO {
                    ctx.sleep(delay).await?;
                }
            }
        }
    }
}
