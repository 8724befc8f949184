//! Fair asynchronous lock with a cooperative cancellation protocol.
//!
//! The lock serializes critical sections in strict FIFO order: queued
//! callers are resumed in the order their `acquire()` calls were made, and
//! the handoff always happens on the waiter's own task, never within the
//! releasing caller's stack, so stack depth stays bounded regardless of the
//! queue length.
//!
//! Since a running critical section cannot be preempted, a long section can
//! opt into being cut short at explicit checkpoints: while the lock is
//! [cancellable](Lock::set_cancellable) and at least one caller is queued,
//! [`Guard::checkpoint`] resolves to [`Interrupted`] and
//! [`Guard::interruptible`] skips its body entirely. With no waiters queued
//! (or with the switch off) checkpoints are noops, so uncontended code paths
//! are unaffected.
use crate::{
    ctx,
    error::{Error, Interrupted, OrInterrupted},
};
use std::{
    collections::VecDeque,
    fmt,
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};
use tokio::sync::oneshot;


/// Mutable state of the lock.
struct State {
    /// Whether some caller currently holds the lock.
    locked: bool,
    /// Queued callers, oldest first. Each entry resumes one `acquire()`
    /// call. A waiter whose receiver has been dropped (canceled `acquire`)
    /// is skipped at release time.
    waiters: VecDeque<oneshot::Sender<()>>,
}

struct Shared {
    state: Mutex<State>,
    /// Enables the checkpoint protocol. While false, every checkpoint is a
    /// noop.
    cancellable: AtomicBool,
}

/// Fair FIFO lock over a logical resource.
pub struct Lock(Arc<Shared>);

/// Proof of lock ownership, returned by [`Lock::acquire`].
/// Releases the lock on drop, handing it over to the oldest queued waiter.
pub struct Guard(Arc<Shared>);

impl Default for Lock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Lock {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("Lock").finish_non_exhaustive()
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("Guard").finish_non_exhaustive()
    }
}

impl Lock {
    /// Constructs an unheld lock with cancellation checkpoints disabled.
    pub fn new() -> Self {
        Self(Arc::new(Shared {
            state: Mutex::new(State {
                locked: false,
                waiters: VecDeque::new(),
            }),
            cancellable: AtomicBool::new(false),
        }))
    }

    /// Enables or disables the cancellation checkpoints.
    /// Affects checkpoints evaluated after this call.
    pub fn set_cancellable(&self, cancellable: bool) {
        self.0.cancellable.store(cancellable, Ordering::Relaxed);
    }

    /// Number of callers currently queued on the lock.
    pub fn waiters(&self) -> usize {
        self.0.state.lock().unwrap().waiters.len()
    }

    /// Acquires the lock, queuing behind the callers which got here first.
    /// If `ctx` gets canceled while queued, the call resolves to
    /// `Interrupted` and the waiter is skipped at release time.
    pub async fn acquire(&self, ctx: &ctx::Ctx) -> OrInterrupted<Guard> {
        let mut recv = {
            let mut state = self.0.state.lock().unwrap();
            if !state.locked {
                state.locked = true;
                return Ok(Guard(self.0.clone()));
            }
            let (send, recv) = oneshot::channel();
            state.waiters.push_back(send);
            recv
        };
        match ctx.wait(&mut recv).await {
            Ok(res) => {
                // The sender is only consumed by the handoff in
                // `Guard::drop`. It cannot be dropped unsent while this call
                // is pending, since the queue entry outlives `self`.
                res.unwrap();
                Ok(Guard(self.0.clone()))
            }
            Err(interrupted) => {
                // The handoff may race the cancellation. Closing the
                // receiver first makes the race safe: either the lock was
                // already handed to us (and must be given back), or the
                // release path will observe a dead waiter and skip it.
                recv.close();
                if recv.try_recv().is_ok() {
                    drop(Guard(self.0.clone()));
                }
                Err(interrupted)
            }
        }
    }

    /// Runs `f` as a critical section: acquires the lock, passes the guard
    /// to `f` and returns its outcome. Critical sections of concurrent
    /// `run()` calls never overlap and start in `run()` call order.
    /// The lock is released when `f` completes, whether with a value, an
    /// error, or a panic, so queued waiters are never stalled by a failed
    /// section.
    pub async fn run<T, F, Fut>(&self, ctx: &ctx::Ctx, f: F) -> Result<T, Error>
    where
        F: FnOnce(Guard) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let guard = self.acquire(ctx).await?;
        f(guard).await
    }
}

impl Guard {
    /// Cooperative cancellation point. Fails with `Interrupted` iff the lock
    /// is cancellable and at least one caller is queued behind the holder.
    pub fn checkpoint(&self) -> OrInterrupted<()> {
        if self.0.cancellable.load(Ordering::Relaxed)
            && !self.0.state.lock().unwrap().waiters.is_empty()
        {
            return Err(Interrupted);
        }
        Ok(())
    }

    /// Runs `f` unless the critical section should yield the lock: on a
    /// tripped [checkpoint](Self::checkpoint) `f` is never polled and
    /// `Interrupted` is reported in its place.
    pub async fn interruptible<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        self.checkpoint()?;
        f.await
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        let mut state = self.0.state.lock().unwrap();
        loop {
            match state.waiters.pop_front() {
                // Handoff: the lock stays held and ownership moves to the
                // oldest waiter, which resumes on its own task.
                Some(waiter) => {
                    if waiter.send(()).is_ok() {
                        return;
                    }
                    // The waiter gave up (canceled acquire); try the next one.
                }
                None => {
                    state.locked = false;
                    return;
                }
            }
        }
    }
}
