//! Single-consumer double-ended queue with drain signaling.
//!
//! The buffer lives inside a watch channel, so both emptiness transitions
//! are plain value observations: "became non-empty" is what drives the
//! consumer loop, and "became empty" is what resolves [`Queue::drained`].
//! No events are emitted; an observer that is not waiting misses nothing.
use crate::{ctx, error::OrInterrupted};
use std::{collections::VecDeque, fmt, future::Future};
use tokio::sync::watch;

#[cfg(test)]
mod tests;

/// Error returned when popping from an empty queue.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("pop from an empty queue")]
pub struct Empty;

/// Double-ended queue feeding at most one consumer.
pub struct Queue<T> {
    send: watch::Sender<VecDeque<T>>,
}

impl<T> fmt::Debug for Queue<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("Queue").finish_non_exhaustive()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for Queue<T> {
    /// Constructs a queue preloaded with the elements, front to back.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let (send, _) = watch::channel(iter.into_iter().collect());
        Self { send }
    }
}

impl<T> Queue<T> {
    /// Constructs an empty queue.
    pub fn new() -> Self {
        let (send, _) = watch::channel(VecDeque::new());
        Self { send }
    }

    /// Appends an element at the back of the queue. O(1).
    pub fn push_back(&self, v: T) {
        self.send.send_modify(|q| q.push_back(v));
    }

    /// Prepends an element at the front of the queue. O(1).
    pub fn push_front(&self, v: T) {
        self.send.send_modify(|q| q.push_front(v));
    }

    /// Removes the front element.
    /// Popping an empty queue is a structural error, never silent.
    pub fn pop_front(&self) -> Result<T, Empty> {
        let mut popped = None;
        self.send.send_if_modified(|q| {
            popped = q.pop_front();
            popped.is_some()
        });
        popped.ok_or(Empty)
    }

    /// Removes the back element.
    /// Popping an empty queue is a structural error, never silent.
    pub fn pop_back(&self) -> Result<T, Empty> {
        let mut popped = None;
        self.send.send_if_modified(|q| {
            popped = q.pop_back();
            popped.is_some()
        });
        popped.ok_or(Empty)
    }

    /// Number of queued elements.
    pub fn len(&self) -> usize {
        self.send.borrow().len()
    }

    /// Checks whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves once the queue is empty: on the first poll if it already is,
    /// otherwise exactly once the next time it drains.
    pub async fn drained(&self, ctx: &ctx::Ctx) -> OrInterrupted<()> {
        let mut recv = self.send.subscribe();
        ctx.wait(async move {
            // The sender half lives in `self`, so the channel cannot close
            // while this call is pending.
            let _ = recv.wait_for(|q| q.is_empty()).await;
        })
        .await
    }

    /// The single-consumer loop: feeds queued elements into `consume`,
    /// strictly one at a time. The next element is popped only once the
    /// previous `consume` call completed, and the loop yields back to the
    /// scheduler between elements instead of draining a burst on one stack.
    /// Goes idle whenever the queue is empty; returns only when `ctx` gets
    /// canceled.
    pub async fn consume<Fut>(
        &self,
        ctx: &ctx::Ctx,
        mut consume: impl FnMut(T) -> Fut,
    ) -> OrInterrupted<()>
    where
        Fut: Future<Output = ()>,
    {
        let mut recv = self.send.subscribe();
        loop {
            ctx.wait(async {
                let _ = recv.wait_for(|q| !q.is_empty()).await;
            })
            .await?;
            // The element may have been popped concurrently by a direct
            // `pop_*` call; in that case just wait for the next one.
            if let Ok(v) = self.pop_front() {
                consume(v).await;
            }
            tokio::task::yield_now().await;
        }
    }
}
