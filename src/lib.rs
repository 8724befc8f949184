//! Cooperative concurrency primitives: a fair lock with checkpoint-based
//! cancellation, an interruption-aware bounded retry, a failure-aggregating
//! fan-out join and a single-consumer double-ended queue.
//!
//! All primitives are context-aware: they take a [`ctx::Ctx`] and suspend
//! instead of blocking, so "concurrency" means interleaved task polls, never
//! busy threads. Cancellation is cooperative throughout: a canceled context
//! or a tripped lock checkpoint surfaces as [`error::Interrupted`], which
//! every layer (retry included) distinguishes from an operational failure.

pub mod ctx;
pub mod default_map;
pub mod error;
pub mod join;
pub mod lock;
pub mod queue;
pub mod retry;
pub mod signal;
pub mod testonly;
pub mod time;
