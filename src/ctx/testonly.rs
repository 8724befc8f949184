//! Test-only context constructors.
use std::sync::Arc;

use super::{Clock, Ctx, Inner};
use crate::signal;

/// Returns a root context with the given `clock`.
pub fn test_root<C: Clone + Into<Clock>>(clock: &C) -> Ctx {
    Ctx(Arc::new(Inner {
        clock: clock.clone().into(),
        canceled: Arc::new(signal::Once::new()),
    }))
}
