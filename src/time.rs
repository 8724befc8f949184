//! Well-defined alternatives to types in std::time.
//! Provides a signed Duration with nanosecond precision.

/// A signed Duration.
pub type Duration = time::Duration;

/// Monotonic clock time.
pub type Instant = time::Instant;
