//! Wall clock used when a caller does not supply a timestamp.

use std::{sync::OnceLock, time::Instant};

static START: OnceLock<Instant> = OnceLock::new();

/// Seconds since the clock was first read
pub fn now() -> f64 {
    START.get_or_init(Instant::now).elapsed().as_secs_f64()
}

/// Resolve an optional timestamp to a concrete one
pub(crate) fn resolve(now: Option<f64>) -> f64 {
    now.unwrap_or_else(self::now)
}
