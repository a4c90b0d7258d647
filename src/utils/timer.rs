//! Wall-clock timing helpers.
//!
//! Every duration reported by the crate is wall-clock time from
//! [`std::time::Instant`]; nothing here reads cycle counters.

use std::time::{Duration, Instant};

/// Time an expression, yielding `(elapsed, value)`.
///
/// ```
/// let (elapsed, value) = matmul_crossover::measure!(2 + 2);
/// assert_eq!(value, 4);
/// assert!(elapsed.as_secs() < 1);
/// ```
#[macro_export]
macro_rules! measure {
    ($e:expr) => {{
        let start = ::std::time::Instant::now();
        let value = $e;
        (start.elapsed(), value)
    }};
}

/// Run `f`, yielding `(elapsed, value)` like [`measure!`](crate::measure).
#[inline]
pub fn timed<R>(f: impl FnOnce() -> R) -> (Duration, R) {
    let start = Instant::now();
    let value = f();
    (start.elapsed(), value)
}

/// Duration as fractional milliseconds.
#[inline]
pub fn as_millis_f64(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}

/// Format a duration with a unit that keeps three significant digits or so.
pub fn format_duration(d: Duration) -> String {
    let ms = as_millis_f64(d);
    if ms >= 1000.0 {
        format!("{:.2} s", ms / 1000.0)
    } else if ms >= 1.0 {
        format!("{:.2} ms", ms)
    } else {
        format!("{:.1} µs", ms * 1000.0)
    }
}
