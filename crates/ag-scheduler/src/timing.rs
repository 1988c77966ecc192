//! Debounce and throttle timing.
//!
//! The wait decision is a pure function over instants, so it is testable
//! without timers; the drain task feeds it `tokio::time::Instant` values,
//! which follow the paused test clock under `#[tokio::test(start_paused)]`.

use std::time::Duration;

use tokio::time::Instant;

/// Computes how long a freshly spawned debounce task must sleep.
///
/// The wait is at least the debounce window; if the previous run ended less
/// than `min_run_interval` ago, the remaining throttle extends it. Back to
/// back saves therefore coalesce, and runs never start more often than the
/// throttle allows.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tokio::time::Instant;
/// use ag_scheduler::timing::debounce_wait;
///
/// let debounce = Duration::from_millis(500);
/// let throttle = Duration::from_millis(500);
///
/// // No previous run: plain debounce
/// let now = Instant::now();
/// assert_eq!(debounce_wait(debounce, throttle, now, None), debounce);
/// ```
#[must_use]
pub fn debounce_wait(
    debounce: Duration,
    min_run_interval: Duration,
    now: Instant,
    last_run_ended_at: Option<Instant>,
) -> Duration {
    let remaining_throttle = last_run_ended_at.map_or(Duration::ZERO, |ended| {
        min_run_interval.saturating_sub(now.saturating_duration_since(ended))
    });
    debounce.max(remaining_throttle)
}
