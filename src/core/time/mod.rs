//! Time management module
//!
//! Provides tick conversion, relative delays, and the drift-corrected
//! periodic delay used by the periodic tasks.

use crate::config::CFG_TICK_RATE_HZ;
use crate::error::{OsError, OsResult};
use crate::kernel::TimeBase;
use crate::types::OsTick;

/// Convert milliseconds to ticks at [`CFG_TICK_RATE_HZ`]
#[inline]
pub const fn ms_to_ticks(ms: u32) -> OsTick {
    ((ms as u64 * CFG_TICK_RATE_HZ as u64) / 1000) as OsTick
}

/// Time delay in ticks
///
/// Relative to the moment of the call, so work done before the call adds
/// to the period. Use [`os_time_dly_until`] when the rate matters.
#[inline]
pub fn os_time_dly<T: TimeBase + ?Sized>(time: &T, ticks: OsTick) {
    if ticks == 0 {
        return;
    }
    time.time_dly(ticks);
}

/// Time delay in hours, minutes, seconds, milliseconds
///
/// # Arguments
/// * `hours` - Hours (0-999)
/// * `minutes` - Minutes (0-59)
/// * `seconds` - Seconds (0-59)
/// * `milliseconds` - Milliseconds (0-999)
pub fn os_time_dly_hmsm<T: TimeBase + ?Sized>(
    time: &T,
    hours: u16,
    minutes: u8,
    seconds: u8,
    milliseconds: u16,
) -> OsResult<()> {
    if hours > 999 || minutes > 59 || seconds > 59 || milliseconds > 999 {
        return Err(OsError::StateInvalid);
    }

    let total_ms = (hours as u32) * 3600_000
        + (minutes as u32) * 60_000
        + (seconds as u32) * 1000
        + (milliseconds as u32);

    os_time_dly(time, ms_to_ticks(total_ms));
    Ok(())
}

/// Outcome of a periodic wake computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeriodicWake {
    /// Scheduled wake tick, to be used as the next reference
    pub wake_at: OsTick,
    /// Ticks to sleep from `now`, or `None` if the wake time already passed
    pub delay: Option<OsTick>,
}

/// Compute the next wake of a periodic task
///
/// The next wake is `prev_wake + period`, never `now + period`. Tick counter
/// wrap-around between `prev_wake`, `now` and the wake time is handled.
pub fn next_periodic_wake(prev_wake: OsTick, period: OsTick, now: OsTick) -> PeriodicWake {
    let wake_at = prev_wake.wrapping_add(period);

    let should_delay = if now < prev_wake {
        // The tick count wrapped since the previous wake; only a wake time
        // that also wrapped and still lies ahead is worth sleeping for.
        wake_at < prev_wake && wake_at > now
    } else {
        wake_at < prev_wake || wake_at > now
    };

    PeriodicWake {
        wake_at,
        delay: should_delay.then(|| wake_at.wrapping_sub(now)),
    }
}

/// Drift-corrected periodic delay
///
/// Blocks until `*next_wake + period` and advances `*next_wake` to that
/// tick, so the time spent in the loop body does not accumulate. Initialise
/// `*next_wake` once with the current tick before the loop.
///
/// Returns `false` if the wake time had already passed (the task overran
/// its period) and no delay took place.
pub fn os_time_dly_until<T: TimeBase + ?Sized>(
    time: &T,
    next_wake: &mut OsTick,
    period: OsTick,
) -> bool {
    let wake = next_periodic_wake(*next_wake, period, time.tick_get());
    *next_wake = wake.wake_at;

    match wake.delay {
        Some(ticks) => {
            os_time_dly(time, ticks);
            true
        }
        None => {
            crate::trace!("periodic wake {} already passed", wake.wake_at);
            false
        }
    }
}
