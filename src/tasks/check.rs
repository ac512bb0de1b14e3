//! Check (watchdog) task
//!
//! Periodically polls every registered liveness check and toggles its LED
//! while all of them report progress. The first cycle in which any check
//! fails latches the watchdog into [`Health::Failed`]: the LED then freezes
//! at whatever value it last held, and only a restart brings it back.

use heapless::Vec;
use portable_atomic::{AtomicU32, Ordering};

use crate::config::CFG_LIVENESS_MAX;
use crate::error::{OsError, OsResult};
use crate::kernel::Kernel;
use crate::output::OutputGuard;
use crate::port::OutputPort;
use crate::time::os_time_dly;
use crate::types::{LineIndex, OsTick};

/// A worker that can report whether it made progress since the last poll
///
/// Polling is expected to reset whatever the worker tracks, so each call
/// answers for the interval since the previous one.
pub trait Liveness {
    fn still_running(&self) -> bool;
}

impl<F> Liveness for F
where
    F: Fn() -> bool,
{
    fn still_running(&self) -> bool {
        self()
    }
}

/// Progress counter polled by the watchdog
///
/// The worker calls [`note_progress`](Self::note_progress) from its loop;
/// [`still_running`](Liveness::still_running) reports whether the count
/// moved since the previous poll.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    count: AtomicU32,
    last_seen: AtomicU32,
}

impl ProgressCounter {
    pub const fn new() -> Self {
        ProgressCounter {
            count: AtomicU32::new(0),
            last_seen: AtomicU32::new(0),
        }
    }

    /// Record one unit of progress
    #[inline]
    pub fn note_progress(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Total progress recorded so far
    #[inline]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Liveness for ProgressCounter {
    fn still_running(&self) -> bool {
        let now = self.count.load(Ordering::Relaxed);
        let before = self.last_seen.swap(now, Ordering::Relaxed);
        now != before
    }
}

/// Health of the watchdog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Health {
    /// Every check passed on every cycle so far
    Healthy,
    /// A check failed; terminal
    Failed,
}

impl Health {
    /// Fold one cycle's verdict into the current health
    #[inline]
    fn after(self, all_running: bool) -> Health {
        match (self, all_running) {
            (Health::Healthy, true) => Health::Healthy,
            _ => Health::Failed,
        }
    }
}

/// Aggregates liveness checks into one LED
pub struct Watchdog<'a, K, P> {
    kernel: &'a K,
    guard: &'a OutputGuard<P>,
    line: LineIndex,
    period: OsTick,
    checks: Vec<&'a (dyn Liveness + Sync), CFG_LIVENESS_MAX>,
    health: Health,
    toggles: u32,
}

impl<'a, K: Kernel, P: OutputPort> Watchdog<'a, K, P> {
    /// Watchdog toggling `line` every `period` ticks while healthy
    pub fn new(kernel: &'a K, guard: &'a OutputGuard<P>, line: LineIndex, period: OsTick) -> Self {
        Watchdog {
            kernel,
            guard,
            line,
            period,
            checks: Vec::new(),
            health: Health::Healthy,
            toggles: 0,
        }
    }

    /// Add a check; checks are polled in registration order
    pub fn register(&mut self, check: &'a (dyn Liveness + Sync)) -> OsResult<()> {
        self.checks
            .push(check)
            .map_err(|_| OsError::LivenessTableFull)
    }

    /// Task body: delay, check, forever
    pub fn run(mut self) -> ! {
        crate::info!(
            "check task started, {} checks every {} ticks",
            self.checks.len(),
            self.period
        );

        loop {
            os_time_dly(self.kernel, self.period);
            self.check_once();
        }
    }

    /// Run one check cycle
    ///
    /// Every check is polled, even after one has failed, so each worker
    /// gets its per-poll reset.
    pub fn check_once(&mut self) -> Health {
        let all_running = self
            .checks
            .iter()
            .fold(true, |acc, check| check.still_running() & acc);

        // A failure shows only as the LED no longer moving
        self.health = self.health.after(all_running);
        if self.health == Health::Healthy {
            self.guard.toggle(self.line);
            self.toggles = self.toggles.wrapping_add(1);
        }

        self.health
    }

    #[inline]
    pub fn health(&self) -> Health {
        self.health
    }

    /// Number of LED toggles issued so far
    #[inline]
    pub fn toggles(&self) -> u32 {
        self.toggles
    }

    #[inline]
    pub fn line(&self) -> LineIndex {
        self.line
    }
}
