//! Blinky producer/consumer pair
//!
//! The producer wakes on a fixed, drift-corrected period and offers a fixed
//! value to the handoff. The consumer blocks on the handoff and toggles its
//! LED each time the expected value arrives.

use portable_atomic::{AtomicU32, Ordering};

use crate::config::CFG_RECEIVE_RETRY_TICKS;
use crate::error::OsResult;
use crate::kernel::Kernel;
use crate::output::OutputGuard;
use crate::port::OutputPort;
use crate::sync::handoff::{Handoff, WAIT_FOREVER};
use crate::time::{os_time_dly, os_time_dly_until};
use crate::types::{LineIndex, OsTick};

/// Periodic sender of a fixed value
pub struct PeriodicProducer<'a, T, K> {
    kernel: &'a K,
    queue: &'a Handoff<'a, T, K>,
    value: T,
    period: OsTick,
    dropped: AtomicU32,
}

impl<'a, T: Copy, K: Kernel> PeriodicProducer<'a, T, K> {
    /// Sender of `value` into `queue` every `period` ticks
    pub fn new(kernel: &'a K, queue: &'a Handoff<'a, T, K>, value: T, period: OsTick) -> Self {
        PeriodicProducer {
            kernel,
            queue,
            value,
            period,
            dropped: AtomicU32::new(0),
        }
    }

    /// Task body: wait for the next period, send, forever
    pub fn run(&self) -> ! {
        crate::info!("producer started, period {} ticks", self.period);

        let mut next_wake = self.kernel.tick_get();
        loop {
            os_time_dly_until(self.kernel, &mut next_wake, self.period);
            self.send_once();
        }
    }

    /// Offer the value once without blocking
    ///
    /// A refused send is not retried; the next period is the retry.
    pub fn send_once(&self) -> bool {
        let accepted = self.queue.send(self.value);
        if !accepted {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        accepted
    }

    /// Number of sends refused because the handoff was occupied
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn period(&self) -> OsTick {
        self.period
    }
}

/// Blocking receiver that toggles an LED on the expected value
pub struct BlockingConsumer<'a, T, K, P> {
    queue: &'a Handoff<'a, T, K>,
    guard: &'a OutputGuard<P>,
    line: LineIndex,
    expected: T,
}

impl<'a, T, K, P> BlockingConsumer<'a, T, K, P>
where
    T: Copy + PartialEq,
    K: Kernel,
    P: OutputPort,
{
    /// Receiver of `expected` from `queue`, toggling `line` on `guard`
    pub fn new(
        queue: &'a Handoff<'a, T, K>,
        guard: &'a OutputGuard<P>,
        line: LineIndex,
        expected: T,
    ) -> Self {
        BlockingConsumer {
            queue,
            guard,
            line,
            expected,
        }
    }

    /// Task body: block for a value, handle it, forever
    pub fn run(&self) -> ! {
        crate::info!("consumer started on line {}", self.line);

        loop {
            if let Err(err) = self.receive_once() {
                crate::warn!("consumer receive failed: {}", err);
            }
        }
    }

    /// Block for one value and handle it
    ///
    /// A failed receive (pend list full, called from an ISR) is followed by
    /// a [`CFG_RECEIVE_RETRY_TICKS`] delay before the error is returned.
    /// Otherwise returns whether the value was the expected one.
    pub fn receive_once(&self) -> OsResult<bool> {
        match self.queue.receive(WAIT_FOREVER) {
            Ok(value) => Ok(self.handle(value)),
            Err(err) => {
                os_time_dly(self.queue.kernel(), CFG_RECEIVE_RETRY_TICKS);
                Err(err)
            }
        }
    }

    /// Toggle the LED if `value` is the expected one
    ///
    /// Other values are discarded without effect.
    pub fn handle(&self, value: T) -> bool {
        if value != self.expected {
            return false;
        }
        self.guard.toggle(self.line);
        true
    }

    #[inline]
    pub fn line(&self) -> LineIndex {
        self.line
    }
}
