//! Property-based tests
//!
//! Drift correction, producer/consumer interleaving and output-guard
//! behaviour checked over generated inputs, using a virtual clock instead
//! of wall time.

use std::cell::Cell;
use std::sync::atomic::{AtomicU32, Ordering};

use proptest::prelude::*;

use rtdemo::config::{BLINKY_LED, BLINKY_VALUE};
use rtdemo::error::{OsError, OsResult};
use rtdemo::host::HostPort;
use rtdemo::kernel::{Kernel, TaskSpec, TimeBase};
use rtdemo::output::{LineRange, OutputGuard};
use rtdemo::sync::handoff::{Handoff, WAIT_FOREVER};
use rtdemo::tasks::{BlockingConsumer, PeriodicProducer};
use rtdemo::time::{next_periodic_wake, os_time_dly_until};
use rtdemo::types::{OsPendStatus, OsTaskId, OsTick};

struct VirtualClock {
    now: Cell<OsTick>,
}

impl VirtualClock {
    fn work(&self, ticks: OsTick) {
        self.now.set(self.now.get().wrapping_add(ticks));
    }
}

impl TimeBase for VirtualClock {
    fn tick_get(&self) -> OsTick {
        self.now.get()
    }

    fn time_dly(&self, ticks: OsTick) {
        self.work(ticks);
    }
}

/// Single-task kernel on a virtual clock
///
/// Only the calling task exists, so a pend can never be satisfied and
/// always times out.
struct SimKernel {
    now: AtomicU32,
}

impl SimKernel {
    fn at(now: OsTick) -> Self {
        SimKernel {
            now: AtomicU32::new(now),
        }
    }

    fn work(&self, ticks: OsTick) {
        self.now.fetch_add(ticks, Ordering::Relaxed);
    }
}

impl TimeBase for SimKernel {
    fn tick_get(&self) -> OsTick {
        self.now.load(Ordering::Relaxed)
    }

    fn time_dly(&self, ticks: OsTick) {
        self.work(ticks);
    }
}

impl Kernel for SimKernel {
    fn task_create<F>(&self, _spec: TaskSpec, _entry: F) -> OsResult<OsTaskId>
    where
        F: FnOnce() + Send + 'static,
    {
        Err(OsError::TaskNoMoreTcb)
    }

    fn task_current(&self) -> OsResult<OsTaskId> {
        Ok(0)
    }

    fn task_pend(&self, timeout: OsTick) -> OsPendStatus {
        self.work(timeout);
        OsPendStatus::Timeout
    }

    fn task_post(&self, _task: OsTaskId) {}
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Set(u8, bool),
    Toggle(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..16, any::<bool>()).prop_map(|(line, on)| Op::Set(line, on)),
        (0u8..16).prop_map(Op::Toggle),
    ]
}

fn line_range() -> impl Strategy<Value = LineRange> {
    (0u8..8, 0u8..8).prop_map(|(a, b)| LineRange::new(a.min(b), a.max(b)).unwrap())
}

proptest! {
    #[test]
    fn prop_steady_state_never_rejects(
        origin in any::<u32>(),
        period in 2u32..1000,
        latency in prop::collection::vec(0u32..1000, 1..200),
    ) {
        let kernel = SimKernel::at(origin);
        let port = HostPort::new(0);
        let reg = port.register();
        let guard = OutputGuard::new(port, LineRange::BOARD);
        let queue = Handoff::new(&kernel);
        let producer = PeriodicProducer::new(&kernel, &queue, BLINKY_VALUE, period);
        let consumer = BlockingConsumer::new(&queue, &guard, BLINKY_LED, BLINKY_VALUE);

        let mut next_wake = kernel.tick_get();
        for (k, latency) in latency.iter().enumerate() {
            // Producer wakes and sends
            prop_assert!(os_time_dly_until(&kernel, &mut next_wake, period));
            prop_assert!(producer.send_once());

            // Consumer gets the CPU some time within the period
            kernel.work(latency % period);
            prop_assert_eq!(queue.receive(WAIT_FOREVER).map(|v| consumer.handle(v)), Ok(true));
            prop_assert_eq!(reg.flips(BLINKY_LED), k as u32 + 1);
        }

        prop_assert_eq!(queue.rejected(), 0);
        prop_assert_eq!(producer.dropped(), 0);
        prop_assert!(!queue.is_occupied());
    }

    #[test]
    fn prop_one_missed_period_drops_one_send(
        origin in any::<u32>(),
        period in 2u32..1000,
        missed in 0usize..19,
    ) {
        let kernel = SimKernel::at(origin);
        let guard = OutputGuard::new(HostPort::new(0), LineRange::BOARD);
        let queue = Handoff::new(&kernel);
        let producer = PeriodicProducer::new(&kernel, &queue, BLINKY_VALUE, period);
        let consumer = BlockingConsumer::new(&queue, &guard, BLINKY_LED, BLINKY_VALUE);

        let mut next_wake = origin;
        for k in 0..20 {
            os_time_dly_until(&kernel, &mut next_wake, period);
            producer.send_once();
            if k == missed {
                // The consumer does not run this period
                continue;
            }
            prop_assert_eq!(queue.receive(WAIT_FOREVER).map(|v| consumer.handle(v)), Ok(true));
        }

        prop_assert_eq!(queue.rejected(), 1);
        prop_assert_eq!(producer.dropped(), 1);
    }

    #[test]
    fn prop_periodic_wakes_stay_on_grid(
        origin in any::<u32>(),
        period in 1u32..1000,
        work in prop::collection::vec(0u32..1000, 1..64),
    ) {
        let clock = VirtualClock { now: Cell::new(origin) };
        let mut next_wake = clock.tick_get();

        for (k, busy) in work.iter().enumerate() {
            let busy = busy % period;
            prop_assert!(os_time_dly_until(&clock, &mut next_wake, period));

            let expected = origin.wrapping_add(period * (k as u32 + 1));
            prop_assert_eq!(clock.tick_get(), expected);
            prop_assert_eq!(next_wake, expected);

            clock.work(busy);
        }
    }

    #[test]
    fn prop_periodic_wakes_across_wrap(
        before_wrap in 0u32..2000,
        period in 1u32..500,
        busy in 0u32..500,
    ) {
        let origin = u32::MAX - before_wrap;
        let clock = VirtualClock { now: Cell::new(origin) };
        let mut next_wake = origin;

        for k in 1..=10u32 {
            os_time_dly_until(&clock, &mut next_wake, period);
            prop_assert_eq!(clock.tick_get(), origin.wrapping_add(period * k));
            clock.work(busy % period);
        }
    }

    #[test]
    fn prop_wake_is_prev_plus_period(
        prev in any::<u32>(),
        period in 1u32..10_000,
        elapsed in 0u32..20_000,
    ) {
        let now = prev.wrapping_add(elapsed);
        let wake = next_periodic_wake(prev, period, now);

        prop_assert_eq!(wake.wake_at, prev.wrapping_add(period));
        if elapsed < period {
            prop_assert_eq!(wake.delay, Some(period - elapsed));
        } else {
            prop_assert_eq!(wake.delay, None);
        }
    }

    #[test]
    fn prop_guard_matches_model(
        initial in any::<u8>(),
        lines in line_range(),
        ops in prop::collection::vec(op(), 0..64),
    ) {
        let port = HostPort::new(initial);
        let reg = port.register();
        let guard = OutputGuard::new(port, lines);

        let mask = lines.mask();
        let mut model = initial & !mask;
        prop_assert_eq!(reg.value(), model);

        for op in ops {
            match op {
                Op::Set(line, on) => {
                    guard.set(line, on);
                    if lines.contains(line) {
                        if on {
                            model |= 1 << line;
                        } else {
                            model &= !(1 << line);
                        }
                    }
                }
                Op::Toggle(line) => {
                    guard.toggle(line);
                    if lines.contains(line) {
                        model ^= 1 << line;
                    }
                }
            }
            prop_assert_eq!(reg.value(), model);
            prop_assert_eq!(guard.state().bits(), model);
        }

        // Lines outside the range never changed
        prop_assert_eq!(reg.value() & !mask, initial & !mask);
        prop_assert_eq!(reg.unguarded_writes(), 0);
    }

    #[test]
    fn prop_set_then_clear_leaves_line_off(
        initial in any::<u8>(),
        line in 4u8..8,
        repeats in 1usize..4,
    ) {
        let port = HostPort::new(initial);
        let reg = port.register();
        let guard = OutputGuard::new(port, LineRange::BOARD);

        for _ in 0..repeats {
            guard.set(line, true);
        }
        prop_assert!(reg.is_on(line));

        guard.set(line, false);
        prop_assert!(!reg.is_on(line));
        prop_assert_eq!(guard.get(line), Some(false));
    }
}
