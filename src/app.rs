//! Demo wiring
//!
//! Creates the blinky pair and the check task on a kernel: one handoff of
//! length one, a receive task above the send task, and the check task above
//! both.

use crate::config::{
    BLINKY_LED, BLINKY_PERIOD_MS, BLINKY_VALUE, CFG_PRIO_BLINKY_RECEIVE, CFG_PRIO_BLINKY_SEND,
    CFG_PRIO_CHECK, CHECK_PERIOD_MS, CHECK_TASK_LED, RECEIVE_PARAMETER, SEND_PARAMETER,
};
use crate::error::OsResult;
use crate::fault::FaultLatch;
use crate::kernel::{Kernel, TaskSpec};
use crate::os_assert;
use crate::output::OutputGuard;
use crate::port::OutputPort;
use crate::sync::handoff::Handoff;
use crate::tasks::{BlockingConsumer, Liveness, PeriodicProducer, Watchdog};
use crate::time::ms_to_ticks;
use crate::types::{LineIndex, OsTaskId};

/// Runtime configuration of the demo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppConfig {
    /// Send period of the blinky producer
    pub blinky_period_ms: u32,
    /// Period of the check task
    pub check_period_ms: u32,
    /// LED toggled by the blinky receiver
    pub blinky_led: LineIndex,
    /// LED toggled by the check task
    pub check_led: LineIndex,
    /// Value sent and expected by the blinky pair
    pub blinky_value: u8,
    /// Parameter handed to the send task
    pub send_parameter: u32,
    /// Parameter handed to the receive task
    pub receive_parameter: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            blinky_period_ms: BLINKY_PERIOD_MS,
            check_period_ms: CHECK_PERIOD_MS,
            blinky_led: BLINKY_LED,
            check_led: CHECK_TASK_LED,
            blinky_value: BLINKY_VALUE,
            send_parameter: SEND_PARAMETER,
            receive_parameter: RECEIVE_PARAMETER,
        }
    }
}

/// Long-lived objects the demo tasks share
pub struct Resources<K: 'static, P: 'static> {
    pub kernel: &'static K,
    pub guard: &'static OutputGuard<P>,
    pub queue: &'static Handoff<'static, u8, K>,
    pub fault: &'static FaultLatch<'static, P>,
}

impl<K: 'static, P: 'static> Clone for Resources<K, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: 'static, P: 'static> Copy for Resources<K, P> {}

/// Ids of the tasks created by [`start`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppTasks {
    pub receive: OsTaskId,
    pub send: OsTaskId,
    pub check: OsTaskId,
}

/// Create the blinky and check tasks
///
/// `checks` are registered with the check task in order. The tasks run
/// until the process ends.
pub fn start<K, P, I>(res: Resources<K, P>, config: AppConfig, checks: I) -> OsResult<AppTasks>
where
    K: Kernel + 'static,
    P: OutputPort + Send + 'static,
    I: IntoIterator<Item = &'static (dyn Liveness + Sync)>,
{
    let mut watchdog = Watchdog::new(
        res.kernel,
        res.guard,
        config.check_led,
        ms_to_ticks(config.check_period_ms),
    );
    for check in checks {
        watchdog.register(check)?;
    }

    let receive_param = config.receive_parameter;
    let receive = res.kernel.task_create(
        TaskSpec::new("RX", CFG_PRIO_BLINKY_RECEIVE),
        move || {
            os_assert!(res.fault, receive_param == RECEIVE_PARAMETER);
            BlockingConsumer::new(res.queue, res.guard, config.blinky_led, config.blinky_value).run()
        },
    )?;

    let send_param = config.send_parameter;
    let send = res.kernel.task_create(
        TaskSpec::new("TX", CFG_PRIO_BLINKY_SEND),
        move || {
            os_assert!(res.fault, send_param == SEND_PARAMETER);
            PeriodicProducer::new(
                res.kernel,
                res.queue,
                config.blinky_value,
                ms_to_ticks(config.blinky_period_ms),
            )
            .run()
        },
    )?;

    let check = res
        .kernel
        .task_create(TaskSpec::new("Check", CFG_PRIO_CHECK), move || watchdog.run())?;

    crate::info!("demo tasks created: RX {} TX {} Check {}", receive, send, check);

    Ok(AppTasks {
        receive,
        send,
        check,
    })
}
