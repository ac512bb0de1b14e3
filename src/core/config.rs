//! Compile-time configuration for the demo core
//!
//! These constants control resource limits, task priorities and the
//! LED/line assignments of the demo board.

use crate::types::{LineIndex, OsPrio, OsTick};

/// Maximum number of priority levels
pub const CFG_PRIO_MAX: usize = 8;

/// Idle task priority
pub const CFG_PRIO_IDLE: OsPrio = (CFG_PRIO_MAX - 1) as OsPrio;

/// Priority of the blinky send task (just above idle)
pub const CFG_PRIO_BLINKY_SEND: OsPrio = CFG_PRIO_IDLE - 1;

/// Priority of the blinky receive task
pub const CFG_PRIO_BLINKY_RECEIVE: OsPrio = CFG_PRIO_IDLE - 2;

/// Priority of the check (watchdog) task
pub const CFG_PRIO_CHECK: OsPrio = CFG_PRIO_IDLE - 3;

/// System tick rate in Hz
pub const CFG_TICK_RATE_HZ: u32 = 1000;

/// Minimum task stack size in bytes
pub const CFG_STK_SIZE_MIN: usize = 128;

/// Maximum number of tasks a hosted kernel will create
pub const CFG_TASK_MAX: usize = 16;

/// Maximum number of live foreign threads a hosted kernel adopts as tasks
pub const CFG_ADOPT_MAX: usize = 32;

/// Maximum number of tasks pended on a single handoff
pub const CFG_PEND_LIST_MAX: usize = 4;

/// Maximum number of liveness checks a watchdog can poll
pub const CFG_LIVENESS_MAX: usize = 8;

/// Back-off of a blocking receiver after a failed receive
pub const CFG_RECEIVE_RETRY_TICKS: OsTick = 10;

// ============ Output lines ============

/// Width of the output register in lines
pub const CFG_OUTPUT_WIDTH: LineIndex = 8;

/// Lowest controllable output line
pub const CFG_OUTPUT_LINE_MIN: LineIndex = 4;

/// Highest controllable output line
pub const CFG_OUTPUT_LINE_MAX: LineIndex = 7;

/// LED toggled by the check task while every worker is alive
pub const CHECK_TASK_LED: LineIndex = 4;

/// LED owned by the serial port tasks (external collaborator)
pub const COM_TEST_LED: LineIndex = 5;

/// LED toggled each time the blinky value is received
pub const BLINKY_LED: LineIndex = 6;

/// LED forced on by an assertion failure
pub const FAULT_LED: LineIndex = 7;

// ============ Demo timing and values ============

/// Rate at which the blinky value is sent
pub const BLINKY_PERIOD_MS: u32 = 200;

/// Period between executions of the check task
pub const CHECK_PERIOD_MS: u32 = 3000;

/// Value sent through the handoff and expected by the receiver
pub const BLINKY_VALUE: u8 = 100;

/// Parameter handed to the send task at creation
pub const SEND_PARAMETER: u32 = 0x1111;

/// Parameter handed to the receive task at creation
pub const RECEIVE_PARAMETER: u32 = 0x22;
