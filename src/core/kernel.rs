//! Scheduler collaborator
//!
//! The core never owns a scheduler. Everything it needs from one is named
//! here: a tick-counted time base, task creation, and a pend/post pair to
//! block the calling task until another task releases it. The coarse
//! exclusion primitive is not part of this trait; it is the
//! `critical-section` implementation linked into the binary (see
//! [`crate::critical`]).

use crate::config::{CFG_PRIO_MAX, CFG_STK_SIZE_MIN};
use crate::error::{OsError, OsResult};
use crate::types::{OsPendStatus, OsPrio, OsStkSize, OsTaskId, OsTick};

/// Tick-counted time base
pub trait TimeBase {
    /// Current tick count (wraps around)
    fn tick_get(&self) -> OsTick;

    /// Block the calling task for `ticks` ticks (0 returns immediately)
    fn time_dly(&self, ticks: OsTick);
}

/// Task scheduling services the core depends on
pub trait Kernel: TimeBase + Sync {
    /// Create a task that runs `entry` at the priority in `spec`
    fn task_create<F>(&self, spec: TaskSpec, entry: F) -> OsResult<OsTaskId>
    where
        F: FnOnce() + Send + 'static;

    /// Identifier of the calling task
    ///
    /// Fails with [`OsError::TaskNoMoreTcb`] if the caller is not a task
    /// and the kernel cannot take it on as one.
    fn task_current(&self) -> OsResult<OsTaskId>;

    /// Block the calling task until posted or until `timeout` ticks elapse
    /// (0 = forever).
    ///
    /// A post that reaches the task before it pends is not lost: the next
    /// pend returns immediately. A pend may also return `Ok` without a
    /// matching post, so callers re-check their wake condition.
    fn task_pend(&self, timeout: OsTick) -> OsPendStatus;

    /// Make a pended task ready
    fn task_post(&self, task: OsTaskId);
}

/// Creation parameters of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskSpec {
    /// Task name for debugging
    pub name: &'static str,
    /// Task priority (0 = highest)
    pub prio: OsPrio,
    /// Stack budget in bytes
    pub stk_size: OsStkSize,
}

impl TaskSpec {
    /// Spec with the minimal stack budget
    pub const fn new(name: &'static str, prio: OsPrio) -> Self {
        TaskSpec {
            name,
            prio,
            stk_size: CFG_STK_SIZE_MIN,
        }
    }

    /// Override the stack budget
    pub const fn with_stack(self, stk_size: OsStkSize) -> Self {
        TaskSpec { stk_size, ..self }
    }

    /// Check the spec against the kernel limits
    pub fn validate(&self) -> OsResult<()> {
        if self.stk_size < CFG_STK_SIZE_MIN {
            return Err(OsError::StkSizeInvalid);
        }

        if self.prio as usize >= CFG_PRIO_MAX {
            return Err(OsError::PrioInvalid);
        }

        Ok(())
    }
}
