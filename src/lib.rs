//! Task-coordination core for a small real-time demo harness
//!
//! Provides the synchronization patterns the demo tasks are built on:
//! - A guarded output port shared by every task (coarse critical section)
//! - A one-slot blocking handoff between a periodic producer and a consumer
//! - A watchdog that folds several liveness checks into one latched LED
//! - A fault latch that pins a dedicated LED on assertion failure
//!
//! The scheduler itself is a collaborator behind the [`Kernel`] trait. With
//! the `std` feature a thread-backed [`host::StdKernel`] is provided.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

// ============ Critical Section ============

#[cfg(all(target_arch = "arm", not(feature = "std")))]
mod cs_impl {
    use cortex_m::interrupt;
    use cortex_m::register::primask;
    use critical_section::{set_impl, Impl, RawRestoreState};

    struct SingleCoreCriticalSection;
    set_impl!(SingleCoreCriticalSection);

    unsafe impl Impl for SingleCoreCriticalSection {
        unsafe fn acquire() -> RawRestoreState {
            let was_active = primask::read().is_active();
            interrupt::disable();
            was_active
        }

        unsafe fn release(was_active: RawRestoreState) {
            if was_active {
                unsafe { interrupt::enable() }
            }
        }
    }
}

// ============ Modules ============

pub mod log;
mod lang_items;

pub mod app;
pub mod core;
pub mod fault;
pub mod output;
pub mod port;
pub mod sync;
pub mod tasks;

#[cfg(feature = "std")]
pub mod host;

// ============ Re-exports ============

pub use crate::core::config;
pub use crate::core::config::*;
pub use crate::core::critical;
pub use crate::core::error;
pub use crate::core::error::{OsError, OsResult};
pub use crate::core::kernel;
pub use crate::core::kernel::{Kernel, TaskSpec, TimeBase};
pub use crate::core::time;
pub use crate::core::types;
pub use crate::core::types::*;

pub use fault::{FaultContext, FaultLatch};
pub use output::{LineRange, OutputGuard, OutputState};
pub use port::OutputPort;
pub use sync::handoff::{Handoff, WAIT_FOREVER};
pub use tasks::blinky::{BlockingConsumer, PeriodicProducer};
pub use tasks::check::{Health, Liveness, ProgressCounter, Watchdog};

#[cfg(feature = "pac")]
pub use stm32_metapac as pac;
