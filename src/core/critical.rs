//! Critical section handling
//!
//! The coarse exclusion used around every read-modify-write of shared
//! hardware state. It is the "suspend all / resume all" pair of the
//! scheduler collapsed onto the `critical-section` crate: on Cortex-M the
//! implementation masks interrupts (and with them the tick that would
//! preempt), on hosted builds it is a process-wide reentrant lock.

use portable_atomic::{AtomicU8, Ordering};

pub use critical_section::{CriticalSection, Mutex};

/// Nesting depth of open critical sections
static NESTING: AtomicU8 = AtomicU8::new(0);

/// Tracks one level of nesting for the lifetime of a section.
///
/// Dropped on unwind too, so a panicking closure on a hosted build does not
/// leave the nesting count raised.
struct Nesting {
    _private: (),
}

impl Nesting {
    #[inline(always)]
    fn enter() -> Self {
        NESTING.fetch_add(1, Ordering::AcqRel);
        Nesting { _private: () }
    }
}

impl Drop for Nesting {
    #[inline(always)]
    fn drop(&mut self) {
        NESTING.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Execute a closure with every other task held off
///
/// The closure receives the critical section token, which is what unlocks
/// [`Mutex`] protected data.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(CriticalSection<'_>) -> R,
{
    ::critical_section::with(|cs| {
        let _nesting = Nesting::enter();
        f(cs)
    })
}

/// Check if any task is currently inside a critical section
#[inline(always)]
pub fn is_active() -> bool {
    NESTING.load(Ordering::Acquire) > 0
}

/// Check if currently executing in an ISR context
#[inline]
pub fn is_isr_context() -> bool {
    #[cfg(target_arch = "arm")]
    {
        let ipsr: u32;
        unsafe {
            ::core::arch::asm!(
                "mrs {}, IPSR",
                out(reg) ipsr,
                options(nomem, nostack, preserves_flags)
            );
        }
        ipsr != 0
    }

    #[cfg(not(target_arch = "arm"))]
    {
        false
    }
}
