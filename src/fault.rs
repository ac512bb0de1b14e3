//! Fault latch
//!
//! Entry point for unrecoverable internal check failures. Reporting a fault
//! forces the fault LED on through the output guard and latches; nothing in
//! this crate ever switches that LED off again. The latch does not halt the
//! system: what the caller does next is the host's decision.

use core::cell::Cell;

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use crate::critical::{critical_section, Mutex};
use crate::output::OutputGuard;
use crate::port::OutputPort;
use crate::types::LineIndex;

/// Where a fault was reported from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultContext<'a> {
    /// Source line of the failed check
    pub line: u32,
    /// Source file (or other context) of the failed check
    pub file: &'a str,
}

impl<'a> FaultContext<'a> {
    pub const fn new(line: u32, file: &'a str) -> Self {
        FaultContext { line, file }
    }
}

/// One-way fault indicator
pub struct FaultLatch<'a, P> {
    guard: &'a OutputGuard<P>,
    line: LineIndex,
    latched: AtomicBool,
    reports: AtomicU32,
    first: Mutex<Cell<Option<FaultContext<'static>>>>,
}

impl<'a, P: OutputPort> FaultLatch<'a, P> {
    /// Latch driving `line` on `guard`
    ///
    /// `line` must not be driven by any other component.
    pub fn new(guard: &'a OutputGuard<P>, line: LineIndex) -> Self {
        FaultLatch {
            guard,
            line,
            latched: AtomicBool::new(false),
            reports: AtomicU32::new(0),
            first: Mutex::new(Cell::new(None)),
        }
    }

    /// Report an unrecoverable fault
    ///
    /// Always forces the fault LED on, however many faults came before.
    pub fn report_fault(&self, context: FaultContext<'static>) {
        self.guard.set(self.line, true);
        self.reports.fetch_add(1, Ordering::Relaxed);

        if !self.latched.swap(true, Ordering::AcqRel) {
            critical_section(|cs| self.first.borrow(cs).set(Some(context)));
            crate::error!("fault at {}:{}", context.file, context.line);
        }
    }

    /// Whether any fault has been reported
    #[inline]
    pub fn is_latched(&self) -> bool {
        self.latched.load(Ordering::Acquire)
    }

    /// Context of the first reported fault
    pub fn first_fault(&self) -> Option<FaultContext<'static>> {
        critical_section(|cs| self.first.borrow(cs).get())
    }

    /// Number of faults reported so far
    #[inline]
    pub fn reports(&self) -> u32 {
        self.reports.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn line(&self) -> LineIndex {
        self.line
    }
}

/// Check a condition and report a fault to `latch` if it does not hold
///
/// The board-level equivalent of an assertion: execution continues after
/// the report.
///
/// ```ignore
/// os_assert!(fault, param == SEND_PARAMETER);
/// ```
#[macro_export]
macro_rules! os_assert {
    ($latch:expr, $cond:expr $(,)?) => {
        if !$cond {
            $latch.report_fault($crate::fault::FaultContext::new(line!(), file!()));
        }
    };
}
