//! Error types for the demo core
//!
//! Uses Rust's Result pattern instead of C-style error pointers. Most
//! failure paths in this core are deliberately silent (out-of-range lines,
//! dropped sends, failed workers); only construction and blocking calls
//! report errors.

/// Core error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum OsError {
    // ============ Output errors ============
    /// Controllable line range is empty or wider than the register
    LineRangeInvalid = 11001,

    // ============ Watchdog errors ============
    /// No free slot left for another liveness check
    LivenessTableFull = 16001,

    // ============ Pend errors ============
    /// Cannot pend from ISR
    PendIsr = 25006,
    /// Pend list of the object is full
    PendListFull = 25009,
    /// Pend would block (non-blocking mode)
    PendWouldBlock = 25008,

    // ============ Priority errors ============
    /// Invalid priority
    PrioInvalid = 25203,

    // ============ State errors ============
    /// Invalid state (e.g. out-of-range time field)
    StateInvalid = 28205,
    /// Invalid stack size
    StkSizeInvalid = 28208,

    // ============ Task errors ============
    /// No more TCBs available
    TaskNoMoreTcb = 29008,

    // ============ Timeout ============
    /// Operation timed out
    Timeout = 29401,
}

/// Result type alias for core operations
pub type OsResult<T> = Result<T, OsError>;

impl OsError {
    /// Numeric error code
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }
}

impl core::fmt::Display for OsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}
