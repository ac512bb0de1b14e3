//! Logging macros
//!
//! Forward to `defmt` when the `defmt` feature is enabled, to the `log`
//! facade on hosted builds (`std`), and compile to nothing otherwise. The
//! application picks the logger; format strings stick to plain `{}` so
//! they are valid for both backends.

#[cfg(all(feature = "std", not(feature = "defmt")))]
#[doc(hidden)]
pub use ::log as __log;

// ============ defmt ============

/// Debug message
#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => { defmt::debug!($($arg)*) };
}

/// Info message
#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => { defmt::info!($($arg)*) };
}

/// Error message
#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => { defmt::error!($($arg)*) };
}

/// Trace message
#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => { defmt::trace!($($arg)*) };
}

/// Warning message
#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => { defmt::warn!($($arg)*) };
}

// ============ log ============

#[cfg(all(feature = "std", not(feature = "defmt")))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => { $crate::log::__log::debug!(target: "rtdemo", $($arg)*) };
}
#[cfg(all(feature = "std", not(feature = "defmt")))]
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => { $crate::log::__log::info!(target: "rtdemo", $($arg)*) };
}
#[cfg(all(feature = "std", not(feature = "defmt")))]
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => { $crate::log::__log::error!(target: "rtdemo", $($arg)*) };
}
#[cfg(all(feature = "std", not(feature = "defmt")))]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => { $crate::log::__log::trace!(target: "rtdemo", $($arg)*) };
}
#[cfg(all(feature = "std", not(feature = "defmt")))]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => { $crate::log::__log::warn!(target: "rtdemo", $($arg)*) };
}

// No-op versions when neither backend is enabled
#[cfg(all(not(feature = "std"), not(feature = "defmt")))]
#[macro_export]
macro_rules! debug { ($($arg:tt)*) => {}; }
#[cfg(all(not(feature = "std"), not(feature = "defmt")))]
#[macro_export]
macro_rules! info { ($($arg:tt)*) => {}; }
#[cfg(all(not(feature = "std"), not(feature = "defmt")))]
#[macro_export]
macro_rules! error { ($($arg:tt)*) => {}; }
#[cfg(all(not(feature = "std"), not(feature = "defmt")))]
#[macro_export]
macro_rules! trace { ($($arg:tt)*) => {}; }
#[cfg(all(not(feature = "std"), not(feature = "defmt")))]
#[macro_export]
macro_rules! warn { ($($arg:tt)*) => {}; }
