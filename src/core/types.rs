//! Core type definitions
//!
//! These types provide strong typing for kernel and output primitives.

/// Task priority (0 = highest priority)
pub type OsPrio = u8;

/// Tick counter type
pub type OsTick = u32;

/// Kernel-assigned task identifier
pub type OsTaskId = u8;

/// Stack size in bytes
pub type OsStkSize = usize;

/// Index of a line in the output register
pub type LineIndex = u8;

/// Pend status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OsPendStatus {
    /// Woken by a post (or early; callers re-check their condition)
    Ok = 0,
    /// Timeout occurred
    Timeout = 3,
}
