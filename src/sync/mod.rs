//! Synchronization primitives
//!
//! Contains the one-slot handoff channel and its pend list.

pub mod handoff;
