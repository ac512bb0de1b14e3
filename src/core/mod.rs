//! Core RTOS-facing modules
//!
//! Configuration, exclusion, errors, the kernel collaborator traits and
//! time management.

pub mod config;
pub mod critical;
pub mod error;
pub mod kernel;
pub mod types;
pub mod time;
