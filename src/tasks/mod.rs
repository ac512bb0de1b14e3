//! Demo tasks
//!
//! Each task is a value with a `run(..) -> !` loop for the scheduler and a
//! single-cycle method that the loop calls, so a cycle can be driven on its
//! own.

pub mod blinky;
pub mod check;

pub use blinky::{BlockingConsumer, PeriodicProducer};
pub use check::{Health, Liveness, ProgressCounter, Watchdog};
