//! Hosted kernel and port
//!
//! Runs the demo on a desktop OS: every task is a thread, ticks are derived
//! from a monotonic clock, and pend/post map onto thread park/unpark (whose
//! token semantics give the "post before pend is not lost" guarantee the
//! [`Kernel`](crate::Kernel) contract asks for). Exclusion comes from the
//! `critical-section` std implementation, a process-wide lock.

mod kernel;
mod port;

pub use kernel::StdKernel;
pub use port::{HostPort, HostRegister};
