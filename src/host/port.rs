//! In-memory output register

use std::sync::Arc;

use portable_atomic::{AtomicU32, AtomicU8, Ordering};

use crate::config::CFG_OUTPUT_WIDTH;
use crate::critical;
use crate::port::OutputPort;
use crate::types::LineIndex;

/// Register shared between a [`HostPort`] and whoever observes it
///
/// Counts every write, the number of times each line changed value, and
/// how many writes arrived outside a critical section.
#[derive(Debug, Default)]
pub struct HostRegister {
    value: AtomicU8,
    direction: AtomicU8,
    writes: AtomicU32,
    unguarded_writes: AtomicU32,
    flips: [AtomicU32; CFG_OUTPUT_WIDTH as usize],
}

impl HostRegister {
    /// Register holding `value` at power-up
    pub fn new(value: u8) -> Self {
        let reg = Self::default();
        reg.value.store(value, Ordering::Relaxed);
        reg
    }

    /// Current register value
    #[inline]
    pub fn value(&self) -> u8 {
        self.value.load(Ordering::Acquire)
    }

    /// Whether `line` is driven high
    #[inline]
    pub fn is_on(&self, line: LineIndex) -> bool {
        line < CFG_OUTPUT_WIDTH && self.value() & (1 << line) != 0
    }

    /// Lines configured as outputs
    #[inline]
    pub fn direction(&self) -> u8 {
        self.direction.load(Ordering::Relaxed)
    }

    /// Number of writes through the port
    #[inline]
    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Number of port writes made outside any critical section
    #[inline]
    pub fn unguarded_writes(&self) -> u32 {
        self.unguarded_writes.load(Ordering::Relaxed)
    }

    /// Number of times `line` changed value through the port
    pub fn flips(&self, line: LineIndex) -> u32 {
        self.flips
            .get(line as usize)
            .map_or(0, |f| f.load(Ordering::Relaxed))
    }

    /// Change the register behind the core's back, as external hardware or
    /// a test harness would. Not counted as a port write.
    pub fn drive_externally(&self, value: u8) {
        self.value.store(value, Ordering::Release);
    }

    fn store(&self, value: u8) {
        if !critical::is_active() {
            self.unguarded_writes.fetch_add(1, Ordering::Relaxed);
        }

        let old = self.value.swap(value, Ordering::AcqRel);
        let changed = old ^ value;
        for (line, flips) in self.flips.iter().enumerate() {
            if changed & (1 << line) != 0 {
                flips.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.writes.fetch_add(1, Ordering::Relaxed);
    }
}

/// Output port backed by a [`HostRegister`]
#[derive(Debug, Clone, Default)]
pub struct HostPort {
    register: Arc<HostRegister>,
}

impl HostPort {
    /// Port over a fresh register holding `value`
    pub fn new(value: u8) -> Self {
        HostPort {
            register: Arc::new(HostRegister::new(value)),
        }
    }

    /// Shared handle to the register, for observation
    pub fn register(&self) -> Arc<HostRegister> {
        Arc::clone(&self.register)
    }
}

impl OutputPort for HostPort {
    fn configure(&mut self, mask: u8) {
        self.register.direction.store(mask, Ordering::Relaxed);
    }

    fn write_register(&mut self, value: u8) {
        self.register.store(value);
    }

    fn read_register(&mut self) -> u8 {
        self.register.value()
    }
}
