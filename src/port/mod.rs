//! Port layer - output register implementations
//!
//! An [`OutputPort`] is the physical side of the guarded output word: one
//! register that can be written whole and read back live. Direction is
//! configured once at initialization and never revisited.

#[cfg(feature = "pac")]
pub mod stm32;

#[cfg(feature = "pac")]
pub use stm32::GpioPort;

/// Physical interface of the guarded output register
pub trait OutputPort {
    /// Configure the lines in `mask` as outputs
    fn configure(&mut self, mask: u8) {
        let _ = mask;
    }

    /// Write the full output word
    fn write_register(&mut self, value: u8);

    /// Read back the live output word
    fn read_register(&mut self) -> u8;
}

impl<P: OutputPort + ?Sized> OutputPort for &mut P {
    fn configure(&mut self, mask: u8) {
        (**self).configure(mask)
    }

    fn write_register(&mut self, value: u8) {
        (**self).write_register(value)
    }

    fn read_register(&mut self) -> u8 {
        (**self).read_register()
    }
}
