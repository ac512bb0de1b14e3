//! STM32F401 GPIO output port
//!
//! Maps the eight output lines onto pins 0..=7 of one GPIO bank. The
//! upper half of the bank's ODR is left untouched.

use crate::pac;
use crate::pac::gpio::{regs, vals, Gpio};

use super::OutputPort;

/// Low byte of a GPIO bank's output data register
pub struct GpioPort {
    gpio: Gpio,
}

impl GpioPort {
    /// Port on bank B (clock is enabled here)
    pub fn gpiob() -> Self {
        pac::RCC.ahb1enr().modify(|w| w.set_gpioben(true));
        GpioPort { gpio: pac::GPIOB }
    }
}

impl OutputPort for GpioPort {
    fn configure(&mut self, mask: u8) {
        for pin in 0..8usize {
            if mask & (1 << pin) != 0 {
                self.gpio.moder().modify(|w| w.set_moder(pin, vals::Moder::OUTPUT));
                self.gpio.otyper().modify(|w| w.set_ot(pin, vals::Ot::PUSHPULL));
            }
        }
    }

    fn write_register(&mut self, value: u8) {
        let high = self.gpio.odr().read().0 & 0xFFFF_FF00;
        self.gpio.odr().write_value(regs::Odr(high | value as u32));
    }

    fn read_register(&mut self) -> u8 {
        (self.gpio.odr().read().0 & 0xFF) as u8
    }
}
