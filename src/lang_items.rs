//! Panic and exception handlers for Cortex-M firmware builds
//!
//! Hosted builds (`std`) get none of these; the test harness and the OS
//! provide their own.

#[cfg(all(feature = "defmt", target_arch = "arm", not(feature = "std")))]
use defmt_rtt as _;

#[cfg(all(feature = "defmt", target_arch = "arm", not(feature = "std")))]
use panic_probe as _;

#[cfg(all(feature = "defmt", target_arch = "arm", not(feature = "std")))]
#[defmt::panic_handler]
fn defmt_panic() -> ! {
    cortex_m::asm::udf()
}

#[cfg(all(not(feature = "defmt"), target_arch = "arm", not(feature = "std")))]
#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {
        cortex_m::asm::udf();
    }
}

// Stop on the faulting frame so a debugger can inspect it
#[cfg(all(target_arch = "arm", not(feature = "std")))]
#[cortex_m_rt::exception]
unsafe fn HardFault(ef: &cortex_m_rt::ExceptionFrame) -> ! {
    crate::error!("hard fault, pc {} lr {}", ef.pc(), ef.lr());
    loop {
        cortex_m::asm::bkpt();
    }
}

#[cfg(all(target_arch = "arm", not(feature = "std")))]
#[cortex_m_rt::exception]
unsafe fn DefaultHandler(irqn: i16) {
    crate::warn!("unhandled interrupt {}", irqn);
}
