//! Laptop keyboard firmware for ATmega32U4 (Teensy 2.0).
//!
//! Two binaries share this library:
//! - `controller`: scans the keyboard matrix and acts as a USB keyboard
//! - `scanner`: probes an unknown FPC connector and types what it finds
//!
//! Both are thin shells around the engines in `lapkey-core`; this crate only
//! supplies the hardware behind them.

#![no_std]

pub mod config;
pub mod delay;
pub mod gpio;
pub mod keymap;
pub mod usb;

use avr_device::atmega32u4::Peripherals;

/// Panic handler: on AVR we just loop forever.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Run the CPU at the full 16MHz of the crystal.
pub fn init_clock(dp: &Peripherals) {
    // Disable clock prescaler (CLKPR)
    dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
    dp.CPU.clkpr.write(|w| unsafe { w.bits(0) }); // Prescaler = 1
}
