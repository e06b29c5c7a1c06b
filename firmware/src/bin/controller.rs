//! Matrix controller: the laptop keyboard as a USB keyboard.

#![no_std]
#![no_main]

use avr_device::atmega32u4::Peripherals;
use firmware::delay::BusyDelay;
use firmware::gpio::TeensyPins;
use firmware::usb::UsbKeyboard;
use firmware::{config, keymap};
use lapkey_core::Controller;

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };
    firmware::init_clock(&dp);

    let mut pins = TeensyPins::new(&dp);
    let mut delay = BusyDelay;

    let mut usb = UsbKeyboard::new(&dp, "Laptop Keyboard");
    usb.init();

    let mut controller = Controller::new(&keymap::KEYMAP, &keymap::WIRING, config::controller());
    controller.init(&mut pins);

    loop {
        controller.run_cycle(&mut pins, &mut delay, &mut usb);
    }
}
