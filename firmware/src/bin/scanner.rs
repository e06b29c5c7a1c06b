//! Topology scanner: types the pin pairs behind every key press into the
//! host's text editor.

#![no_std]
#![no_main]

use avr_device::atmega32u4::Peripherals;
use firmware::config;
use firmware::delay::BusyDelay;
use firmware::gpio::TeensyPins;
use firmware::usb::UsbKeyboard;
use lapkey_core::TopologyScanner;

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };
    firmware::init_clock(&dp);

    let mut pins = TeensyPins::new(&dp);
    let mut delay = BusyDelay;

    let mut usb = UsbKeyboard::new(&dp, "Matrix Scanner");
    usb.init();

    let mut scanner = TopologyScanner::new(config::BOARD, config::scanner());
    scanner.init(&mut pins, &mut delay, &mut usb);

    loop {
        scanner.run_cycle(&mut pins, &mut delay, &mut usb);
    }
}
