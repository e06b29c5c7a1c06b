//! The USB-HID keyboard transport consumed by both engines.

use embedded_hal::delay::DelayNs;

use crate::report::{KeyboardReport, Leds};

pub trait KeyboardTransport {
    /// Send the six key slots and the modifier byte as one report.
    fn send_report(&mut self, report: &KeyboardReport);

    /// Report a consumer-page usage outside the six-slot budget (0 = none).
    fn set_media(&mut self, usage: u16);

    /// LED state last written by the host.
    fn leds(&self) -> Leds;

    /// Service the bus. Called from every wait loop so the host keeps getting
    /// answers while an engine is blocked.
    fn poll(&mut self) {}
}

/// Sleep `ms` milliseconds, servicing the transport once per millisecond.
pub fn wait_polling<D: DelayNs, H: KeyboardTransport>(delay: &mut D, hid: &mut H, ms: u32) {
    for _ in 0..ms {
        delay.delay_ms(1);
        hid.poll();
    }
}
