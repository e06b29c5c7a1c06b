//! Busy-wait delays calibrated for the 16MHz system clock.

use avr_device::asm::nop;
use embedded_hal::delay::DelayNs;

/// Loop iterations per microsecond: 16 cycles at 4 cycles per iteration.
const LOOPS_PER_US: u32 = 4;

/// Cycle-counting delay. Interrupts are never enabled, so the count holds.
#[derive(Copy, Clone, Default)]
pub struct BusyDelay;

impl BusyDelay {
    #[inline(never)]
    fn spin(loops: u32) {
        for _ in 0..loops {
            nop();
        }
    }
}

impl DelayNs for BusyDelay {
    fn delay_ns(&mut self, ns: u32) {
        // One iteration is 250ns; round up so short waits are never skipped.
        Self::spin(ns.div_ceil(250));
    }

    fn delay_us(&mut self, us: u32) {
        Self::spin(us.saturating_mul(LOOPS_PER_US));
    }

    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            Self::spin(1000 * LOOPS_PER_US);
        }
    }
}
