//! Teensy 2.0 pins on top of the ATmega32U4 port registers.
//!
//! Pin numbers are the ones printed on the Teensy 2.0 board:
//!
//! ```text
//!   0-3  PB0-PB3     4  PB7      5-8  PD0-PD3    9-10  PC6-PC7
//!   11   PD6 (LED)   12 PD7    13-15  PB4-PB6   16-19  PF7-PF4
//!   20   PF1         21 PF0    22-23  PD4-PD5      24  PE6
//! ```

use avr_device::atmega32u4::Peripherals;
use lapkey_core::{Level, PinBank, PinMode};

#[derive(Copy, Clone)]
enum Port {
    B,
    C,
    D,
    E,
    F,
}

/// Port and bit behind a Teensy pin number.
fn locate(pin: u8) -> Option<(Port, u8)> {
    let location = match pin {
        0..=3 => (Port::B, pin),
        4 => (Port::B, 7),
        5..=8 => (Port::D, pin - 5),
        9 | 10 => (Port::C, pin - 3),
        11 => (Port::D, 6),
        12 => (Port::D, 7),
        13..=15 => (Port::B, pin - 9),
        16..=19 => (Port::F, 23 - pin),
        20 => (Port::F, 1),
        21 => (Port::F, 0),
        22 | 23 => (Port::D, pin - 18),
        24 => (Port::E, 6),
        _ => return None,
    };
    Some(location)
}

/// Set or clear the bits in `mask` with a read-modify-write.
macro_rules! write_bits {
    ($reg:expr, $mask:expr, $set:expr) => {
        $reg.modify(|r, w| unsafe {
            w.bits(if $set {
                r.bits() | $mask
            } else {
                r.bits() & !$mask
            })
        })
    };
}

pub struct TeensyPins<'a> {
    dp: &'a Peripherals,
}

impl<'a> TeensyPins<'a> {
    pub fn new(dp: &'a Peripherals) -> Self {
        Self { dp }
    }

    /// Data direction: `true` makes the pin an output.
    fn set_ddr(&self, port: Port, mask: u8, output: bool) {
        let dp = self.dp;
        match port {
            Port::B => write_bits!(dp.PORTB.ddrb, mask, output),
            Port::C => write_bits!(dp.PORTC.ddrc, mask, output),
            Port::D => write_bits!(dp.PORTD.ddrd, mask, output),
            Port::E => write_bits!(dp.PORTE.ddre, mask, output),
            Port::F => write_bits!(dp.PORTF.ddrf, mask, output),
        }
    }

    /// Output latch: drives high as an output, enables the pull-up as an
    /// input.
    fn set_port(&self, port: Port, mask: u8, high: bool) {
        let dp = self.dp;
        match port {
            Port::B => write_bits!(dp.PORTB.portb, mask, high),
            Port::C => write_bits!(dp.PORTC.portc, mask, high),
            Port::D => write_bits!(dp.PORTD.portd, mask, high),
            Port::E => write_bits!(dp.PORTE.porte, mask, high),
            Port::F => write_bits!(dp.PORTF.portf, mask, high),
        }
    }

    fn input(&self, port: Port) -> u8 {
        let dp = self.dp;
        match port {
            Port::B => dp.PORTB.pinb.read().bits(),
            Port::C => dp.PORTC.pinc.read().bits(),
            Port::D => dp.PORTD.pind.read().bits(),
            Port::E => dp.PORTE.pine.read().bits(),
            Port::F => dp.PORTF.pinf.read().bits(),
        }
    }
}

impl PinBank for TeensyPins<'_> {
    fn set_pin(&mut self, pin: u8, mode: PinMode) {
        let Some((port, bit)) = locate(pin) else {
            return;
        };
        let mask = 1 << bit;

        // Order the two writes so a pin never passes through the opposite
        // level on its way to the new mode.
        match mode {
            PinMode::Floating => {
                self.set_ddr(port, mask, false);
                self.set_port(port, mask, false);
            }
            PinMode::PullUp => {
                self.set_ddr(port, mask, false);
                self.set_port(port, mask, true);
            }
            PinMode::DriveLow => {
                self.set_port(port, mask, false);
                self.set_ddr(port, mask, true);
            }
            PinMode::DriveHigh => {
                self.set_port(port, mask, true);
                self.set_ddr(port, mask, true);
            }
        }
    }

    fn read(&mut self, pin: u8) -> Level {
        match locate(pin) {
            Some((port, bit)) if self.input(port) & (1 << bit) == 0 => Level::Low,
            _ => Level::High,
        }
    }
}
