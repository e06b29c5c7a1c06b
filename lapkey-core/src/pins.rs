//! Physical pin access shared by the matrix controller and the topology
//! scanner.
//!
//! Pins are addressed by the controller's own pin number (e.g. Teensy pin
//! 0..=24), since both engines switch the same pin between input and output
//! at runtime.

/// Logic level read from a pin.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_low(self) -> bool {
        self == Level::Low
    }
}

/// Direction, pull and driven level of a pin.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PinMode {
    /// Input without pull-up (high impedance).
    Floating,
    /// Input with the internal pull-up enabled.
    PullUp,
    /// Output driven low (the active level for rows and probe pins).
    DriveLow,
    /// Output driven high.
    DriveHigh,
}

/// A bank of pins that can be reconfigured and read one at a time.
pub trait PinBank {
    fn set_pin(&mut self, pin: u8, mode: PinMode);

    fn read(&mut self, pin: u8) -> Level;

    /// Drive an indicator output on or off.
    fn set_output(&mut self, pin: u8, on: bool) {
        let mode = if on { PinMode::DriveHigh } else { PinMode::DriveLow };
        self.set_pin(pin, mode);
    }
}
