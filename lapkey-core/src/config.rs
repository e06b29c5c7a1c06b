//! Timing and behaviour constants for the two engines.
//!
//! The firmware builds these from its cargo features; tests build them
//! directly.

use crate::board::Board;

/// Host OS convention for jumping to the start/end of an editor line.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum HostOs {
    /// Home / End.
    #[default]
    WindowsLinux,
    /// GUI+Left / GUI+Right.
    Mac,
}

/// How Fn-overlay keys with a consumer usage reach the host.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MediaDelivery {
    /// Occupy one of the six normal key slots.
    #[default]
    Slot,
    /// Send a consumer-control report, leaving the slots alone.
    Dedicated,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Wait after grounding a row before reading the columns.
    pub settle_us: u32,
    /// Sleep between two full scans.
    pub cycle_delay_ms: u32,
    pub media: MediaDelivery,
    /// Pin mirroring the host's caps-lock LED, if any.
    pub caps_led: Option<u8>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            settle_us: 10,
            cycle_delay_ms: 25,
            media: MediaDelivery::Slot,
            caps_led: None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Grace period for the host to enumerate the keyboard before any output.
    pub startup_delay_ms: u32,
    /// A connection held longer than this is a short.
    pub max_hold_ms: u32,
    /// Wait after driving the outer pin before reading an inner pin.
    pub settle_us: u32,
    pub cycle_delay_ms: u32,
    /// First connector pin to probe (1-based, inclusive).
    pub first_pin: u8,
    /// Last connector pin to probe (1-based, inclusive).
    pub last_pin: u8,
    /// Run the reverse pass too, for matrices with blocking diodes.
    pub diodes: bool,
    pub host: HostOs,
    /// Number of full scans between heartbeat LED toggles.
    pub heartbeat_every: u16,
    pub heartbeat_pin: Option<u8>,
}

impl ScannerConfig {
    /// Defaults covering every connector pin the board has.
    pub fn for_board(board: Board) -> Self {
        Self {
            startup_delay_ms: 5000,
            max_hold_ms: 1000,
            settle_us: 10,
            cycle_delay_ms: 25,
            first_pin: 1,
            last_pin: board.pin_count() as u8,
            diodes: false,
            host: HostOs::WindowsLinux,
            heartbeat_every: 10,
            heartbeat_pin: Some(board.led_pin()),
        }
    }
}
