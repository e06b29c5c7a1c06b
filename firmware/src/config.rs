//! Engine settings selected by cargo features.

use lapkey_core::{Board, ControllerConfig, HostOs, MediaDelivery, ScannerConfig};

/// The controller this firmware is built for.
pub const BOARD: Board = Board::Teensy2;

pub const HOST: HostOs = if cfg!(feature = "mac") {
    HostOs::Mac
} else {
    HostOs::WindowsLinux
};

pub fn controller() -> ControllerConfig {
    ControllerConfig {
        media: if cfg!(feature = "set-media") {
            MediaDelivery::Dedicated
        } else {
            MediaDelivery::Slot
        },
        caps_led: if cfg!(feature = "caps-led") {
            Some(BOARD.led_pin())
        } else {
            None
        },
        ..ControllerConfig::default()
    }
}

pub fn scanner() -> ScannerConfig {
    ScannerConfig {
        diodes: cfg!(feature = "diodes"),
        host: HOST,
        ..ScannerConfig::for_board(BOARD)
    }
}
