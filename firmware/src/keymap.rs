//! Keymap and wiring for the laptop keyboard on a Teensy 2.0.
//!
//! The matrix is 16 rows by 8 columns. Rows sit on FPC pins 1-16 and columns
//! on FPC pins 17-24; the pin numbers below are the Teensy pins those FPC
//! contacts are soldered to. Regenerate both tables with `lapkey map` after
//! rewiring.

use lapkey_core::{Keycode, Keymap, Wiring};

pub const ROWS: usize = 16;
pub const COLS: usize = 8;

/// Unassigned matrix position.
const ___: Keycode = Keycode::No;

/// Shorthand aliases for readability.
const ENT: Keycode = Keycode::Enter;
const ESC: Keycode = Keycode::Escape;
const BSP: Keycode = Keycode::Backspace;
const TAB: Keycode = Keycode::Tab;
const SPC: Keycode = Keycode::Space;
const DEL: Keycode = Keycode::Delete;
const LCTL: Keycode = Keycode::LCtrl;
const RCTL: Keycode = Keycode::RCtrl;
const LSFT: Keycode = Keycode::LShift;
const RSFT: Keycode = Keycode::RShift;
const LALT: Keycode = Keycode::LAlt;
const RALT: Keycode = Keycode::RAlt;
const LGUI: Keycode = Keycode::LGui;
const FN: Keycode = Keycode::Fn;

#[rustfmt::skip]
pub static KEYMAP: Keymap<ROWS, COLS> = Keymap {
    normal: [
        [Keycode::Kp1, Keycode::PrintScreen, Keycode::KpSlash, ___, Keycode::Kp4, Keycode::Kp7, Keycode::Kp5, Keycode::Right],
        [Keycode::Kp0, DEL, Keycode::KpPlus, ___, Keycode::Kp3, Keycode::Kp9, Keycode::Kp6, Keycode::Down],
        [Keycode::Up, Keycode::Home, Keycode::KpDot, Keycode::End, ___, Keycode::KpEnter, Keycode::KpMinus, Keycode::Left],
        [___, ___, ___, Keycode::N9, Keycode::O, Keycode::L, Keycode::Dot, ___],
        [Keycode::Quote, Keycode::Minus, Keycode::LBracket, Keycode::N0, Keycode::P, Keycode::Semicolon, ___, Keycode::Slash],
        [Keycode::F6, Keycode::Equal, Keycode::RBracket, Keycode::N8, Keycode::I, Keycode::K, Keycode::Comma, ___],
        [Keycode::H, Keycode::N6, Keycode::Y, Keycode::N7, Keycode::U, Keycode::J, Keycode::M, Keycode::N],
        [Keycode::F5, ___, BSP, ___, ___, Keycode::Backslash, ENT, SPC],
        [Keycode::G, Keycode::N5, Keycode::T, Keycode::N4, Keycode::R, Keycode::F, Keycode::V, Keycode::B],
        [Keycode::F4, Keycode::F2, Keycode::F3, Keycode::N3, Keycode::E, Keycode::D, Keycode::C, ___],
        [___, ___, Keycode::CapsLock, Keycode::N2, Keycode::W, Keycode::S, Keycode::X, ___],
        [ESC, Keycode::Grave, TAB, Keycode::N1, Keycode::Q, Keycode::A, Keycode::Z, Keycode::Application],
        [___, ___, ___, Keycode::Insert, Keycode::NumLock, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, Keycode::Kp8, ___, ___, Keycode::PageUp, Keycode::PageDown, Keycode::KpAsterisk, Keycode::Kp2],
    ],
    modifier: [
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [LALT, ___, ___, ___, ___, ___, ___, RALT],
        [___, ___, LSFT, ___, ___, ___, RSFT, ___],
        [___, LCTL, ___, ___, ___, ___, RCTL, ___],
        [FN, ___, ___, LGUI, ___, ___, ___, ___],
    ],
    overlay: [
        [___, ___, ___, Keycode::MediaNext, ___, ___, ___, ___],
        [___, ___, ___, Keycode::MediaPlayPause, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, Keycode::MediaVolumeDown, Keycode::MediaMute, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, Keycode::MediaVolumeUp, ___, Keycode::MediaPrevious, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, Keycode::MediaSleep, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___, ___],
    ],
};

pub static WIRING: Wiring<ROWS, COLS> = Wiring {
    // FPC 1..=16
    row_pins: [21, 0, 20, 1, 19, 2, 18, 3, 17, 4, 16, 5, 15, 6, 14, 7],
    // FPC 17..=24
    col_pins: [13, 8, 12, 9, 22, 10, 23, 24],
};
