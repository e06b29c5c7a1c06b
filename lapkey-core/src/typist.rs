//! Types text into whatever editor the host has focused, one keystroke at a
//! time. This is the scanner's only output channel.

use embedded_hal::delay::DelayNs;
use heapless::String;
use ufmt::uwrite;

use crate::board::Board;
use crate::config::HostOs;
use crate::keycode::{Keycode, MOD_LGUI, MOD_LSHIFT};
use crate::report::KeyboardReport;
use crate::transport::{wait_polling, KeyboardTransport};

/// How long a tapped key stays down.
pub const TAP_MS: u32 = 20;

pub struct Typist<'a, H, D> {
    hid: &'a mut H,
    delay: &'a mut D,
    host: HostOs,
    /// Modifiers held across taps.
    held: u8,
}

impl<'a, H: KeyboardTransport, D: DelayNs> Typist<'a, H, D> {
    pub fn new(hid: &'a mut H, delay: &'a mut D, host: HostOs) -> Self {
        Self {
            hid,
            delay,
            host,
            held: 0,
        }
    }

    pub fn tap(&mut self, key: Keycode) {
        self.tap_with(0, key);
    }

    /// Press and release `key` with extra modifiers down.
    pub fn tap_with(&mut self, modifiers: u8, key: Keycode) {
        let modifiers = self.held | modifiers;
        self.hid.send_report(&KeyboardReport::with_key(modifiers, key));
        wait_polling(self.delay, self.hid, TAP_MS);
        self.hid.send_report(&KeyboardReport::with_key(self.held, Keycode::No));
    }

    pub fn hold(&mut self, modifiers: u8) {
        self.held |= modifiers;
        self.hid.send_report(&KeyboardReport::with_key(self.held, Keycode::No));
    }

    pub fn release(&mut self, modifiers: u8) {
        self.held &= !modifiers;
        self.hid.send_report(&KeyboardReport::with_key(self.held, Keycode::No));
    }

    /// Type ASCII text on a US layout. Characters without a key are skipped.
    pub fn type_str(&mut self, text: &str) {
        for c in text.chars() {
            if let Some((key, shift)) = Keycode::from_ascii(c) {
                self.tap_with(if shift { MOD_LSHIFT } else { 0 }, key);
            }
        }
    }

    pub fn type_number(&mut self, n: u16) {
        let mut text: String<5> = String::new();
        // Five digits always fit a u16.
        let _ = uwrite!(text, "{}", n);
        self.type_str(&text);
    }

    pub fn to_sol(&mut self) {
        match self.host {
            HostOs::WindowsLinux => self.tap(Keycode::Home),
            HostOs::Mac => self.tap_with(MOD_LGUI, Keycode::Left),
        }
    }

    pub fn to_eol(&mut self) {
        match self.host {
            HostOs::WindowsLinux => self.tap(Keycode::End),
            HostOs::Mac => self.tap_with(MOD_LGUI, Keycode::Right),
        }
    }

    /// Move to the end of the next line.
    pub fn next_line(&mut self) {
        self.tap(Keycode::Down);
        self.to_eol();
    }

    pub fn select_line(&mut self) {
        self.to_sol();
        self.hold(MOD_LSHIFT);
        self.to_eol();
        self.release(MOD_LSHIFT);
    }

    /// Replace the current line with the board name and move on to the next
    /// one.
    pub fn identify(&mut self, board: Board) {
        self.select_line();
        self.tap(Keycode::Backspace);
        self.type_str(board.name());
        self.next_line();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{rig, Editor};

    use crate::testing::{MockDelay, MockHid};

    fn typed(
        host: HostOs,
        initial: &[&str],
        f: impl FnOnce(&mut Typist<'_, MockHid, MockDelay>),
    ) -> Editor {
        let (_, mut delay, mut hid) = rig();
        let mut typist = Typist::new(&mut hid, &mut delay, host);
        f(&mut typist);
        Editor::replay(initial, &hid.reports)
    }

    #[test]
    fn tap_holds_for_tap_time() {
        let (_, mut delay, mut hid) = rig();
        let mut typist = Typist::new(&mut hid, &mut delay, HostOs::WindowsLinux);
        typist.tap(Keycode::Tab);
        assert_eq!(delay.now_us(), TAP_MS as u64 * 1000);
        assert_eq!(
            hid.reports,
            vec![
                KeyboardReport::with_key(0, Keycode::Tab),
                KeyboardReport::empty()
            ]
        );
        assert_eq!(hid.polls, TAP_MS as usize);
    }

    #[test]
    fn numbers_and_symbols() {
        let editor = typed(HostOs::WindowsLinux, &[""], |t| {
            t.type_str("# ");
            t.type_number(307);
            t.tap(Keycode::Tab);
            t.type_str("Shorted");
        });
        assert_eq!(editor.lines, ["# 307\tShorted"]);
    }

    #[test]
    fn identify_replaces_current_line() {
        for host in [HostOs::WindowsLinux, HostOs::Mac] {
            let editor = typed(host, &["placeholder", "KEY_A"], |t| t.identify(Board::Teensy2));
            assert_eq!(editor.lines, ["Teensy2", "KEY_A"]);
            assert_eq!(editor.cursor, (1, 5));
        }
    }

    #[test]
    fn mac_uses_gui_arrows() {
        let (_, mut delay, mut hid) = rig();
        let mut typist = Typist::new(&mut hid, &mut delay, HostOs::Mac);
        typist.to_eol();
        assert_eq!(hid.reports[0], KeyboardReport::with_key(MOD_LGUI, Keycode::Right));
    }
}
