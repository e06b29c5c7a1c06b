//! Simulated hardware for the engine tests: a key matrix whose pins are joined
//! by pressed keys or shorts, a delay that advances a shared clock, a
//! recording HID transport, and a small text editor that replays the
//! recorded keystrokes.

use std::cell::Cell;
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::keycode::{Keycode, MOD_LGUI, MOD_LSHIFT, MOD_RGUI, MOD_RSHIFT};
use crate::pins::{Level, PinBank, PinMode};
use crate::report::{KeyboardReport, Leds};
use crate::transport::KeyboardTransport;

/// Nanoseconds since the rig was built.
type Clock = Rc<Cell<u64>>;

pub fn rig() -> (MockMatrix, MockDelay, MockHid) {
    let clock = Clock::default();
    (
        MockMatrix::new(clock.clone()),
        MockDelay { clock },
        MockHid::default(),
    )
}

pub struct MockDelay {
    clock: Clock,
}

impl MockDelay {
    fn advance(&mut self, ns: u64) {
        self.clock.set(self.clock.get() + ns);
    }

    pub fn now_us(&self) -> u64 {
        self.clock.get() / 1_000
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.get() / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.advance(u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms) * 1_000_000);
    }
}

/// Electrical connection between two pins, live during `[from_ms, until_ms)`.
struct Link {
    drive: u8,
    sense: u8,
    /// Conducts only from `drive` to `sense`, like a diode.
    directed: bool,
    from_ms: u64,
    until_ms: Option<u64>,
}

pub struct MockMatrix {
    clock: Clock,
    modes: [PinMode; 64],
    links: Vec<Link>,
    /// Every pin set to `DriveLow`, in order.
    pub driven_low: Vec<u8>,
    /// Every pin read, in order.
    pub reads: Vec<u8>,
}

impl MockMatrix {
    fn new(clock: Clock) -> Self {
        Self {
            clock,
            modes: [PinMode::Floating; 64],
            links: Vec::new(),
            driven_low: Vec::new(),
            reads: Vec::new(),
        }
    }

    fn link(&mut self, drive: u8, sense: u8, directed: bool, from_ms: u64, until_ms: Option<u64>) {
        self.links.push(Link {
            drive,
            sense,
            directed,
            from_ms,
            until_ms,
        });
    }

    /// Join two pins until [`split`](Self::split).
    pub fn join(&mut self, a: u8, b: u8) {
        self.link(a, b, false, 0, None);
    }

    pub fn join_for(&mut self, a: u8, b: u8, from_ms: u64, duration_ms: u64) {
        self.link(a, b, false, from_ms, Some(from_ms + duration_ms));
    }

    pub fn join_directed(&mut self, drive: u8, sense: u8) {
        self.link(drive, sense, true, 0, None);
    }

    pub fn join_directed_for(&mut self, drive: u8, sense: u8, from_ms: u64, duration_ms: u64) {
        self.link(drive, sense, true, from_ms, Some(from_ms + duration_ms));
    }

    pub fn split(&mut self, a: u8, b: u8) {
        self.links
            .retain(|l| !((l.drive == a && l.sense == b) || (l.drive == b && l.sense == a)));
    }

    pub fn mode(&self, pin: u8) -> PinMode {
        self.modes[usize::from(pin)]
    }

    pub fn clear_log(&mut self) {
        self.driven_low.clear();
        self.reads.clear();
    }

    fn pulled_low(&self, pin: u8) -> bool {
        let now_ms = self.clock.get() / 1_000_000;
        self.links
            .iter()
            .filter(|l| now_ms >= l.from_ms && l.until_ms.map_or(true, |until| now_ms < until))
            .any(|l| {
                (l.sense == pin && self.mode(l.drive) == PinMode::DriveLow)
                    || (!l.directed && l.drive == pin && self.mode(l.sense) == PinMode::DriveLow)
            })
    }
}

impl PinBank for MockMatrix {
    fn set_pin(&mut self, pin: u8, mode: PinMode) {
        if mode == PinMode::DriveLow {
            self.driven_low.push(pin);
        }
        self.modes[usize::from(pin)] = mode;
    }

    fn read(&mut self, pin: u8) -> Level {
        self.reads.push(pin);
        match self.mode(pin) {
            PinMode::DriveLow => Level::Low,
            PinMode::DriveHigh => Level::High,
            PinMode::PullUp | PinMode::Floating => {
                if self.pulled_low(pin) {
                    Level::Low
                } else {
                    Level::High
                }
            }
        }
    }
}

#[derive(Default)]
pub struct MockHid {
    pub reports: Vec<KeyboardReport>,
    pub media: Vec<u16>,
    pub leds: Leds,
    pub polls: usize,
}

impl KeyboardTransport for MockHid {
    fn send_report(&mut self, report: &KeyboardReport) {
        self.reports.push(*report);
    }

    fn set_media(&mut self, usage: u16) {
        self.media.push(usage);
    }

    fn leds(&self) -> Leds {
        self.leds
    }

    fn poll(&mut self) {
        self.polls += 1;
    }
}

/// Single-cursor text buffer driven by key presses.
///
/// Understands typing, Tab, Enter, Backspace, Down, Home/End, GUI+Left/Right
/// and shift-selection within a line: enough to replay scanner output.
pub struct Editor {
    pub lines: Vec<String>,
    /// (line, column)
    pub cursor: (usize, usize),
    /// Selection start column on the cursor line.
    anchor: Option<usize>,
}

impl Editor {
    pub fn replay(initial: &[&str], reports: &[KeyboardReport]) -> Self {
        let mut editor = Self {
            lines: initial.iter().map(|line| line.to_string()).collect(),
            cursor: (0, 0),
            anchor: None,
        };
        if editor.lines.is_empty() {
            editor.lines.push(String::new());
        }

        let mut previous = KeyboardReport::empty();
        for report in reports {
            for &code in &report.keys {
                if code != 0 && !previous.keys.contains(&code) {
                    editor.press(code, report.modifiers);
                }
            }
            previous = *report;
        }
        editor
    }

    fn line(&mut self) -> &mut String {
        &mut self.lines[self.cursor.0]
    }

    fn move_to(&mut self, col: usize, shift: bool) {
        if shift {
            self.anchor.get_or_insert(self.cursor.1);
        } else {
            self.anchor = None;
        }
        self.cursor.1 = col;
    }

    fn delete_selection(&mut self) -> bool {
        match self.anchor.take() {
            Some(anchor) => {
                let (start, end) = (anchor.min(self.cursor.1), anchor.max(self.cursor.1));
                self.line().replace_range(start..end, "");
                self.cursor.1 = start;
                true
            }
            None => false,
        }
    }

    fn press(&mut self, code: u8, modifiers: u8) {
        let shift = modifiers & (MOD_LSHIFT | MOD_RSHIFT) != 0;
        let gui = modifiers & (MOD_LGUI | MOD_RGUI) != 0;
        let Some(key) = Keycode::ALL.iter().copied().find(|kc| *kc as u8 == code) else {
            return;
        };
        let len = self.lines[self.cursor.0].len();

        match key {
            Keycode::Home => self.move_to(0, shift),
            Keycode::End => self.move_to(len, shift),
            Keycode::Left if gui => self.move_to(0, shift),
            Keycode::Right if gui => self.move_to(len, shift),
            Keycode::Down => {
                self.anchor = None;
                self.cursor.0 += 1;
                if self.cursor.0 == self.lines.len() {
                    self.lines.push(String::new());
                }
                self.cursor.1 = self.cursor.1.min(self.lines[self.cursor.0].len());
            }
            Keycode::Backspace => {
                if !self.delete_selection() && self.cursor.1 > 0 {
                    self.cursor.1 -= 1;
                    let col = self.cursor.1;
                    self.line().remove(col);
                }
            }
            Keycode::Enter => {
                self.delete_selection();
                let (line, col) = self.cursor;
                let rest = self.lines[line].split_off(col);
                self.lines.insert(line + 1, rest);
                self.cursor = (line + 1, 0);
            }
            _ => {
                if let Some(c) = typed_char(key, shift) {
                    self.delete_selection();
                    let col = self.cursor.1;
                    self.line().insert(col, c);
                    self.cursor.1 += 1;
                }
            }
        }
    }
}

fn typed_char(key: Keycode, shift: bool) -> Option<char> {
    (' '..='~')
        .chain(['\t'])
        .find(|&c| Keycode::from_ascii(c) == Some((key, shift)))
}
