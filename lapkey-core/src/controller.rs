//! Matrix controller: scan the key matrix, turn edges into slot and modifier
//! changes, and flush one report per cycle.

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::config::{ControllerConfig, MediaDelivery};
use crate::keycode::Keycode;
use crate::matrix::{Action, Coord, Edge, KeyStates, Keymap, Wiring};
use crate::pins::{PinBank, PinMode};
use crate::report::SlotSet;
use crate::transport::KeyboardTransport;

pub struct Controller<'a, const ROWS: usize, const COLS: usize> {
    keymap: &'a Keymap<ROWS, COLS>,
    wiring: &'a Wiring<ROWS, COLS>,
    config: ControllerConfig,
    states: KeyStates<ROWS, COLS>,
    /// Action taken when each held key went down; its release undoes exactly
    /// that, even if the Fn latch changed in between.
    held: [[Action; COLS]; ROWS],
    slots: SlotSet,
    modifiers: u8,
    fn_latched: bool,
}

impl<'a, const ROWS: usize, const COLS: usize> Controller<'a, ROWS, COLS> {
    pub fn new(
        keymap: &'a Keymap<ROWS, COLS>,
        wiring: &'a Wiring<ROWS, COLS>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            keymap,
            wiring,
            config,
            states: KeyStates::new(),
            held: [[Action::None; COLS]; ROWS],
            slots: SlotSet::new(),
            modifiers: 0,
            fn_latched: false,
        }
    }

    /// Columns become pulled-up inputs, rows go high impedance.
    pub fn init<P: PinBank>(&mut self, pins: &mut P) {
        for &pin in &self.wiring.col_pins {
            pins.set_pin(pin, PinMode::PullUp);
        }
        for &pin in &self.wiring.row_pins {
            pins.set_pin(pin, PinMode::Floating);
        }
    }

    /// One full iteration of the main loop.
    pub fn run_cycle<P, D, H>(&mut self, pins: &mut P, delay: &mut D, hid: &mut H)
    where
        P: PinBank,
        D: DelayNs,
        H: KeyboardTransport,
    {
        self.scan(pins, delay, hid);
        self.flush(hid);
        self.update_caps_led(pins, hid);
        crate::transport::wait_polling(delay, hid, self.config.cycle_delay_ms);
    }

    /// Ground each row in turn and read every column (keys are active low).
    pub fn scan<P, D, H>(&mut self, pins: &mut P, delay: &mut D, hid: &mut H)
    where
        P: PinBank,
        D: DelayNs,
        H: KeyboardTransport,
    {
        let wiring = self.wiring;
        for (row, &row_pin) in wiring.row_pins.iter().enumerate() {
            pins.set_pin(row_pin, PinMode::DriveLow);
            delay.delay_us(self.config.settle_us);

            for (col, &col_pin) in wiring.col_pins.iter().enumerate() {
                let coord = Coord::new(row, col);
                let down = pins.read(col_pin).is_low();
                if let Some(edge) = self.states.update(coord, down) {
                    self.handle_edge(coord, edge, hid);
                }
            }

            pins.set_pin(row_pin, PinMode::Floating);
        }
    }

    /// Dispatch a single edge and return the action it performed.
    pub fn handle_edge<H: KeyboardTransport>(
        &mut self,
        coord: Coord,
        edge: Edge,
        hid: &mut H,
    ) -> Action {
        let action = match edge {
            Edge::Pressed => {
                let action = self.keymap.classify(coord, self.fn_latched);
                self.held[coord.row][coord.col] = action;
                action
            }
            Edge::Released => {
                core::mem::replace(&mut self.held[coord.row][coord.col], Action::None)
            }
        };
        let pressed = edge == Edge::Pressed;
        debug!("{:?} at {:?}: {:?}", edge, coord, action);

        match action {
            Action::Fn => self.fn_latched = pressed,
            Action::Modifier(bits) => {
                if pressed {
                    self.modifiers |= bits;
                } else {
                    self.modifiers &= !bits;
                }
            }
            Action::Overlay(key) => match (self.config.media, key.consumer_usage()) {
                (MediaDelivery::Dedicated, Some(usage)) => {
                    hid.set_media(if pressed { usage } else { 0 });
                }
                _ => self.set_key(key, pressed),
            },
            Action::Normal(key) => self.set_key(key, pressed),
            Action::None => {}
        }

        action
    }

    fn set_key(&mut self, key: Keycode, pressed: bool) {
        if !pressed {
            self.slots.release(key);
        } else if !self.slots.try_occupy(key) {
            debug!("all slots taken, dropping {:?}", key);
        }
    }

    /// Send slots and modifiers, changed or not.
    pub fn flush<H: KeyboardTransport>(&self, hid: &mut H) {
        hid.send_report(&self.slots.report(self.modifiers));
    }

    pub fn update_caps_led<P: PinBank, H: KeyboardTransport>(&self, pins: &mut P, hid: &H) {
        if let Some(pin) = self.config.caps_led {
            pins.set_output(pin, hid.leds().caps_lock());
        }
    }

    pub fn slots(&self) -> &SlotSet {
        &self.slots
    }

    pub fn modifiers(&self) -> u8 {
        self.modifiers
    }

    pub fn fn_latched(&self) -> bool {
        self.fn_latched
    }
}
