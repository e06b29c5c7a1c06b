//! Output slot multiplexer and the HID report it serializes to.

use bitfield::bitfield;

use crate::keycode::Keycode;

/// Number of normal-key slots in a boot keyboard report.
pub const SLOT_COUNT: usize = 6;

/// Standard USB HID keyboard report (8 bytes).
/// Byte 0: modifier keys bitmask
/// Byte 1: reserved (0x00)
/// Bytes 2-7: up to 6 simultaneous keycodes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyboardReport {
    pub modifiers: u8,
    pub reserved: u8,
    pub keys: [u8; SLOT_COUNT],
}

impl KeyboardReport {
    pub const fn empty() -> Self {
        Self {
            modifiers: 0,
            reserved: 0,
            keys: [0; SLOT_COUNT],
        }
    }

    /// Report with a single key held.
    pub const fn with_key(modifiers: u8, key: Keycode) -> Self {
        let mut report = Self::empty();
        report.modifiers = modifiers;
        report.keys[0] = key as u8;
        report
    }

    pub fn to_bytes(&self) -> [u8; 2 + SLOT_COUNT] {
        let mut bytes = [0; 2 + SLOT_COUNT];
        bytes[0] = self.modifiers;
        bytes[1] = self.reserved;
        bytes[2..].copy_from_slice(&self.keys);
        bytes
    }
}

impl Default for KeyboardReport {
    fn default() -> Self {
        Self::empty()
    }
}

/// Fixed set of six "currently reported" normal key codes.
///
/// Slot position carries no meaning to the host; empty slots hold 0 and a
/// code occupies at most one slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotSet {
    slots: [u8; SLOT_COUNT],
}

impl SlotSet {
    pub const fn new() -> Self {
        Self {
            slots: [0; SLOT_COUNT],
        }
    }

    /// Put `key` into the first free slot.
    ///
    /// Returns `false` when every slot is taken; the press is dropped, not
    /// queued. A key that already holds a slot is not added twice.
    pub fn try_occupy(&mut self, key: Keycode) -> bool {
        let code = key as u8;
        if code == 0 {
            return false;
        }
        if self.contains(key) {
            return true;
        }
        match self.slots.iter_mut().find(|slot| **slot == 0) {
            Some(slot) => {
                *slot = code;
                true
            }
            None => false,
        }
    }

    /// Clear the slot holding `key`. Releasing a key that holds no slot is a
    /// no-op and returns `false`.
    pub fn release(&mut self, key: Keycode) -> bool {
        let code = key as u8;
        if code == 0 {
            return false;
        }
        match self.slots.iter_mut().find(|slot| **slot == code) {
            Some(slot) => {
                *slot = 0;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, key: Keycode) -> bool {
        key.is_assigned() && self.slots.contains(&(key as u8))
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|&&slot| slot != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == SLOT_COUNT
    }

    pub fn slots(&self) -> &[u8; SLOT_COUNT] {
        &self.slots
    }

    /// Serialize the slots together with a modifier byte.
    pub fn report(&self, modifiers: u8) -> KeyboardReport {
        KeyboardReport {
            modifiers,
            reserved: 0,
            keys: self.slots,
        }
    }
}

bitfield! {
    /// Keyboard LED state written by the host (HID output report).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Leds(u8);
    impl Debug;
    pub num_lock, set_num_lock: 0;
    pub caps_lock, set_caps_lock: 1;
    pub scroll_lock, set_scroll_lock: 2;
    pub compose, set_compose: 3;
    pub kana, set_kana: 4;
}

impl From<u8> for Leds {
    fn from(bits: u8) -> Self {
        Leds(bits)
    }
}
