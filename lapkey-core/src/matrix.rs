//! Matrix coordinates, the per-key state table and the classification maps.

use crate::keycode::Keycode;

/// One key switch: the intersection of a row line and a column line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Level change of a key between two scans.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Edge {
    Pressed,
    Released,
}

/// "Was down at last scan" for every matrix position.
pub struct KeyStates<const ROWS: usize, const COLS: usize> {
    down: [[bool; COLS]; ROWS],
}

impl<const ROWS: usize, const COLS: usize> KeyStates<ROWS, COLS> {
    /// All keys up.
    pub const fn new() -> Self {
        Self {
            down: [[false; COLS]; ROWS],
        }
    }

    /// Record the level seen at `coord` this scan and report the edge, if any.
    pub fn update(&mut self, coord: Coord, down: bool) -> Option<Edge> {
        let was_down = &mut self.down[coord.row][coord.col];
        let edge = match (*was_down, down) {
            (false, true) => Edge::Pressed,
            (true, false) => Edge::Released,
            _ => return None,
        };
        *was_down = down;
        Some(edge)
    }

    pub fn is_down(&self, coord: Coord) -> bool {
        self.down[coord.row][coord.col]
    }
}

impl<const ROWS: usize, const COLS: usize> Default for KeyStates<ROWS, COLS> {
    fn default() -> Self {
        Self::new()
    }
}

/// The three parallel classification maps. [`Keycode::No`] marks an
/// unassigned position.
pub struct Keymap<const ROWS: usize, const COLS: usize> {
    pub normal: [[Keycode; COLS]; ROWS],
    /// Modifiers, and the [`Keycode::Fn`] latch key.
    pub modifier: [[Keycode; COLS]; ROWS],
    /// Codes produced while Fn is held.
    pub overlay: [[Keycode; COLS]; ROWS],
}

/// Controller pins carrying each row and column line.
pub struct Wiring<const ROWS: usize, const COLS: usize> {
    pub row_pins: [u8; ROWS],
    pub col_pins: [u8; COLS],
}

/// What a key edge does, decided by [`Keymap::classify`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// The Fn latch key; no HID effect.
    Fn,
    /// Modifier byte bit(s).
    Modifier(u8),
    /// Fn-overlay code.
    Overlay(Keycode),
    /// Normal key code.
    Normal(Keycode),
    None,
}

impl<const ROWS: usize, const COLS: usize> Keymap<ROWS, COLS> {
    pub const fn empty() -> Self {
        Self {
            normal: [[Keycode::No; COLS]; ROWS],
            modifier: [[Keycode::No; COLS]; ROWS],
            overlay: [[Keycode::No; COLS]; ROWS],
        }
    }

    /// Pick the single action for a key, in priority order: modifier map,
    /// then the overlay map while Fn is latched, then the normal map.
    ///
    /// While Fn is latched a position without an overlay code does nothing;
    /// it never falls back to its normal code.
    pub fn classify(&self, coord: Coord, fn_latched: bool) -> Action {
        let Coord { row, col } = coord;

        let modifier = self.modifier[row][col];
        if modifier.is_assigned() {
            return if modifier.is_fn() {
                Action::Fn
            } else {
                Action::Modifier(modifier.modifier_bit())
            };
        }

        if fn_latched {
            let overlay = self.overlay[row][col];
            return if overlay.is_assigned() {
                Action::Overlay(overlay)
            } else {
                Action::None
            };
        }

        let normal = self.normal[row][col];
        if normal.is_assigned() {
            Action::Normal(normal)
        } else {
            Action::None
        }
    }
}
