//! Controller variants and how their pins are wired to the FPC connector.

/// Microcontroller boards the daughterboard can carry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Board {
    /// Teensy 2.0 (ATmega32U4), the target of this firmware.
    Teensy2,
    TeensyLc,
    Teensy32,
    Teensy40,
}

/// Teensy 2.0 pins for FPC pins 1..=24. Pin 11 carries the on-board LED and
/// is left off the connector.
static TEENSY2_FPC: [u8; 24] = [
    21, 0, 20, 1, 19, 2, 18, 3, 17, 4, 16, 5, 15, 6, 14, 7, 13, 8, 12, 9, 22, 10, 23, 24,
];

static TEENSYLC_FPC: [u8; 26] = [
    23, 0, 22, 1, 24, 2, 21, 3, 25, 4, 20, 5, 19, 6, 18, 7, 17, 8, 16, 9, 15, 10, 14, 11, 26, 12,
];

static TEENSY32_FPC: [u8; 34] = [
    23, 0, 22, 1, 21, 2, 20, 3, 19, 4, 18, 5, 17, 6, 24, 7, 25, 8, 33, 9, 26, 10, 27, 11, 28, 12,
    32, 31, 30, 29, 16, 15, 14, 13,
];

static TEENSY40_FPC: [u8; 34] = [
    23, 0, 22, 1, 21, 2, 20, 3, 19, 4, 18, 5, 17, 6, 29, 7, 31, 8, 33, 9, 32, 10, 30, 11, 28, 12,
    27, 26, 25, 24, 16, 15, 14, 13,
];

impl Board {
    pub const ALL: [Board; 4] = [Board::Teensy2, Board::TeensyLc, Board::Teensy32, Board::Teensy40];

    /// Physical pin for each connector pin; index 0 is FPC pin 1.
    pub fn fpc_map(self) -> &'static [u8] {
        match self {
            Board::Teensy2 => &TEENSY2_FPC,
            Board::TeensyLc => &TEENSYLC_FPC,
            Board::Teensy32 => &TEENSY32_FPC,
            Board::Teensy40 => &TEENSY40_FPC,
        }
    }

    /// Highest FPC pin number that can be soldered to this board.
    pub fn pin_count(self) -> usize {
        self.fpc_map().len()
    }

    /// Physical pin of the on-board LED.
    pub fn led_pin(self) -> u8 {
        match self {
            Board::Teensy2 => 11,
            Board::TeensyLc | Board::Teensy32 | Board::Teensy40 => 13,
        }
    }

    /// Identification text, typed by the scanner at startup.
    pub fn name(self) -> &'static str {
        match self {
            Board::Teensy2 => "Teensy2",
            Board::TeensyLc => "TeensyLC",
            Board::Teensy32 => "Teensy32",
            Board::Teensy40 => "Teensy40",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|board| board.name().eq_ignore_ascii_case(name))
    }
}
