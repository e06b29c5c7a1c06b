//! USB HID key codes used by the classification maps.
//!
//! All three maps (normal, modifier, overlay) hold the same [`Keycode`] type;
//! which role a code plays is decided by the map it sits in, not by its value.
//! See USB HID Usage Tables, Section 10 (Keyboard/Keypad Page 0x07).

/// Modifier byte bits (byte 0 of the keyboard report).
pub const MOD_LCTRL: u8 = 1 << 0;
pub const MOD_LSHIFT: u8 = 1 << 1;
pub const MOD_LALT: u8 = 1 << 2;
pub const MOD_LGUI: u8 = 1 << 3;
pub const MOD_RCTRL: u8 = 1 << 4;
pub const MOD_RSHIFT: u8 = 1 << 5;
pub const MOD_RALT: u8 = 1 << 6;
pub const MOD_RGUI: u8 = 1 << 7;

macro_rules! keycodes {
    ($( $(#[$meta:meta])* $name:ident = $value:literal, )*) => {
        /// USB HID keycodes (keyboard page), plus the Fn pseudo-code.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum Keycode {
            $( $(#[$meta])* $name = $value, )*
        }

        impl Keycode {
            /// Every defined keycode, in declaration order.
            pub const ALL: &'static [Keycode] = &[$(Keycode::$name),*];

            /// Identifier of the keycode, as written in keymap tables.
            pub fn name(self) -> &'static str {
                match self {
                    $( Keycode::$name => stringify!($name), )*
                }
            }
        }
    };
}

keycodes! {
    /// Unassigned matrix position.
    No = 0x00,

    // Letters
    A = 0x04,
    B = 0x05,
    C = 0x06,
    D = 0x07,
    E = 0x08,
    F = 0x09,
    G = 0x0A,
    H = 0x0B,
    I = 0x0C,
    J = 0x0D,
    K = 0x0E,
    L = 0x0F,
    M = 0x10,
    N = 0x11,
    O = 0x12,
    P = 0x13,
    Q = 0x14,
    R = 0x15,
    S = 0x16,
    T = 0x17,
    U = 0x18,
    V = 0x19,
    W = 0x1A,
    X = 0x1B,
    Y = 0x1C,
    Z = 0x1D,

    // Numbers
    N1 = 0x1E,
    N2 = 0x1F,
    N3 = 0x20,
    N4 = 0x21,
    N5 = 0x22,
    N6 = 0x23,
    N7 = 0x24,
    N8 = 0x25,
    N9 = 0x26,
    N0 = 0x27,

    // Control keys and punctuation
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    LBracket = 0x2F,
    RBracket = 0x30,
    Backslash = 0x31,
    NonUsHash = 0x32,
    Semicolon = 0x33,
    Quote = 0x34,
    Grave = 0x35,
    Comma = 0x36,
    Dot = 0x37,
    Slash = 0x38,
    CapsLock = 0x39,

    // Function keys
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    // Navigation
    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    Right = 0x4F,
    Left = 0x50,
    Down = 0x51,
    Up = 0x52,

    // Keypad
    NumLock = 0x53,
    KpSlash = 0x54,
    KpAsterisk = 0x55,
    KpMinus = 0x56,
    KpPlus = 0x57,
    KpEnter = 0x58,
    Kp1 = 0x59,
    Kp2 = 0x5A,
    Kp3 = 0x5B,
    Kp4 = 0x5C,
    Kp5 = 0x5D,
    Kp6 = 0x5E,
    Kp7 = 0x5F,
    Kp8 = 0x60,
    Kp9 = 0x61,
    Kp0 = 0x62,
    KpDot = 0x63,
    /// Non-US \ and | (ISO key left of Z)
    NonUsBackslash = 0x64,
    /// Context menu key
    Application = 0x65,

    Mute = 0x7F,
    VolumeUp = 0x80,
    VolumeDown = 0x81,

    // Modifiers (used in the modifier byte, not in keycode array)
    LCtrl = 0xE0,
    LShift = 0xE1,
    LAlt = 0xE2,
    LGui = 0xE3,
    RCtrl = 0xE4,
    RShift = 0xE5,
    RAlt = 0xE6,
    RGui = 0xE7,

    // Media block of the keyboard page (understood by Linux and macOS hosts).
    MediaPlayPause = 0xE8,
    MediaStop = 0xE9,
    MediaPrevious = 0xEA,
    MediaNext = 0xEB,
    MediaEject = 0xEC,
    MediaVolumeUp = 0xED,
    MediaVolumeDown = 0xEE,
    MediaMute = 0xEF,
    MediaSleep = 0xF8,

    /// Fn latch pseudo-code; tracked locally and never sent to the host.
    Fn = 0xFF,
}

impl Default for Keycode {
    fn default() -> Self {
        Keycode::No
    }
}

impl Keycode {
    /// `true` for any code other than [`Keycode::No`].
    pub fn is_assigned(self) -> bool {
        self != Keycode::No
    }

    /// Check if this keycode is a modifier (LCtrl..RGui).
    pub fn is_modifier(self) -> bool {
        let v = self as u8;
        (0xE0..=0xE7).contains(&v)
    }

    /// Get the modifier bit mask (bit 0 = LCtrl, bit 7 = RGui).
    pub fn modifier_bit(self) -> u8 {
        if self.is_modifier() {
            1 << (self as u8 - 0xE0)
        } else {
            0
        }
    }

    pub fn is_fn(self) -> bool {
        self == Keycode::Fn
    }

    /// Consumer page (0x0C) usage for keys that have one.
    ///
    /// Used when media keys are delivered through the dedicated consumer
    /// report instead of a keyboard slot.
    pub fn consumer_usage(self) -> Option<u16> {
        let usage = match self {
            Keycode::MediaPlayPause => 0xCD,
            Keycode::MediaStop => 0xB7,
            Keycode::MediaPrevious => 0xB6,
            Keycode::MediaNext => 0xB5,
            Keycode::MediaEject => 0xB8,
            Keycode::MediaVolumeUp | Keycode::VolumeUp => 0xE9,
            Keycode::MediaVolumeDown | Keycode::VolumeDown => 0xEA,
            Keycode::MediaMute | Keycode::Mute => 0xE2,
            Keycode::MediaSleep => 0x32,
            _ => return None,
        };
        Some(usage)
    }

    /// Look a keycode up by its identifier, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kc| kc.name().eq_ignore_ascii_case(name))
    }

    /// Map an ASCII character to the key (and shift state) that types it on
    /// a US layout.
    pub fn from_ascii(c: char) -> Option<(Keycode, bool)> {
        const DIGITS: [Keycode; 10] = [
            Keycode::N0,
            Keycode::N1,
            Keycode::N2,
            Keycode::N3,
            Keycode::N4,
            Keycode::N5,
            Keycode::N6,
            Keycode::N7,
            Keycode::N8,
            Keycode::N9,
        ];

        let key = match c {
            'a'..='z' => (Self::letter(c as u8 - b'a'), false),
            'A'..='Z' => (Self::letter(c as u8 - b'A'), true),
            '0'..='9' => (DIGITS[(c as u8 - b'0') as usize], false),
            ' ' => (Keycode::Space, false),
            '\t' => (Keycode::Tab, false),
            '\n' => (Keycode::Enter, false),
            '#' => (Keycode::N3, true),
            '-' => (Keycode::Minus, false),
            '_' => (Keycode::Minus, true),
            '=' => (Keycode::Equal, false),
            '.' => (Keycode::Dot, false),
            ',' => (Keycode::Comma, false),
            '/' => (Keycode::Slash, false),
            ':' => (Keycode::Semicolon, true),
            _ => return None,
        };
        Some(key)
    }

    fn letter(offset: u8) -> Keycode {
        // Letters are contiguous from A = 0x04.
        Self::ALL[1 + offset as usize]
    }
}
