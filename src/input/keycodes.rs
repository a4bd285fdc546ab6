//! evdev keycode constants and symbol tables
//!
//! Consolidates all key constants, the code <-> name table and the
//! per-key character variants for the fixed US-like layout.
//! Codes are Linux input event codes from <linux/input-event-codes.h>.

// ============================================================================
// Modifier Keys
// ============================================================================

/// Left Control key
pub const KEY_LEFTCTRL: u16 = 29;

/// Right Control key
pub const KEY_RIGHTCTRL: u16 = 97;

/// Left Shift key
pub const KEY_LEFTSHIFT: u16 = 42;

/// Right Shift key
pub const KEY_RIGHTSHIFT: u16 = 54;

/// Left Alt key
pub const KEY_LEFTALT: u16 = 56;

/// Right Alt key (AltGr on some keyboards)
pub const KEY_RIGHTALT: u16 = 100;

/// Caps Lock key
pub const KEY_CAPSLOCK: u16 = 58;

/// Left Meta (Super/Windows) key
pub const KEY_LEFTMETA: u16 = 125;

/// Right Meta key
pub const KEY_RIGHTMETA: u16 = 126;

// ============================================================================
// Editing Keys
// ============================================================================

pub const KEY_ESC: u16 = 1;
pub const KEY_BACKSPACE: u16 = 14;
pub const KEY_TAB: u16 = 15;
pub const KEY_ENTER: u16 = 28;
pub const KEY_SPACE: u16 = 57;

// ============================================================================
// Function Keys
// ============================================================================

pub const KEY_F1: u16 = 59;
pub const KEY_F2: u16 = 60;
pub const KEY_F3: u16 = 61;
pub const KEY_F4: u16 = 62;
pub const KEY_F5: u16 = 63;
pub const KEY_F6: u16 = 64;
pub const KEY_F7: u16 = 65;
pub const KEY_F8: u16 = 66;
pub const KEY_F9: u16 = 67;
pub const KEY_F10: u16 = 68;
pub const KEY_F11: u16 = 87;
pub const KEY_F12: u16 = 88;

/// Highest code covered by the symbol tables
pub const KEY_TABLE_MAX: u16 = 127;

// ============================================================================
// Code <-> Name
// ============================================================================

/// Symbolic names indexed by key code
///
/// Laid out by physical position: main block, function row, keypad,
/// then the navigation cluster. Blank entries are codes with no name.
/// The keypad repeats "-", "5" and "/" from the main block.
static KEY_NAMES: [&str; KEY_TABLE_MAX as usize + 1] = [
    // 0-15
    "", "ESC", "1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "-", "=", "BS", "TAB",
    // 16-31
    "Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P", "[", "]", "ENTER", "L_CTRL", "A", "S",
    // 32-47
    "D", "F", "G", "H", "J", "K", "L", ";", "'", "`", "L_SHIFT", "\\", "Z", "X", "C", "V",
    // 48-63
    "B", "N", "M", ",", ".", "/", "R_SHIFT", "*", "L_ALT", "SPACE", "CAPS_LOCK", "F1", "F2",
    "F3", "F4", "F5",
    // 64-79
    "F6", "F7", "F8", "F9", "F10", "NUM_LOCK", "SCROLL_LOCK", "HOME", "UP_8", "PGUP_9", "-",
    "LEFT_4", "5", "RT_ARROW_6", "+", "END_1",
    // 80-95
    "DOWN", "PGDN_3", "INS", "DEL", "", "", "", "F11", "F12", "", "", "", "", "", "", "",
    // 96-111
    "R_ENTER", "R_CTRL", "/", "PRT_SCR", "R_ALT", "", "Home", "Up", "PgUp", "Left", "Right",
    "End", "Down", "PgDn", "Insert", "Del",
    // 112-127
    "", "", "", "", "", "", "", "Pause", "SCALE", "KP_COMMA", "HANGEUL", "HANJA", "YEN",
    "L_META", "R_META", "COMPOSE",
];

/// Symbolic name of a key code, or "" when the code has none
pub fn name_of(code: u16) -> &'static str {
    KEY_NAMES.get(code as usize).copied().unwrap_or("")
}

/// Key code for a symbolic name, or 0 when unknown
///
/// 0 doubles as the "no key" code. Names shared by a main-block key and a
/// keypad key resolve to the main-block (lower) code.
pub fn code_of(name: &str) -> u16 {
    if name.is_empty() {
        return 0;
    }
    KEY_NAMES
        .iter()
        .position(|&n| n == name)
        .map_or(0, |code| code as u16)
}

// ============================================================================
// Character Variants
// ============================================================================

/// Characters a key produces without modifiers, with Shift and with Ctrl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterVariant {
    pub lower: char,
    pub upper: char,
    pub control: char,
}

impl CharacterVariant {
    /// Variant for keys that produce no character
    pub const NONE: Self = Self::new('\0', '\0', '\0');

    const fn new(lower: char, upper: char, control: char) -> Self {
        Self {
            lower,
            upper,
            control,
        }
    }

    /// Letter key: Shift gives the capital, Ctrl gives the C0 control code
    const fn letter(lower: char) -> Self {
        let byte = lower as u8;
        Self::new(
            lower,
            (byte - b'a' + b'A') as char,
            (byte - b'a' + 1) as char,
        )
    }

    /// Symbol key with no control meaning
    const fn symbol(lower: char, upper: char) -> Self {
        Self::new(lower, upper, '\0')
    }

    /// Keypad key: same character with or without Shift
    const fn keypad(c: char) -> Self {
        Self::new(c, c, '\0')
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

/// Character variants for a key code (`NONE` for non-printable keys)
pub const fn variant_of(code: u16) -> CharacterVariant {
    match code {
        // Digit row
        2 => CharacterVariant::symbol('1', '!'),
        3 => CharacterVariant::new('2', '@', '\0'),
        4 => CharacterVariant::symbol('3', '#'),
        5 => CharacterVariant::symbol('4', '$'),
        6 => CharacterVariant::symbol('5', '%'),
        7 => CharacterVariant::new('6', '^', '\u{1e}'),
        8 => CharacterVariant::symbol('7', '&'),
        9 => CharacterVariant::symbol('8', '*'),
        10 => CharacterVariant::symbol('9', '('),
        11 => CharacterVariant::symbol('0', ')'),
        12 => CharacterVariant::new('-', '_', '\u{1f}'),
        13 => CharacterVariant::symbol('=', '+'),

        // Top letter row
        16 => CharacterVariant::letter('q'),
        17 => CharacterVariant::letter('w'),
        18 => CharacterVariant::letter('e'),
        19 => CharacterVariant::letter('r'),
        20 => CharacterVariant::letter('t'),
        21 => CharacterVariant::letter('y'),
        22 => CharacterVariant::letter('u'),
        23 => CharacterVariant::letter('i'),
        24 => CharacterVariant::letter('o'),
        25 => CharacterVariant::letter('p'),
        26 => CharacterVariant::new('[', '{', '\u{1b}'),
        27 => CharacterVariant::new(']', '}', '\u{1d}'),

        // Home row
        30 => CharacterVariant::letter('a'),
        31 => CharacterVariant::letter('s'),
        32 => CharacterVariant::letter('d'),
        33 => CharacterVariant::letter('f'),
        34 => CharacterVariant::letter('g'),
        35 => CharacterVariant::letter('h'),
        36 => CharacterVariant::letter('j'),
        37 => CharacterVariant::letter('k'),
        38 => CharacterVariant::letter('l'),
        39 => CharacterVariant::symbol(';', ':'),
        40 => CharacterVariant::symbol('\'', '"'),
        41 => CharacterVariant::symbol('`', '~'),
        43 => CharacterVariant::new('\\', '|', '\u{1c}'),

        // Bottom row
        44 => CharacterVariant::letter('z'),
        45 => CharacterVariant::letter('x'),
        46 => CharacterVariant::letter('c'),
        47 => CharacterVariant::letter('v'),
        48 => CharacterVariant::letter('b'),
        49 => CharacterVariant::letter('n'),
        50 => CharacterVariant::letter('m'),
        51 => CharacterVariant::symbol(',', '<'),
        52 => CharacterVariant::symbol('.', '>'),
        53 => CharacterVariant::symbol('/', '?'),

        KEY_SPACE => CharacterVariant::new(' ', ' ', '\0'),

        // Keypad
        55 => CharacterVariant::keypad('*'),
        71 => CharacterVariant::keypad('7'),
        72 => CharacterVariant::keypad('8'),
        73 => CharacterVariant::keypad('9'),
        74 => CharacterVariant::keypad('-'),
        75 => CharacterVariant::keypad('4'),
        76 => CharacterVariant::keypad('5'),
        77 => CharacterVariant::keypad('6'),
        78 => CharacterVariant::keypad('+'),
        79 => CharacterVariant::keypad('1'),
        80 => CharacterVariant::keypad('2'),
        81 => CharacterVariant::keypad('3'),
        82 => CharacterVariant::keypad('0'),
        83 => CharacterVariant::keypad('.'),
        98 => CharacterVariant::keypad('/'),

        _ => CharacterVariant::NONE,
    }
}

/// Find the key that types `c`
///
/// Returns the lowest code whose unshifted character is `c`, otherwise the
/// lowest code whose shifted character is `c` together with `true` to
/// signal that Shift must be held.
pub fn code_for_char(c: char) -> Option<(u16, bool)> {
    if c == '\0' {
        return None;
    }
    (1..=KEY_TABLE_MAX)
        .find(|&code| variant_of(code).lower == c)
        .map(|code| (code, false))
        .or_else(|| {
            (1..=KEY_TABLE_MAX)
                .find(|&code| variant_of(code).upper == c)
                .map(|code| (code, true))
        })
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Check if keycode is a modifier key
#[inline]
pub const fn is_modifier_key(keycode: u16) -> bool {
    is_shift_key(keycode)
        || is_ctrl_key(keycode)
        || is_alt_key(keycode)
        || is_meta_key(keycode)
        || keycode == KEY_CAPSLOCK
}

/// Check if keycode is a Shift key
#[inline]
pub const fn is_shift_key(keycode: u16) -> bool {
    keycode == KEY_LEFTSHIFT || keycode == KEY_RIGHTSHIFT
}

/// Check if keycode is a Ctrl key
#[inline]
pub const fn is_ctrl_key(keycode: u16) -> bool {
    keycode == KEY_LEFTCTRL || keycode == KEY_RIGHTCTRL
}

/// Check if keycode is an Alt key
#[inline]
pub const fn is_alt_key(keycode: u16) -> bool {
    keycode == KEY_LEFTALT || keycode == KEY_RIGHTALT
}

/// Check if keycode is a Meta key
#[inline]
pub const fn is_meta_key(keycode: u16) -> bool {
    keycode == KEY_LEFTMETA || keycode == KEY_RIGHTMETA
}

/// Convert function key code to function key number (1-12)
/// Returns None if not a function key
#[inline]
pub const fn function_key_number(keycode: u16) -> Option<u8> {
    match keycode {
        KEY_F1 => Some(1),
        KEY_F2 => Some(2),
        KEY_F3 => Some(3),
        KEY_F4 => Some(4),
        KEY_F5 => Some(5),
        KEY_F6 => Some(6),
        KEY_F7 => Some(7),
        KEY_F8 => Some(8),
        KEY_F9 => Some(9),
        KEY_F10 => Some(10),
        KEY_F11 => Some(11),
        KEY_F12 => Some(12),
        _ => None,
    }
}
