//! Global constants for linuxkbd
//!
//! Consolidates wire-format sizes, key values, default paths and timing
//! constants to eliminate magic numbers throughout the codebase.

// ============================================================================
// Wire Format
// ============================================================================

/// Size of one `struct input_event` record on a 64-bit kernel
pub const EVENT_SIZE: usize = 24;

/// Byte offset of the microseconds field
pub const OFFSET_USEC: usize = 8;

/// Byte offset of the event type field
pub const OFFSET_TYPE: usize = 16;

/// Byte offset of the event code field
pub const OFFSET_CODE: usize = 18;

/// Byte offset of the event value field
pub const OFFSET_VALUE: usize = 20;

// ============================================================================
// Key Event Values
// ============================================================================

/// Key released
pub const VALUE_RELEASE: i32 = 0;

/// Key pressed
pub const VALUE_PRESS: i32 = 1;

/// Key held down (kernel autorepeat)
pub const VALUE_REPEAT: i32 = 2;

// ============================================================================
// Printable Range
// ============================================================================

/// First character the typing composer accepts (space)
pub const PRINTABLE_FIRST: char = ' ';

/// Last character the typing composer accepts (tilde)
pub const PRINTABLE_LAST: char = '~';

/// Check if a character is inside the typeable ASCII range
#[inline]
pub const fn is_printable(c: char) -> bool {
    c >= PRINTABLE_FIRST && c <= PRINTABLE_LAST
}

// ============================================================================
// Device Discovery
// ============================================================================

/// Directory holding stable per-port input device symlinks
pub const DEFAULT_SEARCH_DIR: &str = "/dev/input/by-path";

/// File name suffix udev gives keyboard event nodes
pub const DEFAULT_KEYBOARD_SUFFIX: &str = "event-kbd";

// ============================================================================
// Timing Constants
// ============================================================================

/// How often a snooping session re-checks its stop flag while idle (ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Delay before injecting keys so the desktop registers the device (ms)
pub const DEFAULT_START_DELAY_MS: u64 = 1000;
