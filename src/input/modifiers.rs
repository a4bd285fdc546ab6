//! Modifier key state
//!
//! Tracks CapsLock/Shift/Ctrl/Alt/Meta from a stream of key events.
//! Left and right keys drive one flag each: press sets it, release clears
//! it, so holding both and releasing one clears the flag. CapsLock flips on
//! every press. Autorepeat never changes anything.

use bitflags::bitflags;

use super::event::{KeyState, RawEvent};
use super::keycodes::{is_alt_key, is_ctrl_key, is_meta_key, is_shift_key, KEY_CAPSLOCK};

bitflags! {
    /// Active modifier flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierState: u8 {
        const CAPS_LOCK = 0b0_0001;
        const SHIFT     = 0b0_0010;
        const CTRL      = 0b0_0100;
        const ALT       = 0b0_1000;
        const META      = 0b1_0000;
    }
}

impl ModifierState {
    /// Flag driven by a held (non-locking) modifier key
    fn held_flag(code: u16) -> Option<Self> {
        if is_shift_key(code) {
            Some(Self::SHIFT)
        } else if is_ctrl_key(code) {
            Some(Self::CTRL)
        } else if is_alt_key(code) {
            Some(Self::ALT)
        } else if is_meta_key(code) {
            Some(Self::META)
        } else {
            None
        }
    }

    /// Incorporate one event
    ///
    /// Returns true if any flag changed.
    pub fn apply(&mut self, event: &RawEvent) -> bool {
        if !event.is_key() {
            return false;
        }
        let before = *self;

        match (event.code, event.key_state()) {
            (KEY_CAPSLOCK, KeyState::Pressed) => self.toggle(Self::CAPS_LOCK),
            (code, KeyState::Pressed) => {
                if let Some(flag) = Self::held_flag(code) {
                    self.insert(flag);
                }
            }
            (code, KeyState::Released) => {
                if let Some(flag) = Self::held_flag(code) {
                    self.remove(flag);
                }
            }
            _ => {}
        }

        *self != before
    }

    #[inline]
    pub fn caps_lock(&self) -> bool {
        self.contains(Self::CAPS_LOCK)
    }

    #[inline]
    pub fn shift(&self) -> bool {
        self.contains(Self::SHIFT)
    }

    #[inline]
    pub fn ctrl(&self) -> bool {
        self.contains(Self::CTRL)
    }

    #[inline]
    pub fn alt(&self) -> bool {
        self.contains(Self::ALT)
    }

    #[inline]
    pub fn meta(&self) -> bool {
        self.contains(Self::META)
    }
}
