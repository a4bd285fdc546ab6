//! Decode pipeline
//!
//! Enriches raw kernel events with a symbolic name, the character the key
//! produces and a snapshot of the modifier flags.

use std::io::Read;

use log::trace;

use super::event::{read_event, EventType, RawEvent};
use super::keycodes::{name_of, variant_of};
use super::modifiers::ModifierState;
use crate::error::Result;

/// A raw event plus everything the decoder knows about it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub raw: RawEvent,
    /// Symbolic key name ("" when unknown or for `EV_MSC`)
    pub name: &'static str,
    /// Character for the active modifiers ('\0' when none)
    pub rune: char,
    /// Modifier flags after this event was applied
    pub modifiers: ModifierState,
}

impl KeyboardEvent {
    /// True for a key press that produces a character
    pub fn is_char_press(&self) -> bool {
        self.raw.is_press() && self.rune != '\0'
    }
}

/// Pick the character for a key from the modifier flags
///
/// Shift wins over Ctrl. CapsLock is not consulted.
pub fn resolve_rune(code: u16, modifiers: ModifierState) -> char {
    let variant = variant_of(code);
    if modifiers.shift() {
        variant.upper
    } else if modifiers.ctrl() {
        variant.control
    } else {
        variant.lower
    }
}

/// Stateful decoder: one per keyboard session
#[derive(Debug, Default)]
pub struct KeyboardDecoder {
    modifiers: ModifierState,
}

impl KeyboardDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current modifier flags
    pub fn modifiers(&self) -> ModifierState {
        self.modifiers
    }

    /// Enrich one raw event, updating the modifier state first
    pub fn decode(&mut self, raw: RawEvent) -> KeyboardEvent {
        if raw.event_type == EventType::MSC {
            return KeyboardEvent {
                raw,
                name: "",
                rune: '\0',
                modifiers: self.modifiers,
            };
        }

        let name = name_of(raw.code);
        if self.modifiers.apply(&raw) {
            trace!("modifiers now {:?}", self.modifiers);
        }
        let rune = resolve_rune(raw.code, self.modifiers);

        KeyboardEvent {
            raw,
            name,
            rune,
            modifiers: self.modifiers,
        }
    }

    /// Read one record from `reader` and decode it
    pub fn read<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<KeyboardEvent> {
        let raw = read_event(reader)?;
        Ok(self.decode(raw))
    }
}
