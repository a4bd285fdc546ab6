//! Typing composer
//!
//! Builds the press/sync/release/sync sequences that make the kernel (or
//! the decoder, when looped back) see a character being typed. Uppercase
//! and shifted symbols are wrapped in a Left Shift press/release.

use std::fmt;

use log::debug;

use super::event::RawEvent;
use super::keycodes::{code_for_char, code_of, name_of, KEY_BACKSPACE, KEY_LEFTSHIFT, KEY_SPACE};
use crate::constants::is_printable;
use crate::error::{KeyboardError, Result};

/// A key given either by code or by symbolic name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRef {
    Code(u16),
    Name(String),
}

impl KeyRef {
    /// Resolve to a key code (0 for unknown names)
    pub fn code(&self) -> u16 {
        match self {
            KeyRef::Code(code) => *code,
            KeyRef::Name(name) => code_of(name),
        }
    }

    /// Parse a command-line style key: decimal code or symbolic name
    pub fn parse(s: &str) -> Self {
        match s.parse::<u16>() {
            Ok(code) if code_of(s) == 0 => KeyRef::Code(code),
            _ => KeyRef::Name(s.to_string()),
        }
    }
}

impl From<u16> for KeyRef {
    fn from(code: u16) -> Self {
        KeyRef::Code(code)
    }
}

impl From<&str> for KeyRef {
    fn from(name: &str) -> Self {
        KeyRef::Name(name.to_string())
    }
}

impl From<String> for KeyRef {
    fn from(name: String) -> Self {
        KeyRef::Name(name)
    }
}

impl fmt::Display for KeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRef::Code(code) => match name_of(*code) {
                "" => write!(f, "{}", code),
                name => write!(f, "{} ({})", name, code),
            },
            KeyRef::Name(name) => f.write_str(name),
        }
    }
}

/// Press and release of one key, each followed by a sync
pub fn compose_tap(key: impl Into<KeyRef>) -> Vec<RawEvent> {
    let code = key.into().code();
    vec![
        RawEvent::key_press(code),
        RawEvent::sync(),
        RawEvent::key_release(code),
        RawEvent::sync(),
    ]
}

/// Sequence that types `c`, wrapped in Shift when needed
pub fn compose_key(c: char) -> Result<Vec<RawEvent>> {
    let mut events = Vec::with_capacity(8);
    push_key(&mut events, c)?;
    Ok(events)
}

fn push_key(events: &mut Vec<RawEvent>, c: char) -> Result<()> {
    if !is_printable(c) {
        return Err(KeyboardError::NotPrintable(c));
    }
    let (code, shift) = code_for_char(c).ok_or(KeyboardError::NotPrintable(c))?;

    if shift {
        events.push(RawEvent::key_press(KEY_LEFTSHIFT));
        events.push(RawEvent::sync());
    }
    events.extend(compose_tap(code));
    if shift {
        events.push(RawEvent::key_release(KEY_LEFTSHIFT));
        events.push(RawEvent::sync());
    }
    Ok(())
}

/// Sequence that types every character of `text` in order
///
/// Fails without producing anything if any character is not typeable.
pub fn compose_string(text: &str) -> Result<Vec<RawEvent>> {
    if let Some(c) = text.chars().find(|&c| !is_printable(c)) {
        return Err(KeyboardError::NotPrintable(c));
    }

    let mut events = Vec::with_capacity(text.len() * 8);
    for c in text.chars() {
        if c == ' ' {
            events.extend(compose_space());
        } else {
            push_key(&mut events, c)?;
        }
    }
    debug!("composed {} events for {} chars", events.len(), text.chars().count());
    Ok(events)
}

/// Tap of the space bar
pub fn compose_space() -> Vec<RawEvent> {
    compose_tap(KEY_SPACE)
}

/// Tap of backspace
pub fn compose_backspace() -> Vec<RawEvent> {
    compose_tap(KEY_BACKSPACE)
}
