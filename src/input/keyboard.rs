//! Keyboard device handle
//!
//! Owns an open event device (or any byte stream standing in for one)
//! together with its decode pipeline. Reads yield enriched events; typing
//! helpers write each composed sequence in a single write so sequences from
//! separate calls never interleave on this handle.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use log::{debug, info};

use super::composer::{
    compose_backspace, compose_key, compose_space, compose_string, compose_tap, KeyRef,
};
use super::decoder::{KeyboardDecoder, KeyboardEvent};
use super::event::{write_events, RawEvent};
use super::modifiers::ModifierState;
use super::snoop::Snooper;
use crate::config::SnoopConfig;
use crate::device;
use crate::error::Result;

/// Keyboard input/output over a device handle
pub struct LinuxKeyboard<H> {
    /// Device handle (an open /dev/input/eventN in production)
    handle: H,
    /// Decoder holding this handle's modifier state
    decoder: KeyboardDecoder,
}

impl LinuxKeyboard<File> {
    /// Open an event device read-write
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = device::open(path)?;
        Ok(Self::new(file))
    }

    /// Start a streaming session on a duplicate of this device's descriptor
    ///
    /// The session has its own modifier state. Writes made through this
    /// handle while the session runs are the caller's to serialize.
    pub fn start_snooping(&self, config: &SnoopConfig) -> io::Result<Snooper> {
        let file = self.handle.try_clone()?;
        Snooper::start(file, config)
    }
}

impl<H> LinuxKeyboard<H> {
    /// Wrap an already-open handle
    pub fn new(handle: H) -> Self {
        Self {
            handle,
            decoder: KeyboardDecoder::new(),
        }
    }

    /// Modifier flags seen by `read_event` so far
    pub fn modifiers(&self) -> ModifierState {
        self.decoder.modifiers()
    }

    pub fn get_ref(&self) -> &H {
        &self.handle
    }

    /// Give back the handle (closing the keyboard)
    pub fn into_inner(self) -> H {
        self.handle
    }
}

impl<H: Read> LinuxKeyboard<H> {
    /// Read and decode the next event
    pub fn read_event(&mut self) -> Result<KeyboardEvent> {
        self.decoder.read(&mut self.handle)
    }
}

impl<H: Write> LinuxKeyboard<H> {
    /// Write a sequence of raw events in one go
    pub fn write_events(&mut self, events: &[RawEvent]) -> Result<()> {
        write_events(&mut self.handle, events)
    }

    /// Press one key (no sync)
    pub fn press(&mut self, key: impl Into<KeyRef>) -> Result<()> {
        let code = key.into().code();
        self.write_events(&[RawEvent::key_press(code)])
    }

    /// Release one key (no sync)
    pub fn release(&mut self, key: impl Into<KeyRef>) -> Result<()> {
        let code = key.into().code();
        self.write_events(&[RawEvent::key_release(code)])
    }

    /// Emit a sync report
    pub fn sync(&mut self) -> Result<()> {
        self.write_events(&[RawEvent::sync()])
    }

    /// Press and release a key by code or name
    pub fn tap(&mut self, key: impl Into<KeyRef>) -> Result<()> {
        let key = key.into();
        debug!("Tapping {}", key);
        self.write_events(&compose_tap(key))
    }

    /// Type one character, holding Shift when needed
    pub fn type_key(&mut self, c: char) -> Result<()> {
        let events = compose_key(c)?;
        self.write_events(&events)
    }

    /// Type a whole string as one write
    pub fn type_string(&mut self, text: &str) -> Result<()> {
        let events = compose_string(text)?;
        info!("Typing {} chars", text.chars().count());
        self.write_events(&events)
    }

    pub fn type_space(&mut self) -> Result<()> {
        self.write_events(&compose_space())
    }

    pub fn type_backspace(&mut self) -> Result<()> {
        self.write_events(&compose_backspace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyboardError;
    use crate::input::keycodes::{KEY_BACKSPACE, KEY_LEFTSHIFT};
    use std::io::Cursor;

    fn written(kbd: LinuxKeyboard<Vec<u8>>) -> Vec<RawEvent> {
        kbd.into_inner()
            .chunks(24)
            .map(|chunk| RawEvent::decode(chunk).unwrap())
            .collect()
    }

    #[test]
    fn test_type_key_writes_shift_wrapped_sequence() {
        let mut kbd = LinuxKeyboard::new(Vec::new());
        kbd.type_key('Q').unwrap();
        let events = written(kbd);
        assert_eq!(events.len(), 8);
        assert_eq!(events[0], RawEvent::key_press(KEY_LEFTSHIFT));
        assert_eq!(events[2], RawEvent::key_press(16));
        assert_eq!(events[6], RawEvent::key_release(KEY_LEFTSHIFT));
    }

    #[test]
    fn test_not_printable_writes_nothing() {
        let mut kbd = LinuxKeyboard::new(Vec::new());
        assert!(matches!(
            kbd.type_string("tab\there"),
            Err(KeyboardError::NotPrintable('\t'))
        ));
        assert!(kbd.into_inner().is_empty());
    }

    #[test]
    fn test_backspace_and_manual_events() {
        let mut kbd = LinuxKeyboard::new(Vec::new());
        kbd.type_backspace().unwrap();
        kbd.press("ENTER").unwrap();
        kbd.sync().unwrap();
        kbd.release(28u16).unwrap();
        let events = written(kbd);
        assert_eq!(events[0], RawEvent::key_press(KEY_BACKSPACE));
        assert_eq!(events[4], RawEvent::key_press(28));
        assert_eq!(events[5], RawEvent::sync());
        assert_eq!(events[6], RawEvent::key_release(28));
    }

    #[test]
    fn test_read_event_tracks_modifiers() {
        let bytes: Vec<u8> = [RawEvent::key_press(KEY_LEFTSHIFT), RawEvent::key_press(35)]
            .iter()
            .flat_map(|e| e.encode())
            .collect();
        let mut kbd = LinuxKeyboard::new(Cursor::new(bytes));
        assert!(kbd.read_event().unwrap().modifiers.shift());
        assert_eq!(kbd.read_event().unwrap().rune, 'H');
        assert!(kbd.modifiers().shift());
        assert!(matches!(
            kbd.read_event(),
            Err(KeyboardError::ShortRead { got: 0 })
        ));
    }
}
