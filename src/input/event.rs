//! Kernel input event codec
//!
//! Converts between the 24-byte `struct input_event` record read from and
//! written to /dev/input/eventN and the in-memory [`RawEvent`].
//!
//! Layout (little-endian, 64-bit kernel ABI):
//! ```text
//! 0..8    tv_sec   i64
//! 8..16   tv_usec  i64
//! 16..18  type     u16
//! 18..20  code     u16
//! 20..24  value    i32
//! ```
//!
//! Any type/code/value combination is accepted; the kernel is the only
//! producer and vendor codes are legitimate.

use std::fmt;
use std::io::{ErrorKind, Read, Write};

use log::trace;

use crate::constants::{
    EVENT_SIZE, OFFSET_CODE, OFFSET_TYPE, OFFSET_USEC, OFFSET_VALUE, VALUE_PRESS, VALUE_RELEASE,
    VALUE_REPEAT,
};
use crate::error::{KeyboardError, Result};

/// Event type (`EV_*` from linux/input-event-codes.h)
///
/// Unknown values are preserved as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventType(pub u16);

impl EventType {
    /// Separates groups of events
    pub const SYN: Self = Self(0x00);
    /// Key and button state changes
    pub const KEY: Self = Self(0x01);
    /// Relative axis (mouse movement, wheel)
    pub const REL: Self = Self(0x02);
    /// Absolute axis (touch, tablet)
    pub const ABS: Self = Self(0x03);
    /// Miscellaneous data (scancodes)
    pub const MSC: Self = Self(0x04);
    /// Binary switches
    pub const SW: Self = Self(0x05);
    /// LEDs
    pub const LED: Self = Self(0x11);
    /// Sound output
    pub const SND: Self = Self(0x12);
    /// Autorepeat parameters
    pub const REP: Self = Self(0x14);
    /// Force feedback commands
    pub const FF: Self = Self(0x15);
    /// Power button and switch
    pub const PWR: Self = Self(0x16);
    /// Force feedback status
    pub const FF_STATUS: Self = Self(0x17);

    /// Short kernel name, or None for unknown types
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0x00 => Some("EV_SYN"),
            0x01 => Some("EV_KEY"),
            0x02 => Some("EV_REL"),
            0x03 => Some("EV_ABS"),
            0x04 => Some("EV_MSC"),
            0x05 => Some("EV_SW"),
            0x11 => Some("EV_LED"),
            0x12 => Some("EV_SND"),
            0x14 => Some("EV_REP"),
            0x15 => Some("EV_FF"),
            0x16 => Some("EV_PWR"),
            0x17 => Some("EV_FF_STATUS"),
            _ => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "EV_{:#04x}", self.0),
        }
    }
}

/// Kernel timestamp (`struct timeval`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timeval {
    pub sec: i64,
    pub usec: i64,
}

/// Interpretation of the value field of an `EV_KEY` event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Released,
    Pressed,
    Repeated,
    /// Anything else a driver reports
    Other(i32),
}

impl From<i32> for KeyState {
    fn from(value: i32) -> Self {
        match value {
            VALUE_RELEASE => KeyState::Released,
            VALUE_PRESS => KeyState::Pressed,
            VALUE_REPEAT => KeyState::Repeated,
            other => KeyState::Other(other),
        }
    }
}

/// One decoded kernel input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawEvent {
    pub time: Timeval,
    pub event_type: EventType,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    /// Create an event with a zero timestamp (the kernel stamps injected events)
    pub const fn new(event_type: EventType, code: u16, value: i32) -> Self {
        Self {
            time: Timeval { sec: 0, usec: 0 },
            event_type,
            code,
            value,
        }
    }

    /// `EV_KEY` press of `code`
    pub const fn key_press(code: u16) -> Self {
        Self::new(EventType::KEY, code, VALUE_PRESS)
    }

    /// `EV_KEY` release of `code`
    pub const fn key_release(code: u16) -> Self {
        Self::new(EventType::KEY, code, VALUE_RELEASE)
    }

    /// `SYN_REPORT`
    pub const fn sync() -> Self {
        Self::new(EventType::SYN, 0, 0)
    }

    /// Decode one record from the first 24 bytes of `buf`
    ///
    /// Fails only with `ShortRead` when fewer than 24 bytes are given.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < EVENT_SIZE {
            return Err(KeyboardError::ShortRead { got: buf.len() });
        }

        let sec = i64::from_le_bytes(le_array(&buf[..OFFSET_USEC]));
        let usec = i64::from_le_bytes(le_array(&buf[OFFSET_USEC..OFFSET_TYPE]));
        let event_type = u16::from_le_bytes([buf[OFFSET_TYPE], buf[OFFSET_TYPE + 1]]);
        let code = u16::from_le_bytes([buf[OFFSET_CODE], buf[OFFSET_CODE + 1]]);
        let value = i32::from_le_bytes(le_array(&buf[OFFSET_VALUE..EVENT_SIZE]));

        Ok(Self {
            time: Timeval { sec, usec },
            event_type: EventType(event_type),
            code,
            value,
        })
    }

    /// Encode into the 24-byte wire record
    pub fn encode(&self) -> [u8; EVENT_SIZE] {
        let mut buf = [0u8; EVENT_SIZE];
        buf[..OFFSET_USEC].copy_from_slice(&self.time.sec.to_le_bytes());
        buf[OFFSET_USEC..OFFSET_TYPE].copy_from_slice(&self.time.usec.to_le_bytes());
        buf[OFFSET_TYPE..OFFSET_CODE].copy_from_slice(&self.event_type.0.to_le_bytes());
        buf[OFFSET_CODE..OFFSET_VALUE].copy_from_slice(&self.code.to_le_bytes());
        buf[OFFSET_VALUE..].copy_from_slice(&self.value.to_le_bytes());
        buf
    }

    #[inline]
    pub fn is_key(&self) -> bool {
        self.event_type == EventType::KEY
    }

    #[inline]
    pub fn is_sync(&self) -> bool {
        self.event_type == EventType::SYN
    }

    /// Key event with value 1
    #[inline]
    pub fn is_press(&self) -> bool {
        self.is_key() && self.value == VALUE_PRESS
    }

    /// Key event with value 0
    #[inline]
    pub fn is_release(&self) -> bool {
        self.is_key() && self.value == VALUE_RELEASE
    }

    /// Key event with value 2
    #[inline]
    pub fn is_repeat(&self) -> bool {
        self.is_key() && self.value == VALUE_REPEAT
    }

    /// Value viewed as a key state (meaningful for `EV_KEY` only)
    pub fn key_state(&self) -> KeyState {
        KeyState::from(self.value)
    }
}

/// Copy a slice of known length into a fixed array for `from_le_bytes`
#[inline]
fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

/// Read exactly one event record from `reader`
///
/// A stream that ends before 24 bytes yields `ShortRead` carrying the number
/// of bytes obtained; any other I/O error is surfaced as `Read`.
pub fn read_event<R: Read + ?Sized>(reader: &mut R) -> Result<RawEvent> {
    let mut buf = [0u8; EVENT_SIZE];
    let mut got = 0;

    while got < EVENT_SIZE {
        match reader.read(&mut buf[got..]) {
            Ok(0) => return Err(KeyboardError::ShortRead { got }),
            Ok(n) => got += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(KeyboardError::Read(e)),
        }
    }

    let event = RawEvent::decode(&buf)?;
    trace!(
        "read event: type={} code={} value={}",
        event.event_type,
        event.code,
        event.value
    );
    Ok(event)
}

/// Write a sequence of events as one contiguous buffer
///
/// The whole sequence goes out in a single `write_all` followed by a flush,
/// so a reader never observes a partial press/sync group from this call.
pub fn write_events<W: Write + ?Sized>(writer: &mut W, events: &[RawEvent]) -> Result<()> {
    let mut buf = Vec::with_capacity(events.len() * EVENT_SIZE);
    for event in events {
        buf.extend_from_slice(&event.encode());
    }

    writer.write_all(&buf).map_err(KeyboardError::WriteFailure)?;
    writer.flush().map_err(KeyboardError::WriteFailure)?;
    trace!("wrote {} events ({} bytes)", events.len(), buf.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    fn sample() -> RawEvent {
        RawEvent {
            time: Timeval {
                sec: 1_700_000_000,
                usec: 123_456,
            },
            event_type: EventType::KEY,
            code: 30,
            value: 1,
        }
    }

    #[test]
    fn test_encode_is_24_bytes_le() {
        let bytes = sample().encode();
        assert_eq!(bytes.len(), EVENT_SIZE);
        assert_eq!(&bytes[16..18], &[0x01, 0x00]);
        assert_eq!(&bytes[18..20], &[30, 0x00]);
        assert_eq!(&bytes[20..24], &[1, 0, 0, 0]);
        assert_eq!(&bytes[8..16], &123_456i64.to_le_bytes());
    }

    #[test]
    fn test_key_events_round_trip() {
        for code in [1u16, 30, 42, 57, 125] {
            for value in [0, 1] {
                let event = RawEvent {
                    value,
                    code,
                    ..sample()
                };
                assert_eq!(RawEvent::decode(&event.encode()).unwrap(), event);
            }
        }
    }

    #[test]
    fn test_decode_short_buffer() {
        for len in [0usize, 1, 16, 23] {
            let buf = vec![0u8; len];
            match RawEvent::decode(&buf) {
                Err(KeyboardError::ShortRead { got }) => assert_eq!(got, len),
                other => panic!("expected ShortRead, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_decode_passes_unknown_values_through() {
        let event = RawEvent::new(EventType(0x1e), 0xfffe, -42);
        let decoded = RawEvent::decode(&event.encode()).unwrap();
        assert_eq!(decoded.event_type, EventType(0x1e));
        assert_eq!(decoded.code, 0xfffe);
        assert_eq!(decoded.value, -42);
        assert_eq!(decoded.event_type.to_string(), "EV_0x1e");
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut bytes = sample().encode().to_vec();
        bytes.extend_from_slice(&[0xff; 5]);
        assert_eq!(RawEvent::decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_read_event_reports_partial_frame() {
        let bytes = sample().encode();
        let mut cursor = Cursor::new(bytes[..10].to_vec());
        match read_event(&mut cursor) {
            Err(KeyboardError::ShortRead { got }) => assert_eq!(got, 10),
            other => panic!("expected ShortRead, got {:?}", other),
        }
    }

    #[test]
    fn test_write_events_single_buffer() {
        let mut out = Vec::new();
        write_events(&mut out, &[RawEvent::key_press(30), RawEvent::sync()]).unwrap();
        assert_eq!(out.len(), 2 * EVENT_SIZE);
        assert_eq!(RawEvent::decode(&out[24..]).unwrap(), RawEvent::sync());
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_surfaces() {
        let result = write_events(&mut BrokenWriter, &[RawEvent::sync()]);
        assert!(matches!(result, Err(KeyboardError::WriteFailure(_))));
    }

    #[test]
    fn test_key_state() {
        assert_eq!(RawEvent::key_press(1).key_state(), KeyState::Pressed);
        assert_eq!(RawEvent::key_release(1).key_state(), KeyState::Released);
        assert_eq!(KeyState::from(2), KeyState::Repeated);
        assert_eq!(KeyState::from(7), KeyState::Other(7));
    }
}
