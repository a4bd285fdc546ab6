//! End-to-end tests: composed sequences fed back through the decoder and
//! streaming sessions driven by in-memory sources.

use std::io::{self, Cursor, Read};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use linuxkbd::config::SnoopConfig;
use linuxkbd::input::{compose_string, EventSource};
use linuxkbd::{KeyboardDecoder, KeyboardError, LinuxKeyboard, RawEvent, Snooper};

fn bytes_of(events: &[RawEvent]) -> Vec<u8> {
    events.iter().flat_map(|e| e.encode()).collect()
}

#[test]
fn typed_string_decodes_to_same_runes() {
    let mut writer = LinuxKeyboard::new(Vec::new());
    writer.type_string("Hi").unwrap();

    let mut reader = LinuxKeyboard::new(Cursor::new(writer.into_inner()));
    let mut runes = Vec::new();
    loop {
        match reader.read_event() {
            Ok(event) if event.is_char_press() => runes.push(event.rune),
            Ok(_) => {}
            Err(KeyboardError::ShortRead { got: 0 }) => break,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(runes, vec!['H', 'i']);
    assert!(!reader.modifiers().shift());
}

#[test]
fn punctuation_survives_loopback() {
    let text = "Hello, World! (x+y)=~z";
    let events = compose_string(text).unwrap();
    let mut decoder = KeyboardDecoder::new();
    let typed: String = events
        .into_iter()
        .map(|raw| decoder.decode(raw))
        .filter(|event| event.is_char_press())
        .map(|event| event.rune)
        .collect();
    assert_eq!(typed, text);
}

/// Source fed chunk by chunk from the test; reports when it runs dry
struct ChannelSource {
    chunks: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    starved: Sender<()>,
}

impl Read for ChannelSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            let _ = self.starved.send(());
            match self.chunks.recv() {
                Ok(chunk) => self.pending = chunk,
                Err(_) => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

impl EventSource for ChannelSource {}

fn channel_source() -> (ChannelSource, Sender<Vec<u8>>, Receiver<()>) {
    let (chunk_tx, chunks) = mpsc::channel();
    let (starved, starved_rx) = mpsc::channel();
    let source = ChannelSource {
        chunks,
        pending: Vec::new(),
        starved,
    };
    (source, chunk_tx, starved_rx)
}

#[test]
fn cancel_keeps_queued_events_and_stops_reading() {
    let (source, feed, starved) = channel_source();
    let snooper = Snooper::start(source, &SnoopConfig::default()).unwrap();

    // First read finds nothing queued
    starved.recv_timeout(Duration::from_secs(5)).unwrap();

    let events = compose_string("ok").unwrap();
    feed.send(bytes_of(&events)).unwrap();

    // Reader has consumed everything and is waiting again
    starved.recv_timeout(Duration::from_secs(5)).unwrap();

    snooper.cancel();
    drop(feed);

    let received: Vec<RawEvent> = snooper
        .map(|item| item.expect("no error after cancel").raw)
        .collect();
    assert_eq!(received, events);

    // The wake-up read after cancellation was the last one
    assert!(starved.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn sessions_do_not_share_modifier_state() {
    use linuxkbd::input::keycodes::KEY_LEFTSHIFT;

    let shifted = bytes_of(&[RawEvent::key_press(KEY_LEFTSHIFT), RawEvent::key_press(30)]);
    let plain = bytes_of(&[RawEvent::key_press(30)]);

    let a = Snooper::start(Cursor::new(shifted), &SnoopConfig::default()).unwrap();
    let b = Snooper::start(Cursor::new(plain), &SnoopConfig::default()).unwrap();

    let a_runes: Vec<char> = a.filter_map(|item| item.ok()).map(|e| e.rune).collect();
    let b_runes: Vec<char> = b.filter_map(|item| item.ok()).map(|e| e.rune).collect();

    assert_eq!(a_runes, vec!['\0', 'A']);
    assert_eq!(b_runes, vec!['a']);
}

#[test]
fn read_failure_is_reported_once() {
    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device unplugged"))
        }
    }

    impl EventSource for Failing {}

    let snooper = Snooper::start(Failing, &SnoopConfig::default()).unwrap();
    let items: Vec<_> = snooper.collect();
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(KeyboardError::Read(_))));
}
