//! Streaming keyboard session
//!
//! A dedicated thread reads and decodes events and hands them to the
//! consumer over a channel, in kernel order. Every session owns its own
//! decoder, so concurrent sessions on different devices share nothing.
//!
//! Cancellation is cooperative: the stop flag is checked before and after
//! each read. A read that is already blocked is not interrupted; device
//! files are polled with a timeout so the flag is still noticed, other
//! sources finish when their next record (or EOF) arrives.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{
    self, Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError,
};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, info, warn};
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags};

use super::decoder::{KeyboardDecoder, KeyboardEvent};
use crate::config::SnoopConfig;
use crate::error::{KeyboardError, Result};

/// Byte source a session can read events from
pub trait EventSource: Read + Send + 'static {
    /// Wait up to `timeout` for readable data
    ///
    /// Returns Ok(false) on timeout. Sources that cannot be polled report
    /// ready immediately and block in `read` instead.
    fn wait_readable(&mut self, _timeout: Duration) -> io::Result<bool> {
        Ok(true)
    }
}

impl EventSource for File {
    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool> {
        let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
        let mut fds = [PollFd::new(&*self, PollFlags::POLLIN)];

        match poll(&mut fds, timeout_ms) {
            Ok(0) => Ok(false),
            Ok(_) => Ok(true),
            Err(Errno::EINTR) => Ok(false),
            Err(e) => Err(io::Error::from(e)),
        }
    }
}

impl EventSource for Cursor<Vec<u8>> {}

/// Item delivered to the consumer: an event, or the one terminal error
pub type SnoopItem = Result<KeyboardEvent>;

/// Sending half, bounded or not depending on config
enum EventSender {
    Unbounded(mpsc::Sender<SnoopItem>),
    Bounded(SyncSender<SnoopItem>),
}

impl EventSender {
    /// Queue one item
    ///
    /// A full bounded queue is retried every `retry` until there is room or
    /// the session is stopped. Returns false when the item was not queued
    /// (consumer gone or session stopped).
    fn send(&self, mut item: SnoopItem, stop: &AtomicBool, retry: Duration) -> bool {
        match self {
            EventSender::Unbounded(tx) => tx.send(item).is_ok(),
            EventSender::Bounded(tx) => loop {
                match tx.try_send(item) {
                    Ok(()) => return true,
                    Err(TrySendError::Disconnected(_)) => return false,
                    Err(TrySendError::Full(back)) => {
                        if stop.load(Ordering::SeqCst) {
                            return false;
                        }
                        item = back;
                        std::thread::sleep(retry);
                        if stop.load(Ordering::SeqCst) {
                            return false;
                        }
                    }
                }
            },
        }
    }
}

/// Handle to a running session
///
/// Dropping it cancels the session without waiting for the thread.
pub struct Snooper {
    /// Taken out by `join` so the reader thread sees the consumer leave
    events: Option<Receiver<SnoopItem>>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Snooper {
    /// Start a read-decode loop on `source`
    pub fn start<S: EventSource>(source: S, config: &SnoopConfig) -> io::Result<Self> {
        let (tx, events) = if config.channel_capacity == 0 {
            let (tx, rx) = mpsc::channel();
            (EventSender::Unbounded(tx), rx)
        } else {
            let (tx, rx) = mpsc::sync_channel(config.channel_capacity);
            (EventSender::Bounded(tx), rx)
        };
        let stop = Arc::new(AtomicBool::new(false));
        let poll_interval = Duration::from_millis(config.poll_interval_ms.max(1));

        let thread_stop = Arc::clone(&stop);
        let thread = std::thread::Builder::new()
            .name("linuxkbd-snoop".into())
            .spawn(move || snoop_loop(source, tx, thread_stop, poll_interval))?;

        info!("Snooping session started");
        Ok(Self {
            events: Some(events),
            stop,
            thread: Some(thread),
        })
    }

    /// Stop reading; events already queued stay receivable
    pub fn cancel(&self) {
        if !self.stop.swap(true, Ordering::SeqCst) {
            debug!("Snooping session cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Block for the next item; None once the session has ended and drained
    pub fn recv(&self) -> Option<SnoopItem> {
        self.events.as_ref()?.recv().ok()
    }

    /// Next item if one is queued
    ///
    /// `Err(Disconnected)` means the session has ended and everything it
    /// produced has been received.
    pub fn try_recv(&self) -> std::result::Result<SnoopItem, TryRecvError> {
        match &self.events {
            Some(events) => events.try_recv(),
            None => Err(TryRecvError::Disconnected),
        }
    }

    /// Wait up to `timeout` for the next item
    ///
    /// `Err(Timeout)` means nothing arrived yet; `Err(Disconnected)` means
    /// the session has ended and is drained.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> std::result::Result<SnoopItem, RecvTimeoutError> {
        match &self.events {
            Some(events) => events.recv_timeout(timeout),
            None => Err(RecvTimeoutError::Disconnected),
        }
    }

    /// Cancel, discard anything still queued and wait for the reading
    /// thread to exit
    ///
    /// Blocks until the current read returns.
    pub fn join(mut self) {
        self.cancel();
        drop(self.events.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Snooping thread panicked");
            }
        }
    }
}

impl Iterator for Snooper {
    type Item = SnoopItem;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

impl Drop for Snooper {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Session thread body
fn snoop_loop<S: EventSource>(
    mut source: S,
    tx: EventSender,
    stop: Arc<AtomicBool>,
    poll_interval: Duration,
) {
    let mut decoder = KeyboardDecoder::new();

    while !stop.load(Ordering::SeqCst) {
        match source.wait_readable(poll_interval) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => {
                report_end(&tx, &stop, poll_interval, KeyboardError::Read(e));
                break;
            }
        }

        let result = decoder.read(&mut source);

        // An event read after cancellation is never delivered
        if stop.load(Ordering::SeqCst) {
            break;
        }

        match result {
            Ok(event) => {
                debug!(
                    "key event: type={} code={} value={} name={:?} rune={:?}",
                    event.raw.event_type, event.raw.code, event.raw.value, event.name, event.rune
                );
                if !tx.send(Ok(event), &stop, poll_interval) {
                    debug!("Snooping consumer gone or session stopped");
                    break;
                }
            }
            Err(e) => {
                report_end(&tx, &stop, poll_interval, e);
                break;
            }
        }
    }

    info!("Snooping session ended");
}

/// Deliver the terminal error once
fn report_end(tx: &EventSender, stop: &AtomicBool, retry: Duration, err: KeyboardError) {
    if stop.load(Ordering::SeqCst) {
        return;
    }
    warn!("Keyboard read failed, ending session: {}", err);
    tx.send(Err(err), stop, retry);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::composer::compose_string;
    use crate::input::event::RawEvent;

    fn bytes_of(events: &[RawEvent]) -> Vec<u8> {
        events.iter().flat_map(|e| e.encode()).collect()
    }

    #[test]
    fn test_events_delivered_in_order_then_short_read() {
        let events = compose_string("ab").unwrap();
        let snooper = Snooper::start(Cursor::new(bytes_of(&events)), &SnoopConfig::default())
            .unwrap();

        let mut received = Vec::new();
        let mut errors = Vec::new();
        for item in snooper {
            match item {
                Ok(event) => received.push(event.raw),
                Err(e) => errors.push(e),
            }
        }

        assert_eq!(received, events);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], KeyboardError::ShortRead { got: 0 }));
    }

    #[test]
    fn test_bounded_channel_keeps_everything() {
        let events = compose_string("Hello").unwrap();
        let config = SnoopConfig {
            channel_capacity: 1,
            ..SnoopConfig::default()
        };
        let snooper = Snooper::start(Cursor::new(bytes_of(&events)), &config).unwrap();
        let received: Vec<_> = snooper.filter_map(|item| item.ok()).map(|e| e.raw).collect();
        assert_eq!(received, events);
    }

    #[test]
    fn test_truncated_frame_reports_bytes_seen() {
        let mut bytes = bytes_of(&[RawEvent::key_press(30)]);
        bytes.extend_from_slice(&[0u8; 5]);
        let snooper = Snooper::start(Cursor::new(bytes), &SnoopConfig::default()).unwrap();

        let first = snooper.recv().unwrap().unwrap();
        assert_eq!(first.rune, 'a');
        assert!(matches!(
            snooper.recv(),
            Some(Err(KeyboardError::ShortRead { got: 5 }))
        ));
        assert!(snooper.recv().is_none());
    }

    #[test]
    fn test_join_returns_with_full_bounded_queue() {
        let events = compose_string("hello world").unwrap();
        let config = SnoopConfig {
            channel_capacity: 1,
            poll_interval_ms: 10,
            ..SnoopConfig::default()
        };
        let snooper = Snooper::start(Cursor::new(bytes_of(&events)), &config).unwrap();

        // Let the reader fill the queue and wait for room
        std::thread::sleep(Duration::from_millis(100));

        let (done_tx, done_rx) = mpsc::channel();
        std::thread::spawn(move || {
            snooper.join();
            let _ = done_tx.send(());
        });
        assert!(
            done_rx.recv_timeout(Duration::from_secs(3)).is_ok(),
            "join did not return while the queue was full"
        );
    }

    #[test]
    fn test_cancel_unblocks_full_queue_without_join() {
        let events = compose_string("hello world").unwrap();
        let config = SnoopConfig {
            channel_capacity: 1,
            poll_interval_ms: 10,
            ..SnoopConfig::default()
        };
        let snooper = Snooper::start(Cursor::new(bytes_of(&events)), &config).unwrap();
        std::thread::sleep(Duration::from_millis(100));
        snooper.cancel();

        // What was queued is still delivered, then the channel closes
        let mut received = Vec::new();
        loop {
            match snooper.recv_timeout(Duration::from_secs(3)) {
                Ok(item) => received.push(item.expect("no error after cancel").raw),
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => panic!("reader still blocked after cancel"),
            }
        }
        assert!(!received.is_empty());
        assert!(received.len() < events.len());
        assert_eq!(received[..], events[..received.len()]);
    }

    #[test]
    fn test_end_of_session_is_distinguishable() {
        let snooper = Snooper::start(Cursor::new(Vec::new()), &SnoopConfig::default()).unwrap();

        // EOF right away: one ShortRead, then the channel closes
        assert!(matches!(
            snooper.recv_timeout(Duration::from_secs(3)),
            Ok(Err(KeyboardError::ShortRead { got: 0 }))
        ));
        assert!(matches!(
            snooper.recv_timeout(Duration::from_secs(3)),
            Err(RecvTimeoutError::Disconnected)
        ));
        assert!(matches!(snooper.try_recv(), Err(TryRecvError::Disconnected)));
    }

    #[test]
    fn test_idle_session_times_out_instead_of_ending() {
        let (_feed, chunks) = mpsc::channel::<Vec<u8>>();
        let snooper = Snooper::start(Blocking(chunks), &SnoopConfig::default()).unwrap();

        assert!(matches!(
            snooper.recv_timeout(Duration::from_millis(50)),
            Err(RecvTimeoutError::Timeout)
        ));
        assert!(matches!(snooper.try_recv(), Err(TryRecvError::Empty)));
        snooper.cancel();
    }

    #[test]
    fn test_regular_file_is_polled_readable() {
        let path = std::env::temp_dir().join(format!("linuxkbd-snoop-{}", std::process::id()));
        let events = compose_string("Ok").unwrap();
        std::fs::write(&path, bytes_of(&events)).unwrap();

        let mut file = File::open(&path).unwrap();
        assert!(file.wait_readable(Duration::from_millis(10)).unwrap());

        let snooper = Snooper::start(file, &SnoopConfig::default()).unwrap();
        let items: Vec<_> = snooper.collect();
        std::fs::remove_file(&path).unwrap();

        let received: Vec<_> = items
            .iter()
            .filter_map(|item| item.as_ref().ok())
            .map(|event| event.raw)
            .collect();
        assert_eq!(received, events);
        assert!(matches!(
            items.last(),
            Some(Err(KeyboardError::ShortRead { got: 0 }))
        ));
    }

    /// Source that blocks until the test feeds it (or hangs up)
    struct Blocking(Receiver<Vec<u8>>);

    impl Read for Blocking {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.recv() {
                Ok(chunk) => {
                    let n = buf.len().min(chunk.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    Ok(n)
                }
                Err(_) => Ok(0),
            }
        }
    }

    impl EventSource for Blocking {}
}
