//! Keyboard error types
//!
//! Failures are reserved for I/O boundaries and the typing composer.
//! Table lookups never fail (they return empty/zero sentinels).

use std::io;

use thiserror::Error;

use crate::constants::EVENT_SIZE;

/// Errors raised while reading, decoding or synthesizing keyboard events
#[derive(Debug, Error)]
pub enum KeyboardError {
    /// Fewer than 24 bytes were available for one event record
    #[error("short read: got {got} of {} bytes", EVENT_SIZE)]
    ShortRead { got: usize },

    /// The typing composer has no key for this character
    #[error("character {0:?} cannot be typed on this layout")]
    NotPrintable(char),

    /// The device handle rejected a write (never retried)
    #[error("write to keyboard device failed: {0}")]
    WriteFailure(#[source] io::Error),

    /// The device handle failed while reading
    #[error("read from keyboard device failed: {0}")]
    Read(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, KeyboardError>;
