//! linuxkbd - read, decode and synthesize Linux keyboard events
//!
//! Raw `struct input_event` records from /dev/input/eventN are decoded into
//! [`KeyboardEvent`]s carrying the key name, the character it produces and
//! the active modifiers. In the other direction, characters and strings are
//! turned into press/sync/release/sync sequences that can be written back
//! to the device.
//!
//! ```no_run
//! use linuxkbd::{config::Config, device, LinuxKeyboard};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load();
//! let path = device::resolve(&config.device)?;
//! let mut kbd = LinuxKeyboard::open(&path)?;
//! kbd.type_string("Hello")?;
//!
//! for item in kbd.start_snooping(&config.snoop)? {
//!     let event = item?;
//!     if event.is_char_press() {
//!         println!("{}", event.rune);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#[cfg(not(target_os = "linux"))]
compile_error!("linuxkbd only works on Linux");

pub mod config;
pub mod constants;
pub mod device;
pub mod error;
pub mod input;

pub use error::KeyboardError;
pub use input::{
    EventType, KeyRef, KeyboardDecoder, KeyboardEvent, LinuxKeyboard, ModifierState, RawEvent,
    Snooper,
};
