//! Input handling
//!
//! Decode and synthesize Linux evdev keyboard events.
//! - Wire codec for the 24-byte kernel record
//! - Key names and per-key characters for a fixed US layout
//! - Modifier tracking and event enrichment
//! - Typing composer and streaming sessions

pub mod composer;
pub mod decoder;
pub mod event;
pub mod keyboard;
pub mod keycodes;
pub mod modifiers;
pub mod snoop;

pub use composer::{
    compose_backspace, compose_key, compose_space, compose_string, compose_tap, KeyRef,
};
pub use decoder::{resolve_rune, KeyboardDecoder, KeyboardEvent};
pub use event::{read_event, write_events, EventType, KeyState, RawEvent, Timeval};
pub use keyboard::LinuxKeyboard;
pub use keycodes::{code_for_char, code_of, name_of, variant_of, CharacterVariant};
pub use modifiers::ModifierState;
pub use snoop::{EventSource, SnoopItem, Snooper};
