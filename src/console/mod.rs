//! Native console access.
//!
//! This module defines the seam between the terminal logic and the host
//! console:
//!
//! - **`Console`**: the backend trait (input records, wide-character writes,
//!   screen buffer queries, attribute and cursor control)
//! - **`win32`**: the live Windows console backend
//! - **`detect`**: probe for third-party ANSI hook DLLs
//!
//! Everything above this module works in terms of `KeyEvent` and `ScreenInfo`
//! values and is host-independent.

use std::io;

use bitflags::bitflags;
use thiserror::Error;

#[cfg(windows)]
pub mod win32;

pub mod detect;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Failed to change console mode: {0}")]
    Mode(#[source] io::Error),

    #[error("Failed to read console input: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to write to console: {0}")]
    Write(#[source] io::Error),

    #[error("Failed to query console screen buffer: {0}")]
    Query(#[source] io::Error),

    #[error("Invalid console handle")]
    InvalidHandle,
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

bitflags! {
    /// Modifier and flag bits of a native key event, matching the layout of
    /// the Win32 control-key-state mask.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct KeyState: u32 {
        const RIGHT_ALT  = 0x0001;
        const LEFT_ALT   = 0x0002;
        const RIGHT_CTRL = 0x0004;
        const LEFT_CTRL  = 0x0008;
        const SHIFT      = 0x0010;
        const ENHANCED   = 0x0100;
    }
}

impl KeyState {
    /// Either Ctrl key.
    pub fn ctrl(self) -> bool {
        self.intersects(KeyState::LEFT_CTRL | KeyState::RIGHT_CTRL)
    }

    /// Either Alt key.
    pub fn alt(self) -> bool {
        self.intersects(KeyState::LEFT_ALT | KeyState::RIGHT_ALT)
    }
}

/// A native key record reduced to the fields the decoder needs.
#[derive(Clone, Copy, Debug)]
pub struct KeyEvent {
    /// UTF-16 unit produced by the key, 0 for non-printing keys.
    pub character: u16,
    /// Virtual key code.
    pub virtual_key: u16,
    /// Hardware scan code.
    pub scan_code: u16,
    /// Modifier and enhanced-key flags.
    pub state: KeyState,
    /// True for key-down records.
    pub key_down: bool,
}

/// One record pulled from the console input queue.
#[derive(Clone, Copy, Debug)]
pub enum ConsoleEvent {
    Key(KeyEvent),
    /// Mouse, focus, menu and buffer-size records; skipped by the read loop.
    Other,
}

/// A snapshot of the console screen buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenInfo {
    /// Buffer width in character cells.
    pub columns: u16,
    /// Visible window height in rows.
    pub rows: u16,
    /// Current text attributes.
    pub attributes: u16,
    pub cursor_column: i16,
    pub cursor_row: i16,
}

/// Host console backend.
///
/// `acquire` and `release` bracket a session: `acquire` saves the console
/// modes and switches the input queue to window-event reporting, `release`
/// restores whatever was saved. `release` must be safe to call when `acquire`
/// failed part-way or was never called.
pub trait Console {
    fn acquire(&mut self) -> Result<()>;

    fn release(&mut self);

    /// Pull one input record, blocking until one is available.
    fn read_event(&mut self) -> Result<ConsoleEvent>;

    /// Write UTF-16 text at the cursor position.
    fn write_wide(&mut self, text: &[u16]) -> Result<()>;

    fn screen_info(&self) -> Result<ScreenInfo>;

    fn set_attribute(&mut self, attribute: u8) -> Result<()>;

    fn set_cursor(&mut self, column: i16, row: i16) -> Result<()>;
}

/// Virtual key codes used by the decoder.
pub mod vk {
    pub const MENU: u16 = 0x12;
    pub const PRIOR: u16 = 0x21;
    pub const NEXT: u16 = 0x22;
    pub const END: u16 = 0x23;
    pub const HOME: u16 = 0x24;
    pub const LEFT: u16 = 0x25;
    pub const UP: u16 = 0x26;
    pub const RIGHT: u16 = 0x27;
    pub const DOWN: u16 = 0x28;
    pub const INSERT: u16 = 0x2D;
    pub const DELETE: u16 = 0x2E;
    pub const OEM_4: u16 = 0xDB; // [{
    pub const OEM_6: u16 = 0xDD; // ]}
    pub const OEM_MINUS: u16 = 0xBD;
}
