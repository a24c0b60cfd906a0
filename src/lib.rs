//! winvt - ANSI/VT terminal translation layer for the Windows console
//!
//! winvt makes the native console behave like an ANSI/VT-compatible terminal
//! so a Readline-style line editor can be written portably. It translates in
//! both directions:
//!
//! - **Input**: raw console key records become the canonical byte stream a
//!   line editor expects — control characters, ESC-prefixed Alt chords,
//!   `ESC [`/`ESC O` navigation sequences — drained one byte per `read`.
//! - **Output**: the editor's byte stream is scanned for ANSI escape codes;
//!   the SGR color/attribute subset maps onto console text attributes and
//!   everything printable passes through. Unrecognized sequences are dropped
//!   rather than ever failing the session.
//!
//! # Quick Start
//!
//! ```no_run
//! # #[cfg(windows)] {
//! use winvt::{Config, Terminal, Win32Console};
//!
//! let config = Config::load();
//! let console = Win32Console::new().expect("console handles");
//! let mut term = Terminal::new(console, config.terminal);
//!
//! term.begin().expect("console modes");
//! term.write(b"\x1b[1;32m$\x1b[0m ").expect("prompt");
//! let key = term.read().expect("input");
//! term.end();
//! # let _ = key;
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Terminal
//! ├── Console (trait; Win32Console on Windows)
//! ├── input: KeyDecoder → InputBuffer ← read()
//! │          ResizeWatcher (polled per read)
//! └── output: Scanner → sgr/AttributeState + writer ← write()
//! ```
//!
//! The whole layer is single-threaded by design: the consuming editor drives
//! `read` and `write` from one thread of control, and the two directions
//! share no state beyond this crate's session object.

pub mod config;
pub mod console;
pub mod input;
pub mod output;
pub mod terminal;

pub use config::{Config, TerminalSettings};
pub use console::{Console, ConsoleError, ConsoleEvent, KeyEvent, KeyState, ScreenInfo};
pub use terminal::Terminal;

#[cfg(windows)]
pub use console::win32::Win32Console;

/// Terminal over the live Windows console.
#[cfg(windows)]
pub type WinTerminal = Terminal<Win32Console>;
