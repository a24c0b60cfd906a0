//! Terminal session.
//!
//! [`Terminal`] is the object a line editor drives: a blocking [`read`] that
//! yields one decoded input byte per call, and a [`write`] that interprets
//! the editor's output stream — translating the SGR escape subset to console
//! attributes and passing everything printable through.
//!
//! Input and output share nothing except this object; the consuming editor
//! calls both from one thread of control, so there is no locking anywhere in
//! the session.
//!
//! [`read`]: Terminal::read
//! [`write`]: Terminal::write

use crate::config::TerminalSettings;
use crate::console::{detect, Console, ConsoleEvent, Result};
use crate::input::{InputBuffer, KeyDecoder, ResizeWatcher};
use crate::output::{writer, AttributeState, Code, Scanner};

/// Defensive fallback for a read from a drained buffer; unreachable when the
/// fill loop holds its contract.
const EOT: u8 = 0x04;

const BEL: u8 = 0x07;

/// A console session translating between the native console and an
/// ANSI/VT-speaking line editor.
pub struct Terminal<C: Console> {
    console: C,
    settings: TerminalSettings,
    decoder: KeyDecoder,
    input: InputBuffer,
    resize: ResizeWatcher,
    scanner: Scanner,
    attr: AttributeState,
    ansi_enabled: bool,
    on_resize: Option<Box<dyn FnMut()>>,
    active: bool,
}

impl<C: Console> Terminal<C> {
    pub fn new(console: C, settings: TerminalSettings) -> Self {
        Self {
            console,
            settings,
            decoder: KeyDecoder::new(settings.altgr),
            input: InputBuffer::new(),
            resize: ResizeWatcher::new(),
            scanner: Scanner::new(),
            attr: AttributeState::default(),
            ansi_enabled: false,
            on_resize: None,
            active: false,
        }
    }

    /// Register the callback fired from within [`read`](Self::read) when the
    /// console dimensions change between reads.
    pub fn on_resize(&mut self, callback: impl FnMut() + 'static) {
        self.on_resize = Some(Box::new(callback));
    }

    /// Start the session: switch the console modes, capture the default
    /// attribute and decide whether escape translation runs.
    pub fn begin(&mut self) -> Result<()> {
        self.input = InputBuffer::new();
        self.console.acquire()?;

        let info = self.console.screen_info()?;
        self.attr = AttributeState::new((info.attributes & 0xFF) as u8);

        let hook = detect::ansi_hook_module();
        if let Some(module) = hook {
            tracing::info!(module, "third-party ANSI translation found, passing escape codes through");
        }
        self.ansi_enabled = detect::resolve_ansi(self.settings.ansi, hook);

        self.active = true;
        Ok(())
    }

    /// Tear the session down: restore the default attribute and the saved
    /// console modes. Safe to call when [`begin`](Self::begin) failed
    /// part-way or never ran.
    pub fn end(&mut self) {
        if self.active {
            let _ = self.console.set_attribute(self.attr.default_attr());
            self.active = false;
        }
        self.console.release();
    }

    /// Next decoded input byte; blocks until a key event produces one.
    pub fn read(&mut self) -> Result<u8> {
        while self.input.is_empty() {
            self.read_console()?;
        }
        Ok(self.input.pop().unwrap_or(EOT))
    }

    /// One iteration of the console read loop: poll geometry for a resize,
    /// then pull and decode a single input record. Filtered records leave
    /// the buffer empty and the caller loops.
    fn read_console(&mut self) -> Result<()> {
        let info = self.console.screen_info()?;
        if self.resize.observe(info.columns, info.rows) {
            if let Some(callback) = self.on_resize.as_mut() {
                callback();
            }
        }

        match self.console.read_event()? {
            ConsoleEvent::Key(key) => self.decoder.decode(&key, &mut self.input),
            ConsoleEvent::Other => {}
        }
        Ok(())
    }

    /// Interpret `text` and send it to the screen. With translation disabled
    /// for the session the bytes pass through unscanned.
    pub fn write(&mut self, text: &[u8]) -> Result<()> {
        if !self.ansi_enabled {
            return writer::write_text(&mut self.console, text);
        }

        let Self {
            console,
            scanner,
            attr,
            ..
        } = self;

        for code in scanner.scan(text) {
            match code {
                Code::Text(run) => writer::write_text(console, run)?,
                // The console has no bell worth ringing.
                Code::C0(BEL) => {}
                Code::C0(c0) => console.write_wide(&[u16::from(c0)])?,
                Code::Csi(seq) => match seq.final_byte {
                    b'm' => {
                        let updated =
                            crate::output::sgr::transform(&seq.params, attr.current(), attr.default_attr());
                        attr.set_current(updated);
                        console.set_attribute(updated)?;
                    }
                    other => {
                        tracing::debug!(
                            final_byte = %(other as char),
                            params = ?seq.params,
                            "ignoring unsupported CSI sequence"
                        );
                    }
                },
            }
        }
        Ok(())
    }

    /// Re-assert the cursor position. Writing to the console restarts the
    /// cursor blink timer and hides it, which is disorientating when moving
    /// around a line; this keeps it visible.
    pub fn flush(&mut self) -> Result<()> {
        let info = self.console.screen_info()?;
        self.console.set_cursor(info.cursor_column, info.cursor_row)
    }

    /// Buffer width in columns, read live from the console.
    pub fn columns(&self) -> Result<u16> {
        Ok(self.console.screen_info()?.columns)
    }

    /// Visible window height in rows, read live from the console.
    pub fn rows(&self) -> Result<u16> {
        Ok(self.console.screen_info()?.rows)
    }

    /// Attribute captured at session start.
    pub fn default_attribute(&self) -> u8 {
        self.attr.default_attr()
    }

    /// Attribute after the most recent SGR sequence.
    pub fn current_attribute(&self) -> u8 {
        self.attr.current()
    }
}

impl<C: Console> Drop for Terminal<C> {
    fn drop(&mut self) {
        self.end();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;
    use crate::console::{ConsoleError, KeyEvent, KeyState, ScreenInfo};

    /// Scripted console: queued input events, recorded output calls.
    struct FakeConsole {
        events: VecDeque<ConsoleEvent>,
        /// (columns, rows) returned by successive screen_info calls; the
        /// last entry repeats.
        sizes: VecDeque<(u16, u16)>,
        size: (u16, u16),
        attributes: u16,
        writes: Vec<Vec<u16>>,
        attribute_sets: Vec<u8>,
        cursor_sets: Vec<(i16, i16)>,
        acquired: bool,
        released: u32,
        fail_acquire: bool,
    }

    impl FakeConsole {
        fn new() -> Self {
            Self {
                events: VecDeque::new(),
                sizes: VecDeque::new(),
                size: (80, 25),
                attributes: 0x07,
                writes: Vec::new(),
                attribute_sets: Vec::new(),
                cursor_sets: Vec::new(),
                acquired: false,
                released: 0,
                fail_acquire: false,
            }
        }

        fn key_down(character: u16, virtual_key: u16, scan_code: u16, state: KeyState) -> ConsoleEvent {
            ConsoleEvent::Key(KeyEvent {
                character,
                virtual_key,
                scan_code,
                state,
                key_down: true,
            })
        }

        fn written_text(&self) -> String {
            let units: Vec<u16> = self.writes.iter().flatten().copied().collect();
            String::from_utf16_lossy(&units)
        }
    }

    impl Console for FakeConsole {
        fn acquire(&mut self) -> Result<()> {
            if self.fail_acquire {
                return Err(ConsoleError::InvalidHandle);
            }
            self.acquired = true;
            Ok(())
        }

        fn release(&mut self) {
            self.released += 1;
        }

        fn read_event(&mut self) -> Result<ConsoleEvent> {
            self.events
                .pop_front()
                .ok_or(ConsoleError::InvalidHandle)
        }

        fn write_wide(&mut self, text: &[u16]) -> Result<()> {
            self.writes.push(text.to_vec());
            Ok(())
        }

        fn screen_info(&self) -> Result<ScreenInfo> {
            // The front of `sizes` is the current geometry; tests advance it
            // by popping.
            let (columns, rows) = self.sizes.front().copied().unwrap_or(self.size);
            Ok(ScreenInfo {
                columns,
                rows,
                attributes: self.attributes,
                cursor_column: 3,
                cursor_row: 5,
            })
        }

        fn set_attribute(&mut self, attribute: u8) -> Result<()> {
            self.attribute_sets.push(attribute);
            Ok(())
        }

        fn set_cursor(&mut self, column: i16, row: i16) -> Result<()> {
            self.cursor_sets.push((column, row));
            Ok(())
        }
    }

    fn terminal(console: FakeConsole) -> Terminal<FakeConsole> {
        let mut terminal = Terminal::new(console, TerminalSettings::default());
        terminal.begin().unwrap();
        terminal
    }

    #[test]
    fn test_begin_captures_default_attribute() {
        let mut console = FakeConsole::new();
        console.attributes = 0x1E;
        let terminal = terminal(console);

        assert_eq!(terminal.default_attribute(), 0x1E);
        assert_eq!(terminal.current_attribute(), 0x1E);
    }

    #[test]
    fn test_read_plain_character() {
        let mut console = FakeConsole::new();
        console
            .events
            .push_back(FakeConsole::key_down(u16::from(b'a'), 0x41, 0x1E, KeyState::empty()));
        let mut terminal = terminal(console);

        assert_eq!(terminal.read().unwrap(), 0x61);
    }

    #[test]
    fn test_read_left_arrow_yields_three_bytes() {
        let mut console = FakeConsole::new();
        console
            .events
            .push_back(FakeConsole::key_down(0, crate::console::vk::LEFT, 0x4B, KeyState::empty()));
        let mut terminal = terminal(console);

        assert_eq!(terminal.read().unwrap(), 0x1B);
        assert_eq!(terminal.read().unwrap(), b'[');
        assert_eq!(terminal.read().unwrap(), b'D');
    }

    #[test]
    fn test_read_skips_filtered_events() {
        let mut console = FakeConsole::new();
        console.events.push_back(ConsoleEvent::Other);
        console.events.push_back(FakeConsole::key_down(
            0,
            0x14, // Caps Lock: discarded
            0x3A,
            KeyState::empty(),
        ));
        console
            .events
            .push_back(FakeConsole::key_down(u16::from(b'z'), 0x5A, 0x2C, KeyState::empty()));
        let mut terminal = terminal(console);

        assert_eq!(terminal.read().unwrap(), b'z');
    }

    #[test]
    fn test_resize_callback_fires_before_next_key() {
        let mut console = FakeConsole::new();
        console.sizes = VecDeque::from([(80, 25), (120, 40)]);
        console
            .events
            .push_back(FakeConsole::key_down(u16::from(b'a'), 0x41, 0x1E, KeyState::empty()));
        console
            .events
            .push_back(FakeConsole::key_down(u16::from(b'b'), 0x42, 0x30, KeyState::empty()));

        let resized = Rc::new(RefCell::new(0u32));
        let seen = Rc::clone(&resized);

        let mut terminal = terminal(console);
        terminal.on_resize(move || *seen.borrow_mut() += 1);

        assert_eq!(terminal.read().unwrap(), b'a');
        assert_eq!(*resized.borrow(), 0);

        terminal.console.sizes.pop_front();
        assert_eq!(terminal.read().unwrap(), b'b');
        assert_eq!(*resized.borrow(), 1);
    }

    #[test]
    fn test_unchanged_size_never_fires_callback() {
        let mut console = FakeConsole::new();
        for _ in 0..4 {
            console
                .events
                .push_back(FakeConsole::key_down(u16::from(b'x'), 0x58, 0x2D, KeyState::empty()));
        }

        let resized = Rc::new(RefCell::new(0u32));
        let seen = Rc::clone(&resized);

        let mut terminal = terminal(console);
        terminal.on_resize(move || *seen.borrow_mut() += 1);

        for _ in 0..4 {
            terminal.read().unwrap();
        }
        assert_eq!(*resized.borrow(), 0);
    }

    #[test]
    fn test_write_passes_text_through() {
        let mut terminal = terminal(FakeConsole::new());
        terminal.write(b"hello").unwrap();
        assert_eq!(terminal.console.written_text(), "hello");
    }

    #[test]
    fn test_write_sgr_scenario() {
        let mut terminal = terminal(FakeConsole::new());
        let default = terminal.default_attribute();

        terminal.write(b"\x1b[1;31m").unwrap();
        assert_eq!(terminal.current_attribute(), (default & 0xF8) | 0x04 | 0x08);

        terminal.write(b"HI").unwrap();
        assert_eq!(terminal.current_attribute(), (default & 0xF8) | 0x04 | 0x08);

        terminal.write(b"\x1b[0m").unwrap();
        assert_eq!(terminal.current_attribute(), default);

        assert_eq!(terminal.console.written_text(), "HI");
        assert_eq!(
            terminal.console.attribute_sets,
            vec![(default & 0xF8) | 0x0C, default]
        );
    }

    #[test]
    fn test_write_split_mid_sequence_matches_whole() {
        let mut split = terminal(FakeConsole::new());
        split.write(b"A\x1b[3").unwrap();
        split.write(b"1mB").unwrap();

        let mut whole = terminal(FakeConsole::new());
        whole.write(b"A\x1b[31mB").unwrap();

        assert_eq!(split.console.written_text(), whole.console.written_text());
        assert_eq!(split.console.attribute_sets, whole.console.attribute_sets);
        assert_eq!(split.current_attribute(), whole.current_attribute());
    }

    #[test]
    fn test_write_swallows_bell_and_keeps_other_c0() {
        let mut terminal = terminal(FakeConsole::new());
        terminal.write(b"a\x07b\r\n").unwrap();

        assert_eq!(terminal.console.written_text(), "ab\r\n");
    }

    #[test]
    fn test_write_ignores_unsupported_csi() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("winvt=debug")
            .try_init();

        let mut terminal = terminal(FakeConsole::new());
        terminal.write(b"\x1b[2Jtext").unwrap();

        assert_eq!(terminal.console.written_text(), "text");
        assert!(terminal.console.attribute_sets.is_empty());
    }

    #[test]
    fn test_disabled_translation_passes_bytes_unscanned() {
        let mut terminal = Terminal::new(
            FakeConsole::new(),
            TerminalSettings {
                ansi: false,
                ..TerminalSettings::default()
            },
        );
        terminal.begin().unwrap();

        terminal.write(b"\x1b[31mred").unwrap();

        assert_eq!(terminal.console.written_text(), "\u{1b}[31mred");
        assert!(terminal.console.attribute_sets.is_empty());
        assert_eq!(terminal.current_attribute(), terminal.default_attribute());
    }

    #[test]
    fn test_flush_reasserts_cursor_position() {
        let mut terminal = terminal(FakeConsole::new());
        terminal.flush().unwrap();
        assert_eq!(terminal.console.cursor_sets, vec![(3, 5)]);
    }

    #[test]
    fn test_geometry_queries_are_live() {
        let mut terminal = terminal(FakeConsole::new());
        assert_eq!(terminal.columns().unwrap(), 80);
        assert_eq!(terminal.rows().unwrap(), 25);

        terminal.console.size = (132, 50);
        assert_eq!(terminal.columns().unwrap(), 132);
        assert_eq!(terminal.rows().unwrap(), 50);
    }

    #[test]
    fn test_end_restores_default_attribute() {
        let mut terminal = terminal(FakeConsole::new());
        terminal.write(b"\x1b[31m").unwrap();
        terminal.end();

        assert_eq!(terminal.console.attribute_sets.last(), Some(&0x07));
        assert_eq!(terminal.console.released, 1);
    }

    #[test]
    fn test_end_after_failed_begin_is_safe() {
        let mut console = FakeConsole::new();
        console.fail_acquire = true;

        let mut terminal = Terminal::new(console, TerminalSettings::default());
        assert!(terminal.begin().is_err());
        terminal.end();

        // No attribute restore was attempted against a session that never
        // started.
        assert!(terminal.console.attribute_sets.is_empty());
        assert_eq!(terminal.console.released, 1);
    }

    #[test]
    fn test_reads_never_produce_the_defensive_eot() {
        let mut console = FakeConsole::new();
        for ch in [b'o', b'k'] {
            console
                .events
                .push_back(FakeConsole::key_down(u16::from(ch), 0x4F, 0x18, KeyState::empty()));
        }
        let mut terminal = terminal(console);

        assert_eq!(terminal.read().unwrap(), b'o');
        assert_eq!(terminal.read().unwrap(), b'k');
    }
}
