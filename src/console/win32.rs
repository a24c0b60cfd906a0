//! Live Windows console backend.
//!
//! Thin safe wrapper over the Win32 console API. Each call maps directly to
//! one API function; failures are surfaced as [`ConsoleError`] values and
//! never retried here.

use std::io;

use windows::Win32::Foundation::HANDLE;
use windows::Win32::System::Console::{
    GetConsoleMode, GetConsoleScreenBufferInfo, GetStdHandle, ReadConsoleInputW, SetConsoleCursorPosition,
    SetConsoleMode, SetConsoleTextAttribute, WriteConsoleW, CONSOLE_CHARACTER_ATTRIBUTES,
    CONSOLE_MODE, CONSOLE_SCREEN_BUFFER_INFO, COORD, ENABLE_WINDOW_INPUT, INPUT_RECORD,
    STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};

use super::{
    Console, ConsoleError, ConsoleEvent, KeyEvent, KeyState, Result, ScreenInfo,
};

/// `INPUT_RECORD.EventType` value for keyboard records.
const KEY_EVENT_TYPE: u16 = 0x0001;

fn os_error(error: windows::core::Error) -> io::Error {
    io::Error::from_raw_os_error(error.code().0)
}

/// Console backed by the process's standard handles.
pub struct Win32Console {
    stdin: HANDLE,
    stdout: HANDLE,
    saved_input_mode: Option<CONSOLE_MODE>,
    saved_output_mode: Option<CONSOLE_MODE>,
}

// Safety: the console handles are process-global pseudo-handles.
unsafe impl Send for Win32Console {}

impl Win32Console {
    pub fn new() -> Result<Self> {
        let stdin = unsafe { GetStdHandle(STD_INPUT_HANDLE) }
            .map_err(|_| ConsoleError::InvalidHandle)?;
        let stdout = unsafe { GetStdHandle(STD_OUTPUT_HANDLE) }
            .map_err(|_| ConsoleError::InvalidHandle)?;

        Ok(Self {
            stdin,
            stdout,
            saved_input_mode: None,
            saved_output_mode: None,
        })
    }
}

impl Console for Win32Console {
    fn acquire(&mut self) -> Result<()> {
        let mut input_mode = CONSOLE_MODE::default();
        unsafe { GetConsoleMode(self.stdin, &mut input_mode) }
            .map_err(|e| ConsoleError::Mode(os_error(e)))?;
        self.saved_input_mode = Some(input_mode);

        let mut output_mode = CONSOLE_MODE::default();
        unsafe { GetConsoleMode(self.stdout, &mut output_mode) }
            .map_err(|e| ConsoleError::Mode(os_error(e)))?;
        self.saved_output_mode = Some(output_mode);

        // Clear 'processed input' so key presses such as Ctrl-C and Ctrl-S
        // arrive as key events, and ask for window size records.
        unsafe { SetConsoleMode(self.stdin, ENABLE_WINDOW_INPUT) }
            .map_err(|e| ConsoleError::Mode(os_error(e)))?;

        Ok(())
    }

    fn release(&mut self) {
        if let Some(mode) = self.saved_input_mode.take() {
            let _ = unsafe { SetConsoleMode(self.stdin, mode) };
        }
        if let Some(mode) = self.saved_output_mode.take() {
            let _ = unsafe { SetConsoleMode(self.stdout, mode) };
        }
    }

    fn read_event(&mut self) -> Result<ConsoleEvent> {
        let mut records = [INPUT_RECORD::default(); 1];
        let mut read = 0u32;

        unsafe { ReadConsoleInputW(self.stdin, &mut records, &mut read) }
            .map_err(|e| ConsoleError::Read(os_error(e)))?;

        let record = &records[0];
        if read == 0 || record.EventType != KEY_EVENT_TYPE {
            return Ok(ConsoleEvent::Other);
        }

        let key = unsafe { record.Event.KeyEvent };
        Ok(ConsoleEvent::Key(KeyEvent {
            character: unsafe { key.uChar.UnicodeChar },
            virtual_key: key.wVirtualKeyCode,
            scan_code: key.wVirtualScanCode,
            state: KeyState::from_bits_truncate(key.dwControlKeyState),
            key_down: key.bKeyDown.as_bool(),
        }))
    }

    fn write_wide(&mut self, text: &[u16]) -> Result<()> {
        let mut written = 0u32;
        unsafe { WriteConsoleW(self.stdout, text, Some(&mut written), None) }
            .map_err(|e| ConsoleError::Write(os_error(e)))
    }

    fn screen_info(&self) -> Result<ScreenInfo> {
        let mut csbi = CONSOLE_SCREEN_BUFFER_INFO::default();
        unsafe { GetConsoleScreenBufferInfo(self.stdout, &mut csbi) }
            .map_err(|e| ConsoleError::Query(os_error(e)))?;

        Ok(ScreenInfo {
            columns: csbi.dwSize.X as u16,
            rows: (csbi.srWindow.Bottom - csbi.srWindow.Top + 1) as u16,
            attributes: csbi.wAttributes.0,
            cursor_column: csbi.dwCursorPosition.X,
            cursor_row: csbi.dwCursorPosition.Y,
        })
    }

    fn set_attribute(&mut self, attribute: u8) -> Result<()> {
        unsafe {
            SetConsoleTextAttribute(
                self.stdout,
                CONSOLE_CHARACTER_ATTRIBUTES(u16::from(attribute)),
            )
        }
        .map_err(|e| ConsoleError::Write(os_error(e)))
    }

    fn set_cursor(&mut self, column: i16, row: i16) -> Result<()> {
        unsafe { SetConsoleCursorPosition(self.stdout, COORD { X: column, Y: row }) }
            .map_err(|e| ConsoleError::Write(os_error(e)))
    }
}
