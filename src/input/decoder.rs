//! Key event decoding.
//!
//! Converts native console key records into the byte stream a Readline-style
//! line editor expects: plain characters, control codes, ESC-prefixed Alt
//! chords and `ESC [`/`ESC O` navigation sequences. Decoded bytes land in the
//! [`InputBuffer`](super::InputBuffer); one key event may produce zero, one
//! or several bytes.

use crate::console::{vk, KeyEvent, KeyState};

use super::buffer::InputBuffer;

/// Navigation virtual keys that should carry the enhanced-key flag even when
/// the native record omits it (the numpad variants of PgUp, End, etc. come
/// through without it).
const ENHANCED_KEYS: [u16; 10] = [
    vk::UP,
    vk::DOWN,
    vk::LEFT,
    vk::RIGHT,
    vk::HOME,
    vk::END,
    vk::INSERT,
    vk::DELETE,
    vk::PRIOR,
    vk::NEXT,
];

/// Scan code to output letter for enhanced keys. Columns: scan code, letter
/// without Shift, letter with Shift. Ctrl selects the `ESC O` introducer
/// instead of `ESC [` but keeps the same letter choice.
const NAV_KEYS: [(u16, u8, u8); 10] = [
    (0x48, b'A', b'a'), // up
    (0x50, b'B', b'b'), // down
    (0x4B, b'D', b'd'), // left
    (0x4D, b'C', b'c'), // right
    (0x52, b'2', b'w'), // insert
    (0x53, b'3', b'e'), // delete
    (0x47, b'1', b'q'), // home
    (0x4F, b'4', b'r'), // end
    (0x49, b'5', b't'), // pgup
    (0x51, b'6', b'y'), // pgdn
];

const ESC: u8 = 0x1B;

/// Decodes one key event at a time into buffer pushes.
pub struct KeyDecoder {
    altgr: bool,
}

impl KeyDecoder {
    /// `altgr` enables the Ctrl-Alt substitute for the AltGr key; when off,
    /// Ctrl-Alt chords that carry a character produce nothing.
    pub fn new(altgr: bool) -> Self {
        Self { altgr }
    }

    /// Translate `key` into bytes appended to `buffer`.
    pub fn decode(&self, key: &KeyEvent, buffer: &mut InputBuffer) {
        if !key.key_down {
            // Conhost delivers Alt-numpad entry as the Unicode code point on
            // the Alt key-up record.
            if key.virtual_key == vk::MENU && key.character != 0 {
                push_scalar(buffer, key.character);
            }
            return;
        }

        // Windows offers Ctrl-Alt as a substitute for AltGr, historically for
        // keyboards without the key. It collides with Alt bindings, so it can
        // be turned off; a disabled substitute swallows the chord entirely.
        let altgr_sub = key.state.contains(KeyState::LEFT_ALT)
            && key.state.ctrl()
            && key.character != 0;
        if altgr_sub && !self.altgr {
            return;
        }

        let alt = !altgr_sub && key.state.alt();

        if key.character == 0 {
            self.decode_non_printing(key, buffer);
            return;
        }

        // Shift-Tab maps to the back-tab sequence, but only at the start of a
        // sequence boundary so bytes already queued stay intact.
        if key.character == u16::from(b'\t')
            && buffer.is_empty()
            && key.state.contains(KeyState::SHIFT)
        {
            buffer.push_all(&[ESC, b'[', b'Z']);
            return;
        }

        if alt {
            buffer.push(ESC);
        }
        push_scalar(buffer, key.character);
    }

    /// A key-down that produced no character: navigation keys and the
    /// Ctrl-<key> combinations Windows reports without a character.
    fn decode_non_printing(&self, key: &KeyEvent, buffer: &mut InputBuffer) {
        let mut state = key.state;
        if ENHANCED_KEYS.contains(&key.virtual_key) {
            state |= KeyState::ENHANCED;
        }

        if state.contains(KeyState::ENHANCED) {
            if let Some(&(_, normal, shifted)) =
                NAV_KEYS.iter().find(|entry| entry.0 == key.scan_code)
            {
                let letter = if state.contains(KeyState::SHIFT) {
                    shifted
                } else {
                    normal
                };
                let introducer = if state.ctrl() { b'O' } else { b'[' };
                buffer.push_all(&[ESC, introducer, letter]);
            }
            return;
        }

        if !state.ctrl() {
            return;
        }

        // Ctrl-<key> mapped to the control bytes Readline's emacs/vi keymaps
        // document. Alt held alongside does not add an ESC prefix here.
        if let Some(byte) = ctrl_code(key.virtual_key) {
            buffer.push(byte);
        }
    }
}

/// Readline-compatible control byte for a virtual key pressed with Ctrl.
fn ctrl_code(virtual_key: u16) -> Option<u8> {
    match virtual_key {
        0x41..=0x5A => Some((virtual_key - 0x41 + 0x01) as u8), // Ctrl-A .. Ctrl-Z
        vk::OEM_4..=vk::OEM_6 => Some((virtual_key - vk::OEM_4 + 0x1B) as u8), // [ \ ]
        0x32 => Some(0x00),                                     // Ctrl-2 -> NUL
        0x36 => Some(0x1E),                                     // Ctrl-6 -> RS
        vk::OEM_MINUS => Some(0x1F),                            // Ctrl-- -> US
        _ => None,
    }
}

/// Queue one UTF-16 unit, re-encoded to UTF-8 when outside the 7-bit range.
/// The multi-byte form is pushed atomically. Unpaired surrogates degrade to
/// U+FFFD.
fn push_scalar(buffer: &mut InputBuffer, unit: u16) {
    if unit < 0x80 {
        buffer.push(unit as u8);
        return;
    }

    let ch = char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER);
    let mut utf8 = [0u8; 4];
    buffer.push_all(ch.encode_utf8(&mut utf8).as_bytes());
}
