//! Wide-character output conversion.
//!
//! The console consumes UTF-16; the stream handed to this layer is UTF-8.
//! Conversion runs through a fixed-size stack buffer, looping until the run
//! is consumed, so arbitrarily long runs never allocate proportionally to
//! their length.

use crate::console::{Console, Result};

/// Units per console write.
const CHUNK: usize = 256;

/// Convert `text` to UTF-16 and write it in bounded chunks. Invalid UTF-8
/// degrades to U+FFFD; surrogate pairs are never split across writes.
pub fn write_text<C: Console>(console: &mut C, text: &[u8]) -> Result<()> {
    let text = String::from_utf8_lossy(text);
    let mut wide = [0u16; CHUNK];
    let mut len = 0;

    for ch in text.chars() {
        let mut units = [0u16; 2];
        let units = ch.encode_utf16(&mut units);

        if len + units.len() > CHUNK {
            console.write_wide(&wide[..len])?;
            len = 0;
        }
        wide[len..len + units.len()].copy_from_slice(units);
        len += units.len();
    }

    if len > 0 {
        console.write_wide(&wide[..len])?;
    }
    Ok(())
}
