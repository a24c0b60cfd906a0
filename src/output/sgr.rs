//! SGR parameter translation.
//!
//! Maps Select Graphic Rendition parameter lists onto the console's packed
//! attribute byte: foreground color in bits 0-2, foreground intensity in bit
//! 3, background color in bits 4-6, background intensity in bit 7.

/// ANSI palette index to console color bits. The console packs color as
/// blue/green/red where the standard palette orders red/green/blue, so the
/// three low bits are mirrored.
const SGR_TO_ATTR: [u8; 8] = [0, 4, 2, 6, 1, 5, 3, 7];

/// Apply `params` left-to-right to `current`, returning the resulting
/// attribute. An empty list is a reset. Unrecognized parameters are skipped;
/// the extended color introducers 38 and 48 are accepted but their
/// sub-parameters are not consumed, so those trail through as ordinary
/// ignored values.
pub fn transform(params: &[u16], current: u8, default: u8) -> u8 {
    if params.is_empty() {
        return default;
    }

    let mut attr = current;
    for &param in params {
        match param {
            0 => attr = default,
            1 => attr |= 0x08,
            2 | 22 => attr &= !0x08,
            4 => attr |= 0x80,
            24 => attr &= !0x80,
            30..=37 => attr = (attr & 0xF8) | SGR_TO_ATTR[usize::from(param - 30)],
            90..=97 => attr = (attr & 0xF8) | SGR_TO_ATTR[usize::from(param - 90)] | 0x08,
            39 => attr = (attr & 0xF8) | (default & 0x07),
            40..=47 => attr = (attr & 0x8F) | (SGR_TO_ATTR[usize::from(param - 40)] << 4),
            100..=107 => attr = (attr & 0x8F) | (SGR_TO_ATTR[usize::from(param - 100)] << 4) | 0x80,
            49 => attr = (attr & 0x8F) | (default & 0x70),
            38 | 48 => {}
            _ => {}
        }
    }

    attr
}
