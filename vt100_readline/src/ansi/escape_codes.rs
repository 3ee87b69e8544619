// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::KEY_ESCAPE;

/// Escape sequences that can be written to the terminal to style text.
///
/// There is exactly one table per terminal flavor, built at compile time and shared
/// (read only) by every [`crate::Terminal`] session, so no synchronization is needed to
/// use it. Callers get it from [`crate::Terminal::escape_codes`] and splice the bytes
/// into text they pass to [`crate::Terminal::write`].
#[derive(Debug, PartialEq, Eq)]
pub struct EscapeCodes {
    // Foreground colors.
    pub black: &'static [u8],
    pub red: &'static [u8],
    pub green: &'static [u8],
    pub yellow: &'static [u8],
    pub blue: &'static [u8],
    pub magenta: &'static [u8],
    pub cyan: &'static [u8],
    pub white: &'static [u8],

    /// Reset all attributes.
    pub reset: &'static [u8],
}

/// SGR sequences for a VT100 compatible peer.
pub static VT100_ESCAPE_CODES: EscapeCodes = EscapeCodes {
    black: &[KEY_ESCAPE, b'[', b'3', b'0', b'm'],
    red: &[KEY_ESCAPE, b'[', b'3', b'1', b'm'],
    green: &[KEY_ESCAPE, b'[', b'3', b'2', b'm'],
    yellow: &[KEY_ESCAPE, b'[', b'3', b'3', b'm'],
    blue: &[KEY_ESCAPE, b'[', b'3', b'4', b'm'],
    magenta: &[KEY_ESCAPE, b'[', b'3', b'5', b'm'],
    cyan: &[KEY_ESCAPE, b'[', b'3', b'6', b'm'],
    white: &[KEY_ESCAPE, b'[', b'3', b'7', b'm'],

    reset: &[KEY_ESCAPE, b'[', b'0', b'm'],
};

impl EscapeCodes {
    /// Wrap `text` in `color` and a trailing reset.
    #[must_use]
    pub fn paint(&self, color: &[u8], text: &[u8]) -> Vec<u8> {
        let mut acc = Vec::with_capacity(color.len() + text.len() + self.reset.len());
        acc.extend_from_slice(color);
        acc.extend_from_slice(text);
        acc.extend_from_slice(self.reset);
        acc
    }
}
