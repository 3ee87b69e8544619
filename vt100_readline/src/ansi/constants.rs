// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Byte constants for the fixed VT100 subset this crate speaks.
//!
//! # Input (keys)
//!
//! - Single bytes are keys in their own right: Enter (`\r`), Backspace (`0x7F`),
//!   Ctrl-C (`0x03`), Ctrl-D (`0x04`), and every printable ASCII byte.
//! - Arrow keys: `ESC [ A|B|C|D`.
//! - Alt+Arrow: `ESC [ 1 ; 3 C|D`.
//!
//! # Output (cursor control)
//!
//! - `ESC [ A|B|C|D` moves the cursor one cell up / down / right / left.
//! - `ESC [ K` erases from the cursor to the end of the row.

// ==================== Key bytes ====================

/// Ctrl-C, end of text. Produces the break signal.
pub const KEY_CTRL_C: u8 = 3;

/// Ctrl-D, end of transmission. Produces end-of-input on an empty line.
pub const KEY_CTRL_D: u8 = 4;

/// Enter, as delivered by a terminal in raw mode.
pub const KEY_ENTER: u8 = b'\r';

/// ESC byte (27 in decimal, 0x1B in hex). Lead byte of every escape sequence.
pub const KEY_ESCAPE: u8 = 0x1B;

/// Backspace as delivered by VT100 compatible terminals (DEL).
pub const KEY_BACKSPACE: u8 = 0x7F;

/// First printable ASCII byte (space).
pub const PRINTABLE_START: u8 = 32;

/// One past the last printable ASCII byte.
pub const PRINTABLE_END: u8 = 127;

// ==================== CSI components ====================

/// CSI bracket byte: `[` (91 in decimal, 0x5B in hex).
pub const CSI_BRACKET: u8 = b'[';

/// CSI A: Up arrow key final byte, and cursor up on output.
pub const ARROW_UP_FINAL: u8 = b'A';

/// CSI B: Down arrow key final byte, and cursor down on output.
pub const ARROW_DOWN_FINAL: u8 = b'B';

/// CSI C: Right arrow key final byte, and cursor forward on output.
pub const ARROW_RIGHT_FINAL: u8 = b'C';

/// CSI D: Left arrow key final byte, and cursor back on output.
pub const ARROW_LEFT_FINAL: u8 = b'D';

/// Parameter bytes between `CSI` and the final byte of an Alt+Arrow sequence.
pub const ALT_ARROW_PARAMS: &[u8] = b"1;3";

// ==================== Output sequences ====================

pub const CURSOR_UP: &[u8] = &[KEY_ESCAPE, CSI_BRACKET, ARROW_UP_FINAL];
pub const CURSOR_DOWN: &[u8] = &[KEY_ESCAPE, CSI_BRACKET, ARROW_DOWN_FINAL];
pub const CURSOR_FORWARD: &[u8] = &[KEY_ESCAPE, CSI_BRACKET, ARROW_RIGHT_FINAL];
pub const CURSOR_BACK: &[u8] = &[KEY_ESCAPE, CSI_BRACKET, ARROW_LEFT_FINAL];

/// EL 0: erase from the cursor to the end of the row.
pub const CLEAR_LINE_TO_RIGHT: &[u8] = &[KEY_ESCAPE, CSI_BRACKET, b'K'];

/// Overwrite the cell under the cursor with a space, then step back onto it.
pub const ERASE_UNDER_CURSOR: &[u8] = &[b' ', KEY_ESCAPE, CSI_BRACKET, ARROW_LEFT_FINAL];

/// Carriage return + line feed, emitted when a line is submitted.
pub const CRLF: &[u8] = b"\r\n";

// ==================== Literal insertions ====================

/// Echoed when Ctrl-D is pressed on an empty line.
pub const EOF_LITERAL: &[u8] = b"exit";

/// Echoed and returned as the text of the break signal.
pub const BREAK_LITERAL: &[u8] = b"^C";
