// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The `vt100_readline` library gives a program that owns a raw, unbuffered, two-way
//! byte channel (a serial line, an SSH channel, a PTY, or `stdin` / `stdout` of a
//! terminal that was already put into raw mode) `readline` like behavior, without a
//! terminal capability database. The peer is assumed to speak VT100 / ANSI.
//!
//! # Why use this crate
//!
//! 1. You don't get line editing for free on a raw channel. Every byte the user types
//!    shows up on your side, unprocessed and un-echoed. Someone has to decode arrow keys,
//!    echo characters, and move the cursor around.
//!
//! 2. When one part of your program is blocked waiting for the user to press Enter, and
//!    another part wants to print something (a log line, a chat message, a progress
//!    report), the output lands in the middle of whatever the user is typing. This crate
//!    erases the prompt and the in-progress line, prints the output, then redraws them,
//!    so the user never loses their place.
//!
//! # Features
//!
//! - Single line editing: insert, Backspace, Left / Right, Alt+Left / Alt+Right word
//!   jumps. Lines longer than the terminal width wrap.
//! - In-memory history: Up / Down recall previously submitted lines.
//! - Password input: [`Terminal::read_password`] turns echo off for one line and never
//!   records the result into history.
//! - Concurrent output: [`Terminal::write`] (or a cloned [`SharedWriter`]) can be called
//!   from any thread while [`Terminal::read_line`] is blocked.
//! - Autocomplete hook: see [`Terminal::set_autocomplete`].
//! - Ctrl-D on an empty line is end-of-input, Ctrl-C is a break signal.
//!
//! # How to use this crate
//!
//! ```no_run
//! use vt100_readline::{ReadlineEvent, Terminal};
//!
//! # fn main() -> Result<(), vt100_readline::ReadlineError> {
//! // The channel must already be in raw mode.
//! let terminal = Terminal::new(std::io::stdin(), std::io::stdout(), "> ", true);
//! terminal.set_size(120, 40);
//! loop {
//!     match terminal.read_line()? {
//!         ReadlineEvent::Line(line) => {
//!             terminal.write(format!("you said {}\r\n", String::from_utf8_lossy(&line)).as_bytes())?;
//!         }
//!         ReadlineEvent::Eof | ReadlineEvent::Interrupted(_) => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # What this crate doesn't do
//!
//! Putting the device into raw mode, discovering the terminal size, persisting history,
//! and Unicode aware cursor math are all left to the caller. Cursor offsets are byte
//! offsets.

// Enforce strict error handling in production library code only.
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach sources.
pub mod ansi;
pub mod decl_macros;
pub mod log;
pub mod readline_impl;
pub mod shared_writer;
pub mod test_fixtures;

// Re-export the public API.
pub use ansi::*;
pub use readline_impl::*;
pub use shared_writer::*;
pub use test_fixtures::*;

// Type aliases.
use std::sync::Arc;

pub type StdMutex<T> = std::sync::Mutex<T>;

/// Bytes of a line. Not required to be valid UTF-8.
pub type Text = Vec<u8>;

pub type SendRawTerminal = dyn std::io::Write + Send;
pub type SendRawInput = dyn std::io::Read + Send;

pub type SafeLineState = Arc<StdMutex<LineState>>;

// Constants.
pub const MAX_LINE_LENGTH: usize = 4096;
pub const REMAINDER_CAPACITY: usize = 256;
pub const DEFAULT_TERM_WIDTH: usize = 80;
pub const DEFAULT_TERM_HEIGHT: usize = 24;
