// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::io::{self, Write};

use crate::{CRLF, SafeLineState, Text, ok, readline_impl::terminal::lock_ignoring_poison};

/// Cloneable object that implements [`Write`] and allows for sending data to the terminal
/// without messing up the entry that a [`crate::Terminal`] is editing.
///
/// # Create a new instance
///
/// A [`SharedWriter`] is obtained by calling [`crate::Terminal::shared_writer`]. Each
/// clone gets its own (empty) buffer, but they all write through the same session.
///
/// # Nothing is output without terminating with a newline, unless you call [`SharedWriter::flush()`]
///
/// Data written to a [`SharedWriter`] is only output when a line feed (`'\n'`) has been
/// written. That way the prompt is always redrawn at the start of a row. The channel is in
/// raw mode, so every bare `\n` is sent as `\r\n`.
///
/// If you want to output data without a newline, you can call [`SharedWriter::flush()`].
#[derive(Debug)]
pub struct SharedWriter {
    /// Holds the data to be written to the terminal.
    pub buffer: Text,

    /// Session to inject the output into.
    pub safe_line_state: SafeLineState,
}

impl SharedWriter {
    pub fn new(safe_line_state: SafeLineState) -> Self {
        Self {
            buffer: Text::new(),
            safe_line_state,
        }
    }

    fn send_buffer(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return ok!();
        }
        let payload = to_crlf(&self.buffer);
        lock_ignoring_poison(&self.safe_line_state).write_interleaved(&payload)?;
        self.buffer.clear();
        ok!()
    }
}

/// Each clone gets its own buffer, and shares the session.
impl Clone for SharedWriter {
    fn clone(&self) -> Self { Self::new(self.safe_line_state.clone()) }
}

impl Write for SharedWriter {
    fn write(&mut self, payload: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(payload);
        if self.buffer.ends_with(b"\n") {
            self.send_buffer()?;
        }
        Ok(payload.len())
    }

    fn flush(&mut self) -> io::Result<()> { self.send_buffer() }
}

/// Expand every `\n` that isn't already preceded by `\r` into `\r\n`.
fn to_crlf(bytes: &[u8]) -> Text {
    let mut it = Text::with_capacity(bytes.len() + 8);
    let mut previous = None;
    for &byte in bytes {
        if byte == b'\n' && previous != Some(b'\r') {
            it.extend_from_slice(CRLF);
        } else {
            it.push(byte);
        }
        previous = Some(byte);
    }
    it
}
