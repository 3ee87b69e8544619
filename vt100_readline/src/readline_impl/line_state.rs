// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt,
          io::{self, Write},
          sync::Arc};

use super::{EditableLine, History, OutputQueue, RemainderBuffer, RenderState};
use crate::{BREAK_LITERAL, CRLF, EOF_LITERAL, ERASE_UNDER_CURSOR, KEY_BACKSPACE,
            KEY_CTRL_C, KEY_CTRL_D, KEY_ENTER, Key, MAX_LINE_LENGTH, ReadlineEvent,
            SendRawTerminal, Text, ok};

/// Caller supplied hook that gets a look at every key the editor doesn't handle itself.
/// It receives the current line, the cursor offset, and the key. Returning [Some]
/// replaces the line; [None] lets the key through to normal insertion.
///
/// It runs without the session lock held, so it may call [`crate::Terminal::write`].
pub type AutocompleteCallback =
    Arc<dyn Fn(&[u8], usize, Key) -> Option<Completion> + Send + Sync>;

/// Replacement line and cursor offset produced by an [`AutocompleteCallback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub line: Text,
    pub pos: usize,
}

/// Snapshot taken when the editor hands a key to the autocomplete hook. The line and
/// cursor are compared against the session again before the result is applied.
pub struct AutocompleteRequest {
    pub callback: AutocompleteCallback,
    pub line: Text,
    pub pos: usize,
    pub key: Key,
}

impl AutocompleteRequest {
    #[must_use]
    pub fn invoke(&self) -> Option<Completion> { (self.callback)(&self.line, self.pos, self.key) }
}

impl fmt::Debug for AutocompleteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutocompleteRequest")
            .field("line", &String::from_utf8_lossy(&self.line))
            .field("pos", &self.pos)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// What the read loop has to do after a key was handled.
#[derive(Debug)]
pub enum KeyControlFlow {
    /// Keep decoding.
    Continue,
    /// The entry is finished.
    Submit(ReadlineEvent),
    /// Release the lock, call the hook, relock, then
    /// [`LineState::apply_completion`].
    CallAutocomplete(AutocompleteRequest),
}

/// All mutable session state, guarded by one lock in [`crate::Terminal`].
///
/// Key handlers only ever queue bytes in [`Self::out`]. The device is touched by
/// [`Self::flush`] and the output injection methods, which always leave the queue empty.
pub struct LineState {
    pub line: EditableLine,
    pub history: History,
    pub render: RenderState,
    pub out: OutputQueue,
    pub remainder: RemainderBuffer,
    pub prompt: String,
    /// Local echo. Off while reading a password.
    pub echo: bool,
    pub autocomplete: Option<AutocompleteCallback>,
    pub output_device: Box<SendRawTerminal>,
}

impl fmt::Debug for LineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineState")
            .field("line", &self.line)
            .field("history_len", &self.history.len())
            .field("render", &self.render)
            .field("remainder", &self.remainder.as_slice())
            .field("prompt", &self.prompt)
            .field("echo", &self.echo)
            .field("autocomplete", &self.autocomplete.is_some())
            .finish_non_exhaustive()
    }
}

impl LineState {
    pub fn new(prompt: String, echo: bool, output_device: Box<SendRawTerminal>) -> Self {
        Self {
            line: EditableLine::new(),
            history: History::new(),
            render: RenderState::new(),
            out: OutputQueue::new(),
            remainder: RemainderBuffer::new(),
            prompt,
            echo,
            autocomplete: None,
            output_device,
        }
    }

    pub fn handle_key(&mut self, key: Key) -> KeyControlFlow {
        match key {
            Key::Byte(KEY_BACKSPACE) => self.handle_backspace(),
            Key::Byte(KEY_ENTER) => return KeyControlFlow::Submit(self.submit_line()),
            Key::Byte(KEY_CTRL_C) => return KeyControlFlow::Submit(self.submit_break()),
            Key::Byte(KEY_CTRL_D) => {
                if self.line.is_empty() {
                    return KeyControlFlow::Submit(self.submit_end_of_input());
                }
            }
            Key::Left => {
                if self.line.move_left() {
                    self.move_cursor_to(self.line.pos());
                }
            }
            Key::Right => {
                if self.line.move_right() {
                    self.move_cursor_to(self.line.pos());
                }
            }
            Key::AltLeft => {
                if self.line.word_left() {
                    self.move_cursor_to(self.line.pos());
                }
            }
            Key::AltRight => {
                if self.line.word_right() {
                    self.move_cursor_to(self.line.pos());
                }
            }
            Key::Up => {
                if let Some(entry) = self.history.recall_up() {
                    let entry = entry.to_vec();
                    let pos = entry.len();
                    self.replace_line(entry, pos);
                }
            }
            Key::Down => {
                if let Some(entry) = self.history.recall_down() {
                    let entry = entry.to_vec();
                    let pos = entry.len();
                    self.replace_line(entry, pos);
                }
            }
            Key::Byte(_) | Key::Unknown => return self.handle_other_key(key),
        }
        KeyControlFlow::Continue
    }

    /// Apply what the autocomplete hook returned for `request`. If the line moved on
    /// while the lock was released the completion is stale and gets dropped.
    pub fn apply_completion(
        &mut self,
        request: &AutocompleteRequest,
        completion: Option<Completion>,
    ) {
        let unchanged = self.line.as_bytes() == request.line.as_slice()
            && self.line.pos() == request.pos;
        match completion {
            Some(Completion { line, pos }) if unchanged => self.replace_line(line, pos),
            Some(_) => {
                tracing::warn!(
                    message = "line changed while autocomplete ran, completion dropped",
                    key = ?request.key
                );
                self.insert_key(request.key);
            }
            None => self.insert_key(request.key),
        }
    }

    fn handle_other_key(&mut self, key: Key) -> KeyControlFlow {
        if let Some(callback) = &self.autocomplete {
            return KeyControlFlow::CallAutocomplete(AutocompleteRequest {
                callback: Arc::clone(callback),
                line: self.line.as_bytes().to_vec(),
                pos: self.line.pos(),
                key,
            });
        }
        self.insert_key(key);
        KeyControlFlow::Continue
    }

    fn insert_key(&mut self, key: Key) {
        match key {
            Key::Byte(byte) if key.is_printable() => {
                if self.line.insert(byte) {
                    self.echo_from(self.line.pos() - 1);
                }
            }
            _ => tracing::trace!(message = "key ignored", key = ?key),
        }
    }

    fn handle_backspace(&mut self) {
        if !self.line.delete_before() {
            return;
        }
        self.move_cursor_to(self.line.pos());
        if self.echo {
            self.render.write_wrapped(self.line.tail(), &mut self.out);
            self.out.push(ERASE_UNDER_CURSOR);
        }
        self.move_cursor_to(self.line.pos());
    }

    fn submit_line(&mut self) -> ReadlineEvent {
        self.move_cursor_to(self.line.len());
        self.out.push(CRLF);
        let line = self.line.take();
        self.finish_entry();
        tracing::debug!(message = "line submitted", len = line.len());
        ReadlineEvent::Line(line)
    }

    fn submit_end_of_input(&mut self) -> ReadlineEvent {
        self.insert_literal(EOF_LITERAL);
        self.out.push(CRLF);
        self.line.clear();
        self.finish_entry();
        tracing::debug!(message = "end of input");
        ReadlineEvent::Eof
    }

    fn submit_break(&mut self) -> ReadlineEvent {
        self.line.move_to_end();
        self.move_cursor_to(self.line.pos());
        self.insert_literal(BREAK_LITERAL);
        self.out.push(CRLF);
        self.line.clear();
        self.finish_entry();
        tracing::debug!(message = "break");
        ReadlineEvent::Interrupted(BREAK_LITERAL.to_vec())
    }

    /// Throw away the entry in progress: the typed bytes, undecoded input and pending
    /// output. If anything was drawn, a CRLF is queued so the next prompt starts on a
    /// fresh row.
    pub fn discard_entry(&mut self) {
        self.line.clear();
        self.remainder.clear();
        self.out.clear();
        if !self.render.is_at_origin() {
            self.out.push(CRLF);
        }
        self.finish_entry();
        tracing::debug!(message = "entry discarded");
    }

    fn finish_entry(&mut self) {
        self.render.reset();
        self.history.reset_position();
    }

    fn insert_literal(&mut self, literal: &[u8]) {
        let start = self.line.pos();
        if self.line.insert_literal(literal) > 0 {
            self.echo_from(start);
        }
    }

    /// Redraw the line from offset `start` to its end, then put the cursor back on the
    /// logical position.
    fn echo_from(&mut self, start: usize) {
        if self.echo {
            self.render
                .write_wrapped(&self.line.as_bytes()[start..], &mut self.out);
        }
        self.move_cursor_to(self.line.pos());
    }

    fn move_cursor_to(&mut self, pos: usize) {
        self.render
            .move_cursor_to_pos(self.prompt.len(), pos, self.echo, &mut self.out);
    }

    /// Overwrite the on-screen line with `new_line`, padding with spaces over whatever
    /// is left of the old one.
    fn replace_line(&mut self, mut new_line: Text, new_pos: usize) {
        new_line.truncate(MAX_LINE_LENGTH);
        let new_pos = new_pos.min(new_line.len());
        if self.echo {
            self.move_cursor_to(0);
            self.render.write_wrapped(&new_line, &mut self.out);
            let excess = self.line.len().saturating_sub(new_line.len());
            if excess > 0 {
                self.render.write_wrapped(&vec![b' '; excess], &mut self.out);
            }
            self.move_cursor_to(new_pos);
        }
        self.line.replace(new_line, new_pos);
    }

    fn redraw_prompt_and_line(&mut self) {
        self.render.reset();
        self.render
            .write_wrapped(self.prompt.as_bytes(), &mut self.out);
        if self.echo {
            self.render
                .write_wrapped(self.line.as_bytes(), &mut self.out);
        }
        self.move_cursor_to(self.line.pos());
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush_to(self.output_device.as_mut())
    }

    /// Draw the prompt when nothing is on screen for the current entry yet.
    pub fn draw_prompt_if_at_origin(&mut self) -> io::Result<()> {
        if self.render.is_at_origin() {
            self.render
                .write_wrapped(self.prompt.as_bytes(), &mut self.out);
        }
        self.flush()
    }

    /// Write `buf` to the device without disturbing the entry being edited: the prompt
    /// and line are wiped, `buf` goes out, and they are drawn again below it.
    pub fn write_interleaved(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.render.is_at_origin() {
            self.flush()?;
            self.output_device.write_all(buf)?;
            self.output_device.flush()?;
            return ok!();
        }

        self.render.queue_erase_block(&mut self.out);
        self.flush()?;
        self.output_device.write_all(buf)?;
        self.redraw_prompt_and_line();
        self.flush()
    }

    /// Swap the prompt, redrawing right away if an entry is on screen.
    pub fn set_prompt(&mut self, prompt: String) -> io::Result<()> {
        if self.render.is_at_origin() {
            self.prompt = prompt;
            return ok!();
        }
        self.render.queue_erase_block(&mut self.out);
        self.prompt = prompt;
        self.redraw_prompt_and_line();
        self.flush()
    }

    pub fn set_size(&mut self, term_width: usize, term_height: usize) {
        if !self.render.set_size(term_width, term_height) {
            tracing::warn!(
                message = "terminal width of 0 ignored",
                term_width,
                term_height
            );
            return;
        }
        if !self.render.is_at_origin() {
            let (cursor_offset, drawn_len) = if self.echo {
                (self.line.pos(), self.line.len())
            } else {
                (0, 0)
            };
            self.render.reflow(
                self.prompt.len() + cursor_offset,
                self.prompt.len() + drawn_len,
            );
        }
    }
}
