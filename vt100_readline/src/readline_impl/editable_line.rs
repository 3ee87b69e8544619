// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{MAX_LINE_LENGTH, Text};

const WORD_SEPARATOR: u8 = b' ';

/// The bytes of the line being entered, and the logical cursor offset into them.
///
/// Invariant: `0 <= pos <= len <= MAX_LINE_LENGTH`. Operations that would break it are
/// silent no-ops. Nothing here knows about the screen, see [`crate::LineState`] for that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditableLine {
    line: Text,
    pos: usize,
}

impl EditableLine {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.line }

    /// Bytes from the cursor to the end of the line.
    #[must_use]
    pub fn tail(&self) -> &[u8] { &self.line[self.pos..] }

    #[must_use]
    pub fn pos(&self) -> usize { self.pos }

    #[must_use]
    pub fn len(&self) -> usize { self.line.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.line.is_empty() }

    #[must_use]
    pub fn is_full(&self) -> bool { self.line.len() >= MAX_LINE_LENGTH }

    /// Insert `byte` at the cursor and advance past it. Returns `false` (and does
    /// nothing) once the line is full.
    pub fn insert(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.line.insert(self.pos, byte);
        self.pos += 1;
        true
    }

    /// Insert as much of `literal` as fits at the cursor. Returns the number of bytes
    /// inserted.
    pub fn insert_literal(&mut self, literal: &[u8]) -> usize {
        let room = MAX_LINE_LENGTH.saturating_sub(self.line.len());
        let literal = &literal[..literal.len().min(room)];
        let tail = self.line.split_off(self.pos);
        self.line.extend_from_slice(literal);
        self.line.extend_from_slice(&tail);
        self.pos += literal.len();
        literal.len()
    }

    /// Remove the byte before the cursor.
    pub fn delete_before(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.pos -= 1;
        self.line.remove(self.pos);
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.pos -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.pos == self.line.len() {
            return false;
        }
        self.pos += 1;
        true
    }

    pub fn move_to_end(&mut self) { self.pos = self.line.len(); }

    /// Move to the start of the previous space delimited word, skipping the run of
    /// spaces right before the cursor first.
    pub fn word_left(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        let mut pos = self.pos - 1;
        while pos > 0 && self.line[pos] == WORD_SEPARATOR {
            pos -= 1;
        }
        while pos > 0 {
            if self.line[pos] == WORD_SEPARATOR {
                pos += 1;
                break;
            }
            pos -= 1;
        }
        self.pos = pos;
        true
    }

    /// Move to the start of the next space delimited word: past the rest of the current
    /// word, then past the spaces that follow it.
    pub fn word_right(&mut self) -> bool {
        let start = self.pos;
        let len = self.line.len();
        let mut pos = self.pos;
        while pos < len && self.line[pos] != WORD_SEPARATOR {
            pos += 1;
        }
        while pos < len && self.line[pos] == WORD_SEPARATOR {
            pos += 1;
        }
        self.pos = pos;
        pos != start
    }

    /// Swap out the whole line and cursor at once. `new_line` is truncated to
    /// [`MAX_LINE_LENGTH`] and `new_pos` is clamped into it.
    pub fn replace(&mut self, mut new_line: Text, new_pos: usize) {
        new_line.truncate(MAX_LINE_LENGTH);
        self.pos = new_pos.min(new_line.len());
        self.line = new_line;
    }

    /// Hand the line to the caller, leaving an empty line with the cursor at 0.
    pub fn take(&mut self) -> Text {
        self.pos = 0;
        std::mem::take(&mut self.line)
    }

    pub fn clear(&mut self) {
        self.line.clear();
        self.pos = 0;
    }
}
