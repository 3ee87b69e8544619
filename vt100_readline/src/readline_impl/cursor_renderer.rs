// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Screen arithmetic for the prompt + line block.
//!
//! Everything here works in byte offsets from the first cell of the prompt. The block
//! starts at column 0 of row 0 and wraps at `term_width`, so an offset `n` lands on
//! column `n % term_width` of row `n / term_width`. [`RenderState`] remembers where the
//! terminal's cursor is (as far as this crate knows) and which rows have been drawn on,
//! and turns logical cursor moves into the VT100 single cell moves that get it there.

use super::OutputQueue;
use crate::{CLEAR_LINE_TO_RIGHT, CRLF, CURSOR_BACK, CURSOR_DOWN, CURSOR_FORWARD,
            CURSOR_UP, DEFAULT_TERM_HEIGHT, DEFAULT_TERM_WIDTH};

/// Column (`x`) and row (`y`) relative to the first cell of the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenPosition {
    pub x: usize,
    pub y: usize,
}

impl ScreenPosition {
    /// Where the cell at byte `offset` into the prompt + line block ends up.
    #[must_use]
    pub fn from_offset(offset: usize, term_width: usize) -> Self {
        Self {
            x: offset % term_width,
            y: offset / term_width,
        }
    }
}

/// Number of single cell moves in each direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorMovement {
    pub up: usize,
    pub down: usize,
    pub left: usize,
    pub right: usize,
}

impl CursorMovement {
    #[must_use]
    pub fn between(from: ScreenPosition, to: ScreenPosition) -> Self {
        Self {
            up: from.y.saturating_sub(to.y),
            down: to.y.saturating_sub(from.y),
            left: from.x.saturating_sub(to.x),
            right: to.x.saturating_sub(from.x),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool { *self == Self::default() }

    /// Vertical moves first, then horizontal ones.
    pub fn queue_into(&self, out: &mut OutputQueue) {
        out.push_repeated(CURSOR_UP, self.up);
        out.push_repeated(CURSOR_DOWN, self.down);
        out.push_repeated(CURSOR_BACK, self.left);
        out.push_repeated(CURSOR_FORWARD, self.right);
    }
}

/// Where the cursor is on screen, how far down the current block reaches, and the
/// wrapping geometry.
///
/// Invariant: `term_width > 0` and `cursor.x < term_width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderState {
    pub cursor: ScreenPosition,
    /// Highest row drawn on for the current entry. Rows `0..=max_line` have to be
    /// cleared before the block can be redrawn.
    pub max_line: usize,
    term_width: usize,
    term_height: usize,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            cursor: ScreenPosition::default(),
            max_line: 0,
            term_width: DEFAULT_TERM_WIDTH,
            term_height: DEFAULT_TERM_HEIGHT,
        }
    }
}

impl RenderState {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn term_width(&self) -> usize { self.term_width }

    #[must_use]
    pub fn term_height(&self) -> usize { self.term_height }

    /// Returns `false` and changes nothing when `term_width` is 0.
    pub fn set_size(&mut self, term_width: usize, term_height: usize) -> bool {
        if term_width == 0 {
            return false;
        }
        self.term_width = term_width;
        self.term_height = term_height;
        true
    }

    /// Nothing has been drawn for the current entry.
    #[must_use]
    pub fn is_at_origin(&self) -> bool { self.cursor == ScreenPosition::default() }

    pub fn reset(&mut self) {
        self.cursor = ScreenPosition::default();
        self.max_line = 0;
    }

    /// Queue the moves that take the cursor to logical offset `pos` of the line. Does
    /// nothing when `echo` is off, the line isn't on screen in that case.
    pub fn move_cursor_to_pos(
        &mut self,
        prompt_len: usize,
        pos: usize,
        echo: bool,
        out: &mut OutputQueue,
    ) {
        if !echo {
            return;
        }
        let target = ScreenPosition::from_offset(prompt_len + pos, self.term_width);
        CursorMovement::between(self.cursor, target).queue_into(out);
        self.cursor = target;
    }

    /// Queue `text` at the cursor, a row at a time. When a row fills up exactly the
    /// cursor is taken to the start of the next row with `\r\n`, since terminals park
    /// the cursor on the last column instead of wrapping right away.
    pub fn write_wrapped(&mut self, mut text: &[u8], out: &mut OutputQueue) {
        while !text.is_empty() {
            let remaining_on_row = self.term_width - self.cursor.x;
            let (row, rest) = text.split_at(text.len().min(remaining_on_row));
            out.push(row);
            self.cursor.x += row.len();
            text = rest;

            if self.cursor.x == self.term_width {
                out.push(CRLF);
                self.cursor.x = 0;
                self.cursor.y += 1;
                self.max_line = self.max_line.max(self.cursor.y);
            }
        }
    }

    /// Queue the moves and clears that wipe every row of the block, leaving the cursor
    /// on column 0 of row 0.
    pub fn queue_erase_block(&mut self, out: &mut OutputQueue) {
        let bottom = self.max_line.max(self.cursor.y);
        CursorMovement {
            down: bottom - self.cursor.y,
            left: self.cursor.x,
            ..Default::default()
        }
        .queue_into(out);
        out.push(CLEAR_LINE_TO_RIGHT);
        for _ in 0..bottom {
            out.push(CURSOR_UP);
            out.push(CLEAR_LINE_TO_RIGHT);
        }
        self.reset();
    }

    /// Recompute where the cursor sits after the terminal changed width. `cursor_offset`
    /// is where the cursor is in the block, `drawn_len` how much of the block is drawn.
    pub fn reflow(&mut self, cursor_offset: usize, drawn_len: usize) {
        self.cursor = ScreenPosition::from_offset(cursor_offset, self.term_width);
        self.max_line = (drawn_len / self.term_width).max(self.cursor.y);
    }
}
