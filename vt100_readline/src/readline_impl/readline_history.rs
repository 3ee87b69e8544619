// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::collections::VecDeque;

use crate::Text;

/// Previously submitted lines, oldest first, plus the Up / Down traversal position.
///
/// The traversal position is always in `[0, len]`, where `len` means "a fresh line past
/// the newest entry". Recall never mutates the entries.
#[derive(Debug, Default)]
pub struct History {
    entries: VecDeque<Text>,
    /// [None] means unbounded.
    max_size: Option<usize>,
    current_position: usize,
}

impl History {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    #[must_use]
    pub fn current_position(&self) -> usize { self.current_position }

    /// Entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.iter().map(Vec::as_slice)
    }

    #[must_use]
    pub fn max_size(&self) -> Option<usize> { self.max_size }

    /// Append a copy of a submitted line and park the traversal position past it.
    pub fn record_submission(&mut self, line: &[u8]) {
        self.entries.push_back(line.to_vec());
        self.evict_over_max_size();
        self.reset_position();
    }

    /// Park the traversal position on the fresh line past the newest entry.
    pub fn reset_position(&mut self) { self.current_position = self.entries.len(); }

    /// Step back to an older entry. Stays on the oldest entry once it gets there.
    /// Returns [None] when there is no history at all.
    pub fn recall_up(&mut self) -> Option<&[u8]> {
        if self.entries.is_empty() {
            return None;
        }
        self.current_position = self
            .current_position
            .min(self.entries.len())
            .saturating_sub(1);
        Some(self.entries[self.current_position].as_slice())
    }

    /// Step forward to a newer entry. Stepping past the newest entry yields the empty
    /// line. Returns [None] when there is no history at all.
    pub fn recall_down(&mut self) -> Option<&[u8]> {
        if self.entries.is_empty() {
            return None;
        }
        self.current_position = (self.current_position + 1).min(self.entries.len());
        match self.entries.get(self.current_position) {
            Some(entry) => Some(entry.as_slice()),
            None => Some(b"".as_slice()),
        }
    }

    /// Replace all entries, eg: with lines loaded from a file by the caller.
    pub fn set_entries(&mut self, entries: impl IntoIterator<Item = Text>) {
        self.entries = entries.into_iter().collect();
        self.evict_over_max_size();
        self.reset_position();
    }

    pub fn set_max_size(&mut self, max_size: Option<usize>) {
        self.max_size = max_size;
        self.evict_over_max_size();
        self.current_position = self.current_position.min(self.entries.len());
    }

    fn evict_over_max_size(&mut self) {
        if let Some(max_size) = self.max_size {
            while self.entries.len() > max_size {
                self.entries.pop_front();
            }
        }
    }
}
