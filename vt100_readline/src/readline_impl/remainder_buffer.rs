// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::REMAINDER_CAPACITY;

/// Raw input bytes that have been read but not yet decoded into keys, usually the start
/// of an escape sequence whose tail is still in flight. Never holds more than
/// [`REMAINDER_CAPACITY`] bytes, and reads are sized with [`Self::spare_capacity`] so it
/// doesn't have to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemainderBuffer {
    bytes: [u8; REMAINDER_CAPACITY],
    len: usize,
}

impl Default for RemainderBuffer {
    fn default() -> Self {
        Self {
            bytes: [0; REMAINDER_CAPACITY],
            len: 0,
        }
    }
}

impl RemainderBuffer {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] { &self.bytes[..self.len] }

    #[must_use]
    pub fn len(&self) -> usize { self.len }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len == 0 }

    #[must_use]
    pub fn is_full(&self) -> bool { self.len == REMAINDER_CAPACITY }

    /// How many more bytes fit.
    #[must_use]
    pub fn spare_capacity(&self) -> usize { REMAINDER_CAPACITY - self.len }

    /// Append as much of `bytes` as fits, returning how many bytes were taken.
    pub fn extend(&mut self, bytes: &[u8]) -> usize {
        let count = bytes.len().min(self.spare_capacity());
        self.bytes[self.len..self.len + count].copy_from_slice(&bytes[..count]);
        self.len += count;
        count
    }

    /// Keep only `bytes` (eg: whatever the decoder couldn't use yet).
    pub fn replace_with(&mut self, bytes: &[u8]) {
        self.clear();
        self.extend(bytes);
    }

    pub fn clear(&mut self) { self.len = 0; }
}
