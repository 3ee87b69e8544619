// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::io::{self, Write};

use crate::{Text, ok};

/// Bytes destined for the output device, accumulated while a key is handled and written
/// in one go afterwards. After [`OutputQueue::flush_to`] returns (successfully or not)
/// the queue is empty.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputQueue {
    pending: Text,
}

impl OutputQueue {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, bytes: &[u8]) { self.pending.extend_from_slice(bytes); }

    pub fn push_byte(&mut self, byte: u8) { self.pending.push(byte); }

    /// Queue `bytes` repeated `count` times.
    pub fn push_repeated(&mut self, bytes: &[u8], count: usize) {
        for _ in 0..count {
            self.pending.extend_from_slice(bytes);
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.pending }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.pending.is_empty() }

    pub fn clear(&mut self) { self.pending.clear(); }

    /// Write everything queued to `device` and flush it. The queue is drained before the
    /// write is attempted, so a failed write drops the bytes instead of replaying them.
    pub fn flush_to(&mut self, device: &mut dyn Write) -> io::Result<()> {
        let bytes = std::mem::take(&mut self.pending);
        if !bytes.is_empty() {
            device.write_all(&bytes)?;
        }
        device.flush()?;
        ok!()
    }
}
