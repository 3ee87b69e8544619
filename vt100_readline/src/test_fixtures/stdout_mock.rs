// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{io::{Result, Write},
          sync::Arc};

use strip_ansi_escapes::strip;

use crate::{StdMutex, Text, ok, readline_impl::terminal::lock_ignoring_poison};

/// You can safely clone this struct, since it only contains an `Arc<StdMutex<Text>>`.
/// The inner `buffer` will not be cloned, just the [Arc] will be cloned.
#[derive(Clone, Debug, Default)]
pub struct StdoutMock {
    pub buffer: Arc<StdMutex<Text>>,
}

impl StdoutMock {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn get_copy_of_buffer(&self) -> Text { lock_ignoring_poison(&self.buffer).clone() }

    /// Lossy, the channel carries bytes.
    #[must_use]
    pub fn get_copy_of_buffer_as_string(&self) -> String {
        String::from_utf8_lossy(&lock_ignoring_poison(&self.buffer)).into_owned()
    }

    #[must_use]
    pub fn get_copy_of_buffer_as_string_strip_ansi(&self) -> String {
        let stripped = strip(lock_ignoring_poison(&self.buffer).as_slice());
        String::from_utf8_lossy(&stripped).into_owned()
    }

    pub fn clear(&self) { lock_ignoring_poison(&self.buffer).clear(); }
}

impl Write for StdoutMock {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        lock_ignoring_poison(&self.buffer).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> { ok!() }
}
