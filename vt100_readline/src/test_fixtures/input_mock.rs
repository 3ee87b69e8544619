// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{collections::VecDeque,
          io::{self, Read},
          sync::mpsc::{Receiver, Sender, channel}};

use crate::Text;

/// Scripted input half of a raw channel.
///
/// Every chunk is handed out by its own `read` call (split over several calls if the
/// caller's buffer is smaller), which is how bytes trickle in from a real terminal. Once
/// the chunks run out the mock reports end of stream, or the error set with
/// [`Self::then_fail`]. A one-off error between chunks is scripted with
/// [`Self::then_fail_once`] and [`Self::then_chunks`].
///
/// With [`Self::new_channel`] the chunks come from another thread instead, and `read`
/// blocks until one arrives. Dropping every [Sender] ends the stream.
#[derive(Debug, Default)]
pub struct InputMock {
    chunks: VecDeque<Result<Text, io::ErrorKind>>,
    maybe_receiver: Option<Receiver<Text>>,
    maybe_failure: Option<io::ErrorKind>,
}

impl InputMock {
    pub fn from_chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Text>,
    {
        Self::default().then_chunks(chunks)
    }

    /// Queue more chunks after everything scripted so far.
    #[must_use]
    pub fn then_chunks<I, C>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Text>,
    {
        self.chunks
            .extend(chunks.into_iter().map(|chunk| Ok(chunk.into())));
        self
    }

    /// Fail a single `read` with `kind` once the chunks queued so far are used up.
    #[must_use]
    pub fn then_fail_once(mut self, kind: io::ErrorKind) -> Self {
        self.chunks.push_back(Err(kind));
        self
    }

    #[must_use]
    pub fn new_channel() -> (Self, Sender<Text>) {
        let (sender, receiver) = channel();
        let it = Self {
            maybe_receiver: Some(receiver),
            ..Default::default()
        };
        (it, sender)
    }

    /// Fail with `kind` instead of reporting end of stream.
    #[must_use]
    pub fn then_fail(mut self, kind: io::ErrorKind) -> Self {
        self.maybe_failure = Some(kind);
        self
    }

    fn next_chunk(&mut self) -> Option<Result<Text, io::ErrorKind>> {
        if let Some(chunk) = self.chunks.pop_front() {
            return Some(chunk);
        }
        self.maybe_receiver.as_ref()?.recv().ok().map(Ok)
    }
}

impl Read for InputMock {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut chunk = match self.next_chunk() {
            Some(Ok(chunk)) => chunk,
            Some(Err(kind)) => {
                return Err(io::Error::new(kind, "scripted one-off input failure"));
            }
            None => {
                return match self.maybe_failure {
                    Some(kind) => Err(io::Error::new(kind, "scripted input failure")),
                    None => Ok(0),
                };
            }
        };

        let count = chunk.len().min(buf.len());
        buf[..count].copy_from_slice(&chunk[..count]);
        if count < chunk.len() {
            self.chunks.push_front(Ok(chunk.split_off(count)));
        }
        Ok(count)
    }
}
