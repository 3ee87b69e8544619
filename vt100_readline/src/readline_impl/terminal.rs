// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt,
          io::{self, Read, Write},
          sync::{Arc, MutexGuard, PoisonError}};

use smallvec::SmallVec;
use thiserror::Error;

use super::{Completion, KeyControlFlow, LineState};
use crate::{EscapeCodes, Key, REMAINDER_CAPACITY, SafeLineState, SendRawInput,
            SharedWriter, StdMutex, Text, VT100_ESCAPE_CODES, decode_key, ok};

/// Error returned from [`Terminal::read_line`] and friends.
#[derive(Debug, Error)]
pub enum ReadlineError {
    /// Reading from or writing to the channel failed.
    #[error(transparent)]
    IO(#[from] io::Error),
}

/// How a call to [`Terminal::read_line`] or [`Terminal::read_password`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadlineEvent {
    /// The user pressed Enter.
    Line(Text),

    /// The user pressed Ctrl-D on an empty line, or the channel reached end of stream.
    Eof,

    /// The user pressed Ctrl-C. Always carries the literal text `^C`.
    Interrupted(Text),
}

impl ReadlineEvent {
    /// Text that goes with the event. Empty for [`ReadlineEvent::Eof`].
    #[must_use]
    pub fn text(&self) -> &[u8] {
        match self {
            ReadlineEvent::Line(text) | ReadlineEvent::Interrupted(text) => text,
            ReadlineEvent::Eof => &[],
        }
    }
}

/// Lock a session mutex. Session state is plain data that every handler leaves
/// consistent, so a panic on another thread doesn't make it unusable.
pub(crate) fn lock_ignoring_poison<T: ?Sized>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A line editor session on top of a raw duplex byte channel.
///
/// One instance per channel. Wrap it in an [Arc] to share it: [`Self::read_line`] is
/// meant to be called from one flow, while [`Self::write`] (or a [`SharedWriter`] from
/// [`Self::shared_writer`]) and the setters can be called from any number of others.
///
/// # Locking
///
/// There are two locks:
/// 1. `input` is held for the whole of a [`Self::read_line`] /
///    [`Self::read_password`] call, so only one read is ever in flight.
/// 2. [`Self::safe_line_state`] guards everything else. The read loop releases it while
///    it is blocked on the channel and while the autocomplete hook runs, which is what
///    lets output be injected mid edit.
///
/// `input` is always taken before the line state, never the other way around.
pub struct Terminal {
    input: StdMutex<Box<SendRawInput>>,
    pub safe_line_state: SafeLineState,
}

impl fmt::Debug for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terminal")
            .field("safe_line_state", &self.safe_line_state)
            .finish_non_exhaustive()
    }
}

impl Terminal {
    /// The channel has to be in raw mode already. `prompt` is drawn at the start of
    /// every entry. With `echo` off typed bytes aren't shown (see also
    /// [`Self::read_password`]).
    pub fn new(
        input: impl Read + Send + 'static,
        output: impl Write + Send + 'static,
        prompt: impl Into<String>,
        echo: bool,
    ) -> Self {
        Self {
            input: StdMutex::new(Box::new(input)),
            safe_line_state: Arc::new(StdMutex::new(LineState::new(
                prompt.into(),
                echo,
                Box::new(output),
            ))),
        }
    }

    fn lock_line_state(&self) -> MutexGuard<'_, LineState> {
        lock_ignoring_poison(&self.safe_line_state)
    }

    /// Block until the user submits a line, presses Ctrl-D on an empty line, presses
    /// Ctrl-C, or the channel ends or fails. Submitted lines are recorded into history
    /// while echo is on.
    pub fn read_line(&self) -> Result<ReadlineEvent, ReadlineError> {
        let mut input = lock_ignoring_poison(&self.input);
        self.read_line_with(input.as_mut())
    }

    /// Like [`Self::read_line`], with `prompt` and echo off for this one entry. Nothing
    /// typed is shown and the result is not recorded into history. The previous prompt
    /// and echo setting are restored afterwards, even when the read fails. An entry that
    /// is cut short (read error, end of stream) is discarded so none of it leaks into
    /// the next [`Self::read_line`].
    pub fn read_password(
        &self,
        prompt: impl Into<String>,
    ) -> Result<ReadlineEvent, ReadlineError> {
        let mut input = lock_ignoring_poison(&self.input);

        let (saved_prompt, saved_echo) = {
            let mut state = self.lock_line_state();
            (
                std::mem::replace(&mut state.prompt, prompt.into()),
                std::mem::replace(&mut state.echo, false),
            )
        };

        let result = self.read_line_with(input.as_mut());

        let mut state = self.lock_line_state();
        if result.is_err() || !state.line.is_empty() {
            state.discard_entry();
        }
        state.prompt = saved_prompt;
        state.echo = saved_echo;

        result
    }

    fn read_line_with(
        &self,
        input: &mut SendRawInput,
    ) -> Result<ReadlineEvent, ReadlineError> {
        let mut state = self.lock_line_state();
        state.draw_prompt_if_at_origin()?;

        loop {
            let pending: SmallVec<[u8; REMAINDER_CAPACITY]> =
                SmallVec::from_slice(state.remainder.as_slice());
            let mut rest = pending.as_slice();
            let mut maybe_submitted = None;

            while maybe_submitted.is_none() {
                let (Some(key), after) = decode_key(rest) else {
                    break;
                };
                rest = after;

                let control_flow = state.handle_key(key);
                match control_flow {
                    KeyControlFlow::Continue => {}
                    KeyControlFlow::Submit(event) => maybe_submitted = Some(event),
                    KeyControlFlow::CallAutocomplete(request) => {
                        state.remainder.replace_with(rest);
                        state.flush()?;
                        drop(state);
                        let completion = request.invoke();
                        state = self.lock_line_state();
                        state.apply_completion(&request, completion);
                    }
                }
            }

            if let Some(ReadlineEvent::Interrupted(_)) = maybe_submitted {
                state.remainder.clear();
            } else {
                state.remainder.replace_with(rest);
            }

            // The entry is already taken off the line, so an output failure past this
            // point must not lose it.
            if let Some(event) = maybe_submitted {
                if let ReadlineEvent::Line(line) = &event
                    && state.echo
                {
                    state.history.record_submission(line);
                }
                if let Err(error) = state.flush() {
                    tracing::warn!(message = "output failed after submission", ?error);
                }
                return Ok(event);
            }
            state.flush()?;

            if state.remainder.is_full() {
                tracing::warn!(
                    message = "discarding input that never formed a key",
                    len = state.remainder.len()
                );
                state.remainder.clear();
            }

            let spare_capacity = state.remainder.spare_capacity();
            drop(state);
            let mut read_buf = [0u8; REMAINDER_CAPACITY];
            let bytes_read = read_retrying_interrupted(input, &mut read_buf[..spare_capacity])?;
            state = self.lock_line_state();

            if bytes_read == 0 {
                tracing::debug!(message = "input channel reached end of stream");
                return Ok(ReadlineEvent::Eof);
            }
            tracing::trace!(message = "read input", bytes_read);
            state.remainder.extend(&read_buf[..bytes_read]);
        }
    }

    /// Write `buf` to the channel without clobbering the entry being edited. Safe to
    /// call while another thread is blocked in [`Self::read_line`]. `buf` should end
    /// with `\r\n`, otherwise the redrawn prompt lands on the same row as its tail.
    pub fn write(&self, buf: &[u8]) -> Result<usize, ReadlineError> {
        self.lock_line_state().write_interleaved(buf)?;
        ok!(buf.len())
    }

    /// A cloneable [Write] handle that injects output through [`Self::write`].
    #[must_use]
    pub fn shared_writer(&self) -> SharedWriter {
        SharedWriter::new(Arc::clone(&self.safe_line_state))
    }

    /// Change the prompt. If an entry is on screen it is redrawn with the new prompt.
    pub fn set_prompt(&self, prompt: impl Into<String>) -> Result<(), ReadlineError> {
        self.lock_line_state().set_prompt(prompt.into())?;
        ok!()
    }

    /// Set the wrapping geometry. A `width` of 0 is ignored.
    pub fn set_size(&self, width: usize, height: usize) {
        self.lock_line_state().set_size(width, height);
    }

    pub fn set_echo(&self, echo: bool) { self.lock_line_state().echo = echo; }

    /// Install the hook that sees every key the editor doesn't handle itself. See
    /// [`crate::AutocompleteCallback`]. Calling [`Self::read_line`] from inside the hook
    /// deadlocks.
    pub fn set_autocomplete(
        &self,
        callback: impl Fn(&[u8], usize, Key) -> Option<Completion> + Send + Sync + 'static,
    ) {
        self.lock_line_state().autocomplete = Some(Arc::new(callback));
    }

    pub fn clear_autocomplete(&self) { self.lock_line_state().autocomplete = None; }

    /// Cap the number of history entries, evicting the oldest first. [None] (the
    /// default) keeps every entry.
    pub fn set_max_history(&self, max_size: Option<usize>) {
        self.lock_line_state().history.set_max_size(max_size);
    }

    /// Replace the history, eg: with entries the caller persisted earlier.
    pub fn set_history(&self, entries: Vec<Text>) {
        self.lock_line_state().history.set_entries(entries);
    }

    /// Copy of the history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Text> {
        self.lock_line_state()
            .history
            .entries()
            .map(<[u8]>::to_vec)
            .collect()
    }

    #[must_use]
    pub fn escape_codes(&self) -> &'static EscapeCodes { &VT100_ESCAPE_CODES }
}

fn read_retrying_interrupted(input: &mut SendRawInput, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match input.read(buf) {
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{CLEAR_LINE_TO_RIGHT, CURSOR_BACK, CURSOR_FORWARD, InputMock, StdoutMock};
    use pretty_assertions::assert_eq;

    fn new_terminal(input: InputMock, prompt: &str) -> (Terminal, StdoutMock) {
        let stdout_mock = StdoutMock::new();
        let terminal = Terminal::new(input, stdout_mock.clone(), prompt, true);
        (terminal, stdout_mock)
    }

    #[test]
    fn test_hello_enter_is_recorded_in_history() {
        let (terminal, stdout_mock) =
            new_terminal(InputMock::from_chunks(["hello\r"]), "> ");
        terminal.set_size(80, 24);

        let event = terminal.read_line().unwrap();
        assert_eq!(event, ReadlineEvent::Line(b"hello".to_vec()));
        assert_eq!(event.text(), b"hello");
        assert_eq!(terminal.history(), vec![b"hello".to_vec()]);
        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "> hello\r\n");
    }

    #[test]
    fn test_up_with_empty_history_changes_nothing() {
        let (terminal, stdout_mock) =
            new_terminal(InputMock::from_chunks(["ab", "\x1b[A", "\r"]), "> ");
        let event = terminal.read_line().unwrap();
        assert_eq!(event, ReadlineEvent::Line(b"ab".to_vec()));
        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "> ab\r\n");
    }

    #[test]
    fn test_up_recalls_previous_entry() {
        let (terminal, _) =
            new_terminal(InputMock::from_chunks(["first\r", "\x1b[A\r"]), "> ");
        terminal.read_line().unwrap();
        let event = terminal.read_line().unwrap();
        assert_eq!(event, ReadlineEvent::Line(b"first".to_vec()));
        assert_eq!(terminal.history(), vec![b"first".to_vec(), b"first".to_vec()]);
    }

    #[test]
    fn test_ctrl_c_breaks_and_drops_pending_input() {
        let (terminal, stdout_mock) =
            new_terminal(InputMock::from_chunks(["abc\x03xyz\r"]), "> ");

        let event = terminal.read_line().unwrap();
        assert_eq!(event, ReadlineEvent::Interrupted(b"^C".to_vec()));
        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "> abc^C\r\n");
        assert!(terminal.history().is_empty());

        let state = terminal.safe_line_state.lock().unwrap();
        assert!(state.line.is_empty());
        assert!(state.remainder.is_empty());
        drop(state);

        // "xyz\r" was thrown away with the break, so the channel is simply exhausted.
        assert_eq!(terminal.read_line().unwrap(), ReadlineEvent::Eof);
    }

    #[test]
    fn test_ctrl_d_on_empty_line() {
        let (terminal, stdout_mock) = new_terminal(InputMock::from_chunks(["\x04"]), "> ");
        let event = terminal.read_line().unwrap();
        assert_eq!(event, ReadlineEvent::Eof);
        assert!(event.text().is_empty());
        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "> exit\r\n");
    }

    #[test]
    fn test_password_is_not_echoed_or_recorded() {
        let (terminal, stdout_mock) =
            new_terminal(InputMock::from_chunks(["sec", "ret\r"]), "> ");

        let event = terminal.read_password("Password: ").unwrap();
        assert_eq!(event, ReadlineEvent::Line(b"secret".to_vec()));
        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "Password: \r\n");
        assert!(terminal.history().is_empty());

        let state = terminal.safe_line_state.lock().unwrap();
        assert_eq!(state.prompt, "> ");
        assert!(state.echo);
    }

    #[test]
    fn test_password_settings_restored_after_error() {
        let (terminal, _) = new_terminal(
            InputMock::from_chunks(["se"]).then_fail(io::ErrorKind::BrokenPipe),
            "> ",
        );
        assert!(terminal.read_password("Password: ").is_err());
        let state = terminal.safe_line_state.lock().unwrap();
        assert_eq!(state.prompt, "> ");
        assert!(state.echo);
    }

    #[test]
    fn test_password_cut_short_does_not_leak_into_next_line() {
        let (terminal, stdout_mock) = new_terminal(
            InputMock::from_chunks(["se"])
                .then_fail_once(io::ErrorKind::TimedOut)
                .then_chunks(["x\r"]),
            "> ",
        );

        let Err(ReadlineError::IO(err)) = terminal.read_password("Password: ") else {
            panic!("expected an io error");
        };
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);

        let event = terminal.read_line().unwrap();
        assert_eq!(event, ReadlineEvent::Line(b"x".to_vec()));
        assert_eq!(terminal.history(), vec![b"x".to_vec()]);
        assert_eq!(
            stdout_mock.get_copy_of_buffer_as_string(),
            "Password: \r\n> x\r\n"
        );
    }

    /// Fails the first write that ends a row, then passes everything through.
    #[derive(Debug)]
    struct FailOnceOnCrlf {
        stdout_mock: StdoutMock,
        has_failed: bool,
    }

    impl Write for FailOnceOnCrlf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if !self.has_failed && buf.windows(2).any(|it| it == b"\r\n") {
                self.has_failed = true;
                return Err(io::Error::new(io::ErrorKind::WouldBlock, "device busy"));
            }
            self.stdout_mock.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    #[test]
    fn test_output_failure_on_submit_keeps_the_line() {
        let stdout_mock = StdoutMock::new();
        let terminal = Terminal::new(
            InputMock::from_chunks(["hello\r", "again\r"]),
            FailOnceOnCrlf {
                stdout_mock: stdout_mock.clone(),
                has_failed: false,
            },
            "> ",
            true,
        );

        assert_eq!(
            terminal.read_line().unwrap(),
            ReadlineEvent::Line(b"hello".to_vec())
        );
        assert_eq!(terminal.history(), vec![b"hello".to_vec()]);

        assert_eq!(
            terminal.read_line().unwrap(),
            ReadlineEvent::Line(b"again".to_vec())
        );
        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "> > again\r\n");
    }

    #[test]
    fn test_backspace_at_start_emits_nothing() {
        let (terminal, stdout_mock) =
            new_terminal(InputMock::from_chunks(["\x7f", "x\r"]), "> ");
        assert_eq!(
            terminal.read_line().unwrap(),
            ReadlineEvent::Line(b"x".to_vec())
        );
        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "> x\r\n");
    }

    #[test]
    fn test_escape_sequence_split_across_reads() {
        let (terminal, stdout_mock) =
            new_terminal(InputMock::from_chunks(["a\x1b", "[", "D", "b\r"]), "> ");
        assert_eq!(
            terminal.read_line().unwrap(),
            ReadlineEvent::Line(b"ba".to_vec())
        );

        let mut expected = b"> a".to_vec();
        expected.extend_from_slice(CURSOR_BACK);
        expected.extend_from_slice(b"ba");
        expected.extend_from_slice(CURSOR_BACK);
        expected.extend_from_slice(CURSOR_FORWARD);
        expected.extend_from_slice(b"\r\n");
        assert_eq!(stdout_mock.get_copy_of_buffer(), expected);
    }

    #[test]
    fn test_stuck_escape_sequence_is_discarded() {
        let mut stuck = vec![0x1b];
        stuck.extend(std::iter::repeat_n(b';', REMAINDER_CAPACITY - 1));
        let (terminal, _) =
            new_terminal(InputMock::from_chunks([stuck, b"ok\r".to_vec()]), "> ");
        assert_eq!(
            terminal.read_line().unwrap(),
            ReadlineEvent::Line(b"ok".to_vec())
        );
    }

    #[test]
    fn test_read_error_is_propagated() {
        let (terminal, _) = new_terminal(
            InputMock::from_chunks(["ab"]).then_fail(io::ErrorKind::ConnectionReset),
            "> ",
        );
        let Err(ReadlineError::IO(err)) = terminal.read_line() else {
            panic!("expected an io error");
        };
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }

    #[test]
    fn test_end_of_stream_is_eof() {
        let (terminal, _) = new_terminal(InputMock::from_chunks(["partial"]), "> ");
        assert_eq!(terminal.read_line().unwrap(), ReadlineEvent::Eof);
    }

    #[test]
    fn test_history_seed_and_cap() {
        let (terminal, _) = new_terminal(InputMock::from_chunks(["c\r"]), "> ");
        terminal.set_history(vec![b"a".to_vec(), b"b".to_vec()]);
        terminal.set_max_history(Some(2));
        terminal.read_line().unwrap();
        assert_eq!(terminal.history(), vec![b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn test_debug_shows_session_state() {
        let (terminal, _) = new_terminal(InputMock::from_chunks(Vec::<Text>::new()), "$ ");
        let debug = format!("{terminal:?}");
        assert!(debug.starts_with("Terminal"));
        assert!(debug.contains(r#"prompt: "$ ""#));
    }

    #[test]
    fn test_escape_codes_table_is_shared() {
        let (terminal, _) = new_terminal(InputMock::from_chunks(Vec::<Text>::new()), "> ");
        assert!(std::ptr::eq(terminal.escape_codes(), &VT100_ESCAPE_CODES));
    }

    /// Poll until `stdout_mock` holds exactly `expected`.
    async fn wait_for_output(stdout_mock: &StdoutMock, expected: &[u8]) {
        for _ in 0..500 {
            if stdout_mock.get_copy_of_buffer() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!(
            "timed out waiting for {:?}, got {:?}",
            String::from_utf8_lossy(expected),
            stdout_mock.get_copy_of_buffer_as_string()
        );
    }

    #[tokio::test]
    async fn test_write_while_read_line_is_blocked() {
        let (input, sender) = InputMock::new_channel();
        let (terminal, stdout_mock) = new_terminal(input, "> ");
        let terminal = Arc::new(terminal);

        let reader = tokio::task::spawn_blocking({
            let terminal = Arc::clone(&terminal);
            move || terminal.read_line()
        });

        sender.send(b"ab".to_vec()).unwrap();
        wait_for_output(&stdout_mock, b"> ab").await;

        assert_eq!(terminal.write(b"news\r\n").unwrap(), 6);
        sender.send(b"\r".to_vec()).unwrap();

        let event = reader.await.unwrap().unwrap();
        assert_eq!(event, ReadlineEvent::Line(b"ab".to_vec()));

        let mut expected = b"> ab".to_vec();
        expected.extend(CURSOR_BACK.repeat(4));
        expected.extend_from_slice(CLEAR_LINE_TO_RIGHT);
        expected.extend_from_slice(b"news\r\n> ab\r\n");
        assert_eq!(stdout_mock.get_copy_of_buffer(), expected);
    }

    #[tokio::test]
    async fn test_write_while_read_password_is_blocked() {
        let (input, sender) = InputMock::new_channel();
        let (terminal, stdout_mock) = new_terminal(input, "> ");
        let terminal = Arc::new(terminal);

        let reader = tokio::task::spawn_blocking({
            let terminal = Arc::clone(&terminal);
            move || terminal.read_password("Pw: ")
        });

        sender.send(b"se".to_vec()).unwrap();
        for _ in 0..500 {
            if terminal.safe_line_state.lock().unwrap().line.len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "Pw: ");

        terminal.write(b"log\r\n").unwrap();
        sender.send(b"\r".to_vec()).unwrap();

        let event = reader.await.unwrap().unwrap();
        assert_eq!(event, ReadlineEvent::Line(b"se".to_vec()));

        // The hidden line is never redrawn, and the cursor is never moved onto it.
        let mut expected = b"Pw: ".to_vec();
        expected.extend(CURSOR_BACK.repeat(4));
        expected.extend_from_slice(CLEAR_LINE_TO_RIGHT);
        expected.extend_from_slice(b"log\r\nPw: \r\n");
        assert_eq!(stdout_mock.get_copy_of_buffer(), expected);
        assert!(terminal.history().is_empty());
    }

    #[tokio::test]
    async fn test_autocomplete_can_write_without_deadlock() {
        let (input, sender) = InputMock::new_channel();
        let (terminal, stdout_mock) = new_terminal(input, "> ");
        let shared_writer = terminal.shared_writer();
        terminal.set_autocomplete(move |line, _pos, key| {
            if key != Key::Byte(b'\t') {
                return None;
            }
            let mut shared_writer = shared_writer.clone();
            writeln!(shared_writer, "completing").ok()?;
            (line == b"he").then(|| Completion {
                line: b"help".to_vec(),
                pos: 4,
            })
        });
        let terminal = Arc::new(terminal);

        let reader = tokio::task::spawn_blocking({
            let terminal = Arc::clone(&terminal);
            move || terminal.read_line()
        });
        sender.send(b"he\t\r".to_vec()).unwrap();

        let event = reader.await.unwrap().unwrap();
        assert_eq!(event, ReadlineEvent::Line(b"help".to_vec()));
        assert!(
            stdout_mock
                .get_copy_of_buffer_as_string_strip_ansi()
                .contains("completing")
        );
    }

    #[test]
    fn test_set_prompt_and_size_between_lines() {
        let (terminal, stdout_mock) = new_terminal(InputMock::from_chunks(["x\r"]), "> ");
        terminal.set_prompt("$ ").unwrap();
        terminal.set_size(0, 0);
        terminal.set_echo(false);
        assert_eq!(
            terminal.read_line().unwrap(),
            ReadlineEvent::Line(b"x".to_vec())
        );
        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "$ \r\n");
        assert!(terminal.history().is_empty());
    }
}
