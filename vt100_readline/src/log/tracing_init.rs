// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{io::{self, Write},
          sync::mpsc::{Sender, channel}};

use miette::IntoDiagnostic;
use tracing_core::LevelFilter;
use tracing_subscriber::{Layer, layer::SubscriberExt, registry::LookupSpan,
                         util::SubscriberInitExt};

use super::{DisplayPreference, TracingConfig, WriterConfig, rolling_file_appender_impl};
use crate::{SharedWriter, Text};

pub type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

/// Avoid gnarly type annotations by using a macro to create the `fmt` layer.
#[macro_export]
macro_rules! create_fmt {
    () => {
        tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_thread_ids(true)
            .with_thread_names(false)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true)
    };
}

/// Simply initialize the tracing system with the provided [`TracingConfig`].
pub fn init(tracing_config: TracingConfig) -> miette::Result<()> {
    if let Some(layers) = try_create_layers(tracing_config)? {
        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .into_diagnostic()?;
    }
    Ok(())
}

/// Returns the layers, or [None] for [`WriterConfig::None`]. This does not initialize
/// the tracing system.
pub fn try_create_layers(
    tracing_config: TracingConfig,
) -> miette::Result<Option<Vec<Box<DynLayer<tracing_subscriber::Registry>>>>> {
    let level_filter = tracing_config.get_level_filter();

    let (maybe_display, maybe_file_path) = match tracing_config.writer_config {
        WriterConfig::None => return Ok(None),
        WriterConfig::Display(display) => (Some(display), None),
        WriterConfig::File(file_path) => (None, Some(file_path)),
        WriterConfig::DisplayAndFile(display, file_path) => (Some(display), Some(file_path)),
    };

    let mut return_it: Vec<Box<DynLayer<tracing_subscriber::Registry>>> = vec![];

    // Needed if more layers without their own level filter get added.
    return_it.push(Box::new(level_filter));

    if let Some(display) = maybe_display {
        return_it.push(try_create_display_layer(level_filter, display)?);
    }

    if let Some(file_path) = maybe_file_path {
        return_it.push(try_create_file_layer(level_filter, &file_path)?);
    }

    Ok(Some(return_it))
}

/// This erases the concrete type of the writer, and returns a boxed layer. This is useful
/// for composition of layers. There's more info in the docs
/// [here](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/index.html#runtime-configuration-with-layers).
pub fn try_create_display_layer<S>(
    level_filter: LevelFilter,
    preferred_display: DisplayPreference,
) -> miette::Result<Box<DynLayer<S>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let fmt_layer = create_fmt!();

    Ok(match preferred_display {
        DisplayPreference::Stdout => Box::new(
            fmt_layer
                .with_writer(std::io::stdout)
                .with_filter(level_filter),
        ),
        DisplayPreference::Stderr => Box::new(
            fmt_layer
                .with_writer(std::io::stderr)
                .with_filter(level_filter),
        ),
        DisplayPreference::SharedWriter(shared_writer) => {
            let sender = spawn_shared_writer_forwarder(shared_writer)?;
            let make_writer = move || LogLineSender {
                sender: sender.clone(),
            };
            Box::new(
                fmt_layer
                    .with_ansi(false)
                    .with_writer(make_writer)
                    .with_filter(level_filter),
            )
        }
    })
}

pub fn try_create_file_layer<S>(
    level_filter: LevelFilter,
    file_path: &str,
) -> miette::Result<Box<DynLayer<S>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let file = rolling_file_appender_impl::try_create(file_path)?;
    Ok(Box::new(
        create_fmt!()
            .with_ansi(false)
            .with_writer(file)
            .with_filter(level_filter),
    ))
}

/// Events are often emitted while the session lock is held (by the thread that holds
/// it), so they can't go into the [`SharedWriter`] directly. They are handed to a
/// dedicated thread that waits for the lock instead.
fn spawn_shared_writer_forwarder(
    mut shared_writer: SharedWriter,
) -> miette::Result<Sender<Text>> {
    let (sender, receiver) = channel::<Text>();
    std::thread::Builder::new()
        .name("log_shared_writer".into())
        .spawn(move || {
            for log_line in receiver {
                if shared_writer.write_all(&log_line).is_err() {
                    break;
                }
            }
            shared_writer.flush().ok();
        })
        .into_diagnostic()?;
    Ok(sender)
}

/// [Write] end handed to the `fmt` layer for every event.
#[derive(Debug, Clone)]
pub struct LogLineSender {
    pub sender: Sender<Text>,
}

impl Write for LogLineSender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sender
            .send(buf.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "log forwarder stopped"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{InputMock, StdoutMock, Terminal};

    #[test]
    fn test_none_creates_no_layers() {
        let config = TracingConfig {
            writer_config: WriterConfig::None,
            level: tracing::Level::INFO,
        };
        assert!(try_create_layers(config).unwrap().is_none());
    }

    #[test]
    fn test_display_and_file_layers() {
        let file_path = std::env::temp_dir().join("vt100_readline_tracing_init_test.log");
        let config = TracingConfig::new_file_and_display(
            Some(file_path.display().to_string()),
            DisplayPreference::Stderr,
        );
        let layers = try_create_layers(config).unwrap().unwrap();
        // Level filter, display, file.
        assert_eq!(layers.len(), 3);
    }

    #[test]
    fn test_log_lines_reach_shared_writer() {
        let stdout_mock = StdoutMock::new();
        let terminal = Terminal::new(
            InputMock::from_chunks(Vec::<Text>::new()),
            stdout_mock.clone(),
            "> ",
            true,
        );
        let sender = spawn_shared_writer_forwarder(terminal.shared_writer()).unwrap();
        let mut log_line_sender = LogLineSender { sender };
        log_line_sender.write_all(b"hello from tracing\n").unwrap();

        for _ in 0..500 {
            if stdout_mock.get_copy_of_buffer_as_string() == "hello from tracing\r\n" {
                return;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        panic!("log line never arrived: {:?}", stdout_mock.get_copy_of_buffer_as_string());
    }
}
