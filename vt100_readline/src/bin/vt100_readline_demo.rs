// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Interactive demo: a tiny shell on the current terminal. A background ticker writes
//! through a [`SharedWriter`] while you type, so you can watch the prompt and the line
//! being edited survive concurrent output.

use std::{io::Write,
          str::FromStr,
          sync::{Arc,
                 atomic::{AtomicBool, AtomicU64, Ordering}},
          time::Duration};

use clap::Parser;
use miette::IntoDiagnostic;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use vt100_readline::{Completion, Key, ReadlineEvent, SharedWriter, Terminal,
                     log::{DisplayPreference, TracingConfig, WriterConfig}};

use crate::clap_config::CLIArgs;

/// More info:
/// - <https://docs.rs/strum_macros/latest/strum_macros/derive.EnumString.html>
/// - <https://docs.rs/strum_macros/latest/strum_macros/derive.EnumIter.html>
#[derive(Debug, Clone, Copy, PartialEq, EnumString, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
enum Command {
    #[strum(ascii_case_insensitive)]
    Help,

    #[strum(ascii_case_insensitive)]
    History,

    #[strum(ascii_case_insensitive)]
    Password,

    #[strum(ascii_case_insensitive)]
    Prompt,

    #[strum(ascii_case_insensitive)]
    StartTicker,

    #[strum(ascii_case_insensitive)]
    StopTicker,

    #[strum(ascii_case_insensitive)]
    Exit,
}

#[derive(Debug, Default)]
struct TickerState {
    pub is_running: AtomicBool,
    pub counter: AtomicU64,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli_args = CLIArgs::parse();

    crossterm::terminal::enable_raw_mode().into_diagnostic()?;
    let result = run(cli_args).await;
    crossterm::terminal::disable_raw_mode().into_diagnostic()?;

    result
}

async fn run(cli_args: CLIArgs) -> miette::Result<()> {
    let terminal = Arc::new(Terminal::new(
        std::io::stdin(),
        std::io::stdout(),
        cli_args.prompt.clone(),
        !cli_args.no_echo,
    ));

    if let Ok((width, height)) = crossterm::terminal::size() {
        terminal.set_size(usize::from(width), usize::from(height));
    }

    // Initialize tracing w/ the SharedWriter (so logs don't clobber the prompt), and
    // optionally a file writer.
    let display = DisplayPreference::SharedWriter(terminal.shared_writer());
    vt100_readline::log::init(TracingConfig {
        writer_config: match cli_args.log_file.clone() {
            Some(file_path) => WriterConfig::DisplayAndFile(display, file_path),
            None => WriterConfig::Display(display),
        },
        level: cli_args.log_level,
    })?;

    terminal.set_history(Command::iter().map(|it| it.to_string().into_bytes()).collect());
    terminal.set_autocomplete(autocomplete::complete_command(terminal.shared_writer()));

    let ticker_state = Arc::new(TickerState::default());
    ticker_state
        .is_running
        .store(cli_args.ticker_ms.is_some(), Ordering::Relaxed);
    let ticker = tokio::spawn(ticker::run(
        Arc::clone(&ticker_state),
        terminal.shared_writer(),
        Duration::from_millis(cli_args.ticker_ms.unwrap_or(1_000).max(10)),
    ));

    writeln!(terminal.shared_writer(), "{}", help_message(&terminal)).into_diagnostic()?;

    let result = tokio::task::spawn_blocking({
        let terminal = Arc::clone(&terminal);
        move || repl::run(&terminal, &ticker_state)
    })
    .await
    .into_diagnostic()?;

    ticker.abort();
    result
}

fn help_message(terminal: &Terminal) -> String {
    let codes = terminal.escape_codes();
    let commands = Command::iter()
        .map(|it| it.to_string())
        .collect::<Vec<String>>();
    let available = codes.paint(codes.green, format!("{commands:?}").as_bytes());
    let keys = codes.paint(
        codes.cyan,
        b"try Left, Right, Alt+Left, Alt+Right, Up, Down, Tab, Ctrl+C, and Ctrl+D",
    );
    format!(
        "Available commands:\n{}\n{}",
        String::from_utf8_lossy(&available),
        String::from_utf8_lossy(&keys)
    )
}

mod repl {
    use super::{Command, FromStr, IntoDiagnostic, Ordering, ReadlineEvent, Terminal,
                TickerState, Write, help_message};

    pub fn run(terminal: &Terminal, ticker_state: &TickerState) -> miette::Result<()> {
        let mut shared_writer = terminal.shared_writer();
        loop {
            let line = match terminal.read_line().into_diagnostic()? {
                ReadlineEvent::Line(line) => line,
                ReadlineEvent::Eof | ReadlineEvent::Interrupted(_) => {
                    writeln!(shared_writer, "Goodbye").into_diagnostic()?;
                    return Ok(());
                }
            };

            let line = String::from_utf8_lossy(&line).trim().to_string();
            let (first_word, args) = line.split_once(' ').unwrap_or((line.as_str(), ""));
            if first_word.is_empty() {
                continue;
            }

            let Ok(command) = Command::from_str(first_word) else {
                writeln!(shared_writer, "Unknown command: {first_word}").into_diagnostic()?;
                continue;
            };

            match command {
                Command::Help => {
                    writeln!(shared_writer, "{}", help_message(terminal)).into_diagnostic()?;
                }
                Command::History => {
                    for (index, entry) in terminal.history().iter().enumerate() {
                        writeln!(
                            shared_writer,
                            "{index:>4}  {}",
                            String::from_utf8_lossy(entry)
                        )
                        .into_diagnostic()?;
                    }
                }
                Command::Password => {
                    match terminal.read_password("Password: ").into_diagnostic()? {
                        ReadlineEvent::Line(secret) => {
                            writeln!(shared_writer, "Got {} bytes, not echoed", secret.len())
                                .into_diagnostic()?;
                        }
                        _ => writeln!(shared_writer, "Cancelled").into_diagnostic()?,
                    }
                }
                Command::Prompt => {
                    // Keep the trailing space that `trim` took off the line.
                    terminal.set_prompt(format!("{} ", args.trim())).into_diagnostic()?;
                }
                Command::StartTicker => {
                    ticker_state.is_running.store(true, Ordering::Relaxed);
                    writeln!(shared_writer, "Ticker started").into_diagnostic()?;
                }
                Command::StopTicker => {
                    ticker_state.is_running.store(false, Ordering::Relaxed);
                    writeln!(shared_writer, "Ticker stopped").into_diagnostic()?;
                }
                Command::Exit => {
                    writeln!(shared_writer, "Goodbye").into_diagnostic()?;
                    return Ok(());
                }
            }
        }
    }
}

/// Prints to the terminal through a [`SharedWriter`] on a timer.
mod ticker {
    use super::{Arc, Duration, Ordering, SharedWriter, TickerState, Write};

    pub async fn run(
        ticker_state: Arc<TickerState>,
        mut shared_writer: SharedWriter,
        period: Duration,
    ) {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if !ticker_state.is_running.load(Ordering::Relaxed) {
                continue;
            }
            let counter = ticker_state.counter.fetch_add(1, Ordering::Relaxed);
            if writeln!(shared_writer, "[{counter}] tick").is_err() {
                break;
            }
            tracing::debug!(message = "ticker fired", counter);
        }
    }
}

mod autocomplete {
    use super::{Command, Completion, IntoEnumIterator, Key, SharedWriter, Write};

    const KEY_TAB: u8 = b'\t';

    /// Tab completes a unique command prefix, and lists the candidates otherwise.
    pub fn complete_command(
        shared_writer: SharedWriter,
    ) -> impl Fn(&[u8], usize, Key) -> Option<Completion> + Send + Sync + 'static {
        move |line: &[u8], pos: usize, key: Key| {
            if key != Key::Byte(KEY_TAB) || pos != line.len() {
                return None;
            }

            let prefix = String::from_utf8_lossy(line).to_lowercase();
            let candidates = Command::iter()
                .map(|it| it.to_string())
                .filter(|it| it.starts_with(&prefix))
                .collect::<Vec<String>>();

            match candidates.as_slice() {
                [only] => Some(Completion {
                    line: only.clone().into_bytes(),
                    pos: only.len(),
                }),
                [] => None,
                many => {
                    let mut shared_writer = shared_writer.clone();
                    writeln!(shared_writer, "{}", many.join("  ")).ok();
                    None
                }
            }
        }
    }
}

mod clap_config {
    use clap::Parser;

    /// More info: <https://docs.rs/clap/latest/clap/_derive/_tutorial/chapter_2/index.html>
    #[derive(Debug, Parser)]
    #[command(bin_name = "vt100_readline_demo")]
    #[command(about = "Line editing on a raw terminal, with output from a background task")]
    #[command(version)]
    #[command(next_line_help = true)]
    #[command(arg_required_else_help(false))]
    pub struct CLIArgs {
        #[arg(long, default_value = "> ", help = "Prompt drawn at the start of each line")]
        pub prompt: String,

        #[arg(long, help = "Don't echo typed characters")]
        pub no_echo: bool,

        #[arg(
            long,
            value_name = "MILLIS",
            help = "Start the background ticker right away, firing every MILLIS ms"
        )]
        pub ticker_ms: Option<u64>,

        #[arg(long, value_name = "PATH", help = "Also write logs to this file")]
        pub log_file: Option<String>,

        #[arg(long, default_value = "info", help = "One of: trace, debug, info, warn, error")]
        pub log_level: tracing::Level,
    }
}
