// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Tracing setup for programs built on this crate. The engine itself only emits
//! `tracing` events; nothing is recorded until a subscriber is installed, eg: with
//! [`init`].
//!
//! While a [`crate::Terminal`] owns the screen, writing logs straight to `stdout` would
//! clobber the prompt. Either log to a file, or use
//! [`DisplayPreference::SharedWriter`] so log lines are injected like any other output.

// Attach.
pub mod rolling_file_appender_impl;
pub mod tracing_config;
pub mod tracing_init;

// Re-export.
pub use tracing_config::*;
pub use tracing_init::*;
