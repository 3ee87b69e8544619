// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! In-memory stand-ins for the two halves of a raw duplex channel, for driving a
//! [`crate::Terminal`] in tests and demos without a real TTY.

// Attach.
pub mod input_mock;
pub mod stdout_mock;

// Re-export.
pub use input_mock::*;
pub use stdout_mock::*;
