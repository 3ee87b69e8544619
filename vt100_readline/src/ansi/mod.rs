// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod constants;
pub mod escape_codes;
pub mod key_decoder;

// Re-export.
pub use constants::*;
pub use escape_codes::*;
pub use key_decoder::*;
