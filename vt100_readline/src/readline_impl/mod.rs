// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod cursor_renderer;
pub mod editable_line;
pub mod line_state;
pub mod output_queue;
pub mod readline_history;
pub mod remainder_buffer;
pub mod terminal;

// Re-export.
pub use cursor_renderer::*;
pub use editable_line::*;
pub use line_state::*;
pub use output_queue::*;
pub use readline_history::*;
pub use remainder_buffer::*;
pub use terminal::*;
