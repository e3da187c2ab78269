//! Core terminal session components.
//!
//! - **mode**: raw terminal discipline with guaranteed restoration
//! - **decoder**: raw input bytes to key events
//! - **output**: text and ANSI directives
//! - **console**: the session object combining the three
//!
//! # Architecture
//!
//! ```text
//! Console
//! ├── TerminalMode (raw mode guard + exit hooks)
//! ├── InputDecoder (ESC [ A..D, Enter, Backspace, chars)
//! └── OutputSink   (cursor, clear, truecolor, highlight)
//! ```

pub mod mode;
pub mod decoder;
pub mod output;
pub mod console;

pub use console::{Console, DEFAULT_TERMINAL_HEIGHT, DEFAULT_TERMINAL_WIDTH};
pub use decoder::{InputDecoder, KeyEvent};
pub use mode::{restore_active, TerminalMode, TerminalState};
pub use output::{OutputSink, Rgb};
