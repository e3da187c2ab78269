//! gameterm - raw-mode terminal console for terminal games
//!
//! Puts the controlling terminal into byte-at-a-time input, decodes keys
//! (including arrow-key escape sequences), writes cursor-positioned and colored
//! output, and provides a line editor and selection menus on top.
//!
//! # Quick Start
//!
//! ```no_run
//! use gameterm::{Console, SelectionModal};
//!
//! # fn main() -> gameterm::Result<()> {
//! let mut console = Console::open()?;
//! let choice = SelectionModal::vertical("Play?", ["Yes", "No"])?.display_on(&mut console)?;
//! let name = console.read_line()?;
//! let size = console.read_int("Board size: ", 4, 16)?;
//! # let _ = (choice, name, size);
//! # Ok(())
//! # }
//! ```
//!
//! The terminal is restored when the console is dropped, at process exit and
//! on SIGINT/SIGTERM/SIGHUP/SIGQUIT.

pub mod config;
pub mod core;
pub mod error;
pub mod ui;

pub use crate::core::{Console, KeyEvent, Rgb, TerminalMode};
pub use crate::error::{ConsoleError, Result};
pub use crate::ui::{LineEditor, Orientation, SelectionModal};
