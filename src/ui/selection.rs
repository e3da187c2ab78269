//! Selection menu
//!
//! Lists options under a prompt and lets the user move a highlight through
//! them with the arrow keys. Enter or space picks the highlighted option.
//!
//! # Example
//!
//! ```ignore
//! let index = SelectionModal::vertical("Pick a difficulty", ["Easy", "Hard"])?
//!     .with_color(92)
//!     .display_on(&mut console)?;
//! ```

use std::fmt::Display;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Console, KeyEvent};
use crate::error::{ConsoleError, Result};

/// Default highlight: bright cyan.
pub const DEFAULT_HIGHLIGHT: u8 = 96;

/// Menu layout: which arrow pair moves the selection and how items are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// One numbered option per line, Up/Down to move.
    #[default]
    Vertical,
    /// Options on one line separated by spaces, Left/Right to move.
    Horizontal,
}

impl Orientation {
    /// (previous, next) navigation keys.
    pub fn keys(&self) -> (KeyEvent, KeyEvent) {
        match self {
            Orientation::Vertical => (KeyEvent::Up, KeyEvent::Down),
            Orientation::Horizontal => (KeyEvent::Left, KeyEvent::Right),
        }
    }

    pub fn format_item(&self, index: usize, item: &str) -> String {
        match self {
            Orientation::Vertical => format!("{}. {}\n", index + 1, item),
            Orientation::Horizontal => format!("{} ", item),
        }
    }
}

/// A prompt with a non-empty list of options.
#[derive(Debug, Clone)]
pub struct SelectionModal {
    prompt: String,
    options: Vec<String>,
    selected: usize,
    color: u8,
    orientation: Orientation,
}

impl SelectionModal {
    /// Build a menu. Fails with [`ConsoleError::EmptyMenu`] when there are no options.
    pub fn new<I, T>(prompt: impl Into<String>, options: I, orientation: Orientation) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let options: Vec<String> = options.into_iter().map(|o| o.to_string()).collect();
        if options.is_empty() {
            return Err(ConsoleError::EmptyMenu);
        }
        Ok(Self {
            prompt: prompt.into(),
            options,
            selected: 0,
            color: DEFAULT_HIGHLIGHT,
            orientation,
        })
    }

    pub fn vertical<I, T>(prompt: impl Into<String>, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        Self::new(prompt, options, Orientation::Vertical)
    }

    pub fn horizontal<I, T>(prompt: impl Into<String>, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        Self::new(prompt, options, Orientation::Horizontal)
    }

    /// Highlight the selection with another SGR color code.
    pub fn with_color(mut self, code: u8) -> Self {
        self.color = code;
        self
    }

    /// Append more options after the existing ones.
    pub fn extend<I, T>(mut self, more: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        self.options.extend(more.into_iter().map(|o| o.to_string()));
        self
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Move the selection for a key event. Returns true if the event was a
    /// navigation key for this orientation.
    pub fn navigate(&mut self, event: KeyEvent) -> bool {
        let (prev, next) = self.orientation.keys();
        if event == prev {
            self.selected = self.selected.saturating_sub(1);
            true
        } else if event == next {
            self.selected = (self.selected + 1).min(self.options.len() - 1);
            true
        } else {
            false
        }
    }

    /// Run the menu until the user picks an option and return its index.
    ///
    /// Cursor visibility is put back to what it was before the menu opened.
    pub fn display_on<R: Read, W: Write>(&mut self, console: &mut Console<R, W>) -> Result<usize> {
        let cursor_visible = console.is_cursor_visible();
        console.clear_screen()?;
        console.hide_cursor()?;
        console.println(&self.prompt)?;

        let top = self.prompt.lines().count();

        loop {
            console.move_cursor(top, 0)?;
            self.draw(console)?;

            match console.read_event()? {
                KeyEvent::Enter | KeyEvent::Char(' ') => break,
                event => {
                    self.navigate(event);
                }
            }
        }

        console.set_cursor_visible(cursor_visible)?;
        debug!(index = self.selected, option = %self.options[self.selected], "Selection made");
        Ok(self.selected)
    }

    fn draw<R: Read, W: Write>(&self, console: &mut Console<R, W>) -> Result<()> {
        for (i, option) in self.options.iter().enumerate() {
            let item = self.orientation.format_item(i, option);
            if i == self.selected {
                console.highlight(self.color)?;
                console.print(item)?;
                console.reset_style()?;
            } else {
                console.print(item)?;
            }
        }
        Ok(())
    }
}
