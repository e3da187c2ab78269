//! Output sink
//!
//! Queues text and ANSI directives on the terminal writer. Every directive is
//! a literal escape sequence; nothing here tracks terminal state.

use std::fmt;
use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveLeft, MoveRight, MoveTo, Show},
    queue,
    style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    Command,
};
use serde::{Deserialize, Serialize};

/// A 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpack a `0xRRGGBB` value. Bits above the low 24 are ignored.
    pub const fn from_packed(color: u32) -> Self {
        Self {
            r: ((color >> 16) & 0xFF) as u8,
            g: ((color >> 8) & 0xFF) as u8,
            b: (color & 0xFF) as u8,
        }
    }

    pub fn to_crossterm(&self) -> Color {
        Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

impl From<u32> for Rgb {
    fn from(color: u32) -> Self {
        Self::from_packed(color)
    }
}

/// Home the cursor and clear the screen: `ESC [ H ESC [ 2 J`.
#[derive(Debug, Clone, Copy)]
pub struct ClearScreen;

impl Command for ClearScreen {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str("\x1b[H\x1b[2J")
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(windows)]
    fn is_ansi_code_supported(&self) -> bool {
        true
    }
}

/// Bold text in the given SGR color code: `ESC [ code ; 1 m`.
#[derive(Debug, Clone, Copy)]
pub struct Highlight(pub u8);

impl Command for Highlight {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "\x1b[{};1m", self.0)
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(windows)]
    fn is_ansi_code_supported(&self) -> bool {
        true
    }
}

/// Writer that emits terminal directives.
pub struct OutputSink<W: Write> {
    out: W,
}

impl<W: Write> OutputSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn text(&mut self, text: &str) -> io::Result<()> {
        queue!(self.out, Print(text))
    }

    /// Absolute move, zero-based.
    pub fn move_to(&mut self, row: u16, col: u16) -> io::Result<()> {
        queue!(self.out, MoveTo(col, row))
    }

    pub fn move_left(&mut self, n: u16) -> io::Result<()> {
        if n == 0 {
            return Ok(());
        }
        queue!(self.out, MoveLeft(n))
    }

    pub fn move_right(&mut self, n: u16) -> io::Result<()> {
        if n == 0 {
            return Ok(());
        }
        queue!(self.out, MoveRight(n))
    }

    pub fn clear(&mut self) -> io::Result<()> {
        queue!(self.out, ClearScreen)
    }

    pub fn show_cursor(&mut self) -> io::Result<()> {
        queue!(self.out, Show)
    }

    pub fn hide_cursor(&mut self) -> io::Result<()> {
        queue!(self.out, Hide)
    }

    pub fn foreground(&mut self, color: Rgb) -> io::Result<()> {
        queue!(self.out, SetForegroundColor(color.to_crossterm()))
    }

    pub fn background(&mut self, color: Rgb) -> io::Result<()> {
        queue!(self.out, SetBackgroundColor(color.to_crossterm()))
    }

    pub fn reset_foreground(&mut self) -> io::Result<()> {
        queue!(self.out, SetForegroundColor(Color::Reset))
    }

    pub fn reset_background(&mut self) -> io::Result<()> {
        queue!(self.out, SetBackgroundColor(Color::Reset))
    }

    pub fn highlight(&mut self, code: u8) -> io::Result<()> {
        queue!(self.out, Highlight(code))
    }

    pub fn reset_style(&mut self) -> io::Result<()> {
        queue!(self.out, SetAttribute(Attribute::Reset))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
