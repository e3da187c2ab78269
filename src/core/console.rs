//! Console session
//!
//! The one object games talk to. Combines the raw-mode guard, the key decoder
//! and the output sink, and tracks what it believes the terminal's echo and
//! cursor visibility are so nested prompts can put them back.

use std::fmt::Display;
use std::io::{self, Read, Stdin, Stdout, Write};

use tracing::{debug, info, warn};

use super::decoder::{InputDecoder, KeyEvent};
use super::mode::TerminalMode;
use super::output::{OutputSink, Rgb};
use crate::error::{ConsoleError, Result};
use crate::ui::LineEditor;

pub const DEFAULT_TERMINAL_WIDTH: usize = 80;
pub const DEFAULT_TERMINAL_HEIGHT: usize = 25;

fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Raw-mode terminal session.
pub struct Console<R: Read = Stdin, W: Write = Stdout> {
    input: InputDecoder<R>,
    output: OutputSink<W>,
    mode: Option<TerminalMode>,
    echo_enabled: bool,
    cursor_visible: bool,
}

impl Console<Stdin, Stdout> {
    /// Put the controlling terminal into raw mode and attach to stdin/stdout.
    pub fn open() -> Result<Self> {
        let mode = TerminalMode::enter_raw()?;
        info!("Console opened");
        Ok(Self::attach(io::stdin(), io::stdout(), mode))
    }
}

impl<R: Read, W: Write> Console<R, W> {
    /// Console over arbitrary streams with no terminal discipline to manage.
    pub fn new(input: R, output: W) -> Self {
        Self::build(input, output, None)
    }

    /// Console over arbitrary streams that owns an already entered raw mode.
    pub fn attach(input: R, output: W, mode: TerminalMode) -> Self {
        Self::build(input, output, Some(mode))
    }

    fn build(input: R, output: W, mode: Option<TerminalMode>) -> Self {
        Self {
            input: InputDecoder::new(input),
            output: OutputSink::new(output),
            mode,
            echo_enabled: false,
            cursor_visible: true,
        }
    }

    pub fn is_echo_enabled(&self) -> bool {
        self.echo_enabled
    }

    pub fn is_cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    /// Whether this console holds the terminal in raw mode.
    pub fn is_raw(&self) -> bool {
        self.mode.as_ref().map_or(false, TerminalMode::is_active)
    }

    pub fn writer(&self) -> &W {
        self.output.get_ref()
    }

    // ---- input ----

    /// Next decoded key event. Pending output is flushed first.
    pub fn read_event(&mut self) -> Result<KeyEvent> {
        let result = self.flush().and_then(|_| self.input.next_event());
        self.guard(result)
    }

    /// Next character exactly as typed, escape bytes included.
    pub fn read_char(&mut self) -> Result<char> {
        let result = self.flush().and_then(|_| self.input.next_char());
        self.guard(result)
    }

    /// Interactive line input. See [`LineEditor`].
    pub fn read_line(&mut self) -> Result<String> {
        LineEditor::new().run(self)
    }

    /// Swallow input until Enter is pressed.
    pub fn wait_for_enter(&mut self) -> Result<()> {
        let echo = self.echo_enabled;
        self.echo(false)?;
        while self.read_event()? != KeyEvent::Enter {}
        self.echo(echo)
    }

    /// Prompt until the user enters an integer within `[min, max]`.
    pub fn read_int(&mut self, prompt: &str, min: i32, max: i32) -> Result<i32> {
        if min > max {
            return Err(ConsoleError::InvalidRange { min, max });
        }
        loop {
            self.clear_screen()?;
            self.print(prompt)?;
            let line = self.read_line()?;
            match line.parse::<i32>() {
                Ok(value) if (min..=max).contains(&value) => return Ok(value),
                Ok(value) => {
                    debug!(value, min, max, "Number out of range");
                    self.hide_cursor()?;
                    self.print(format_args!("\nNumber must be between {} and {}!", min, max))?;
                    self.wait_for_enter()?;
                }
                Err(_) => {
                    debug!(input = %line, "Invalid number");
                    self.hide_cursor()?;
                    self.print("\nInvalid number!")?;
                    self.wait_for_enter()?;
                }
            }
        }
    }

    /// [`read_int`](Self::read_int) over the whole `i32` range.
    pub fn read_int_any(&mut self, prompt: &str) -> Result<i32> {
        self.read_int(prompt, i32::MIN, i32::MAX)
    }

    // ---- output ----

    pub fn print(&mut self, value: impl Display) -> Result<()> {
        let result = self.output.text(&value.to_string());
        self.guard_io(result)
    }

    pub fn println(&mut self, value: impl Display) -> Result<()> {
        self.print(value)?;
        self.newline()
    }

    pub fn newline(&mut self) -> Result<()> {
        self.print('\n')
    }

    pub fn clear_screen(&mut self) -> Result<()> {
        let result = self.output.clear();
        self.guard_io(result)
    }

    /// Absolute move, zero-based.
    pub fn move_cursor(&mut self, row: usize, col: usize) -> Result<()> {
        let result = self.output.move_to(clamp_u16(row), clamp_u16(col));
        self.guard_io(result)
    }

    pub fn move_cursor_left(&mut self, n: usize) -> Result<()> {
        let result = self.output.move_left(clamp_u16(n));
        self.guard_io(result)
    }

    pub fn move_cursor_right(&mut self, n: usize) -> Result<()> {
        let result = self.output.move_right(clamp_u16(n));
        self.guard_io(result)
    }

    pub fn hide_cursor(&mut self) -> Result<()> {
        if self.cursor_visible {
            let result = self.output.hide_cursor();
            self.guard_io(result)?;
            self.cursor_visible = false;
        }
        Ok(())
    }

    pub fn show_cursor(&mut self) -> Result<()> {
        if !self.cursor_visible {
            let result = self.output.show_cursor();
            self.guard_io(result)?;
            self.cursor_visible = true;
        }
        Ok(())
    }

    /// Restore cursor visibility to a previously observed state.
    pub fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        if visible {
            self.show_cursor()
        } else {
            self.hide_cursor()
        }
    }

    /// Toggle terminal echo. Nothing is sent when the state already matches.
    pub fn echo(&mut self, enabled: bool) -> Result<()> {
        if self.echo_enabled == enabled {
            return Ok(());
        }
        if let Some(mode) = self.mode.as_mut() {
            let result = mode.set_echo(enabled);
            self.guard(result)?;
        }
        self.echo_enabled = enabled;
        Ok(())
    }

    pub fn set_foreground_color(&mut self, color: impl Into<Rgb>) -> Result<()> {
        let result = self.output.foreground(color.into());
        self.guard_io(result)
    }

    pub fn set_background_color(&mut self, color: impl Into<Rgb>) -> Result<()> {
        let result = self.output.background(color.into());
        self.guard_io(result)
    }

    pub fn reset_foreground_color(&mut self) -> Result<()> {
        let result = self.output.reset_foreground();
        self.guard_io(result)
    }

    pub fn reset_background_color(&mut self) -> Result<()> {
        let result = self.output.reset_background();
        self.guard_io(result)
    }

    /// Bold text in an SGR color code until [`reset_style`](Self::reset_style).
    pub fn highlight(&mut self, code: u8) -> Result<()> {
        let result = self.output.highlight(code);
        self.guard_io(result)
    }

    pub fn reset_style(&mut self) -> Result<()> {
        let result = self.output.reset_style();
        self.guard_io(result)
    }

    pub fn flush(&mut self) -> Result<()> {
        let result = self.output.flush();
        self.guard_io(result)
    }

    // ---- lifecycle ----

    /// Show the cursor and give the terminal back. Safe to call repeatedly.
    pub fn release(&mut self) {
        if !self.cursor_visible && self.output.show_cursor().is_ok() {
            self.cursor_visible = true;
        }
        let _ = self.output.flush();
        if let Some(mode) = self.mode.as_mut() {
            mode.restore();
        }
    }

    /// Environment failures give the terminal back before propagating.
    fn guard<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_environment() {
                warn!("Console failure, restoring terminal: {}", e);
                self.release();
            }
        }
        result
    }

    fn guard_io<T>(&mut self, result: io::Result<T>) -> Result<T> {
        self.guard(result.map_err(ConsoleError::from))
    }
}

impl<R: Read, W: Write> Drop for Console<R, W> {
    fn drop(&mut self) {
        self.release();
        debug!("Console closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &[u8]) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.to_vec()), Vec::new())
    }

    fn output(console: &Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8_lossy(console.writer()).into_owned()
    }

    #[test]
    fn test_read_int_reprompts_on_garbage() {
        let mut con = console(b"abc\n\n5\n");
        assert_eq!(con.read_int("Pick: ", 1, 10).unwrap(), 5);

        let out = output(&con);
        assert_eq!(out.matches("Invalid number!").count(), 1);
        assert_eq!(out.matches("\x1b[H\x1b[2J").count(), 2);
        assert_eq!(out.matches("Pick: ").count(), 2);
    }

    #[test]
    fn test_read_int_rejects_out_of_range() {
        let mut con = console(b"42\r\r-3\n\n7\n");
        assert_eq!(con.read_int("Pick: ", 1, 10).unwrap(), 7);

        let out = output(&con);
        assert_eq!(out.matches("Number must be between 1 and 10!").count(), 2);
    }

    #[test]
    fn test_read_int_bounds_inclusive() {
        let mut con = console(b"1\n");
        assert_eq!(con.read_int("", 1, 1).unwrap(), 1);
        let mut con = console(b"-2147483648\n");
        assert_eq!(con.read_int_any("").unwrap(), i32::MIN);
    }

    #[test]
    fn test_read_int_invalid_range() {
        let mut con = console(b"5\n");
        assert!(matches!(
            con.read_int("", 10, 1),
            Err(ConsoleError::InvalidRange { min: 10, max: 1 })
        ));
    }

    #[test]
    fn test_read_int_input_closed() {
        let mut con = console(b"abc");
        assert!(matches!(con.read_int("", 0, 9), Err(ConsoleError::InputClosed)));
    }

    #[test]
    fn test_cursor_visibility_is_idempotent() {
        let mut con = console(b"");
        con.hide_cursor().unwrap();
        con.hide_cursor().unwrap();
        con.show_cursor().unwrap();
        con.show_cursor().unwrap();
        assert_eq!(output(&con), "\x1b[?25l\x1b[?25h");
    }

    #[test]
    fn test_echo_tracks_state() {
        let mut con = console(b"");
        assert!(!con.is_echo_enabled());
        con.echo(true).unwrap();
        assert!(con.is_echo_enabled());
        con.echo(false).unwrap();
        assert!(!con.is_echo_enabled());
        assert!(!con.is_raw());
    }

    #[test]
    fn test_wait_for_enter_skips_other_keys() {
        let mut con = console(b"ab\x1b[A\rz");
        con.wait_for_enter().unwrap();
        assert_eq!(con.read_char().unwrap(), 'z');
    }

    #[test]
    fn test_read_char_is_raw() {
        let mut con = console(b"\x1b[B");
        assert_eq!(con.read_char().unwrap(), '\x1b');
        assert_eq!(con.read_char().unwrap(), '[');
        assert_eq!(con.read_char().unwrap(), 'B');
    }

    #[test]
    fn test_release_shows_hidden_cursor() {
        let mut con = console(b"");
        con.hide_cursor().unwrap();
        con.release();
        assert!(con.is_cursor_visible());
        assert!(output(&con).ends_with("\x1b[?25h"));
    }

    #[cfg(unix)]
    #[test]
    #[serial_test::serial]
    fn test_input_closed_restores_terminal() {
        use crate::core::mode::tests::open_pty;
        use std::os::unix::io::AsRawFd;
        use termios::Termios;

        let (_master, slave) = open_pty();
        let fd = slave.as_raw_fd();
        let before = Termios::from_fd(fd).unwrap();

        let mode = TerminalMode::enter_raw_fd(fd).unwrap();
        let mut con = Console::attach(Cursor::new(b"ab".to_vec()), Vec::new(), mode);
        assert!(con.is_raw());
        con.hide_cursor().unwrap();

        assert_eq!(con.read_event().unwrap(), KeyEvent::Char('a'));
        assert_eq!(con.read_event().unwrap(), KeyEvent::Char('b'));
        assert!(matches!(con.read_event(), Err(ConsoleError::InputClosed)));

        assert!(!con.is_raw());
        assert!(con.is_cursor_visible());
        assert!(output(&con).ends_with("\x1b[?25h"));
        let after = Termios::from_fd(fd).unwrap();
        assert_eq!(before.c_lflag, after.c_lflag);
        assert_eq!(before.c_cc, after.c_cc);

        // The line editor surfaces the same failure.
        let mode = TerminalMode::enter_raw_fd(fd).unwrap();
        let mut con = Console::attach(Cursor::new(b"ab".to_vec()), Vec::new(), mode);
        assert!(matches!(con.read_line(), Err(ConsoleError::InputClosed)));
        assert!(!con.is_raw());
        assert_eq!(Termios::from_fd(fd).unwrap().c_lflag, before.c_lflag);
    }

    #[test]
    fn test_colors_and_text() {
        let mut con = console(b"");
        con.set_background_color(0x00BB_ADA0_u32).unwrap();
        con.set_foreground_color(Rgb::new(1, 2, 3)).unwrap();
        con.print("hi").unwrap();
        con.reset_foreground_color().unwrap();
        con.reset_background_color().unwrap();
        con.move_cursor(2, 3).unwrap();
        assert_eq!(
            output(&con),
            "\x1b[48;2;187;173;160m\x1b[38;2;1;2;3mhi\x1b[39m\x1b[49m\x1b[3;4H"
        );
    }
}
