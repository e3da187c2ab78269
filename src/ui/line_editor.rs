//! Single-line text editor
//!
//! Reads a line with an insertion point that can be moved with the arrow keys.
//! Echo is turned off for the duration and every keystroke is redrawn by hand,
//! so the screen always shows the buffer with the cursor at the insertion
//! point. Characters are assumed to be one column wide.

use std::io::{Read, Write};

use tracing::trace;

use crate::core::console::{Console, DEFAULT_TERMINAL_WIDTH};
use crate::core::KeyEvent;
use crate::error::Result;

/// Characters of the line being edited plus the insertion point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            chars: Vec::with_capacity(DEFAULT_TERMINAL_WIDTH),
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Insertion point, always within `0..=len`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text from the insertion point to the end.
    pub fn tail(&self) -> String {
        self.chars[self.cursor..].iter().collect()
    }

    pub fn insert(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor. Returns false at the start of the line.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.chars.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn into_string(self) -> String {
        self.chars.into_iter().collect()
    }
}

impl std::fmt::Display for LineBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.chars.iter().try_for_each(|c| write!(f, "{}", c))
    }
}

/// Drives a [`LineBuffer`] from console key events.
#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: LineBuffer,
}

impl LineEditor {
    pub fn new() -> Self {
        Self {
            buffer: LineBuffer::new(),
        }
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    /// Edit until Enter, then return the line.
    ///
    /// Echo and cursor visibility are put back to what they were on entry.
    pub fn run<R: Read, W: Write>(mut self, console: &mut Console<R, W>) -> Result<String> {
        let cursor_visible = console.is_cursor_visible();
        let echo = console.is_echo_enabled();
        console.show_cursor()?;
        console.echo(false)?;

        loop {
            let event = console.read_event()?;
            if event == KeyEvent::Enter {
                break;
            }
            self.apply(event, console)?;
        }

        console.set_cursor_visible(cursor_visible)?;
        console.echo(echo)?;
        trace!(len = self.buffer.len(), "Line read");
        Ok(self.buffer.into_string())
    }

    /// Apply one non-Enter event to the buffer and the screen.
    pub fn apply<R: Read, W: Write>(
        &mut self,
        event: KeyEvent,
        console: &mut Console<R, W>,
    ) -> Result<()> {
        match event {
            KeyEvent::Char(c) => {
                self.buffer.insert(c);
                // Redraw from the inserted char; the terminal cursor ends up at the line end.
                console.print(c)?;
                let tail = self.buffer.tail();
                console.print(&tail)?;
                console.move_cursor_left(tail.chars().count())?;
            }
            KeyEvent::Backspace => {
                if self.buffer.backspace() {
                    let tail = self.buffer.tail();
                    console.move_cursor_left(1)?;
                    console.print(format_args!("{} ", tail))?;
                    console.move_cursor_left(tail.chars().count() + 1)?;
                }
            }
            KeyEvent::Left => {
                if self.buffer.move_left() {
                    console.move_cursor_left(1)?;
                }
            }
            KeyEvent::Right => {
                if self.buffer.move_right() {
                    console.move_cursor_right(1)?;
                }
            }
            KeyEvent::Enter | KeyEvent::Up | KeyEvent::Down | KeyEvent::Escape => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn console(input: &[u8]) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.to_vec()), Vec::new())
    }

    /// Single-row screen that understands what the editor emits.
    #[derive(Default)]
    struct Screen {
        cells: Vec<char>,
        col: usize,
    }

    impl Screen {
        fn replay(bytes: &[u8]) -> Self {
            let text = String::from_utf8_lossy(bytes);
            let mut screen = Screen::default();
            let mut chars = text.chars();
            while let Some(c) = chars.next() {
                if c != '\x1b' {
                    if screen.col == screen.cells.len() {
                        screen.cells.push(c);
                    } else {
                        screen.cells[screen.col] = c;
                    }
                    screen.col += 1;
                    continue;
                }
                assert_eq!(chars.next(), Some('['));
                let mut param = String::new();
                let final_char = loop {
                    let ch = chars.next().expect("unterminated sequence");
                    if ch.is_ascii_digit() || ch == '?' {
                        param.push(ch);
                    } else {
                        break ch;
                    }
                };
                match final_char {
                    'C' => screen.col += param.parse::<usize>().unwrap(),
                    'D' => screen.col -= param.parse::<usize>().unwrap(),
                    'h' | 'l' => {}
                    other => panic!("unexpected sequence {:?}", other),
                }
            }
            screen
        }

        fn right_of_cursor(&self) -> String {
            self.cells[self.col..].iter().collect::<String>()
        }
    }

    #[test]
    fn test_plain_line() {
        let mut con = console(b"hello\n");
        assert_eq!(con.read_line().unwrap(), "hello");
        assert_eq!(String::from_utf8_lossy(con.writer()), "hello");
    }

    #[test]
    fn test_insert_in_middle() {
        // "ac", left, "b" -> "abc"
        let mut con = console(b"ac\x1b[Db\r");
        assert_eq!(con.read_line().unwrap(), "abc");
        let screen = Screen::replay(con.writer());
        assert_eq!(screen.cells.iter().collect::<String>(), "abc");
        assert_eq!(screen.col, 2);
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut editor = LineEditor::new();
        let mut con = console(b"");
        editor.apply(KeyEvent::Backspace, &mut con).unwrap();
        assert_eq!(editor.buffer(), &LineBuffer::new());
        assert!(con.writer().is_empty());

        editor.apply(KeyEvent::Char('x'), &mut con).unwrap();
        editor.apply(KeyEvent::Left, &mut con).unwrap();
        let before = editor.buffer().clone();
        editor.apply(KeyEvent::Backspace, &mut con).unwrap();
        assert_eq!(editor.buffer(), &before);
    }

    #[test]
    fn test_backspace_erases_stale_char() {
        let mut con = console(b"abcd\x1b[D\x1b[D\x7f\n");
        assert_eq!(con.read_line().unwrap(), "acd");
        let screen = Screen::replay(con.writer());
        assert_eq!(screen.cells.iter().collect::<String>().trim_end(), "acd");
        assert_eq!(screen.col, 1);
    }

    #[test]
    fn test_boundary_moves_emit_nothing() {
        let mut con = console(b"\x1b[D\x1b[C\n");
        assert_eq!(con.read_line().unwrap(), "");
        assert!(con.writer().is_empty());
    }

    #[test]
    fn test_other_events_ignored() {
        let mut con = console(b"a\x1b[A\x1b[Bb\x1bq\n");
        assert_eq!(con.read_line().unwrap(), "abq");
    }

    #[test]
    fn test_restores_console_state() {
        let mut con = console(b"x\n");
        con.hide_cursor().unwrap();
        con.echo(true).unwrap();
        con.read_line().unwrap();
        assert!(!con.is_cursor_visible());
        assert!(con.is_echo_enabled());
        let out = String::from_utf8_lossy(con.writer()).into_owned();
        assert_eq!(out, "\x1b[?25l\x1b[?25hx\x1b[?25l");
    }

    fn edit_event() -> impl Strategy<Value = KeyEvent> {
        prop_oneof![
            prop::char::range('a', 'z').prop_map(KeyEvent::Char),
            Just(KeyEvent::Left),
            Just(KeyEvent::Right),
            Just(KeyEvent::Backspace),
        ]
    }

    proptest! {
        #[test]
        fn prop_screen_matches_buffer(events in prop::collection::vec(edit_event(), 0..60)) {
            let mut editor = LineEditor::new();
            let mut con = console(b"");
            for event in events {
                editor.apply(event, &mut con).unwrap();
                let buffer = editor.buffer();
                prop_assert!(buffer.cursor() <= buffer.len());

                con.flush().unwrap();
                let screen = Screen::replay(con.writer());
                prop_assert_eq!(screen.col, buffer.cursor());
                let shown = screen.right_of_cursor();
                prop_assert_eq!(shown.trim_end_matches(' '), buffer.tail());
            }
        }
    }
}
