//! Key event decoder
//!
//! Turns the raw byte stream coming from the terminal into logical key events.
//! The only escape sequences given meaning are the cursor keys `ESC [ A..D`.
//! Anything else that starts with ESC decodes to a bare [`KeyEvent::Escape`],
//! and the bytes read while looking for a continuation are decoded afterwards
//! as ordinary input.

use std::collections::VecDeque;
use std::io::{self, Read};

use tracing::trace;

use crate::error::{ConsoleError, Result};

const ESC: u8 = 0x1B;
const BACKSPACE: u8 = 0x08;
const DEL: u8 = 0x7F;

/// A decoded unit of keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    /// Any other character, control characters included.
    Char(char),
    Enter,
    Backspace,
    Escape,
    Up,
    Down,
    Left,
    Right,
}

impl KeyEvent {
    /// Map a single ASCII byte. Escape sequences and UTF-8 are handled by the decoder.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'\n' | b'\r' => KeyEvent::Enter,
            BACKSPACE | DEL => KeyEvent::Backspace,
            ESC => KeyEvent::Escape,
            _ => KeyEvent::Char(byte as char),
        }
    }

    /// Final byte of a `CSI` cursor key.
    fn arrow(final_byte: u8) -> Option<Self> {
        match final_byte {
            b'A' => Some(KeyEvent::Up),
            b'B' => Some(KeyEvent::Down),
            b'C' => Some(KeyEvent::Right),
            b'D' => Some(KeyEvent::Left),
            _ => None,
        }
    }
}

/// Blocking decoder over a byte source.
pub struct InputDecoder<R> {
    reader: R,
    /// Bytes read ahead while decoding an escape sequence.
    pending: VecDeque<u8>,
}

impl<R: Read> InputDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::with_capacity(4),
        }
    }

    /// Next raw byte, blocking until one arrives.
    pub fn next_byte(&mut self) -> Result<u8> {
        if let Some(byte) = self.pending.pop_front() {
            return Ok(byte);
        }
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Err(ConsoleError::InputClosed),
                Ok(_) => return Ok(buf[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Decode the next key event.
    pub fn next_event(&mut self) -> Result<KeyEvent> {
        let byte = self.next_byte()?;
        match byte {
            ESC => self.escape(),
            0x80..=0xFF => self.utf8(byte).map(KeyEvent::Char),
            _ => Ok(KeyEvent::from_byte(byte)),
        }
    }

    /// Next character without escape-sequence interpretation.
    pub fn next_char(&mut self) -> Result<char> {
        let byte = self.next_byte()?;
        if byte < 0x80 {
            Ok(byte as char)
        } else {
            self.utf8(byte)
        }
    }

    fn escape(&mut self) -> Result<KeyEvent> {
        let intro = self.next_byte()?;
        if intro != b'[' {
            trace!(byte = intro, "Bare escape");
            self.pending.push_back(intro);
            return Ok(KeyEvent::Escape);
        }

        let final_byte = self.next_byte()?;
        match KeyEvent::arrow(final_byte) {
            Some(event) => Ok(event),
            None => {
                trace!(byte = final_byte, "Unrecognized CSI sequence");
                self.pending.push_back(intro);
                self.pending.push_back(final_byte);
                Ok(KeyEvent::Escape)
            }
        }
    }

    fn utf8(&mut self, lead: u8) -> Result<char> {
        let len = match lead {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Ok(char::REPLACEMENT_CHARACTER),
        };

        let mut buf = [lead, 0, 0, 0];
        for slot in buf.iter_mut().take(len).skip(1) {
            let byte = self.next_byte()?;
            if byte & 0xC0 != 0x80 {
                self.pending.push_back(byte);
                return Ok(char::REPLACEMENT_CHARACTER);
            }
            *slot = byte;
        }

        Ok(std::str::from_utf8(&buf[..len])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
