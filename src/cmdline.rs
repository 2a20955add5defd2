//! Line editing and argument parsing for a serial command prompt.

use embedded_io::Write;
use heapless::Vec;

const CR: u8 = b'\r';
const BS: u8 = 0x08;
const DEL: u8 = 0x7f;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("expected a number")]
    NoDigits,
    #[error("number too large")]
    Overflow,
}

/// Unsigned integer types the reader can parse into.
pub trait Number: Copy + Default {
    /// `self * base + digit`, or `None` on overflow.
    fn shift_in(self, base: u8, digit: u8) -> Option<Self>;
}

macro_rules! impl_number {
    ($($t:ty),*) => {
        $(
            impl Number for $t {
                #[inline]
                fn shift_in(self, base: u8, digit: u8) -> Option<Self> {
                    self.checked_mul(<$t>::from(base))?.checked_add(<$t>::from(digit))
                }
            }
        )*
    };
}

impl_number!(u8, u16, u32);

/// Reads characters and numbers from a completed command line.
///
/// Parse failures are returned and also latched, so a command handler can
/// read all of its arguments and check [`CmdReader::is_ok`] once.
pub struct CmdReader<const N: usize> {
    line: Vec<u8, N>,
    index_out: usize,
    error: bool,
}

impl<const N: usize> CmdReader<N> {
    pub const fn new() -> Self {
        Self {
            line: Vec::new(),
            index_out: 0,
            error: false,
        }
    }

    /// A reader over `line`, truncated to `N` bytes.
    pub fn from_line(line: &[u8]) -> Self {
        let line = match Vec::from_slice(line) {
            Ok(line) => line,
            Err(()) => {
                log::warn!("cmdline: {} byte line truncated to {}", line.len(), N);
                Vec::from_slice(&line[..N]).unwrap_or_default()
            }
        };
        Self {
            line,
            index_out: 0,
            error: false,
        }
    }

    #[inline(always)]
    pub fn line(&self) -> &[u8] {
        &self.line
    }

    /// Returns the next character, or `0` at the end of the line.
    pub fn next_char(&mut self) -> u8 {
        match self.line.get(self.index_out) {
            Some(&ch) => {
                self.index_out += 1;
                ch
            }
            None => 0,
        }
    }

    /// Like [`CmdReader::next_char`], skipping blanks and tabs.
    pub fn next_char_ignore_blank(&mut self) -> u8 {
        let mut ch = self.next_char();
        while ch == b' ' || ch == b'\t' {
            ch = self.next_char();
        }
        ch
    }

    /// Parses a hexadecimal number after optional blanks.
    pub fn next_hex<T: Number>(&mut self) -> Result<T, ParseError> {
        self.next_number(16, from_hex)
    }

    /// Parses a decimal number after optional blanks.
    pub fn next_dec<T: Number>(&mut self) -> Result<T, ParseError> {
        self.next_number(10, from_dec)
    }

    /// `true` if no number failed to parse since the line was entered.
    #[inline(always)]
    pub fn is_ok(&self) -> bool {
        !self.error
    }

    fn next_number<T: Number>(
        &mut self,
        base: u8,
        digit: fn(u8) -> Option<u8>,
    ) -> Result<T, ParseError> {
        let Some(mut d) = digit(self.next_char_ignore_blank()) else {
            return self.fail(ParseError::NoDigits);
        };

        let mut result = T::default();
        loop {
            result = match result.shift_in(base, d) {
                Some(v) => v,
                None => return self.fail(ParseError::Overflow),
            };

            match self.line.get(self.index_out).copied().and_then(digit) {
                Some(next) => {
                    self.index_out += 1;
                    d = next;
                }
                None => return Ok(result),
            }
        }
    }

    fn fail<T>(&mut self, e: ParseError) -> Result<T, ParseError> {
        self.error = true;
        Err(e)
    }

    fn rewind(&mut self) {
        self.index_out = 0;
        self.error = false;
    }
}

impl<const N: usize> Default for CmdReader<N> {
    fn default() -> Self {
        Self::new()
    }
}

fn from_hex(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        _ => None,
    }
}

fn from_dec(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        _ => None,
    }
}

/// Collects typed characters into a line, echoing them, and hands the line
/// to a command handler on Enter.
pub struct CmdLine<const N: usize> {
    reader: CmdReader<N>,
}

impl<const N: usize> CmdLine<N> {
    pub const fn new() -> Self {
        Self {
            reader: CmdReader::new(),
        }
    }

    /// The characters typed so far.
    #[inline(always)]
    pub fn pending(&self) -> &[u8] {
        self.reader.line()
    }

    /// Processes one received character.
    ///
    /// - CR ends the line and calls `execute` with the first non-blank
    ///   character and a reader positioned after it. If `execute` returns
    ///   `false`, a `^` marker under the read position and `???` are printed.
    /// - Backspace or DEL removes the last character.
    /// - Other printable characters are stored and echoed while there is room.
    pub fn append_char<W: Write>(
        &mut self,
        ch: u8,
        out: &mut W,
        execute: impl FnOnce(u8, &mut CmdReader<N>) -> bool,
    ) -> Result<(), W::Error> {
        match ch {
            CR => self.evaluate_line(out, execute),
            BS | DEL => {
                if self.reader.line.pop().is_some() {
                    out.write_all(&[BS, b' ', BS])?;
                }
                Ok(())
            }
            b' '..=b'~' => {
                if self.reader.line.push(ch).is_ok() {
                    out.write_all(&[ch])?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn evaluate_line<W: Write>(
        &mut self,
        out: &mut W,
        execute: impl FnOnce(u8, &mut CmdReader<N>) -> bool,
    ) -> Result<(), W::Error> {
        out.write_all(b"\r\n")?;

        self.reader.rewind();
        let cmd = self.reader.next_char_ignore_blank();
        let ok = execute(cmd, &mut self.reader);
        if !ok {
            for _ in 1..self.reader.index_out {
                out.write_all(b"-")?;
            }
            out.write_all(b"^\r\n???\r\n")?;
        }

        self.reader.line.clear();
        self.reader.rewind();
        Ok(())
    }
}

impl<const N: usize> Default for CmdLine<N> {
    fn default() -> Self {
        Self::new()
    }
}
