use crate::{SpecialFunction, Vt100Target};

const ESC: u8 = 0x1b;

/// Largest value a numeric argument may accumulate to.
const MAX_ARG: u8 = 99;

/// A byte-at-a-time parser for the small VT100 subset a character display
/// can act on.
///
/// | Sequence              | Target call                                   |
/// |-----------------------|-----------------------------------------------|
/// | `ESC [ 2 J`           | [`SpecialFunction::ClearScreen`]              |
/// | `ESC [ H`             | [`SpecialFunction::CursorHome`]               |
/// | `ESC [ row ; col H`   | [`Vt100Target::set_cursor_position`]`(col, row)` |
/// | `ESC 7` / `ESC 8`     | save / restore cursor                         |
/// | `ESC B` / `ESC b`     | backlight on / off                            |
/// | `ESC c`               | [`SpecialFunction::ClearScreenHome`]          |
///
/// Anything else inside a sequence is reported through
/// [`Vt100Target::error`] and the parser falls back to literal mode.
pub struct Vt100<T> {
    target: T,
    mode: Mode,
    arg1: u8,
    arg2: u8,
}

impl<T> Vt100<T> {
    pub const fn new(target: T) -> Self {
        Self {
            target,
            mode: Mode::Normal,
            arg1: 0,
            arg2: 0,
        }
    }

    #[inline(always)]
    pub const fn target(&self) -> &T {
        &self.target
    }

    #[inline(always)]
    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    #[inline(always)]
    pub fn take_target(self) -> T {
        self.target
    }

    /// Abandons any partially-received escape sequence without reporting it.
    pub fn reset(&mut self) {
        self.mode = Mode::Normal;
    }

    /// Returns `true` while the parser is between an `ESC` and the end of
    /// its sequence.
    #[inline(always)]
    pub fn in_sequence(&self) -> bool {
        self.mode != Mode::Normal
    }
}

impl<T: Vt100Target> Vt100<T> {
    pub fn write(&mut self, data: &[u8]) {
        for &ch in data {
            self.putch(ch);
        }
    }

    /// Feeds a single byte.
    pub fn putch(&mut self, ch: u8) {
        match self.mode {
            Mode::Normal => match ch {
                ESC => self.mode = Mode::Escape,
                _ => self.target.putchar(ch),
            },
            Mode::Escape => match ch {
                b'[' => self.mode = Mode::Bracket,
                b'7' => self.special(SpecialFunction::SaveCursor),
                b'8' => self.special(SpecialFunction::RestoreCursor),
                b'B' => self.special(SpecialFunction::BacklightOn),
                b'b' => self.special(SpecialFunction::BacklightOff),
                b'c' => self.special(SpecialFunction::ClearScreenHome),
                _ => self.error(ch),
            },
            Mode::Bracket => match ch {
                b'H' => self.special(SpecialFunction::CursorHome),
                b'0'..=b'9' => {
                    self.arg1 = ch - b'0';
                    self.mode = Mode::Arg1;
                }
                _ => self.error(ch),
            },
            Mode::Arg1 => match ch {
                b'0'..=b'9' => {
                    if let Some(v) = accumulate(self.arg1, ch) {
                        self.arg1 = v;
                    } else {
                        self.error(ch);
                    }
                }
                b'J' if self.arg1 == 2 => self.special(SpecialFunction::ClearScreen),
                b';' => {
                    self.arg2 = 0;
                    self.mode = Mode::Arg2;
                }
                _ => self.error(ch),
            },
            Mode::Arg2 => match ch {
                b'0'..=b'9' => {
                    if let Some(v) = accumulate(self.arg2, ch) {
                        self.arg2 = v;
                    } else {
                        self.error(ch);
                    }
                }
                b'H' => {
                    self.mode = Mode::Normal;
                    self.target.set_cursor_position(self.arg2, self.arg1);
                }
                _ => self.error(ch),
            },
        }
    }

    fn special(&mut self, function: SpecialFunction) {
        self.mode = Mode::Normal;
        self.target.special_function(function);
    }

    fn error(&mut self, ch: u8) {
        log::debug!("vt100: unexpected byte {ch:#04x} in {:?}", self.mode);
        self.mode = Mode::Normal;
        self.target.error(ch);
    }
}

/// Appends a decimal digit, refusing results beyond [`MAX_ARG`].
fn accumulate(current: u8, digit: u8) -> Option<u8> {
    let v = u16::from(current) * 10 + u16::from(digit - b'0');
    if v > u16::from(MAX_ARG) {
        None
    } else {
        Some(v as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Escape,
    Bracket,
    Arg1,
    Arg2,
}

/// Escape strings understood by [`Vt100`], for the producing side.
pub mod seq {
    pub const CLEAR_SCREEN: &str = "\x1b[2J";
    pub const CURSOR_HOME: &str = "\x1b[H";
    pub const SAVE_CURSOR: &str = "\x1b7";
    pub const RESTORE_CURSOR: &str = "\x1b8";
    pub const BACKLIGHT_ON: &str = "\x1bB";
    pub const BACKLIGHT_OFF: &str = "\x1bb";
    pub const CLEAR_SCREEN_HOME: &str = "\x1bc";

    /// Writes `ESC [ row ; col H`.
    pub fn write_cursor_position(
        out: &mut impl core::fmt::Write,
        col: u8,
        row: u8,
    ) -> core::fmt::Result {
        write!(out, "\x1b[{row};{col}H")
    }
}
