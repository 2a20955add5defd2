extern crate std;

use std::vec::Vec;

use pretty_assertions::assert_eq;

use crate::{seq, vt100_target_fn, SpecialFunction, Vt100, Vt100Event, Vt100Target};

macro_rules! put {
    ($c:literal) => {
        Vt100Event::Putchar($c)
    };
}

macro_rules! special {
    ($f:ident) => {
        Vt100Event::SpecialFunction(SpecialFunction::$f)
    };
}

#[test]
fn literal() {
    let mut vt = testing_parser();
    vt.write(b"abc\r\n");
    assert_eq!(
        vt.target().log(),
        &[put!(b'a'), put!(b'b'), put!(b'c'), put!(b'\r'), put!(b'\n')]
    );
}

#[test]
fn every_byte_but_escape_is_literal() {
    let mut vt = testing_parser();
    for b in 0..=255u8 {
        if b == 0x1b {
            continue;
        }
        vt.putch(b);
        assert!(!vt.in_sequence());
    }
    let expected: Vec<Vt100Event> = (0..=255u8)
        .filter(|&b| b != 0x1b)
        .map(Vt100Event::Putchar)
        .collect();
    assert_eq!(vt.target().log(), &expected[..]);
}

#[test]
fn clear_screen() {
    let mut vt = testing_parser();
    vt.write(b"1\x1b[2Jy\x1b[02Jz");
    assert_eq!(
        vt.target().log(),
        &[
            put!(b'1'),
            special!(ClearScreen),
            put!(b'y'),
            special!(ClearScreen),
            put!(b'z'),
        ]
    );
}

#[test]
fn nothing_is_reported_inside_a_sequence() {
    let mut vt = testing_parser();
    vt.write(b"\x1b[2");
    assert!(vt.in_sequence());
    assert!(vt.target().log().is_empty());
    vt.putch(b'J');
    assert_eq!(vt.target().log(), &[special!(ClearScreen)]);
}

#[test]
fn cursor_home() {
    let mut vt = testing_parser();
    vt.write(b"1\x1b[Hy");
    assert_eq!(
        vt.target().log(),
        &[put!(b'1'), special!(CursorHome), put!(b'y')]
    );
}

#[test]
fn cursor_position_is_column_first() {
    let mut vt = testing_parser();
    vt.write(b"\x1b[12;20H\x1b[02;09Hy");
    assert_eq!(
        vt.target().log(),
        &[
            Vt100Event::SetCursorPosition { col: 20, row: 12 },
            Vt100Event::SetCursorPosition { col: 9, row: 2 },
            put!(b'y'),
        ]
    );
}

#[test]
fn cursor_position_without_column() {
    let mut vt = testing_parser();
    vt.write(b"\x1b[3;H");
    assert_eq!(
        vt.target().log(),
        &[Vt100Event::SetCursorPosition { col: 0, row: 3 }]
    );
}

#[test]
fn save_and_restore_cursor() {
    let mut vt = testing_parser();
    vt.write(b"X\x1b7Z\x1b8U");
    assert_eq!(
        vt.target().log(),
        &[
            put!(b'X'),
            special!(SaveCursor),
            put!(b'Z'),
            special!(RestoreCursor),
            put!(b'U'),
        ]
    );
}

#[test]
fn display_extensions() {
    let mut vt = testing_parser();
    vt.write(b"\x1bB\x1bb\x1bc");
    assert_eq!(
        vt.target().log(),
        &[
            special!(BacklightOn),
            special!(BacklightOff),
            special!(ClearScreenHome),
        ]
    );
}

#[test]
fn unknown_escape() {
    let mut vt = testing_parser();
    vt.write(b"f\x1bag");
    assert_eq!(
        vt.target().log(),
        &[put!(b'f'), Vt100Event::Error(b'a'), put!(b'g')]
    );
}

#[test]
fn escape_twice() {
    let mut vt = testing_parser();
    vt.write(b"\x1b\x1bx");
    assert_eq!(
        vt.target().log(),
        &[Vt100Event::Error(0x1b), put!(b'x')]
    );
}

#[test]
fn unknown_bracket_sequence() {
    let mut vt = testing_parser();
    vt.write(b"g\x1b[qh");
    assert_eq!(
        vt.target().log(),
        &[put!(b'g'), Vt100Event::Error(b'q'), put!(b'h')]
    );
}

#[test]
fn argument_overflow() {
    let mut vt = testing_parser();
    vt.write(b"\x1b[199x");
    assert_eq!(
        vt.target().log(),
        &[Vt100Event::Error(b'9'), put!(b'x')]
    );

    // The largest accepted value still works afterwards.
    vt.target_mut().clear();
    vt.write(b"\x1b[99;99H");
    assert_eq!(
        vt.target().log(),
        &[Vt100Event::SetCursorPosition { col: 99, row: 99 }]
    );
}

#[test]
fn second_argument_overflow() {
    let mut vt = testing_parser();
    vt.write(b"\x1b[1;100Hx");
    assert_eq!(
        vt.target().log(),
        &[Vt100Event::Error(b'0'), put!(b'H'), put!(b'x')]
    );
}

#[test]
fn clear_with_wrong_argument() {
    let mut vt = testing_parser();
    vt.write(b"\x1b[1J\x1b[5Hk");
    assert_eq!(
        vt.target().log(),
        &[Vt100Event::Error(b'J'), Vt100Event::Error(b'H'), put!(b'k')]
    );
}

#[test]
fn bad_terminator_after_second_argument() {
    let mut vt = testing_parser();
    vt.write(b"\x1b[1;2Jk");
    assert_eq!(
        vt.target().log(),
        &[Vt100Event::Error(b'J'), put!(b'k')]
    );
}

#[test]
fn reset_drops_partial_sequence() {
    let mut vt = testing_parser();
    vt.write(b"\x1b[12");
    vt.reset();
    vt.write(b"J");
    assert_eq!(vt.target().log(), &[put!(b'J')]);
}

#[test]
fn through_target_fn() {
    let mut events: Vec<Vt100Event> = Vec::new();
    let mut vt = Vt100::new(vt100_target_fn(|event| events.push(event)));
    vt.write(b"a\x1b[H\x1b[4;2H\x1bz");
    drop(vt);
    assert_eq!(
        events,
        &[
            put!(b'a'),
            special!(CursorHome),
            Vt100Event::SetCursorPosition { col: 2, row: 4 },
            Vt100Event::Error(b'z'),
        ]
    );
}

#[test]
fn produced_sequences_parse_back() {
    let mut out: heapless::String<16> = heapless::String::new();
    seq::write_cursor_position(&mut out, 20, 12).unwrap();
    assert_eq!(out.as_str(), "\x1b[12;20H");

    let mut vt = testing_parser();
    vt.write(out.as_bytes());
    vt.write(seq::CLEAR_SCREEN.as_bytes());
    vt.write(seq::CURSOR_HOME.as_bytes());
    vt.write(seq::SAVE_CURSOR.as_bytes());
    vt.write(seq::RESTORE_CURSOR.as_bytes());
    vt.write(seq::BACKLIGHT_ON.as_bytes());
    vt.write(seq::BACKLIGHT_OFF.as_bytes());
    vt.write(seq::CLEAR_SCREEN_HOME.as_bytes());
    assert_eq!(
        vt.target().log(),
        &[
            Vt100Event::SetCursorPosition { col: 20, row: 12 },
            special!(ClearScreen),
            special!(CursorHome),
            special!(SaveCursor),
            special!(RestoreCursor),
            special!(BacklightOn),
            special!(BacklightOff),
            special!(ClearScreenHome),
        ]
    );
}

fn testing_parser() -> Vt100<LogTarget> {
    Vt100::new(LogTarget::new())
}

struct LogTarget {
    log: Vec<Vt100Event>,
}

impl LogTarget {
    pub fn new() -> Self {
        Self { log: Vec::new() }
    }

    pub fn log(&self) -> &[Vt100Event] {
        &self.log
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }
}

impl Vt100Target for LogTarget {
    fn putchar(&mut self, ch: u8) {
        self.log.push(Vt100Event::Putchar(ch));
    }

    fn special_function(&mut self, function: SpecialFunction) {
        self.log.push(Vt100Event::SpecialFunction(function));
    }

    fn set_cursor_position(&mut self, col: u8, row: u8) {
        self.log.push(Vt100Event::SetCursorPosition { col, row });
    }

    fn error(&mut self, ch: u8) {
        self.log.push(Vt100Event::Error(ch));
    }
}
