/// The non-literal terminal actions a [`crate::Vt100`] parser can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialFunction {
    /// `ESC [ 2 J`
    ClearScreen,
    /// `ESC [ H`
    CursorHome,
    /// `ESC 7`
    SaveCursor,
    /// `ESC 8`
    RestoreCursor,
    /// `ESC B`, an extension for displays with a backlight.
    BacklightOn,
    /// `ESC b`
    BacklightOff,
    /// `ESC c`, clears the screen and moves the cursor home in one step.
    ClearScreenHome,
}

/// Trait for implementations that can render what a [`crate::Vt100`] decodes.
///
/// All of the provided method implementations perform no action at all.
pub trait Vt100Target {
    /// Renders a literal character at the current cursor position.
    #[inline(always)]
    fn putchar(&mut self, ch: u8) {
        let _ = ch;
        // Silently ignored by default.
    }

    /// Executes a recognized special function such as clearing the screen.
    #[inline(always)]
    fn special_function(&mut self, function: SpecialFunction) {
        let _ = function;
        // Silently ignored by default.
    }

    /// Moves the cursor.
    ///
    /// The arguments arrive as `(column, row)` even though the escape sequence
    /// spells them as `ESC [ row ; column H`.
    #[inline(always)]
    fn set_cursor_position(&mut self, col: u8, row: u8) {
        let _ = (col, row);
        // Silently ignored by default.
    }

    /// Handles a byte that isn't valid at the parser's current position in
    /// an escape sequence.
    ///
    /// The parser has already returned to literal mode when this is called.
    #[inline(always)]
    fn error(&mut self, ch: u8) {
        let _ = ch;
        // Silently ignores errors by default.
    }
}

/// Represents target calls delivered to a callback through `vt100_target_fn`.
///
/// Each variant corresponds to a method of [`Vt100Target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vt100Event {
    Putchar(u8),
    SpecialFunction(SpecialFunction),
    SetCursorPosition { col: u8, row: u8 },
    Error(u8),
}

/// Returns a [`Vt100Target`] that calls the given function for each
/// event produced by an associated [`crate::Vt100`].
pub fn vt100_target_fn(f: impl FnMut(Vt100Event)) -> impl Vt100Target {
    Vt100TargetFn { f }
}

struct Vt100TargetFn<F> {
    f: F,
}

impl<F: FnMut(Vt100Event)> Vt100Target for Vt100TargetFn<F> {
    #[inline(always)]
    fn putchar(&mut self, ch: u8) {
        (self.f)(Vt100Event::Putchar(ch));
    }

    #[inline(always)]
    fn special_function(&mut self, function: SpecialFunction) {
        (self.f)(Vt100Event::SpecialFunction(function));
    }

    #[inline(always)]
    fn set_cursor_position(&mut self, col: u8, row: u8) {
        (self.f)(Vt100Event::SetCursorPosition { col, row });
    }

    #[inline(always)]
    fn error(&mut self, ch: u8) {
        (self.f)(Vt100Event::Error(ch));
    }
}

impl<T: Vt100Target + ?Sized> Vt100Target for &mut T {
    #[inline(always)]
    fn putchar(&mut self, ch: u8) {
        (**self).putchar(ch);
    }

    #[inline(always)]
    fn special_function(&mut self, function: SpecialFunction) {
        (**self).special_function(function);
    }

    #[inline(always)]
    fn set_cursor_position(&mut self, col: u8, row: u8) {
        (**self).set_cursor_position(col, row);
    }

    #[inline(always)]
    fn error(&mut self, ch: u8) {
        (**self).error(ch);
    }
}
