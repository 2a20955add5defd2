use embedded_hal::digital::InputPin;

use crate::timing::TickSource;

const PHASE1: u8 = 1 << 0;
const PHASE2: u8 = 1 << 1;
const BUTTON: u8 = 1 << 2;

/// A rotary encoder with a push button.
///
/// All three inputs are sampled together; a change is only evaluated once
/// the inputs have been stable for `DEBOUNCE` ticks. The button is expected
/// to pull its input low when pressed.
pub struct TurnEncoder<'t, A, B, K, S: ?Sized, const DEBOUNCE: u8 = 2> {
    phase1: A,
    phase2: B,
    button: K,
    source: &'t S,
    old_value: u8,
    wait_start: u8,
    waiting: bool,
    counter: i8,
}

impl<'t, A, B, K, S, const DEBOUNCE: u8> TurnEncoder<'t, A, B, K, S, DEBOUNCE>
where
    A: InputPin,
    B: InputPin<Error = A::Error>,
    K: InputPin<Error = A::Error>,
    S: TickSource + ?Sized,
{
    pub fn new(phase1: A, phase2: B, button: K, source: &'t S) -> Result<Self, A::Error> {
        let mut encoder = Self {
            phase1,
            phase2,
            button,
            source,
            old_value: 0,
            wait_start: 0,
            waiting: false,
            counter: 0,
        };
        encoder.old_value = encoder.inputs()?;
        Ok(encoder)
    }

    /// Position counter, wrapping.
    #[inline(always)]
    pub fn counter(&self) -> i8 {
        self.counter
    }

    /// Call once per main-loop cycle.
    ///
    /// `on_turn(counter, increment)` is called for each detent with an
    /// increment of `1` or `-1`; `on_click(down)` for each button edge.
    pub fn cyclic(
        &mut self,
        mut on_turn: impl FnMut(i8, i8),
        mut on_click: impl FnMut(bool),
    ) -> Result<(), A::Error> {
        let new_value = self.inputs()?;
        let now = self.source.ticks() as u8;

        if !self.waiting {
            if new_value != self.old_value {
                self.wait_start = now;
                self.waiting = true;
            }
            return Ok(());
        }

        if now.wrapping_sub(self.wait_start) < DEBOUNCE {
            return Ok(());
        }
        self.waiting = false;

        if new_value == self.old_value {
            return Ok(());
        }

        let old = self.old_value;
        if (old & BUTTON) != (new_value & BUTTON) {
            on_click(new_value & BUTTON == 0);
        }

        let increment = if old & PHASE1 == 0 && new_value & PHASE1 != 0 {
            Some(if new_value & PHASE2 != 0 { 1 } else { -1 })
        } else if old & PHASE2 != 0 && new_value & PHASE2 == 0 {
            Some(if new_value & PHASE1 != 0 { 1 } else { -1 })
        } else {
            None
        };
        if let Some(increment) = increment {
            self.counter = self.counter.wrapping_add(increment);
            on_turn(self.counter, increment);
        }

        self.old_value = new_value;
        Ok(())
    }

    fn inputs(&mut self) -> Result<u8, A::Error> {
        let mut v = 0;
        if self.phase1.is_high()? {
            v |= PHASE1;
        }
        if self.phase2.is_high()? {
            v |= PHASE2;
        }
        if self.button.is_high()? {
            v |= BUTTON;
        }
        Ok(v)
    }
}
