use embedded_hal::digital::InputPin;

use crate::timing::{SingleDelay, TickSource, Ticks};

/// A digital input that only reports a new level after it has stayed
/// different from the accepted level for a debounce delay.
pub struct DebouncedInput<'t, P, S: ?Sized, T = u8> {
    pin: P,
    last: bool,
    invert: bool,
    delay: SingleDelay<'t, S, T>,
}

impl<'t, P: InputPin, S: TickSource + ?Sized, T: Ticks> DebouncedInput<'t, P, S, T> {
    /// Takes over `pin` and samples its current level as the accepted one.
    ///
    /// With `invert` set, [`DebouncedInput::is_active`] reports a low level
    /// as active, which suits buttons wired against a pull-up.
    pub fn new(mut pin: P, source: &'t S, delay: T, invert: bool) -> Result<Self, P::Error> {
        let last = pin.is_high()?;
        Ok(Self {
            pin,
            last,
            invert,
            delay: SingleDelay::new(source, delay),
        })
    }

    /// Call once per main-loop cycle. Returns `true` when a new level has
    /// been accepted.
    pub fn has_changed(&mut self) -> Result<bool, P::Error> {
        if self.pin.is_high()? != self.last && !self.delay.is_running() {
            self.delay.start();
        }

        if self.delay.poll() {
            let level = self.pin.is_high()?;
            if level != self.last {
                self.last = level;
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// The accepted level, after inversion.
    #[inline(always)]
    pub fn is_active(&self) -> bool {
        self.last != self.invert
    }

    /// The accepted raw pin level.
    #[inline(always)]
    pub fn level(&self) -> bool {
        self.last
    }

    pub fn release(self) -> P {
        self.pin
    }
}
