use core::cell::Cell;
use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin};

use crate::timing::Ticker;

mod vt100;

/// An input pin whose level the test controls through a shared cell.
struct TestPin<'a>(&'a Cell<bool>);

impl ErrorType for TestPin<'_> {
    type Error = Infallible;
}

impl InputPin for TestPin<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.get())
    }
}

fn advance(ticker: &Ticker, ticks: u16) {
    for _ in 0..ticks {
        ticker.tick();
    }
}
