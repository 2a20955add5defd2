//! Cooperative timers driven by a free-running tick counter.
//!
//! A periodic interrupt increments a [`Ticker`]; everything else only reads
//! it. Elapsed time is always computed with wrapping subtraction in the width
//! of the timer, so a [`SingleDelay`] stays correct across counter overflow
//! as long as the delay itself fits in that width.

use core::sync::atomic::{AtomicU16, Ordering};

/// Source of the system tick count.
pub trait TickSource {
    fn ticks(&self) -> u16;
}

impl<S: TickSource + ?Sized> TickSource for &S {
    #[inline(always)]
    fn ticks(&self) -> u16 {
        (**self).ticks()
    }
}

/// The system ticker, meant to live in a `static` and be advanced from a
/// timer interrupt.
///
/// There must be exactly one writer. Only atomic loads and stores are used,
/// so this also works on targets without atomic read-modify-write.
pub struct Ticker(AtomicU16);

impl Ticker {
    pub const fn new() -> Self {
        Self(AtomicU16::new(0))
    }

    /// Advances the counter by one tick.
    #[inline(always)]
    pub fn tick(&self) {
        let v = self.0.load(Ordering::Relaxed);
        self.0.store(v.wrapping_add(1), Ordering::Relaxed);
    }

    /// Overwrites the counter. Only the writer side may call this.
    pub fn set(&self, value: u16) {
        self.0.store(value, Ordering::Relaxed);
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for Ticker {
    #[inline(always)]
    fn ticks(&self) -> u16 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Unsigned width a timer measures elapsed ticks in.
///
/// An 8 bit timer saves space but limits delays to 255 ticks.
pub trait Ticks: Copy + PartialOrd {
    /// Keeps the low bits of the system tick count.
    fn truncate(ticks: u16) -> Self;

    fn wrapping_sub(self, rhs: Self) -> Self;
}

impl Ticks for u8 {
    #[inline(always)]
    fn truncate(ticks: u16) -> Self {
        ticks as u8
    }

    #[inline(always)]
    fn wrapping_sub(self, rhs: Self) -> Self {
        u8::wrapping_sub(self, rhs)
    }
}

impl Ticks for u16 {
    #[inline(always)]
    fn truncate(ticks: u16) -> Self {
        ticks
    }

    #[inline(always)]
    fn wrapping_sub(self, rhs: Self) -> Self {
        u16::wrapping_sub(self, rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Running,
    /// Expired, and the expiry has not been reported yet.
    Stopped,
    Done,
}

/// A one-shot delay.
///
/// After [`SingleDelay::start`], [`SingleDelay::poll`] returns `true` exactly
/// once, on the first call at which at least `delay` ticks have elapsed. The
/// timer must be started again for another expiry.
pub struct SingleDelay<'t, S: ?Sized, T = u16> {
    source: &'t S,
    start_value: T,
    delay: T,
    mode: Mode,
}

impl<'t, S: TickSource + ?Sized, T: Ticks> SingleDelay<'t, S, T> {
    pub const fn new(source: &'t S, delay: T) -> Self {
        Self {
            source,
            start_value: delay,
            delay,
            mode: Mode::Done,
        }
    }

    /// (Re)starts the delay from the current tick.
    pub fn start(&mut self) {
        self.start_value = T::truncate(self.source.ticks());
        self.mode = Mode::Running;
    }

    /// Replaces the delay threshold and starts.
    pub fn start_with(&mut self, delay: T) {
        self.delay = delay;
        self.start();
    }

    /// Cancels the delay; no expiry will be reported.
    pub fn stop(&mut self) {
        self.mode = Mode::Done;
    }

    pub fn is_running(&self) -> bool {
        self.mode == Mode::Running
    }

    #[inline(always)]
    pub fn delay(&self) -> T {
        self.delay
    }

    /// Returns `true` once, when the delay has elapsed.
    pub fn poll(&mut self) -> bool {
        match self.mode {
            Mode::Running => {
                let now = T::truncate(self.source.ticks());
                if now.wrapping_sub(self.start_value) >= self.delay {
                    self.mode = Mode::Stopped;
                    true
                } else {
                    false
                }
            }
            Mode::Stopped => {
                self.mode = Mode::Done;
                false
            }
            Mode::Done => false,
        }
    }
}
