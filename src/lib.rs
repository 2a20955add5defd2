//! Non-blocking building blocks for small microcontrollers.
//!
//! Everything in this crate is designed for a single-threaded main loop with
//! interrupts and no operating system. Nothing blocks: each component keeps
//! just enough state to continue where it left off on its next call.
//!
//! - [`Vt100`] turns a byte stream into literal characters and the handful of
//!   escape sequences a character display can act on, delivering them to a
//!   caller-provided [`Vt100Target`].
//! - [`i2c::Master`] drives a write-then-read I2C transaction one bus event
//!   per poll and reports completion through a callback.
//! - [`timing::SingleDelay`] and [`debounce::DebouncedInput`] measure time
//!   against a free-running tick counter that a timer interrupt advances.
//! - [`cmdline::CmdLine`] and [`encoder::TurnEncoder`] cover the usual
//!   serial prompt and rotary-knob input.
//!
//! ```rust
//! # use saba_blocks::{SpecialFunction, Vt100, Vt100Event, vt100_target_fn};
//! # let mut evts: Vec<Vt100Event> = Vec::new();
//! let mut vt = Vt100::new(vt100_target_fn(|event| {
//!     println!("{event:?}");
//! #   evts.push(event);
//! }));
//! vt.write(b"\x1b[2J\x1b[1;5HHi");
//! # drop(vt);
//! # assert_eq!(&evts[..], &[
//! #    Vt100Event::SpecialFunction(SpecialFunction::ClearScreen),
//! #    Vt100Event::SetCursorPosition { col: 5, row: 1 },
//! #    Vt100Event::Putchar(b'H'),
//! #    Vt100Event::Putchar(b'i'),
//! # ]);
//! ```
//!
//! ```plaintext
//! SpecialFunction(ClearScreen)
//! SetCursorPosition { col: 5, row: 1 }
//! Putchar(72)
//! Putchar(105)
//! ```
#![no_std]

pub mod cmdline;
pub mod debounce;
pub mod encoder;
pub mod i2c;
mod target;
pub mod timing;
mod vt100;

pub use target::{vt100_target_fn, SpecialFunction, Vt100Event, Vt100Target};
pub use vt100::{seq, Vt100};

#[cfg(test)]
mod tests;
