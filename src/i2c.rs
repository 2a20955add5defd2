//! Non-blocking I2C master.
//!
//! [`Master`] runs one write-then-read transaction at a time on a TWI style
//! peripheral. A transaction is started with
//! [`I2cMaster::start_write_and_read`] and advanced by calling
//! [`I2cMaster::poll`] from the main loop or from the peripheral's interrupt,
//! one bus event per call. When the bus is released the completion callback
//! runs from inside that `poll` call.
//!
//! The callback sees the [`Transaction`] record and may rewrite its counts
//! before returning [`Next::Continue`], which runs another phase on the same
//! record. That is how "write a register pointer, then read" is expressed:
//!
//! ```rust
//! # use saba_blocks::i2c::{I2cMaster, Master, Next, Transaction, TwiPeripheral, Control};
//! # struct Nop;
//! # impl TwiPeripheral for Nop {
//! #     fn pending_status(&mut self) -> Option<u8> { None }
//! #     fn write_data(&mut self, _: u8) {}
//! #     fn read_data(&mut self) -> u8 { 0 }
//! #     fn control(&mut self, _: Control) {}
//! # }
//! let register = [0x00];
//! let mut data = [0u8; 2];
//! let mut phase = 0;
//! let mut done = |t: &mut Transaction<'_>| {
//!     phase += 1;
//!     if phase == 1 && t.error().is_none() {
//!         t.bytes_to_write = 0;
//!         t.bytes_to_read = 2;
//!         Next::Continue
//!     } else {
//!         Next::Finish
//!     }
//! };
//! let mut master = Master::new(Nop);
//! // Write the register pointer only; the read phase is added by `done`.
//! assert!(master.start_write_and_read(0x48, 1, &register, 0, &mut data, Some(&mut done)));
//! assert!(master.is_busy());
//! ```
//!
//! Nothing here times out. A bus that never produces its next status leaves
//! the master busy until the caller gives up and calls [`Master::stop`].

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// TWI status codes, with the prescaler bits masked off.
pub mod status {
    pub const BUS_ERROR: u8 = 0x00;
    pub const START: u8 = 0x08;
    pub const REP_START: u8 = 0x10;
    pub const MT_SLA_ACK: u8 = 0x18;
    pub const MT_SLA_NACK: u8 = 0x20;
    pub const MT_DATA_ACK: u8 = 0x28;
    pub const MT_DATA_NACK: u8 = 0x30;
    pub const ARB_LOST: u8 = 0x38;
    pub const MR_SLA_ACK: u8 = 0x40;
    pub const MR_SLA_NACK: u8 = 0x48;
    pub const MR_DATA_ACK: u8 = 0x50;
    pub const MR_DATA_NACK: u8 = 0x58;
}

/// What the master asks the peripheral to do after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Generate a (repeated) start condition.
    Start,
    /// Release the interrupt flag and clock the next byte. When receiving,
    /// `ack` decides whether that byte will be acknowledged.
    Transfer { ack: bool },
    /// Generate a stop condition.
    Stop,
}

/// The register-level side of a TWI peripheral.
pub trait TwiPeripheral {
    /// Returns the bus status if the peripheral is enabled and has an event
    /// waiting to be handled, otherwise `None`.
    fn pending_status(&mut self) -> Option<u8>;

    fn write_data(&mut self, byte: u8);

    fn read_data(&mut self) -> u8;

    fn control(&mut self, control: Control);
}

impl<H: TwiPeripheral + ?Sized> TwiPeripheral for &mut H {
    #[inline(always)]
    fn pending_status(&mut self) -> Option<u8> {
        (**self).pending_status()
    }

    #[inline(always)]
    fn write_data(&mut self, byte: u8) {
        (**self).write_data(byte)
    }

    #[inline(always)]
    fn read_data(&mut self) -> u8 {
        (**self).read_data()
    }

    #[inline(always)]
    fn control(&mut self, control: Control) {
        (**self).control(control)
    }
}

/// An unexpected bus status that aborted a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unexpected I2C bus status {status:#04x}")]
pub struct BusError {
    pub status: u8,
}

impl embedded_hal::i2c::Error for BusError {
    fn kind(&self) -> ErrorKind {
        match self.status {
            status::MT_SLA_NACK | status::MR_SLA_NACK => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            }
            status::MT_DATA_NACK => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            status::ARB_LOST => ErrorKind::ArbitrationLoss,
            status::BUS_ERROR => ErrorKind::Bus,
            _ => ErrorKind::Other,
        }
    }
}

/// The record of one transaction.
///
/// The buffers are borrowed from the caller for as long as the master holds
/// the record. `bytes_to_write` and `bytes_to_read` may be changed from a
/// completion callback before continuing; they are clamped to the buffer
/// lengths when a phase starts.
pub struct Transaction<'a> {
    /// 7 bit device address.
    pub address: u8,
    pub bytes_to_write: usize,
    pub write_buffer: &'a [u8],
    pub bytes_to_read: usize,
    pub read_buffer: &'a mut [u8],
    bytes_written: usize,
    bytes_read: usize,
    error: Option<BusError>,
}

impl<'a> Transaction<'a> {
    fn new(
        address: u8,
        bytes_to_write: usize,
        write_buffer: &'a [u8],
        bytes_to_read: usize,
        read_buffer: &'a mut [u8],
    ) -> Self {
        Self {
            address,
            bytes_to_write,
            write_buffer,
            bytes_to_read,
            read_buffer,
            bytes_written: 0,
            bytes_read: 0,
            error: None,
        }
    }

    /// The status that aborted the last phase, if any.
    #[inline(always)]
    pub fn error(&self) -> Option<BusError> {
        self.error
    }

    /// The abort status as a raw byte, `0` meaning success.
    ///
    /// A [`status::BUS_ERROR`] abort also reads as `0` here; use
    /// [`Transaction::error`] to tell it apart.
    pub fn error_code(&self) -> u8 {
        self.error.map_or(0, |e| e.status)
    }

    #[inline(always)]
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    #[inline(always)]
    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    /// The bytes actually received in the last phase.
    ///
    /// After an abort this can be shorter than `bytes_to_read`. If a
    /// callback swapped in a shorter `read_buffer`, only what still fits is
    /// returned.
    pub fn read_data(&self) -> &[u8] {
        &self.read_buffer[..self.bytes_read.min(self.read_buffer.len())]
    }

    fn reset_progress(&mut self) {
        self.bytes_written = 0;
        self.bytes_read = 0;
        self.error = None;
        if self.bytes_to_write > self.write_buffer.len() {
            log::warn!(
                "i2c: {} bytes to write clamped to buffer of {}",
                self.bytes_to_write,
                self.write_buffer.len()
            );
            self.bytes_to_write = self.write_buffer.len();
        }
        if self.bytes_to_read > self.read_buffer.len() {
            log::warn!(
                "i2c: {} bytes to read clamped to buffer of {}",
                self.bytes_to_read,
                self.read_buffer.len()
            );
            self.bytes_to_read = self.read_buffer.len();
        }
    }

    fn write_done(&self) -> bool {
        self.bytes_written >= self.bytes_to_write
    }
}

/// Returned by a completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// The transaction is complete.
    Finish,
    /// Run another phase with the (possibly modified) record and the same
    /// callback.
    Continue,
}

/// A completion callback.
pub type DoneFn<'a> = &'a mut (dyn FnMut(&mut Transaction<'a>) -> Next + 'a);

/// The operations of a non-blocking I2C master.
pub trait I2cMaster<'a> {
    /// Starts writing `bytes_to_write` bytes of `write` to the device at
    /// `address` and then reading `bytes_to_read` bytes into `read`. Either
    /// count may be zero.
    ///
    /// Returns `false` without doing anything if another transaction is
    /// still running; try again later.
    fn start_write_and_read(
        &mut self,
        address: u8,
        bytes_to_write: usize,
        write: &'a [u8],
        bytes_to_read: usize,
        read: &'a mut [u8],
        done: Option<DoneFn<'a>>,
    ) -> bool;

    /// Runs another phase on the current record, e.g. after a callback has
    /// changed its counts.
    ///
    /// Also accepted right after a start, before the first bus event has
    /// been handled: the phase is restarted with `done` as its callback.
    /// Refused once the bus is mid-phase.
    fn continue_write_and_read(&mut self, done: Option<DoneFn<'a>>) -> bool;

    /// Handles at most one pending bus event and returns whether a
    /// transaction is still running.
    fn poll(&mut self) -> bool;

    fn start_write(&mut self, address: u8, write: &'a [u8], done: Option<DoneFn<'a>>) -> bool {
        self.start_write_and_read(address, write.len(), write, 0, Default::default(), done)
    }

    fn start_read(&mut self, address: u8, read: &'a mut [u8], done: Option<DoneFn<'a>>) -> bool {
        self.start_write_and_read(address, 0, &[], read.len(), read, done)
    }
}

/// I2C master state machine over a [`TwiPeripheral`].
pub struct Master<'a, H> {
    hw: H,
    busy: bool,
    /// A bus event of the current phase has been handled.
    started: bool,
    transaction: Transaction<'a>,
    done: Option<DoneFn<'a>>,
}

impl<'a, H> Master<'a, H> {
    pub fn new(hw: H) -> Self {
        Self {
            hw,
            busy: false,
            started: false,
            transaction: Transaction::new(0, 0, &[], 0, Default::default()),
            done: None,
        }
    }

    #[inline(always)]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The current or most recent transaction record.
    #[inline(always)]
    pub fn transaction(&self) -> &Transaction<'a> {
        &self.transaction
    }

    #[inline(always)]
    pub fn hardware(&self) -> &H {
        &self.hw
    }

    #[inline(always)]
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn release(self) -> H {
        self.hw
    }
}

impl<'a, H: TwiPeripheral> Master<'a, H> {
    /// Abandons the running transaction, releasing the bus. The completion
    /// callback is dropped without being called.
    pub fn stop(&mut self) {
        if self.busy {
            log::debug!("i2c: transaction to {:#04x} cancelled", self.transaction.address);
            self.hw.control(Control::Stop);
            self.busy = false;
        }
        self.done = None;
    }

    fn arm(&mut self, done: Option<DoneFn<'a>>) {
        self.busy = true;
        self.started = false;
        self.done = done;
        self.transaction.reset_progress();
        log::trace!(
            "i2c: {:#04x} W:{} R:{}",
            self.transaction.address,
            self.transaction.bytes_to_write,
            self.transaction.bytes_to_read
        );
        self.hw.control(Control::Start);
    }

    fn step(&mut self) {
        if !self.busy {
            return;
        }
        let Some(status) = self.hw.pending_status() else {
            return;
        };
        self.started = true;

        let control = self.transition(status);
        log::trace!("i2c: {status:#04x} -> {control:?}");
        self.hw.control(control);

        if control == Control::Stop {
            self.finish();
        }
    }

    fn transition(&mut self, status: u8) -> Control {
        let t = &mut self.transaction;
        match status {
            status::START | status::REP_START => {
                let read = t.write_done() && t.bytes_to_read > 0;
                self.hw.write_data(t.address << 1 | u8::from(read));
                Control::Transfer { ack: false }
            }
            status::MT_SLA_ACK | status::MT_DATA_ACK => {
                if !t.write_done() {
                    self.hw.write_data(t.write_buffer[t.bytes_written]);
                    t.bytes_written += 1;
                    Control::Transfer { ack: false }
                } else if t.bytes_to_read > 0 {
                    Control::Start
                } else {
                    Control::Stop
                }
            }
            status::MR_SLA_ACK if t.bytes_to_read > 0 => Control::Transfer {
                ack: t.bytes_to_read > 1,
            },
            status::MR_DATA_ACK if t.bytes_read < t.bytes_to_read => {
                t.read_buffer[t.bytes_read] = self.hw.read_data();
                t.bytes_read += 1;
                if t.bytes_read >= t.bytes_to_read {
                    // The device got an ACK for what should have been the
                    // final byte; nothing more fits.
                    Control::Stop
                } else {
                    Control::Transfer {
                        ack: t.bytes_read + 1 < t.bytes_to_read,
                    }
                }
            }
            status::MR_DATA_NACK if t.bytes_read < t.bytes_to_read => {
                t.read_buffer[t.bytes_read] = self.hw.read_data();
                t.bytes_read += 1;
                Control::Stop
            }
            _ => {
                t.error = Some(BusError { status });
                Control::Stop
            }
        }
    }

    fn finish(&mut self) {
        self.busy = false;
        if let Some(e) = self.transaction.error {
            log::warn!("i2c: transaction to {:#04x} aborted: {e}", self.transaction.address);
        }

        if let Some(done) = self.done.take() {
            if done(&mut self.transaction) == Next::Continue {
                self.arm(Some(done));
            }
        }
    }
}

impl<'a, H: TwiPeripheral> I2cMaster<'a> for Master<'a, H> {
    fn start_write_and_read(
        &mut self,
        address: u8,
        bytes_to_write: usize,
        write: &'a [u8],
        bytes_to_read: usize,
        read: &'a mut [u8],
        done: Option<DoneFn<'a>>,
    ) -> bool {
        if self.busy {
            log::debug!("i2c: busy, start to {address:#04x} rejected");
            return false;
        }

        self.transaction = Transaction::new(address, bytes_to_write, write, bytes_to_read, read);
        self.arm(done);
        true
    }

    fn continue_write_and_read(&mut self, done: Option<DoneFn<'a>>) -> bool {
        if self.busy && self.started {
            log::debug!("i2c: mid-phase, continue rejected");
            return false;
        }

        self.arm(done);
        true
    }

    fn poll(&mut self) -> bool {
        if self.busy {
            self.step();
        }
        self.busy
    }
}
