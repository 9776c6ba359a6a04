//! Sharing a channel between thread mode and its interrupt handler

use core::cell::RefCell;

use critical_section::Mutex;
use kdac_hal::{DacRegisters, InterruptController};

use crate::channel::DacChannel;
use crate::config::IrqMask;
use crate::error::{DacResult, StateError};
use crate::pointer::Fired;

/// A [`DacChannel`] that can live in a `static`.
///
/// Every access runs inside a critical section, so reconfiguration from
/// thread mode can never interleave with an advance or a callback dispatch
/// running in the interrupt handler.
///
/// ```ignore
/// static DAC0: SharedDac<Dac0Regs, Nvic> = SharedDac::new();
///
/// #[interrupt]
/// fn DAC0() {
///     DAC0.on_interrupt();
/// }
/// ```
pub struct SharedDac<R, I> {
    inner: Mutex<RefCell<Option<DacChannel<R, I>>>>,
}

impl<R, I> SharedDac<R, I>
where
    R: DacRegisters,
    I: InterruptController,
{
    /// Empty slot; install a channel before use
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Put a channel in the slot, returning the one it replaces
    pub fn install(&self, channel: DacChannel<R, I>) -> Option<DacChannel<R, I>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).replace(channel))
    }

    /// Remove the channel from the slot
    pub fn take(&self) -> Option<DacChannel<R, I>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }

    /// Run `f` on the installed channel, or return `None` if the slot is empty.
    pub fn with<F, T>(&self, f: F) -> Option<T>
    where
        F: FnOnce(&mut DacChannel<R, I>) -> T,
    {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).as_mut().map(f))
    }

    /// Interrupt entry for the installed channel
    pub fn on_interrupt(&self) -> IrqMask {
        self.with(|ch| ch.on_interrupt()).unwrap_or(IrqMask::NONE)
    }

    /// Hardware advance entry for the installed channel
    pub fn advance(&self) -> DacResult<Fired> {
        self.with(|ch| ch.advance())
            .unwrap_or(Err(StateError::NotActive.into()))
    }
}

impl<R, I> Default for SharedDac<R, I>
where
    R: DacRegisters,
    I: InterruptController,
{
    fn default() -> Self {
        Self::new()
    }
}
