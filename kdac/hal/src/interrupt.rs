//! Interrupt controller abstraction

/// Interrupt request number in the vector table
pub type IrqNumber = u16;

/// The firmware's interrupt delivery substrate (NVIC or equivalent).
///
/// The DAC driver only masks, unmasks and pends its own line; vectoring to
/// the channel's interrupt entry is the surrounding firmware's job.
pub trait InterruptController {
    /// Unmask an interrupt line
    fn enable_interrupt(&mut self, irq: IrqNumber);

    /// Mask an interrupt line
    fn disable_interrupt(&mut self, irq: IrqNumber);

    /// Check if an interrupt line is unmasked
    fn is_enabled(&self, irq: IrqNumber) -> bool;

    /// Check if an interrupt request is pending
    fn is_pending(&self, irq: IrqNumber) -> bool;

    /// Raise a request on the line
    fn set_pending(&mut self, irq: IrqNumber);

    /// Clear a pending request
    fn clear_pending(&mut self, irq: IrqNumber);
}

impl<T: InterruptController + ?Sized> InterruptController for &mut T {
    fn enable_interrupt(&mut self, irq: IrqNumber) {
        (**self).enable_interrupt(irq)
    }

    fn disable_interrupt(&mut self, irq: IrqNumber) {
        (**self).disable_interrupt(irq)
    }

    fn is_enabled(&self, irq: IrqNumber) -> bool {
        (**self).is_enabled(irq)
    }

    fn is_pending(&self, irq: IrqNumber) -> bool {
        (**self).is_pending(irq)
    }

    fn set_pending(&mut self, irq: IrqNumber) {
        (**self).set_pending(irq)
    }

    fn clear_pending(&mut self, irq: IrqNumber) {
        (**self).clear_pending(irq)
    }
}
