//! Software models of the DAC register file and interrupt controller
//!
//! These let the channel driver run on the host. Field values are stored
//! verbatim; nothing here reproduces conversion timing.

use crate::interrupt::{InterruptController, IrqNumber};
use crate::registers::{DacField, DacInstance, DacRegisters, BUFFER_SLOTS, FIELD_COUNT};

/// Simulated register file of one DAC instance
#[derive(Debug, Clone)]
pub struct SimDac {
    instance: DacInstance,
    fields: [u8; FIELD_COUNT],
    data: [u16; BUFFER_SLOTS],
    writes: usize,
}

impl SimDac {
    /// Register file in its reset state
    pub const fn new(instance: DacInstance) -> Self {
        Self {
            instance,
            fields: [0; FIELD_COUNT],
            data: [0; BUFFER_SLOTS],
            writes: 0,
        }
    }

    /// Number of field and data writes performed so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Snapshot of every field value, indexed by [`DacField::ordinal`]
    pub fn fields(&self) -> [u8; FIELD_COUNT] {
        self.fields
    }
}

impl DacRegisters for SimDac {
    fn instance(&self) -> DacInstance {
        self.instance
    }

    fn read(&self, field: DacField) -> u8 {
        self.fields[field.ordinal()]
    }

    fn write(&mut self, field: DacField, value: u8) {
        self.writes += 1;
        // The strobe reads back as zero on hardware
        if field != DacField::SoftwareTriggerStrobe {
            self.fields[field.ordinal()] = value;
        }
    }

    fn read_data(&self, slot: u8) -> u16 {
        self.data.get(usize::from(slot)).copied().unwrap_or(0)
    }

    fn write_data(&mut self, slot: u8, value: u16) {
        self.writes += 1;
        if let Some(word) = self.data.get_mut(usize::from(slot)) {
            *word = value;
        }
    }
}

/// Simulated interrupt controller covering lines `0..128`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimNvic {
    enabled: u128,
    pending: u128,
}

impl SimNvic {
    /// Controller with every line masked and nothing pending
    pub const fn new() -> Self {
        Self {
            enabled: 0,
            pending: 0,
        }
    }

    fn bit(irq: IrqNumber) -> u128 {
        if irq < 128 {
            1u128 << irq
        } else {
            0
        }
    }
}

impl InterruptController for SimNvic {
    fn enable_interrupt(&mut self, irq: IrqNumber) {
        self.enabled |= Self::bit(irq);
    }

    fn disable_interrupt(&mut self, irq: IrqNumber) {
        self.enabled &= !Self::bit(irq);
    }

    fn is_enabled(&self, irq: IrqNumber) -> bool {
        self.enabled & Self::bit(irq) != 0
    }

    fn is_pending(&self, irq: IrqNumber) -> bool {
        self.pending & Self::bit(irq) != 0
    }

    fn set_pending(&mut self, irq: IrqNumber) {
        self.pending |= Self::bit(irq);
    }

    fn clear_pending(&mut self, irq: IrqNumber) {
        self.pending &= !Self::bit(irq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strobe_reads_back_zero() {
        let mut dac = SimDac::new(DacInstance::DAC0);
        dac.write(DacField::SoftwareTriggerStrobe, 1);
        assert_eq!(dac.read(DacField::SoftwareTriggerStrobe), 0);
        assert_eq!(dac.write_count(), 1);
    }

    #[test]
    fn test_out_of_range_slot_is_ignored() {
        let mut dac = SimDac::new(DacInstance::DAC1);
        dac.write_data(BUFFER_SLOTS as u8, 0x123);
        assert_eq!(dac.read_data(BUFFER_SLOTS as u8), 0);
    }

    #[test]
    fn test_nvic_pending_cycle() {
        let mut nvic = SimNvic::new();
        nvic.set_pending(81);
        assert!(nvic.is_pending(81));
        assert!(!nvic.is_pending(82));
        nvic.clear_pending(81);
        assert!(!nvic.is_pending(81));
    }
}
