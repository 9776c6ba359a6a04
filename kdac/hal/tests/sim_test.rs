//! Simulated register file tests for kdac-hal

use kdac_hal::sim::{SimDac, SimNvic};
use kdac_hal::{DacField, DacInstance, DacRegisters, InterruptController};

#[test]
fn test_fields_start_at_reset_value() {
    let dac = SimDac::new(DacInstance::DAC0);
    for field in DacField::ALL {
        assert_eq!(dac.read(field), 0, "{field:?} not reset");
    }
    assert_eq!(dac.write_count(), 0);
}

#[test]
fn test_flag_helpers() {
    let mut dac = SimDac::new(DacInstance::DAC1);
    dac.set_flag(DacField::BufferEnable, true);
    assert!(dac.flag(DacField::BufferEnable));
    assert_eq!(dac.read(DacField::BufferEnable), 1);

    dac.set_flag(DacField::BufferEnable, false);
    assert!(!dac.flag(DacField::BufferEnable));
}

#[test]
fn test_data_slots_are_independent() {
    let mut dac = SimDac::new(DacInstance::DAC0);
    dac.write_data(0, 0x100);
    dac.write_data(16, 0xABC);

    assert_eq!(dac.read_data(0), 0x100);
    assert_eq!(dac.read_data(1), 0);
    assert_eq!(dac.read_data(16), 0xABC);
}

#[test]
fn test_access_through_mut_reference() {
    fn program<R: DacRegisters>(mut regs: R) -> DacInstance {
        regs.write(DacField::UpperLimit, 7);
        regs.instance()
    }

    let mut dac = SimDac::new(DacInstance::DAC0);
    assert_eq!(program(&mut dac), DacInstance::DAC0);
    assert_eq!(dac.read(DacField::UpperLimit), 7);
}

#[test]
fn test_nvic_masking() {
    let mut nvic = SimNvic::new();
    nvic.enable_interrupt(DacInstance::DAC0.irq());
    assert!(nvic.is_enabled(81));
    assert!(!nvic.is_enabled(82));

    nvic.disable_interrupt(DacInstance::DAC0.irq());
    assert!(!nvic.is_enabled(81));
}
