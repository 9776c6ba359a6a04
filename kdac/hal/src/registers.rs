//! DAC register-level abstraction

use core::fmt;

use crate::interrupt::IrqNumber;

/// Number of DAC instances on the target family
pub const MAX_INSTANCES: u8 = 2;

/// Addressable data slots in the buffer (pointer positions `0..=16`)
pub const BUFFER_SLOTS: usize = 17;

/// Number of named control and status fields
pub const FIELD_COUNT: usize = 16;

/// Conversions are 12 bits wide; upper bits of a data word are ignored
pub const DATA_MASK: u16 = 0x0FFF;

/// Handle naming one physical DAC instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DacInstance(u8);

impl DacInstance {
    /// First DAC instance
    pub const DAC0: DacInstance = DacInstance(0);

    /// Second DAC instance
    pub const DAC1: DacInstance = DacInstance(1);

    /// Create an instance handle, returning the raw index back when it names
    /// no instance on this family.
    pub const fn new(index: u8) -> Result<Self, u8> {
        if index < MAX_INSTANCES {
            Ok(DacInstance(index))
        } else {
            Err(index)
        }
    }

    /// Zero-based instance index
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Interrupt request number of this instance in the vector table
    pub const fn irq(self) -> IrqNumber {
        match self.0 {
            0 => 81,
            _ => 82,
        }
    }

    /// Single-bit mask used by claim bookkeeping
    pub const fn mask(self) -> u8 {
        1 << self.0
    }
}

impl fmt::Display for DacInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DAC{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DacInstance {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "DAC{}", self.0);
    }
}

/// Named control and status fields of a DAC instance.
///
/// Bit positions are owned by the [`DacRegisters`] implementation. Values
/// passed through `read`/`write` are the field's own encoding: `0`/`1` for
/// flags, the raw mode, watermark or pointer value otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DacField {
    /// Converter enable (`C0.DACEN`)
    Enable,
    /// Reference voltage select (`C0.DACRFS`)
    ReferenceSelect,
    /// Software trigger selected as the trigger source (`C0.DACTRGSEL`)
    SoftwareTriggerSelect,
    /// Write-one software trigger strobe (`C0.DACSWTRG`)
    SoftwareTriggerStrobe,
    /// Buffer read pointer bottom interrupt enable (`C0.DACBBIEN`)
    BottomIrqEnable,
    /// Buffer read pointer top interrupt enable (`C0.DACBTIEN`)
    TopIrqEnable,
    /// Buffer watermark interrupt enable (`C0.DACBWIEN`)
    WatermarkIrqEnable,
    /// DMA request enable (`C1.DMAEN`)
    DmaEnable,
    /// Watermark select, words before the upper limit minus one (`C1.DACBFWM`)
    WatermarkSelect,
    /// Buffer work mode (`C1.DACBFMD`)
    BufferMode,
    /// Buffer enable (`C1.DACBFEN`)
    BufferEnable,
    /// Buffer read pointer (`C2.DACBFRP`)
    ReadPointer,
    /// Buffer upper limit (`C2.DACBFUP`)
    UpperLimit,
    /// Read pointer bottom flag (`SR.DACBFRPBF`)
    BottomFlag,
    /// Read pointer top flag (`SR.DACBFRPTF`)
    TopFlag,
    /// Watermark flag (`SR.DACBFWMF`)
    WatermarkFlag,
}

impl DacField {
    /// Every field, in register order
    pub const ALL: [DacField; FIELD_COUNT] = [
        DacField::Enable,
        DacField::ReferenceSelect,
        DacField::SoftwareTriggerSelect,
        DacField::SoftwareTriggerStrobe,
        DacField::BottomIrqEnable,
        DacField::TopIrqEnable,
        DacField::WatermarkIrqEnable,
        DacField::DmaEnable,
        DacField::WatermarkSelect,
        DacField::BufferMode,
        DacField::BufferEnable,
        DacField::ReadPointer,
        DacField::UpperLimit,
        DacField::BottomFlag,
        DacField::TopFlag,
        DacField::WatermarkFlag,
    ];

    /// Position of this field in [`DacField::ALL`]
    pub const fn ordinal(self) -> usize {
        self as usize
    }
}

/// Register interface of one DAC instance.
///
/// Writes are assumed to always succeed; there is no transient failure at
/// this layer.
pub trait DacRegisters {
    /// Instance these registers belong to
    fn instance(&self) -> DacInstance;

    /// Read a control or status field
    fn read(&self, field: DacField) -> u8;

    /// Write a control or status field
    fn write(&mut self, field: DacField, value: u8);

    /// Read the data word stored in a buffer slot
    fn read_data(&self, slot: u8) -> u16;

    /// Store a data word in a buffer slot
    fn write_data(&mut self, slot: u8, value: u16);

    /// Write a flag field from a `bool`
    fn set_flag(&mut self, field: DacField, on: bool) {
        self.write(field, u8::from(on));
    }

    /// Read a flag field as a `bool`
    fn flag(&self, field: DacField) -> bool {
        self.read(field) != 0
    }
}

impl<T: DacRegisters + ?Sized> DacRegisters for &mut T {
    fn instance(&self) -> DacInstance {
        (**self).instance()
    }

    fn read(&self, field: DacField) -> u8 {
        (**self).read(field)
    }

    fn write(&mut self, field: DacField, value: u8) {
        (**self).write(field, value)
    }

    fn read_data(&self, slot: u8) -> u16 {
        (**self).read_data(slot)
    }

    fn write_data(&mut self, slot: u8, value: u16) {
        (**self).write_data(slot, value)
    }
}
