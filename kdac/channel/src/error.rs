//! Error types for DAC channel operations

use kdac_hal::DacInstance;
use thiserror::Error;

use crate::config::IrqSource;

/// Result type used throughout the driver
pub type DacResult<T> = Result<T, DacError>;

/// Errors reported by the channel controller.
///
/// Every error is detected before any register is written, so a failed call
/// leaves the channel exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DacError {
    /// The configuration is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// The call is not valid in the channel's current state
    #[error("state error: {0}")]
    State(#[from] StateError),
    /// The instance is already claimed by another channel
    #[error("{0} is unavailable")]
    HardwareUnavailable(DacInstance),
}

/// Which configuration field was rejected, and why
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `buffer_ceiling` outside `1..=16`
    #[error("buffer ceiling {0} outside 1..=16")]
    CeilingOutOfRange(u8),
    /// The watermark zone would reach below position 1
    #[error("watermark offset {offset} exceeds buffer ceiling {ceiling}")]
    WatermarkBeyondCeiling { offset: u8, ceiling: u8 },
    /// An interrupt is armed without a callback to deliver it to
    #[error("{0} interrupt armed without a callback")]
    UnboundCallback(IrqSource),
    /// The configuration names a different instance than the channel drives
    #[error("configuration targets {found}, channel drives {expected}")]
    TargetMismatch {
        expected: DacInstance,
        found: DacInstance,
    },
    /// No DAC instance with this index exists
    #[error("no DAC instance {0}")]
    UnsupportedInstance(u8),
}

/// Operation rejected because of the channel's runtime state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    /// `activate` on a channel that is already active
    #[error("channel already active")]
    AlreadyActive,
    /// Operation needs an active channel
    #[error("channel not active")]
    NotActive,
    /// Software trigger was not enabled at activation
    #[error("software trigger disabled")]
    TriggerDisabled,
    /// Data slot beyond the buffer ceiling
    #[error("slot {slot} beyond buffer ceiling {ceiling}")]
    SlotOutOfRange { slot: u8, ceiling: u8 },
    /// More samples than the buffer holds
    #[error("{count} samples exceed buffer capacity {capacity}")]
    CountOutOfRange { count: usize, capacity: usize },
}

#[cfg(feature = "defmt")]
impl defmt::Format for DacError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            DacError::Config(e) => defmt::write!(fmt, "Config({})", e),
            DacError::State(e) => defmt::write!(fmt, "State({})", e),
            DacError::HardwareUnavailable(i) => defmt::write!(fmt, "HardwareUnavailable({})", i),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ConfigError::CeilingOutOfRange(c) => defmt::write!(fmt, "CeilingOutOfRange({})", c),
            ConfigError::WatermarkBeyondCeiling { offset, ceiling } => {
                defmt::write!(fmt, "WatermarkBeyondCeiling({}, {})", offset, ceiling)
            }
            ConfigError::UnboundCallback(s) => defmt::write!(fmt, "UnboundCallback({})", s),
            ConfigError::TargetMismatch { expected, found } => {
                defmt::write!(fmt, "TargetMismatch({}, {})", expected, found)
            }
            ConfigError::UnsupportedInstance(i) => defmt::write!(fmt, "UnsupportedInstance({})", i),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StateError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            StateError::AlreadyActive => defmt::write!(fmt, "AlreadyActive"),
            StateError::NotActive => defmt::write!(fmt, "NotActive"),
            StateError::TriggerDisabled => defmt::write!(fmt, "TriggerDisabled"),
            StateError::SlotOutOfRange { slot, ceiling } => {
                defmt::write!(fmt, "SlotOutOfRange({}, {})", slot, ceiling)
            }
            StateError::CountOutOfRange { count, capacity } => {
                defmt::write!(fmt, "CountOutOfRange({}, {})", count, capacity)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        let err: DacError = ConfigError::CeilingOutOfRange(0).into();
        assert_eq!(err, DacError::Config(ConfigError::CeilingOutOfRange(0)));

        let err: DacError = StateError::TriggerDisabled.into();
        assert_eq!(err, DacError::State(StateError::TriggerDisabled));
    }
}
