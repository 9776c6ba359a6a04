//! Channel configuration and its static validation

use core::fmt;

use kdac_hal::DacInstance;

use crate::error::ConfigError;

/// Smallest valid buffer ceiling
pub const MIN_CEILING: u8 = 1;

/// Largest valid buffer ceiling
pub const MAX_CEILING: u8 = 16;

/// Zero-argument interrupt callback.
///
/// Runs in interrupt context inside a critical section: it must not block
/// and must not call back into the channel it was registered with.
pub type Callback = fn();

/// Buffer wrap policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferMode {
    /// Pointer wraps to 0 after the ceiling
    #[default]
    Normal,
    /// Pointer bounces between 0 and the ceiling
    Swing,
    /// Pointer stops at the ceiling until reactivated
    OneTimeScan,
}

impl BufferMode {
    /// Encoding of the mode in the `BufferMode` register field
    pub const fn bits(self) -> u8 {
        match self {
            BufferMode::Normal => 0,
            BufferMode::Swing => 1,
            BufferMode::OneTimeScan => 2,
        }
    }
}

/// Distance of the watermark from the buffer ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Watermark {
    #[default]
    Words1,
    Words2,
    Words3,
    Words4,
}

impl Watermark {
    /// Offset in words below the ceiling (1..=4)
    pub const fn words(self) -> u8 {
        match self {
            Watermark::Words1 => 1,
            Watermark::Words2 => 2,
            Watermark::Words3 => 3,
            Watermark::Words4 => 4,
        }
    }

    /// Encoding in the `WatermarkSelect` register field
    pub const fn bits(self) -> u8 {
        self.words() - 1
    }

    /// First pointer position of the watermark zone for `ceiling`
    pub const fn zone_start(self, ceiling: u8) -> u8 {
        ceiling + 1 - self.words()
    }
}

/// Interrupt event categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqSource {
    /// Read pointer reached the bottom (ceiling) of the buffer
    Bottom,
    /// Read pointer reached the top (position 0) of the buffer
    Top,
    /// Read pointer entered the watermark zone
    Watermark,
}

impl IrqSource {
    /// Dispatch order within one interrupt
    pub const ALL: [IrqSource; 3] = [IrqSource::Bottom, IrqSource::Top, IrqSource::Watermark];

    pub(crate) const fn slot(self) -> usize {
        match self {
            IrqSource::Bottom => 0,
            IrqSource::Top => 1,
            IrqSource::Watermark => 2,
        }
    }
}

impl fmt::Display for IrqSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrqSource::Bottom => write!(f, "bottom"),
            IrqSource::Top => write!(f, "top"),
            IrqSource::Watermark => write!(f, "watermark"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for IrqSource {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            IrqSource::Bottom => defmt::write!(fmt, "Bottom"),
            IrqSource::Top => defmt::write!(fmt, "Top"),
            IrqSource::Watermark => defmt::write!(fmt, "Watermark"),
        }
    }
}

/// Set of armed interrupt categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IrqMask(u8);

impl IrqMask {
    /// Nothing armed
    pub const NONE: IrqMask = IrqMask(0);

    /// Mask containing a single source
    pub const fn of(source: IrqSource) -> Self {
        IrqMask(1 << source.slot())
    }

    pub const fn contains(self, source: IrqSource) -> bool {
        self.0 & (1 << source.slot()) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn with(self, source: IrqSource) -> Self {
        IrqMask(self.0 | (1 << source.slot()))
    }

    pub const fn without(self, source: IrqSource) -> Self {
        IrqMask(self.0 & !(1 << source.slot()))
    }

    pub const fn union(self, other: IrqMask) -> Self {
        IrqMask(self.0 | other.0)
    }

    pub const fn difference(self, other: IrqMask) -> Self {
        IrqMask(self.0 & !other.0)
    }
}

/// Configuration of one DAC channel.
///
/// Borrowed by every controller call and never retained. Changing it while
/// the channel is active has no effect and is not supported: deactivate
/// first, then activate with the new configuration.
#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig {
    pub target: DacInstance,
    pub buffer_enabled: bool,
    /// Only meaningful with `buffer_enabled`
    pub buffer_mode: BufferMode,
    /// Only meaningful with `buffer_enabled`
    pub watermark: Watermark,
    pub dma_enabled: bool,
    /// Inclusive upper bound of pointer positions, `1..=16`
    pub buffer_ceiling: u8,
    pub software_trigger_enabled: bool,
    pub bottom_irq_enabled: bool,
    pub top_irq_enabled: bool,
    pub watermark_irq_enabled: bool,
    pub bottom_callback: Option<Callback>,
    pub top_callback: Option<Callback>,
    pub watermark_callback: Option<Callback>,
}

impl ChannelConfig {
    /// Configuration with every optional field at its default
    pub const fn new(target: DacInstance) -> Self {
        Self {
            target,
            buffer_enabled: false,
            buffer_mode: BufferMode::Normal,
            watermark: Watermark::Words1,
            dma_enabled: false,
            buffer_ceiling: MIN_CEILING,
            software_trigger_enabled: false,
            bottom_irq_enabled: false,
            top_irq_enabled: false,
            watermark_irq_enabled: false,
            bottom_callback: None,
            top_callback: None,
            watermark_callback: None,
        }
    }

    /// Creates a configuration builder for `target`.
    pub const fn builder(target: DacInstance) -> ChannelConfigBuilder {
        ChannelConfigBuilder {
            config: ChannelConfig::new(target),
        }
    }

    /// Builder for a raw instance index, failing if no such instance exists.
    pub fn for_index(index: u8) -> Result<ChannelConfigBuilder, ConfigError> {
        DacInstance::new(index)
            .map(Self::builder)
            .map_err(ConfigError::UnsupportedInstance)
    }

    /// Interrupt categories this configuration asks to arm
    pub fn requested_irqs(&self) -> IrqMask {
        let mut mask = IrqMask::NONE;
        if self.bottom_irq_enabled {
            mask = mask.with(IrqSource::Bottom);
        }
        if self.top_irq_enabled {
            mask = mask.with(IrqSource::Top);
        }
        if self.watermark_irq_enabled {
            mask = mask.with(IrqSource::Watermark);
        }
        mask
    }

    /// Callback bound to a category
    pub fn callback(&self, source: IrqSource) -> Option<Callback> {
        match source {
            IrqSource::Bottom => self.bottom_callback,
            IrqSource::Top => self.top_callback,
            IrqSource::Watermark => self.watermark_callback,
        }
    }

    /// Check that every requested interrupt has a callback.
    pub fn validate_irqs(&self) -> Result<(), ConfigError> {
        let requested = self.requested_irqs();
        for source in IrqSource::ALL {
            if requested.contains(source) && self.callback(source).is_none() {
                return Err(ConfigError::UnboundCallback(source));
            }
        }
        Ok(())
    }

    /// Static checks performed before activation touches any register.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_enabled {
            if !(MIN_CEILING..=MAX_CEILING).contains(&self.buffer_ceiling) {
                return Err(ConfigError::CeilingOutOfRange(self.buffer_ceiling));
            }
            if self.watermark.words() > self.buffer_ceiling {
                return Err(ConfigError::WatermarkBeyondCeiling {
                    offset: self.watermark.words(),
                    ceiling: self.buffer_ceiling,
                });
            }
        }
        self.validate_irqs()
    }
}

/// Builder for ergonomic channel configuration construction.
#[derive(Debug, Clone, Copy)]
pub struct ChannelConfigBuilder {
    config: ChannelConfig,
}

impl ChannelConfigBuilder {
    /// Enables the buffer with the given wrap policy and ceiling.
    pub fn buffer(mut self, mode: BufferMode, ceiling: u8) -> Self {
        self.config.buffer_enabled = true;
        self.config.buffer_mode = mode;
        self.config.buffer_ceiling = ceiling;
        self
    }

    /// Sets the watermark distance from the ceiling.
    pub fn watermark(mut self, watermark: Watermark) -> Self {
        self.config.watermark = watermark;
        self
    }

    /// Delegates buffer refill to DMA.
    pub fn dma(mut self, enabled: bool) -> Self {
        self.config.dma_enabled = enabled;
        self
    }

    /// Allows software triggers.
    pub fn software_trigger(mut self, enabled: bool) -> Self {
        self.config.software_trigger_enabled = enabled;
        self
    }

    /// Binds a callback and arms its interrupt.
    pub fn on(mut self, source: IrqSource, callback: Callback) -> Self {
        match source {
            IrqSource::Bottom => {
                self.config.bottom_callback = Some(callback);
                self.config.bottom_irq_enabled = true;
            }
            IrqSource::Top => {
                self.config.top_callback = Some(callback);
                self.config.top_irq_enabled = true;
            }
            IrqSource::Watermark => {
                self.config.watermark_callback = Some(callback);
                self.config.watermark_irq_enabled = true;
            }
        }
        self
    }

    /// Builds the channel configuration.
    pub fn build(self) -> ChannelConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() {}

    #[test]
    fn test_defaults() {
        let config = ChannelConfig::new(DacInstance::DAC0);
        assert!(!config.buffer_enabled);
        assert_eq!(config.buffer_mode, BufferMode::Normal);
        assert_eq!(config.watermark, Watermark::Words1);
        assert_eq!(config.buffer_ceiling, 1);
        assert!(config.requested_irqs().is_empty());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_ceiling_range() {
        for ceiling in [0u8, 17, 255] {
            let config = ChannelConfig::builder(DacInstance::DAC0)
                .buffer(BufferMode::Normal, ceiling)
                .build();
            assert_eq!(config.validate(), Err(ConfigError::CeilingOutOfRange(ceiling)));
        }
        for ceiling in MIN_CEILING..=MAX_CEILING {
            let config = ChannelConfig::builder(DacInstance::DAC0)
                .buffer(BufferMode::Swing, ceiling)
                .build();
            assert_eq!(config.validate(), Ok(()));
        }
    }

    #[test]
    fn test_ceiling_ignored_without_buffer() {
        let mut config = ChannelConfig::new(DacInstance::DAC1);
        config.buffer_ceiling = 0;
        config.watermark = Watermark::Words4;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_watermark_beyond_ceiling() {
        let config = ChannelConfig::builder(DacInstance::DAC0)
            .buffer(BufferMode::Normal, 2)
            .watermark(Watermark::Words3)
            .build();
        assert_eq!(
            config.validate(),
            Err(ConfigError::WatermarkBeyondCeiling { offset: 3, ceiling: 2 })
        );
    }

    #[test]
    fn test_armed_without_callback() {
        let mut config = ChannelConfig::new(DacInstance::DAC0);
        config.top_irq_enabled = true;
        assert_eq!(config.validate(), Err(ConfigError::UnboundCallback(IrqSource::Top)));

        config.top_callback = Some(noop);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_builder_binds_and_arms() {
        let config = ChannelConfig::builder(DacInstance::DAC1)
            .on(IrqSource::Watermark, noop)
            .build();
        assert!(config.watermark_irq_enabled);
        assert!(config.callback(IrqSource::Watermark).is_some());
        assert_eq!(config.requested_irqs(), IrqMask::of(IrqSource::Watermark));
    }

    #[test]
    fn test_for_index() {
        assert!(ChannelConfig::for_index(1).is_ok());
        assert_eq!(
            ChannelConfig::for_index(5).err(),
            Some(ConfigError::UnsupportedInstance(5))
        );
    }

    #[test]
    fn test_watermark_zone() {
        assert_eq!(Watermark::Words1.zone_start(3), 3);
        assert_eq!(Watermark::Words4.zone_start(4), 1);
        assert_eq!(Watermark::Words2.bits(), 1);
    }

    #[test]
    fn test_irq_mask_ops() {
        let mask = IrqMask::NONE.with(IrqSource::Bottom).with(IrqSource::Top);
        assert!(mask.contains(IrqSource::Bottom));
        assert!(!mask.contains(IrqSource::Watermark));
        assert_eq!(mask.without(IrqSource::Top), IrqMask::of(IrqSource::Bottom));
        assert_eq!(mask.difference(IrqMask::of(IrqSource::Bottom)), IrqMask::of(IrqSource::Top));
    }
}
