//! DAC channel controller
//!
//! [`DacChannel`] owns the register interface and interrupt controller of one
//! DAC instance. It turns a [`ChannelConfig`] into register values, runs the
//! buffer-pointer state machine on every consumed sample, latches boundary
//! events into the status flags and dispatches them to the bound callbacks
//! from [`DacChannel::on_interrupt`].
//!
//! Every fallible call validates first and writes second: an `Err` means no
//! register was touched.

use kdac_hal::{DacField, DacInstance, DacRegisters, InterruptController, DATA_MASK};

use crate::claims::{Claim, ClaimRegistry, CLAIMS};
use crate::config::{BufferMode, Callback, ChannelConfig, IrqMask, IrqSource, Watermark};
use crate::error::{ConfigError, DacError, DacResult, StateError};
use crate::pointer::{BufferPointer, Fired};

/// `ReferenceSelect` value picking DACREF_2 (VDDA)
const REFERENCE_VDDA: u8 = 1;

const fn flag_field(source: IrqSource) -> DacField {
    match source {
        IrqSource::Bottom => DacField::BottomFlag,
        IrqSource::Top => DacField::TopFlag,
        IrqSource::Watermark => DacField::WatermarkFlag,
    }
}

const fn enable_field(source: IrqSource) -> DacField {
    match source {
        IrqSource::Bottom => DacField::BottomIrqEnable,
        IrqSource::Top => DacField::TopIrqEnable,
        IrqSource::Watermark => DacField::WatermarkIrqEnable,
    }
}

#[derive(Debug, Clone, Copy)]
struct BufferState {
    mode: BufferMode,
    ceiling: u8,
    watermark: Watermark,
    pointer: BufferPointer,
}

#[derive(Debug, Clone, Copy)]
struct ActiveState {
    buffer: Option<BufferState>,
    software_trigger: bool,
    armed: IrqMask,
    callbacks: [Option<Callback>; 3],
}

impl ActiveState {
    /// Highest addressable slot: the ceiling, or 0 when unbuffered
    fn ceiling(&self) -> u8 {
        self.buffer.map_or(0, |b| b.ceiling)
    }
}

/// Controller for one DAC instance.
///
/// Dropping an active channel releases its instance but leaves the hardware
/// running; use [`deactivate`](Self::deactivate) or [`free`](Self::free) to
/// quiesce it first.
pub struct DacChannel<R, I> {
    regs: R,
    nvic: I,
    claims: &'static ClaimRegistry,
    claim: Option<Claim>,
    active: Option<ActiveState>,
    last_output: u16,
}

impl<R, I> DacChannel<R, I>
where
    R: DacRegisters,
    I: InterruptController,
{
    /// Create an inactive channel claiming through the global [`CLAIMS`] registry
    pub fn new(regs: R, nvic: I) -> Self {
        Self::with_claims(regs, nvic, &CLAIMS)
    }

    /// Create an inactive channel claiming through `claims`
    pub fn with_claims(regs: R, nvic: I, claims: &'static ClaimRegistry) -> Self {
        Self {
            regs,
            nvic,
            claims,
            claim: None,
            active: None,
            last_output: 0,
        }
    }

    /// Instance driven by this channel
    pub fn instance(&self) -> DacInstance {
        self.regs.instance()
    }

    fn check_target(&self, config: &ChannelConfig) -> Result<(), ConfigError> {
        let expected = self.instance();
        if config.target == expected {
            Ok(())
        } else {
            Err(ConfigError::TargetMismatch {
                expected,
                found: config.target,
            })
        }
    }

    fn state(&self) -> Result<&ActiveState, StateError> {
        self.active.as_ref().ok_or(StateError::NotActive)
    }

    /// Validate `config`, claim the instance and program it.
    ///
    /// Nothing is written unless every check passes.
    pub fn activate(&mut self, config: &ChannelConfig) -> DacResult<()> {
        if self.active.is_some() {
            return Err(StateError::AlreadyActive.into());
        }
        self.check_target(config)?;
        config.validate()?;

        let instance = self.instance();
        let Some(claim) = self.claims.claim(instance) else {
            log::warn!("{}: already claimed by another channel", instance);
            return Err(DacError::HardwareUnavailable(instance));
        };

        let buffer = config.buffer_enabled.then(|| BufferState {
            mode: config.buffer_mode,
            ceiling: config.buffer_ceiling,
            watermark: config.watermark,
            pointer: BufferPointer::new(),
        });
        // The software trigger only takes effect on a buffered channel
        let software_trigger = config.software_trigger_enabled && buffer.is_some();
        let state = ActiveState {
            buffer,
            software_trigger,
            armed: config.requested_irqs(),
            callbacks: IrqSource::ALL.map(|source| config.callback(source)),
        };

        let regs = &mut self.regs;
        regs.set_flag(DacField::BufferEnable, buffer.is_some());
        regs.write(DacField::BufferMode, buffer.map_or(0, |b| b.mode.bits()));
        regs.write(DacField::WatermarkSelect, buffer.map_or(0, |b| b.watermark.bits()));
        regs.write(DacField::UpperLimit, buffer.map_or(0, |b| b.ceiling));
        regs.write(DacField::ReadPointer, 0);
        regs.set_flag(DacField::DmaEnable, config.dma_enabled);
        regs.set_flag(DacField::SoftwareTriggerSelect, software_trigger);
        for source in IrqSource::ALL {
            regs.set_flag(flag_field(source), false);
        }
        regs.write(DacField::ReferenceSelect, REFERENCE_VDDA);
        regs.set_flag(DacField::Enable, true);

        self.claim = Some(claim);
        self.active = Some(state);
        self.last_output = 0;
        self.program_irqs(state.armed);

        match buffer {
            Some(b) => log::debug!(
                "{}: activated, {:?} buffer, ceiling {}, watermark {}",
                instance,
                b.mode,
                b.ceiling,
                b.watermark.words()
            ),
            None => log::debug!("{}: activated, unbuffered", instance),
        }
        Ok(())
    }

    /// Disarm, drain and disable the channel, then release its instance.
    ///
    /// Calling this on an inactive channel succeeds and does nothing. Once it
    /// returns no callback of this channel runs again.
    pub fn deactivate(&mut self, config: &ChannelConfig) -> DacResult<()> {
        self.check_target(config)?;
        if self.active.is_none() {
            return Ok(());
        }
        self.teardown();
        Ok(())
    }

    fn teardown(&mut self) {
        let instance = self.instance();
        let irq = instance.irq();

        // Disarm first so nothing new is requested, then drain what is latched
        for source in IrqSource::ALL {
            self.regs.set_flag(enable_field(source), false);
        }
        self.nvic.disable_interrupt(irq);
        for source in IrqSource::ALL {
            self.regs.set_flag(flag_field(source), false);
        }
        self.nvic.clear_pending(irq);
        self.active = None;

        self.regs.set_flag(DacField::DmaEnable, false);
        self.regs.set_flag(DacField::SoftwareTriggerSelect, false);
        self.regs.set_flag(DacField::BufferEnable, false);
        self.regs.write(DacField::ReadPointer, 0);
        self.regs.set_flag(DacField::Enable, false);

        self.claim = None;
        log::debug!("{}: deactivated", instance);
    }

    /// Bind the configured callbacks and arm every category `config` requests.
    ///
    /// Categories already armed stay armed. Buffer settings and pointer state
    /// are left alone.
    pub fn enable_irq(&mut self, config: &ChannelConfig) -> DacResult<()> {
        self.check_target(config)?;
        let state = self.active.as_mut().ok_or(StateError::NotActive)?;
        config.validate_irqs()?;

        let requested = config.requested_irqs();
        for source in IrqSource::ALL {
            if requested.contains(source) {
                state.callbacks[source.slot()] = config.callback(source);
            }
        }
        state.armed = state.armed.union(requested);
        let armed = state.armed;

        self.program_irqs(armed);
        log::debug!("{}: armed {:?}", self.instance(), armed);
        Ok(())
    }

    /// Disarm every category `config` flags; the rest stay armed.
    pub fn disable_irq(&mut self, config: &ChannelConfig) -> DacResult<()> {
        self.check_target(config)?;
        let state = self.active.as_mut().ok_or(StateError::NotActive)?;
        state.armed = state.armed.difference(config.requested_irqs());
        let armed = state.armed;

        self.program_irqs(armed);
        if armed.is_empty() {
            self.nvic.clear_pending(self.instance().irq());
        }
        log::debug!("{}: armed {:?}", self.instance(), armed);
        Ok(())
    }

    fn program_irqs(&mut self, armed: IrqMask) {
        for source in IrqSource::ALL {
            self.regs.set_flag(enable_field(source), armed.contains(source));
        }
        let irq = self.instance().irq();
        if armed.is_empty() {
            self.nvic.disable_interrupt(irq);
        } else {
            self.nvic.enable_interrupt(irq);
        }
    }

    fn check_slot(&self, slot: u8) -> DacResult<()> {
        let ceiling = self.state()?.ceiling();
        if slot > ceiling {
            return Err(StateError::SlotOutOfRange { slot, ceiling }.into());
        }
        Ok(())
    }

    /// Stage one sample in `slot`, which must not exceed the buffer ceiling.
    pub fn set_buffer_data_n(&mut self, value: u16, slot: u8) -> DacResult<()> {
        if let Err(err) = self.check_slot(slot) {
            log::warn!("{}: rejected write to slot {}", self.instance(), slot);
            return Err(err);
        }
        self.regs.write_data(slot, value & DATA_MASK);
        Ok(())
    }

    /// Stage `values` from slot 0 onwards.
    ///
    /// Fails without writing anything if there are more values than slots up
    /// to the ceiling.
    pub fn set_buffer_data(&mut self, values: &[u16]) -> DacResult<()> {
        let capacity = usize::from(self.state()?.ceiling()) + 1;
        if values.len() > capacity {
            log::warn!("{}: {} samples for {} slots", self.instance(), values.len(), capacity);
            return Err(StateError::CountOutOfRange {
                count: values.len(),
                capacity,
            }
            .into());
        }
        for (slot, value) in (0u8..).zip(values) {
            self.regs.write_data(slot, value & DATA_MASK);
        }
        Ok(())
    }

    /// Read back a staged sample
    pub fn buffer_data(&self, slot: u8) -> DacResult<u16> {
        self.check_slot(slot)?;
        Ok(self.regs.read_data(slot))
    }

    /// Fire one conversion by software.
    ///
    /// Only allowed if the channel was activated with both the buffer and the
    /// software trigger enabled. Callbacks are not run here; armed events pend the interrupt
    /// line and are delivered by [`on_interrupt`](Self::on_interrupt).
    pub fn software_trigger(&mut self) -> DacResult<()> {
        if !self.state()?.software_trigger {
            log::warn!("{}: software trigger not enabled", self.instance());
            return Err(StateError::TriggerDisabled.into());
        }
        self.regs.write(DacField::SoftwareTriggerStrobe, 1);
        self.convert();
        Ok(())
    }

    /// Consume one sample on behalf of a hardware or DMA trigger.
    ///
    /// Returns the events the advance fired, in firing order. Callback order
    /// is fixed by [`on_interrupt`](Self::on_interrupt) instead.
    pub fn advance(&mut self) -> DacResult<Fired> {
        self.state()?;
        Ok(self.convert())
    }

    fn convert(&mut self) -> Fired {
        let instance = self.instance();
        let Self {
            regs,
            nvic,
            active,
            last_output,
            ..
        } = self;
        let Some(state) = active.as_mut() else {
            return Fired::new();
        };
        let Some(buffer) = state.buffer.as_mut() else {
            *last_output = regs.read_data(0);
            return Fired::new();
        };

        *last_output = regs.read_data(buffer.pointer.position());
        let fired = buffer
            .pointer
            .advance(buffer.mode, buffer.ceiling, buffer.watermark);
        regs.write(DacField::ReadPointer, buffer.pointer.position());

        let mut request = false;
        for &source in fired.iter() {
            log::trace!("{}: {} event at {}", instance, source, buffer.pointer);
            regs.set_flag(flag_field(source), true);
            request |= state.armed.contains(source);
        }
        if request {
            nvic.set_pending(instance.irq());
        }
        fired
    }

    /// Interrupt entry: clear latched events and run armed callbacks.
    ///
    /// Events are latched as status flags, so their firing order is not kept:
    /// callbacks always run in the order bottom, top, watermark. Latched
    /// events whose category is not armed are cleared silently. Returns the
    /// categories whose callbacks ran.
    pub fn on_interrupt(&mut self) -> IrqMask {
        let irq = self.instance().irq();
        let Some(state) = self.active else {
            return IrqMask::NONE;
        };
        self.nvic.clear_pending(irq);

        let mut dispatched = IrqMask::NONE;
        for source in IrqSource::ALL {
            let field = flag_field(source);
            if !self.regs.flag(field) {
                continue;
            }
            self.regs.set_flag(field, false);
            if !state.armed.contains(source) {
                continue;
            }
            if let Some(callback) = state.callbacks[source.slot()] {
                callback();
                dispatched = dispatched.with(source);
            }
        }
        dispatched
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Pointer snapshot, `None` when inactive or unbuffered
    pub fn pointer(&self) -> Option<BufferPointer> {
        self.active.and_then(|s| s.buffer).map(|b| b.pointer)
    }

    /// Whether a one-time scan has run to completion
    pub fn scan_complete(&self) -> bool {
        self.pointer().is_some_and(|p| p.scan_complete())
    }

    /// Categories currently armed
    pub fn armed(&self) -> IrqMask {
        self.active.map_or(IrqMask::NONE, |s| s.armed)
    }

    /// Value emitted by the most recent conversion
    pub fn last_output(&self) -> u16 {
        self.last_output
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn interrupts(&self) -> &I {
        &self.nvic
    }

    /// Deactivate if needed and hand back the register interface and
    /// interrupt controller.
    pub fn free(mut self) -> (R, I) {
        if self.active.is_some() {
            self.teardown();
        }
        (self.regs, self.nvic)
    }
}
