#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # kdac
//!
//! Driver for the buffered 12-bit DAC found on Kinetis K-series parts.
//!
//! The interesting part is the buffer: up to seventeen staged samples that a
//! read pointer walks through on every trigger, under one of three wrap
//! policies ([`BufferMode`]). The pointer's position drives three interrupt
//! events (bottom, top and watermark) which are delivered to plain `fn()`
//! callbacks bound in the [`ChannelConfig`].
//!
//! ## Module Overview
//! - [`config`]  – Channel configuration, defaults and static validation.
//! - [`pointer`] – The read-pointer state machine.
//! - [`channel`] – The controller: activation, arming, data staging, triggers
//!   and interrupt dispatch.
//! - [`claims`]  – Which instances are held by an active channel.
//! - [`shared`]  – Critical-section wrapper for use from interrupt handlers.
//!
//! ```ignore
//! use kdac::{BufferMode, ChannelConfig, DacChannel, DacInstance, IrqSource};
//!
//! fn refill() { /* stage the next half of the waveform */ }
//!
//! let config = ChannelConfig::builder(DacInstance::DAC0)
//!     .buffer(BufferMode::Normal, 15)
//!     .software_trigger(true)
//!     .on(IrqSource::Watermark, refill)
//!     .build();
//!
//! let mut dac = DacChannel::new(regs, nvic);
//! dac.activate(&config)?;
//! dac.set_buffer_data(&SINE)?;
//! dac.software_trigger()?;
//! ```

pub mod channel;
pub mod claims;
pub mod config;
pub mod error;
pub mod pointer;
pub mod shared;

pub use channel::DacChannel;
pub use claims::{Claim, ClaimRegistry, CLAIMS};
pub use config::{
    BufferMode, Callback, ChannelConfig, ChannelConfigBuilder, IrqMask, IrqSource, Watermark,
    MAX_CEILING, MIN_CEILING,
};
pub use error::{ConfigError, DacError, DacResult, StateError};
pub use kdac_hal::{DacField, DacInstance, DacRegisters, InterruptController};
pub use pointer::{BufferPointer, Direction, Fired};
pub use shared::SharedDac;
