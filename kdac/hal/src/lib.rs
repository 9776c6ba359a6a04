#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # kdac HAL
//!
//! Hardware-facing collaborators of the DAC channel driver.
//!
//! The driver never touches memory-mapped registers directly. Instead it
//! computes field values and hands them to a [`DacRegisters`] implementation,
//! and it asks an [`InterruptController`] to mask, unmask and pend the
//! instance's request line. Both traits are small enough to implement over a
//! PAC register block on target, or over the software models in [`sim`] on
//! the host.

pub mod interrupt;
pub mod registers;

#[cfg(feature = "sim")]
pub mod sim;

pub use interrupt::{InterruptController, IrqNumber};
pub use registers::{
    DacField, DacInstance, DacRegisters, BUFFER_SLOTS, DATA_MASK, FIELD_COUNT, MAX_INSTANCES,
};
