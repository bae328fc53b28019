#![cfg_attr(not(test), no_std)]
//! Si443x Radio Driver
//!
//! This crate provides a type-safe interface for the Silicon Labs
//! Si4430/31/32 (EZRadioPRO) sub-GHz FSK transceivers, built on the
//! `embedded-hal` 1.0 traits.
//!
//! # Features
//! - Frequency range: 240-930 MHz
//! - Modulation: FSK and GFSK, 0.123-256 kbps, deviation 0.625-320 kHz
//! - 64 byte FIFO packet handler with sync word, preamble detection and CRC
//! - NRZ, manchester and whitening line coding
//! - Direct mode for streaming raw bits through GPIOs
//! - Blocking and async (nIRQ edge) transfers
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: Register interface over an `SpiDevice`
//!   - Typed register access through `regiface`
//!   - Single, burst and bit field access
//!
//! - [`registers`]: Register map and field definitions
//!
//! - [`translate`]: Conversions from physical units to register codes
//!
//! - [`Si443x`]: The radio driver
//!   - Reset, chip detection and configuration
//!   - Mode control (sleep, standby, direct mode)
//!   - Packet transmission and reception
//!
//! - [`direct`]: Bit stream helpers for direct mode
//! - [`switch`]: External RF switch control
//!
//! # Usage
//! ```no_run
//! use embedded_hal::{delay::DelayNs, digital::{InputPin, OutputPin}, spi::SpiDevice};
//! use si443x::{Error, RadioConfig, Si443x};
//!
//! fn send<SPI, SDN, IRQ, DELAY>(spi: SPI, sdn: SDN, irq: IRQ, delay: DELAY) -> Result<(), Error>
//! where
//!     SPI: SpiDevice,
//!     SDN: OutputPin,
//!     IRQ: InputPin,
//!     DELAY: DelayNs,
//! {
//!     let mut radio = Si443x::new(spi, sdn, irq, delay);
//!     radio.begin(&RadioConfig::new(9.6, 5.0, 10.0, 16).with_frequency(868.0))?;
//!
//!     radio.transmit(b"hello")?;
//!
//!     let mut buffer = [0u8; 64];
//!     let received = radio.receive(&mut buffer)?;
//!     let _packet = &buffer[..received];
//!
//!     radio.sleep()
//! }
//! ```
//!
//! # Important Notes
//! - Settings can only change in sleep or standby; otherwise [`Error::Busy`]
//! - Bit rate, deviation, bandwidth and encoding all feed the clock recovery loop, which
//!   is recomputed from the programmed registers after each of them
//! - The nIRQ line must be connected; transfers complete on its falling level

pub mod config;
pub mod device;
pub mod direct;
mod error;
mod radio;
pub mod registers;
pub mod switch;
pub mod translate;

pub use config::*;
pub use device::Device;
pub use direct::{DirectReceiver, DirectTransmitter};
pub use error::Error;
pub use radio::Si443x;
pub use registers::*;
pub use switch::{NoRfSwitch, RfSwitch, RfSwitchMode, RfSwitchPins};
