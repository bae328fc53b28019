//! Si443x Register Interface
//!
//! This module provides the low level interface for talking to Si443x radios
//! over SPI. Every access is a single SPI transaction: an address byte (bit 7
//! set for writes) followed by one or more data bytes. Consecutive bytes go to
//! consecutive registers, except for the FIFO at 0x7F which keeps its address.
//!
//! The interface is built around the `Device<SPI>` struct which wraps an SPI
//! device and provides methods for:
//! - Reading and writing typed `regiface` registers
//! - Reading and writing single registers and register bursts
//! - Updating bit fields inside a register
//!
//! # Example
//! ```no_run
//! use si443x::{Device, DeviceVersion, Register};
//!
//! # fn demo<SPI: embedded_hal::spi::SpiDevice>(spi: SPI) -> Result<(), si443x::Error> {
//! let mut device = Device::new(spi);
//!
//! let version: DeviceVersion = device.read_register()?;
//! device.modify_bits(Register::Gpio1Config, 0x15, 4, 0)?;
//! # let _ = version;
//! # Ok(())
//! # }
//! ```

use core::convert::Infallible;

use embedded_hal::spi::Operation;
use regiface::{errors::Error as RegifaceError, ByteArray, ReadableRegister, WritableRegister};

use crate::registers::Register;

const WRITE_FLAG: u8 = 0x80;
const ADDRESS_MASK: u8 = 0x7F;

/// Register level interface to a Si443x radio.
///
/// Owns the SPI device. Higher layers never build SPI frames themselves.
pub struct Device<SPI> {
    spi: SPI,
}

impl<SPI> Device<SPI> {
    /// Creates a new Device instance wrapping the provided SPI interface.
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Device<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    /// Reads a typed register from the device.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    /// * `RegifaceError::DeserializationError` - Failed to parse register value
    pub fn read_register<R>(&mut self) -> Result<R, RegifaceError>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let header = [R::id() & ADDRESS_MASK];
        let mut raw_value = R::Array::new();

        self.spi
            .transaction(&mut [
                Operation::Write(header.as_slice()),
                Operation::Read(raw_value.as_mut()),
            ])
            .map_err(|_| RegifaceError::BusError)?;

        R::from_bytes(raw_value).map_err(|_| RegifaceError::DeserializationError)
    }

    /// Writes a typed register to the device.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    pub fn write_register<R>(&mut self, register: R) -> Result<(), RegifaceError>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let header = [R::id() | WRITE_FLAG];
        let raw_value = match register.to_bytes() {
            Ok(raw) => raw,
            Err(never) => match never {},
        };

        self.spi
            .transaction(&mut [
                Operation::Write(header.as_slice()),
                Operation::Write(raw_value.as_ref()),
            ])
            .map_err(|_| RegifaceError::BusError)
    }

    /// Reads a single register.
    pub fn read(&mut self, register: Register) -> Result<u8, RegifaceError> {
        let mut value = [0u8];
        self.read_burst(register, &mut value)?;
        Ok(value[0])
    }

    /// Writes a single register.
    pub fn write(&mut self, register: Register, value: u8) -> Result<(), RegifaceError> {
        self.write_burst(register, &[value])
    }

    /// Reads `bytes.len()` consecutive registers starting at `register`.
    ///
    /// Reading [`Register::FifoAccess`] pops that many bytes from the receive FIFO.
    pub fn read_burst(&mut self, register: Register, bytes: &mut [u8]) -> Result<(), RegifaceError> {
        let header = [register.addr() & ADDRESS_MASK];

        self.spi
            .transaction(&mut [Operation::Write(header.as_slice()), Operation::Read(bytes)])
            .map_err(|_| RegifaceError::BusError)
    }

    /// Writes `bytes` to consecutive registers starting at `register`.
    ///
    /// Writing [`Register::FifoAccess`] pushes every byte into the transmit FIFO.
    pub fn write_burst(&mut self, register: Register, bytes: &[u8]) -> Result<(), RegifaceError> {
        let header = [register.addr() | WRITE_FLAG];

        self.spi
            .transaction(&mut [Operation::Write(header.as_slice()), Operation::Write(bytes)])
            .map_err(|_| RegifaceError::BusError)
    }

    /// Reads bits `msb..=lsb` of a register, shifted down to bit 0.
    pub fn read_bits(&mut self, register: Register, msb: u8, lsb: u8) -> Result<u8, RegifaceError> {
        let mask = field_mask(msb, lsb);
        Ok((self.read(register)? & mask) >> lsb)
    }

    /// Replaces bits `msb..=lsb` of a register with `value`, keeping every other bit.
    ///
    /// `value` is right aligned; bits that do not fit the field are dropped.
    pub fn modify_bits(
        &mut self,
        register: Register,
        value: u8,
        msb: u8,
        lsb: u8,
    ) -> Result<(), RegifaceError> {
        let mask = field_mask(msb, lsb);
        let current = self.read(register)?;
        self.write(register, (current & !mask) | ((value << lsb) & mask))
    }
}

fn field_mask(msb: u8, lsb: u8) -> u8 {
    debug_assert!(msb < 8 && lsb <= msb);
    (0xFF >> (7 - msb)) & (0xFF << lsb)
}
