//! Interrupt registers
//!
//! The chip exposes two status bytes (0x03, 0x04) and two matching enable
//! bytes (0x05, 0x06). The driver treats each pair as a single 16-bit word:
//! status/enable 1 in the high byte, status/enable 2 in the low byte.
//!
//! Reading the status registers clears every latched flag, and the nIRQ line
//! stays low while any enabled flag is latched.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

bitflags! {
    /// Interrupt sources, laid out as `(status1 << 8) | status2`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IrqFlags: u16 {
        /// FIFO underflow/overflow
        const FIFO_ERROR = 0x8000;
        const TX_FIFO_ALMOST_FULL = 0x4000;
        const TX_FIFO_ALMOST_EMPTY = 0x2000;
        const RX_FIFO_ALMOST_FULL = 0x1000;
        const EXTERNAL = 0x0800;
        const PACKET_SENT = 0x0400;
        const VALID_PACKET_RECEIVED = 0x0200;
        const CRC_ERROR = 0x0100;

        const SYNC_WORD_DETECTED = 0x0080;
        const VALID_PREAMBLE = 0x0040;
        const INVALID_PREAMBLE = 0x0020;
        const RSSI = 0x0010;
        const WAKEUP_TIMER = 0x0008;
        const LOW_BATTERY = 0x0004;
        const CHIP_READY = 0x0002;
        const POWER_ON_RESET = 0x0001;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for IrqFlags {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "IrqFlags({=u16:#x})", self.bits())
    }
}

/// Interrupt status 1 & 2 (address: 0x03..=0x04)
///
/// Read-to-clear.
#[register(0x03u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptStatus {
    pub flags: IrqFlags,
}

/// Interrupt enable 1 & 2 (address: 0x05..=0x06)
#[register(0x05u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptEnable {
    pub sources: IrqFlags,
}

impl FromByteArray for InterruptStatus {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: IrqFlags::from_bits_retain(u16::from_be_bytes(bytes)),
        })
    }
}

impl FromByteArray for InterruptEnable {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            sources: IrqFlags::from_bits_retain(u16::from_be_bytes(bytes)),
        })
    }
}

impl ToByteArray for InterruptEnable {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok(self.sources.bits().to_be_bytes())
    }
}
