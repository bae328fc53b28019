//! System registers
//!
//! Device identification, operating mode control and GPIO routing.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister};

/// Version code reported by every supported Si4430/31/32 revision
pub const SI443X_DEVICE_VERSION: u8 = 0x06;

/// Device version register (address: 0x01)
#[register(0x01u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceVersion {
    /// Silicon version code, [`SI443X_DEVICE_VERSION`] on supported parts
    pub version: u8,
}

bitflags! {
    /// Operating & function control 1 (address: 0x07)
    ///
    /// Writing a combination of these bits selects the chip state. With none of
    /// the state bits set the chip drops to Standby; [`OperatingFlags::XTAL_ON`]
    /// alone is the Ready state the driver calls standby; the wake-up timer bit
    /// alone lets the chip sleep.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OperatingFlags: u8 {
        /// Software register reset, self clearing
        const SOFTWARE_RESET = 0x80;
        const LOW_BATTERY_DETECT = 0x40;
        const WAKEUP_TIMER = 0x20;
        const XTAL_32K = 0x10;
        const TX_ON = 0x08;
        const RX_ON = 0x04;
        const PLL_ON = 0x02;
        const XTAL_ON = 0x01;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OperatingFlags {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "OperatingFlags({=u8:#x})", self.bits())
    }
}

/// Operating & function control 2: receive FIFO clear bit
pub const RX_FIFO_CLEAR_BIT: u8 = 1;
/// Operating & function control 2: transmit FIFO clear bit
pub const TX_FIFO_CLEAR_BIT: u8 = 0;

/// GPIO configuration: high while the transmitter is on
pub const GPIO_TX_STATE: u8 = 0x12;
/// GPIO configuration: high while the receiver is on
pub const GPIO_RX_STATE: u8 = 0x15;
/// GPIO configuration: direct mode data clock output
pub const GPIO_DATA_CLK_OUT: u8 = 0x0F;
/// GPIO configuration: direct mode transmit data input
pub const GPIO_TX_DATA_IN: u8 = 0x10;
/// GPIO configuration: direct mode receive data output
pub const GPIO_RX_DATA_OUT: u8 = 0x14;

impl FromByteArray for DeviceVersion {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            version: bytes[0] & 0x1F,
        })
    }
}
