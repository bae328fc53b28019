//! Register definitions for the Si443x radio
//! Taken from the Si4430/31/32 datasheet (rev 1.1) and AN440 register descriptions
//!
//! Every register is one byte wide and addressed with 7 bits. Multi-byte
//! registers that are always accessed together (interrupt status/enable, clock
//! recovery, carrier frequency, data rate) have typed `regiface` definitions in
//! the submodules. Everything else is accessed through [`Register`] and the
//! field constants next to the typed definitions.

mod irq;
mod packet;
mod rf;
mod system;

pub use irq::*;
pub use packet::*;
pub use rf::*;
pub use system::*;

/// Si443x register addresses used by the driver
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    DeviceType = 0x00,
    DeviceVersion = 0x01,
    DeviceStatus = 0x02,
    InterruptStatus1 = 0x03,
    InterruptStatus2 = 0x04,
    InterruptEnable1 = 0x05,
    InterruptEnable2 = 0x06,
    OperatingControl1 = 0x07,
    OperatingControl2 = 0x08,
    Gpio0Config = 0x0B,
    Gpio1Config = 0x0C,
    Gpio2Config = 0x0D,
    IfFilterBandwidth = 0x1C,
    ClockRecoveryOversampling = 0x20,
    ClockRecoveryOffset2 = 0x21,
    ClockRecoveryOffset1 = 0x22,
    ClockRecoveryOffset0 = 0x23,
    ClockRecoveryGain1 = 0x24,
    ClockRecoveryGain0 = 0x25,
    Rssi = 0x26,
    AfcLimiter = 0x2A,
    DataAccessControl = 0x30,
    HeaderControl1 = 0x32,
    HeaderControl2 = 0x33,
    PreambleLength = 0x34,
    PreambleDetectionControl = 0x35,
    SyncWord3 = 0x36,
    SyncWord2 = 0x37,
    SyncWord1 = 0x38,
    SyncWord0 = 0x39,
    TransmitPacketLength = 0x3E,
    ReceivedPacketLength = 0x4B,
    AgcOverride1 = 0x69,
    TxPower = 0x6D,
    TxDataRate1 = 0x6E,
    TxDataRate0 = 0x6F,
    ModulationControl1 = 0x70,
    ModulationControl2 = 0x71,
    FrequencyDeviation = 0x72,
    FrequencyBandSelect = 0x75,
    NominalCarrierFrequency1 = 0x76,
    NominalCarrierFrequency0 = 0x77,
    FifoAccess = 0x7F,
}

impl Register {
    /// 7-bit register address
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

impl From<Register> for u8 {
    fn from(register: Register) -> Self {
        register.addr()
    }
}
