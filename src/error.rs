//! Driver error type
//!
//! Every fallible driver operation returns [`Error`]. Bus failures coming out
//! of the register facade are reported by `regiface` and converted here.

use regiface::errors::Error as RegifaceError;

/// Errors reported by the Si443x driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// SPI communication failed
    Bus,
    /// A register value read back from the device could not be decoded
    Decode,
    /// A GPIO (shutdown, nIRQ or RF switch) operation failed
    Pin,
    /// The device version register never matched after all probe attempts
    ChipNotFound,
    /// Bit rate outside 0.123 - 256 kbps
    InvalidBitRate,
    /// Frequency deviation outside 0.625 - 320 kHz
    InvalidFrequencyDeviation,
    /// Receive bandwidth not reachable by any IF filter setting
    InvalidRxBandwidth,
    /// Preamble length not a multiple of 4 bits, or longer than the chip counter
    InvalidPreambleLength,
    /// Sync word empty or longer than 4 bytes
    InvalidSyncWord,
    /// Carrier frequency outside 240 - 930 MHz
    InvalidFrequency,
    /// Output power outside -1 - 20 dBm
    InvalidOutputPower,
    /// Payload (or requested length) larger than the FIFO frame
    PacketTooLong,
    /// Packet sent interrupt did not fire in time
    TxTimeout,
    /// No packet arrived in time
    RxTimeout,
    /// The received packet failed the CRC check
    CrcMismatch,
    /// Configuration attempted while a transfer or direct stream is active
    Busy,
}

impl From<RegifaceError> for Error {
    fn from(err: RegifaceError) -> Self {
        match err {
            RegifaceError::BusError => Self::Bus,
            _ => Self::Decode,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::Bus => "SPI communication failed",
            Self::Decode => "invalid register value returned from device",
            Self::Pin => "GPIO error",
            Self::ChipNotFound => "no Si443x found",
            Self::InvalidBitRate => "invalid bit rate",
            Self::InvalidFrequencyDeviation => "invalid frequency deviation",
            Self::InvalidRxBandwidth => "invalid receiver bandwidth",
            Self::InvalidPreambleLength => "invalid preamble length",
            Self::InvalidSyncWord => "invalid sync word",
            Self::InvalidFrequency => "invalid carrier frequency",
            Self::InvalidOutputPower => "invalid output power",
            Self::PacketTooLong => "packet too long",
            Self::TxTimeout => "transmit timeout",
            Self::RxTimeout => "receive timeout",
            Self::CrcMismatch => "CRC mismatch",
            Self::Busy => "transfer in progress",
        };
        f.write_str(msg)
    }
}
