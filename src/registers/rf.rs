//! RF-related registers
//!
//! This module contains registers related to RF configuration including:
//! - IF filter bandwidth
//! - Clock recovery loop
//! - Transmit data rate and modulation
//! - Carrier frequency synthesis

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Modulation control 1: data rates below 30 kbps use the 2^21 scaling
pub const LOW_DATA_RATE_BIT: u8 = 5;
/// Modulation control 1: manchester coding enable bit
pub const MANCHESTER_BIT: u8 = 1;

/// Modulation control 2: frequency shift keying
pub const MODULATION_FSK: u8 = 0b10;
/// Modulation control 2: gaussian frequency shift keying
pub const MODULATION_GFSK: u8 = 0b11;
/// Modulation control 2: modulation data taken from a GPIO pin
pub const DATA_SOURCE_DIRECT_GPIO: u8 = 0b00;
/// Modulation control 2: modulation data taken from the FIFO
pub const DATA_SOURCE_FIFO: u8 = 0b10;
/// Modulation control 2: frequency deviation bit 8
pub const DEVIATION_MSB_BIT: u8 = 2;

/// AGC override 1: automatic gain control enabled
pub const AGC_ENABLED: u8 = 0b01;

/// IF filter bandwidth register (address: 0x1C)
///
/// Selects the channel filter through a decimation stage and one of 15 filter
/// sets. The bypass bit skips the decimate-by-3 stage for wide bandwidths.
#[register(0x1Cu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IfFilterBandwidth {
    /// Bypass the decimate-by-3 stage
    pub bypass_decimator: bool,
    /// Decimation rate exponent (0-5)
    pub decimation_rate: u8,
    /// IF filter coefficient set (1-15)
    pub filter_set: u8,
}

/// Clock recovery registers (address: 0x20..=0x25)
///
/// Receiver timing loop parameters, derived from the bit rate, frequency
/// deviation, IF filter and manchester setting. The flag bits sharing bytes
/// with the numeric fields are carried so a read-modify-write keeps them.
///
/// | Address | Content |
/// |---------|---------|
/// | 0x20 | oversampling ratio [7:0] |
/// | 0x21 | oversampling ratio [10:8], stall control, NCO offset [19:16] |
/// | 0x22 | NCO offset [15:8] |
/// | 0x23 | NCO offset [7:0] |
/// | 0x24 | reserved [7:5], NCO compensation [4], gain doubling [3], loop gain [10:8] |
/// | 0x25 | loop gain [7:0] |
#[register(0x20u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockRecovery {
    /// Oversampling ratio, 11 bits
    pub oversampling_ratio: u16,
    pub stall_control: bool,
    /// NCO offset, 20 bits
    pub nco_offset: u32,
    /// NCO frequency compensation
    pub nco_compensation: bool,
    /// Doubles the loop gain while the preamble is being received
    pub gain_doubling: bool,
    /// Timing loop gain, 11 bits
    pub timing_loop_gain: u16,
    /// Reserved bits of 0x24, written back unchanged
    pub reserved: u8,
}

/// TX data rate registers (address: 0x6E..=0x6F)
#[register(0x6Eu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataRate {
    pub code: u16,
}

/// Frequency band select and nominal carrier (address: 0x75..=0x77)
///
/// Carrier = (band + 24 + carrier / 64000) * 10 MHz, doubled when
/// `high_band` is set.
#[register(0x75u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CarrierFrequency {
    /// Select the lower sideband of the synthesizer
    pub side_band_select: bool,
    /// Select the 480 - 960 MHz band
    pub high_band: bool,
    /// Band index (0-23)
    pub band: u8,
    /// Fractional carrier
    pub carrier: u16,
    /// Reserved bit 7 of 0x75, written back unchanged
    pub reserved: bool,
}

impl FromByteArray for IfFilterBandwidth {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            bypass_decimator: bytes[0] & 0x80 != 0,
            decimation_rate: (bytes[0] >> 4) & 0x07,
            filter_set: bytes[0] & 0x0F,
        })
    }
}

impl ToByteArray for IfFilterBandwidth {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(u8::from(self.bypass_decimator) << 7)
            | ((self.decimation_rate & 0x07) << 4)
            | (self.filter_set & 0x0F)])
    }
}

impl FromByteArray for ClockRecovery {
    type Error = Infallible;
    type Array = [u8; 6];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            oversampling_ratio: (u16::from(bytes[1] & 0xE0) << 3) | u16::from(bytes[0]),
            stall_control: bytes[1] & 0x10 != 0,
            nco_offset: (u32::from(bytes[1] & 0x0F) << 16)
                | (u32::from(bytes[2]) << 8)
                | u32::from(bytes[3]),
            nco_compensation: bytes[4] & 0x10 != 0,
            gain_doubling: bytes[4] & 0x08 != 0,
            timing_loop_gain: (u16::from(bytes[4] & 0x07) << 8) | u16::from(bytes[5]),
            reserved: bytes[4] & 0xE0,
        })
    }
}

impl ToByteArray for ClockRecovery {
    type Error = Infallible;
    type Array = [u8; 6];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let osr = self.oversampling_ratio & 0x07FF;
        let nco = self.nco_offset & 0x000F_FFFF;
        let gain = self.timing_loop_gain & 0x07FF;

        Ok([
            osr as u8,
            ((osr >> 3) as u8 & 0xE0) | (u8::from(self.stall_control) << 4) | (nco >> 16) as u8,
            (nco >> 8) as u8,
            nco as u8,
            (self.reserved & 0xE0)
                | (u8::from(self.nco_compensation) << 4)
                | (u8::from(self.gain_doubling) << 3)
                | (gain >> 8) as u8,
            gain as u8,
        ])
    }
}

impl FromByteArray for DataRate {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            code: u16::from_be_bytes(bytes),
        })
    }
}

impl ToByteArray for DataRate {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok(self.code.to_be_bytes())
    }
}

impl FromByteArray for CarrierFrequency {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            reserved: bytes[0] & 0x80 != 0,
            side_band_select: bytes[0] & 0x40 != 0,
            high_band: bytes[0] & 0x20 != 0,
            band: bytes[0] & 0x1F,
            carrier: u16::from_be_bytes([bytes[1], bytes[2]]),
        })
    }
}

impl ToByteArray for CarrierFrequency {
    type Error = Infallible;
    type Array = [u8; 3];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let [msb, lsb] = self.carrier.to_be_bytes();
        Ok([
            (u8::from(self.reserved) << 7)
                | (u8::from(self.side_band_select) << 6)
                | (u8::from(self.high_band) << 5)
                | (self.band & 0x1F),
            msb,
            lsb,
        ])
    }
}
