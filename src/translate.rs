//! Parameter translation
//!
//! Pure conversions from physical units (kbps, kHz, MHz, bits, dBm) to the
//! register codes the Si443x expects. Nothing here touches the bus, so every
//! formula is unit tested on its own.

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::{registers::IfFilterBandwidth, Error};

/// Lowest bit rate in kbps
pub const MIN_BIT_RATE: f32 = 0.123;
/// Highest bit rate in kbps
pub const MAX_BIT_RATE: f32 = 256.0;
/// Bit rates at or above this use the high rate scaling
const HIGH_RATE_THRESHOLD: f32 = 30.0;

/// Deviation resolution in kHz
pub const DEVIATION_STEP: f32 = 0.625;
pub const MAX_DEVIATION: f32 = 320.0;
const MAX_DEVIATION_CODE: u16 = 0x1FF;

pub const MIN_FREQUENCY: f32 = 240.0;
pub const MAX_FREQUENCY: f32 = 930.0;
const HIGH_BAND_THRESHOLD: f32 = 480.0;

pub const MIN_RX_BANDWIDTH: f32 = 2.6;
pub const MAX_RX_BANDWIDTH: f32 = 620.7;

pub const MIN_OUTPUT_POWER: i8 = -1;
pub const MAX_OUTPUT_POWER: i8 = 20;

/// Longest preamble the 9-bit nibble counter holds
const MAX_PREAMBLE_NIBBLES: u16 = 0x1FF;
/// Widest preamble detection threshold in nibbles
const MAX_PREAMBLE_THRESHOLD: u8 = 0x1F;

const BANDWIDTH_TOLERANCE: f32 = 0.001;

/// TX data rate setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataRateCode {
    /// Register value for 0x6E/0x6F
    pub code: u16,
    /// Low data rate scaling (2^21 instead of 2^16)
    pub low_rate: bool,
}

/// Frequency deviation setting
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviationCode {
    /// Deviation in kHz after clamping
    pub deviation_khz: f32,
    /// 9-bit register value, bit 8 lives in modulation control 2
    pub code: u16,
}

/// Carrier frequency setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CarrierCode {
    pub high_band: bool,
    pub band: u8,
    pub carrier: u16,
    /// AFC pull-in limit matching the band
    pub afc_limiter: u8,
}

/// Preamble length setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PreambleCode {
    /// Preamble length in 4-bit nibbles, 9 bits
    pub nibbles: u16,
    /// Detection threshold in nibbles, 5 bits
    pub threshold: u8,
}

/// Clock recovery loop setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockRecoveryCode {
    pub oversampling_ratio: u16,
    pub nco_offset: u32,
    pub timing_loop_gain: u16,
}

/// IF filter settings for bandwidths reached with the decimator bypassed
const WIDE_BANDWIDTHS: [(f32, u8, u8); 15] = [
    (142.8, 1, 4),
    (167.8, 1, 5),
    (181.1, 1, 6),
    (191.5, 0, 15),
    (225.1, 0, 1),
    (248.8, 0, 2),
    (269.3, 0, 3),
    (284.8, 0, 4),
    (335.5, 0, 8),
    (391.8, 0, 9),
    (420.2, 0, 10),
    (468.4, 0, 11),
    (518.8, 0, 12),
    (577.0, 0, 13),
    (620.7, 0, 14),
];

/// Narrow bandwidth tiers: `(upper bound, decimation rate, offset, step)`.
///
/// Each tier interpolates the filter set from the requested bandwidth; the
/// upper bounds are inclusive.
const NARROW_BANDWIDTHS: [(f32, u8, f32, f32); 6] = [
    (4.5, 5, 2.1429, 0.3250),
    (8.8, 4, 3.9857, 0.6643),
    (17.5, 3, 7.6714, 1.3536),
    (34.7, 2, 15.2000, 2.6893),
    (69.2, 1, 30.2430, 5.3679),
    (137.9, 0, 60.2860, 10.7000),
];

/// Converts a bit rate in kbps into the TX data rate code.
pub fn bit_rate(kbps: f32) -> Result<DataRateCode, Error> {
    if !(MIN_BIT_RATE..=MAX_BIT_RATE).contains(&kbps) {
        return Err(Error::InvalidBitRate);
    }

    let low_rate = kbps < HIGH_RATE_THRESHOLD;
    let scale = if low_rate { 2_097_152.0 } else { 65_536.0 };

    Ok(DataRateCode {
        code: (kbps * scale / 1000.0).round() as u16,
        low_rate,
    })
}

/// Converts a frequency deviation in kHz into its register code.
///
/// Negative requests select the smallest deviation.
pub fn frequency_deviation(khz: f32) -> Result<DeviationCode, Error> {
    let deviation_khz = if khz < 0.0 { DEVIATION_STEP } else { khz };
    if !(DEVIATION_STEP..=MAX_DEVIATION).contains(&deviation_khz) {
        return Err(Error::InvalidFrequencyDeviation);
    }

    let code = ((deviation_khz / DEVIATION_STEP).round() as u16).min(MAX_DEVIATION_CODE);
    Ok(DeviationCode {
        deviation_khz,
        code,
    })
}

/// Picks the IF filter setting for a receiver bandwidth in kHz.
pub fn rx_bandwidth(khz: f32) -> Result<IfFilterBandwidth, Error> {
    if !(MIN_RX_BANDWIDTH..=MAX_RX_BANDWIDTH).contains(&khz) {
        return Err(Error::InvalidRxBandwidth);
    }

    for (upper, decimation_rate, offset, step) in NARROW_BANDWIDTHS {
        if khz <= upper {
            return Ok(IfFilterBandwidth {
                bypass_decimator: false,
                decimation_rate,
                filter_set: ((khz - offset) / step + 0.5) as u8,
            });
        }
    }

    WIDE_BANDWIDTHS
        .iter()
        .find(|(bandwidth, _, _)| (khz - bandwidth).abs() <= BANDWIDTH_TOLERANCE)
        .map(|&(_, decimation_rate, filter_set)| IfFilterBandwidth {
            bypass_decimator: true,
            decimation_rate,
            filter_set,
        })
        .ok_or(Error::InvalidRxBandwidth)
}

/// Converts a preamble length in bits into the nibble count and detection threshold.
pub fn preamble_length(bits: u16) -> Result<PreambleCode, Error> {
    if bits % 4 != 0 {
        return Err(Error::InvalidPreambleLength);
    }

    let nibbles = bits / 4;
    if nibbles > MAX_PREAMBLE_NIBBLES {
        return Err(Error::InvalidPreambleLength);
    }

    Ok(PreambleCode {
        nibbles,
        threshold: ((5 * nibbles) / 8).min(u16::from(MAX_PREAMBLE_THRESHOLD)) as u8,
    })
}

/// Checks that a carrier frequency in MHz can be synthesized.
pub fn check_frequency(mhz: f32) -> Result<(), Error> {
    if (MIN_FREQUENCY..=MAX_FREQUENCY).contains(&mhz) {
        Ok(())
    } else {
        Err(Error::InvalidFrequency)
    }
}

/// Splits a carrier frequency in MHz into band and fractional carrier.
///
/// Both the band index and the carrier are truncated, not rounded.
pub fn carrier_frequency(mhz: f32) -> CarrierCode {
    let high_band = mhz >= HIGH_BAND_THRESHOLD;
    let (divisor, afc_limiter) = if high_band { (20.0, 0x28) } else { (10.0, 0x50) };

    let band = (mhz / divisor - 24.0) as u8;
    let carrier = ((mhz / divisor - f32::from(band) - 24.0) * 64000.0) as u16;

    CarrierCode {
        high_band,
        band,
        carrier,
        afc_limiter,
    }
}

/// Derives the clock recovery loop parameters.
///
/// The oversampling ratio is truncated to 11 bits, the NCO offset to 20 bits
/// and the loop gain to 11 bits.
pub fn clock_recovery(
    bit_rate_kbps: f32,
    deviation_khz: f32,
    filter: &IfFilterBandwidth,
    manchester: bool,
) -> ClockRecoveryCode {
    let bypass = u32::from(filter.bypass_decimator);
    let manchester_factor = 1.0 + f32::from(u8::from(manchester));
    let decimation = i32::from(filter.decimation_rate) - 3;
    let ndec = if decimation > 0 {
        (1u32 << decimation) as f32
    } else {
        1.0 / (1u32 << -decimation) as f32
    };
    let divider = (500 * (1 + 2 * bypass)) as f32;

    let osr = divider / (ndec * bit_rate_kbps * manchester_factor);
    let nco = bit_rate_kbps * manchester_factor * (1u32 << (20 + u32::from(filter.decimation_rate))) as f32
        / divider;
    let gain = 2.0 + 65536.0 * manchester_factor * bit_rate_kbps / (osr * (deviation_khz / DEVIATION_STEP));

    ClockRecoveryCode {
        oversampling_ratio: (osr as u16) & 0x07FF,
        nco_offset: (nco as u32) & 0x000F_FFFF,
        timing_loop_gain: (gain as u16) & 0x07FF,
    }
}

/// Maps an output power in dBm onto the 3-bit power step.
pub fn output_power(dbm: i8) -> Result<u8, Error> {
    if !(MIN_OUTPUT_POWER..=MAX_OUTPUT_POWER).contains(&dbm) {
        return Err(Error::InvalidOutputPower);
    }
    Ok(((dbm + 1) / 3) as u8)
}

/// Time allowed for sending `length` bytes: five times the air time plus 5 ms.
pub fn tx_timeout_ms(length: usize, bit_rate_kbps: f32) -> u32 {
    5 + ((length * 8) as f32 / bit_rate_kbps * 5.0) as u32
}

/// Time allowed for a full 64 byte packet to arrive: 500 ms plus 400 bit times per byte.
pub fn rx_timeout_ms(bit_rate_kbps: f32) -> u32 {
    (500.0 + (1.0 / bit_rate_kbps) * (64.0 * 400.0)) as u32
}
