//! Radio configuration types

use heapless::Vec;

use crate::Error;

/// Chip state as tracked by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipMode {
    /// Lowest power state, only the wake-up timer runs
    Sleep,
    /// Crystal oscillator running, ready for configuration
    Standby,
    /// Packet transmission in progress
    Tx,
    /// Packet reception in progress
    Rx,
    /// Transmitting a bit stream clocked through a GPIO
    DirectTx,
    /// Receiving a bit stream clocked through a GPIO
    DirectRx,
}

impl ChipMode {
    /// Whether configuration changes are currently rejected
    pub fn is_busy(self) -> bool {
        !matches!(self, Self::Sleep | Self::Standby)
    }
}

/// Line coding applied to the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Encoding {
    #[default]
    Nrz,
    Manchester,
    Whitening,
}

impl Encoding {
    /// Value of modulation control 1 bits 2:0
    pub(crate) fn bits(self) -> u8 {
        match self {
            Self::Nrz => 0b000,
            Self::Manchester => 0b010,
            Self::Whitening => 0b001,
        }
    }
}

/// Frequency shaping applied to the modulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataShaping {
    /// Plain FSK
    #[default]
    None,
    /// GFSK, gaussian filter with BT = 0.5
    Gaussian,
}

/// CRC polynomial used by the packet handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CrcVariant {
    /// CCITT, x^16 + x^12 + x^5 + 1
    Ccitt = 0b00,
    /// CRC-16 (IBM), x^16 + x^15 + x^2 + 1
    #[default]
    Ibm = 0b01,
    /// IEC-16, x^16 + x^14 + x^12 + x^11 + x^9 + x^8 + x^4 + x + 1
    Iec16 = 0b10,
    /// Baicheva, x^16 + x^15 + x^12 + x^7 + x^6 + x^4 + x^3 + 1
    Baicheva = 0b11,
}

/// Packet length handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketLengthConfig {
    /// Every packet has exactly this many bytes, no length byte is sent
    Fixed(u8),
    /// A length byte precedes the payload; the value is the largest payload expected
    Variable(u8),
}

impl PacketLengthConfig {
    /// Largest payload accepted for transmission
    pub fn max_payload(self) -> usize {
        match self {
            Self::Fixed(len) => usize::from(len),
            Self::Variable(_) => crate::registers::MAX_PACKET_LENGTH,
        }
    }
}

impl Default for PacketLengthConfig {
    fn default() -> Self {
        Self::Variable(crate::registers::MAX_PACKET_LENGTH as u8)
    }
}

/// Settings applied by [`Si443x::begin`](crate::Si443x::begin)
///
/// ```
/// use si443x::RadioConfig;
///
/// let config = RadioConfig::new(9.6, 5.0, 10.0, 16).with_frequency(868.0);
/// assert_eq!(config.sync_word.as_slice(), &[0x12, 0xAD]);
/// assert_eq!(config.frequency_mhz, 868.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioConfig {
    pub bit_rate_kbps: f32,
    pub frequency_deviation_khz: f32,
    pub rx_bandwidth_khz: f32,
    /// Preamble length in bits, multiple of 4
    pub preamble_length_bits: u16,
    /// 1 to 4 bytes
    pub sync_word: Vec<u8, 4>,
    pub frequency_mhz: f32,
    pub output_power_dbm: i8,
    pub encoding: Encoding,
    pub shaping: DataShaping,
    pub crc_enabled: bool,
    pub crc_variant: CrcVariant,
    pub packet_length: PacketLengthConfig,
}

impl RadioConfig {
    /// Modem parameters with every other setting at its default
    pub fn new(
        bit_rate_kbps: f32,
        frequency_deviation_khz: f32,
        rx_bandwidth_khz: f32,
        preamble_length_bits: u16,
    ) -> Self {
        Self {
            bit_rate_kbps,
            frequency_deviation_khz,
            rx_bandwidth_khz,
            preamble_length_bits,
            ..Self::default()
        }
    }

    pub fn with_frequency(self, frequency_mhz: f32) -> Self {
        Self {
            frequency_mhz,
            ..self
        }
    }

    /// Replaces the sync word.
    ///
    /// Fails with [`Error::InvalidSyncWord`] unless it is 1 to 4 bytes long.
    pub fn with_sync_word(self, sync_word: &[u8]) -> Result<Self, Error> {
        if sync_word.is_empty() {
            return Err(Error::InvalidSyncWord);
        }
        let sync_word = Vec::from_slice(sync_word).map_err(|()| Error::InvalidSyncWord)?;
        Ok(Self { sync_word, ..self })
    }

    pub fn with_output_power(self, output_power_dbm: i8) -> Self {
        Self {
            output_power_dbm,
            ..self
        }
    }

    pub fn with_encoding(self, encoding: Encoding) -> Self {
        Self { encoding, ..self }
    }

    pub fn with_shaping(self, shaping: DataShaping) -> Self {
        Self { shaping, ..self }
    }

    pub fn with_crc(self, crc_enabled: bool, crc_variant: CrcVariant) -> Self {
        Self {
            crc_enabled,
            crc_variant,
            ..self
        }
    }

    pub fn with_packet_length(self, packet_length: PacketLengthConfig) -> Self {
        Self {
            packet_length,
            ..self
        }
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        let mut sync_word = Vec::new();
        sync_word.extend_from_slice(&[0x12, 0xAD]).ok();

        Self {
            bit_rate_kbps: 48.0,
            frequency_deviation_khz: 50.0,
            rx_bandwidth_khz: 181.1,
            preamble_length_bits: 16,
            sync_word,
            frequency_mhz: 434.0,
            output_power_dbm: 10,
            encoding: Encoding::Nrz,
            shaping: DataShaping::None,
            crc_enabled: true,
            crc_variant: CrcVariant::Ibm,
            packet_length: PacketLengthConfig::default(),
        }
    }
}
