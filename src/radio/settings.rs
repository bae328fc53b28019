//! Modem, packet handler and RF settings

use crate::{
    config::{CrcVariant, DataShaping, Encoding, PacketLengthConfig},
    registers::*,
    switch::RfSwitch,
    translate::{self, CarrierCode},
    Error,
};

use super::Si443x;

impl<SPI, SDN, IRQ, DELAY, RFS> Si443x<SPI, SDN, IRQ, DELAY, RFS>
where
    SPI: embedded_hal::spi::SpiDevice,
    RFS: RfSwitch,
{
    /// Baseline register setup applied by `begin` after the software reset.
    pub(super) fn configure_defaults(&mut self) -> Result<(), Error> {
        self.standby()?;

        // POR and chip ready interrupts off
        self.device.write(Register::InterruptEnable2, 0x00)?;
        self.device
            .modify_bits(Register::AgcOverride1, AGC_ENABLED, 6, 5)?;
        // No header, no sync word timeout
        self.device.modify_bits(Register::HeaderControl2, 0x00, 7, 4)?;
        self.device
            .modify_bits(Register::Gpio0Config, GPIO_TX_STATE, 4, 0)?;
        self.device
            .modify_bits(Register::Gpio1Config, GPIO_RX_STATE, 4, 0)?;
        // No broadcast or header checks
        self.device.write(Register::HeaderControl1, 0x00)?;
        Ok(())
    }

    /// Sets the data rate in kbps, 0.123 to 256.
    ///
    /// Recomputes the clock recovery loop for the new rate.
    pub fn set_bit_rate(&mut self, kbps: f32) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("set_bit_rate({})", kbps);

        let rate = translate::bit_rate(kbps)?;
        self.ensure_idle()?;

        self.device.modify_bits(
            Register::ModulationControl1,
            u8::from(rate.low_rate),
            LOW_DATA_RATE_BIT,
            LOW_DATA_RATE_BIT,
        )?;
        self.device.write_register(DataRate { code: rate.code })?;
        self.bit_rate = kbps;

        self.update_clock_recovery()
    }

    /// Sets the FSK frequency deviation in kHz, 0.625 to 320.
    ///
    /// A negative value selects the smallest deviation. The timing loop gain
    /// depends on the deviation and is recomputed.
    pub fn set_frequency_deviation(&mut self, khz: f32) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("set_frequency_deviation({})", khz);

        let deviation = translate::frequency_deviation(khz)?;
        self.ensure_idle()?;

        self.device.modify_bits(
            Register::ModulationControl2,
            (deviation.code >> 8) as u8,
            DEVIATION_MSB_BIT,
            DEVIATION_MSB_BIT,
        )?;
        self.device
            .write(Register::FrequencyDeviation, deviation.code as u8)?;
        self.frequency_deviation = deviation.deviation_khz;

        self.update_clock_recovery()
    }

    /// Sets the receiver channel filter bandwidth in kHz.
    ///
    /// Between 2.6 and 137.9 kHz any value is accepted and rounded to the
    /// nearest filter; above that only the discrete wideband filter
    /// bandwidths (142.8, 167.8, ... 620.7 kHz) are valid.
    pub fn set_rx_bandwidth(&mut self, khz: f32) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("set_rx_bandwidth({})", khz);

        let filter = translate::rx_bandwidth(khz)?;
        self.ensure_idle()?;

        self.device.write_register(filter)?;
        self.update_clock_recovery()
    }

    /// Sets the preamble length in bits, a multiple of 4.
    ///
    /// The detection threshold follows at 5/8 of the preamble.
    pub fn set_preamble_length(&mut self, bits: u16) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("set_preamble_length({})", bits);

        let preamble = translate::preamble_length(bits)?;
        self.ensure_idle()?;

        self.device
            .write(Register::PreambleLength, preamble.nibbles as u8)?;
        self.device.modify_bits(
            Register::HeaderControl2,
            (preamble.nibbles >> 8) as u8,
            PREAMBLE_LENGTH_MSB_BIT,
            PREAMBLE_LENGTH_MSB_BIT,
        )?;
        self.device.modify_bits(
            Register::PreambleDetectionControl,
            preamble.threshold,
            PREAMBLE_THRESHOLD_MSB,
            PREAMBLE_THRESHOLD_LSB,
        )?;
        Ok(())
    }

    /// Sets the 1 to 4 byte sync word, first byte on air first.
    pub fn set_sync_word(&mut self, sync_word: &[u8]) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("set_sync_word({=[u8]:x})", sync_word);

        if !(1..=4).contains(&sync_word.len()) {
            return Err(Error::InvalidSyncWord);
        }
        self.ensure_idle()?;
        self.standby()?;

        self.device.modify_bits(
            Register::HeaderControl2,
            (sync_word.len() - 1) as u8,
            SYNC_LENGTH_MSB,
            SYNC_LENGTH_LSB,
        )?;
        self.device.write_burst(Register::SyncWord3, sync_word)?;
        Ok(())
    }

    /// Sets the carrier frequency in MHz, 240 to 930.
    pub fn set_frequency(&mut self, mhz: f32) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("set_frequency({})", mhz);

        translate::check_frequency(mhz)?;
        self.ensure_idle()?;
        self.standby()?;

        let code = translate::carrier_frequency(mhz);
        self.write_carrier(&code, None)?;
        self.device.write(Register::AfcLimiter, code.afc_limiter)?;
        self.frequency = mhz;
        Ok(())
    }

    /// Programs band and carrier. The sideband bit keeps its current value
    /// unless `side_band_select` says otherwise.
    pub(super) fn write_carrier(
        &mut self,
        code: &CarrierCode,
        side_band_select: Option<bool>,
    ) -> Result<(), Error> {
        let mut carrier: CarrierFrequency = self.device.read_register()?;
        carrier.high_band = code.high_band;
        carrier.band = code.band;
        carrier.carrier = code.carrier;
        if let Some(side_band_select) = side_band_select {
            carrier.side_band_select = side_band_select;
        }
        self.device.write_register(carrier)?;
        Ok(())
    }

    /// Selects NRZ, manchester or whitening for the payload.
    ///
    /// Manchester coding changes the clock recovery loop, which is recomputed.
    pub fn set_encoding(&mut self, encoding: Encoding) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("set_encoding({})", encoding);

        self.ensure_idle()?;
        self.standby()?;

        self.device
            .modify_bits(Register::ModulationControl1, encoding.bits(), 2, 0)?;
        self.update_clock_recovery()
    }

    /// Selects FSK or GFSK.
    pub fn set_data_shaping(&mut self, shaping: DataShaping) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("set_data_shaping({})", shaping);

        self.ensure_idle()?;
        self.standby()?;

        self.device
            .modify_bits(Register::ModulationControl2, modulation_type(shaping), 1, 0)?;
        self.shaping = shaping;
        Ok(())
    }

    /// Enables or disables the packet CRC and picks its polynomial.
    ///
    /// With the CRC enabled, reception also completes on a CRC error so
    /// corrupted packets are reported instead of timing out.
    pub fn set_crc(&mut self, enable: bool, variant: CrcVariant) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("set_crc({}, {})", enable, variant);

        self.ensure_idle()?;

        self.device.modify_bits(
            Register::DataAccessControl,
            (u8::from(enable) << CRC_ENABLE_BIT) | variant as u8,
            2,
            0,
        )?;
        self.crc_enabled = enable;
        Ok(())
    }

    /// Every packet is exactly `length` bytes, no length byte on air.
    pub fn fixed_packet_length_mode(&mut self, length: u8) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("fixed_packet_length_mode({})", length);

        self.set_packet_length_config(PacketLengthConfig::Fixed(length))
    }

    /// Packets carry a length byte; `max_length` is the largest payload expected.
    pub fn variable_packet_length_mode(&mut self, max_length: u8) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("variable_packet_length_mode({})", max_length);

        self.set_packet_length_config(PacketLengthConfig::Variable(max_length))
    }

    fn set_packet_length_config(&mut self, config: PacketLengthConfig) -> Result<(), Error> {
        let (fixed, length) = match config {
            PacketLengthConfig::Fixed(length) => (true, length),
            PacketLengthConfig::Variable(length) => (false, length),
        };
        if usize::from(length) > MAX_PACKET_LENGTH {
            return Err(Error::PacketTooLong);
        }
        self.ensure_idle()?;

        self.device.modify_bits(
            Register::HeaderControl2,
            u8::from(fixed),
            FIXED_PACKET_LENGTH_BIT,
            FIXED_PACKET_LENGTH_BIT,
        )?;
        self.device.write(Register::TransmitPacketLength, length)?;
        self.packet_length_config = config;
        self.packet_length_queried = false;
        Ok(())
    }

    /// Sets the transmit power in dBm, -1 to 20 in 3 dB steps.
    pub fn set_output_power(&mut self, dbm: i8) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("set_output_power({})", dbm);

        let step = translate::output_power(dbm)?;
        self.ensure_idle()?;

        self.device.modify_bits(Register::TxPower, step, 2, 0)?;
        Ok(())
    }

    /// Recomputes the clock recovery loop from the programmed IF filter and
    /// manchester setting, and the cached bit rate and deviation.
    fn update_clock_recovery(&mut self) -> Result<(), Error> {
        let filter: IfFilterBandwidth = self.device.read_register()?;
        let manchester =
            self.device
                .read_bits(Register::ModulationControl1, MANCHESTER_BIT, MANCHESTER_BIT)?
                != 0;

        let code = translate::clock_recovery(
            self.bit_rate,
            self.frequency_deviation,
            &filter,
            manchester,
        );

        #[cfg(feature = "defmt")]
        defmt::debug!("clock recovery {} from {}", code, filter);

        let mut loop_config: ClockRecovery = self.device.read_register()?;
        loop_config.oversampling_ratio = code.oversampling_ratio;
        loop_config.nco_offset = code.nco_offset;
        loop_config.timing_loop_gain = code.timing_loop_gain;
        self.device.write_register(loop_config)?;
        Ok(())
    }
}

/// Modulation type field for packet mode
pub(super) fn modulation_type(shaping: DataShaping) -> u8 {
    match shaping {
        DataShaping::None => MODULATION_FSK,
        DataShaping::Gaussian => MODULATION_GFSK,
    }
}
