//! Si443x radio driver
//!
//! [`Si443x`] owns the register interface, the shutdown (SDN) pin, the nIRQ
//! input, a delay provider and an optional RF switch. It keeps a small shadow
//! of the settings the chip cannot report back cheaply (bit rate, deviation,
//! packet length handling) so dependent registers stay consistent.
//!
//! Settings can only change while the chip is idle (sleep or standby); every
//! setter returns [`Error::Busy`] during a transfer or direct mode stream.

mod mode;
mod settings;
mod transfer;

use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::{
    config::{ChipMode, DataShaping, PacketLengthConfig, RadioConfig},
    device::Device,
    registers::{
        DeviceVersion, InterruptStatus, IrqFlags, OperatingFlags, Register, SI443X_DEVICE_VERSION,
    },
    switch::{NoRfSwitch, RfSwitch, RfSwitchMode},
    Error,
};

/// Version probes before giving up on the chip
const CHIP_PROBE_ATTEMPTS: u8 = 10;
/// SDN high time for a hardware reset
const RESET_PULSE_MS: u32 = 1;
/// Power-on time after SDN is released
const POWER_ON_MS: u32 = 100;
const PROBE_RETRY_MS: u32 = 10;

/// Si4430/31/32 packet radio
pub struct Si443x<SPI, SDN, IRQ, DELAY, RFS = NoRfSwitch> {
    device: Device<SPI>,
    sdn: SDN,
    irq: IRQ,
    delay: DELAY,
    rf_switch: RFS,

    mode: ChipMode,
    bit_rate: f32,
    frequency_deviation: f32,
    frequency: f32,
    shaping: DataShaping,
    crc_enabled: bool,
    packet_length_config: PacketLengthConfig,
    packet_length: usize,
    packet_length_queried: bool,
    /// Modulation source and GPIOs currently routed for direct mode
    direct_path: bool,
}

impl<SPI, SDN, IRQ, DELAY> Si443x<SPI, SDN, IRQ, DELAY, NoRfSwitch> {
    /// Driver for a board without an external RF switch.
    ///
    /// Nothing is sent to the chip until [`begin`](Self::begin).
    pub fn new(spi: SPI, sdn: SDN, irq: IRQ, delay: DELAY) -> Self {
        Self::with_rf_switch(spi, sdn, irq, delay, NoRfSwitch)
    }
}

impl<SPI, SDN, IRQ, DELAY, RFS> Si443x<SPI, SDN, IRQ, DELAY, RFS> {
    pub fn with_rf_switch(spi: SPI, sdn: SDN, irq: IRQ, delay: DELAY, rf_switch: RFS) -> Self {
        Self {
            device: Device::new(spi),
            sdn,
            irq,
            delay,
            rf_switch,
            mode: ChipMode::Standby,
            // Chip reset values
            bit_rate: 40.0,
            frequency_deviation: 20.0,
            frequency: 434.0,
            shaping: DataShaping::None,
            crc_enabled: true,
            packet_length_config: PacketLengthConfig::default(),
            packet_length: 0,
            packet_length_queried: false,
            direct_path: false,
        }
    }

    /// Releases the bus, pins, delay and switch.
    pub fn release(self) -> (SPI, SDN, IRQ, DELAY, RFS) {
        (
            self.device.release(),
            self.sdn,
            self.irq,
            self.delay,
            self.rf_switch,
        )
    }

    /// Raw register access, for settings the driver does not cover.
    ///
    /// Registers changed through this bypass the driver's cached state.
    pub fn device(&mut self) -> &mut Device<SPI> {
        &mut self.device
    }

    pub fn mode(&self) -> ChipMode {
        self.mode
    }

    /// Bit rate in kbps last accepted by [`set_bit_rate`](Self::set_bit_rate)
    pub fn bit_rate(&self) -> f32 {
        self.bit_rate
    }

    /// Frequency deviation in kHz last accepted by the driver
    pub fn frequency_deviation(&self) -> f32 {
        self.frequency_deviation
    }

    /// Carrier frequency in MHz last accepted by the driver
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn packet_length_config(&self) -> PacketLengthConfig {
        self.packet_length_config
    }

    /// Time allowed for [`transmit`](Self::transmit) of `length` bytes at the current bit rate
    pub fn tx_timeout_ms(&self, length: usize) -> u32 {
        crate::translate::tx_timeout_ms(length, self.bit_rate)
    }

    /// Time allowed for [`receive`](Self::receive) at the current bit rate
    pub fn rx_timeout_ms(&self) -> u32 {
        crate::translate::rx_timeout_ms(self.bit_rate)
    }

    fn ensure_idle(&self) -> Result<(), Error> {
        if self.mode.is_busy() {
            #[cfg(feature = "defmt")]
            defmt::warn!("rejected while {}", self.mode);
            return Err(Error::Busy);
        }
        Ok(())
    }
}

impl<SPI, SDN, IRQ, DELAY, RFS> Si443x<SPI, SDN, IRQ, DELAY, RFS>
where
    SPI: embedded_hal::spi::SpiDevice,
    SDN: OutputPin,
    DELAY: DelayNs,
    RFS: RfSwitch,
{
    /// Resets the chip and applies `config`.
    ///
    /// The chip is power cycled through SDN and probed until its version
    /// register answers, then software reset and configured from scratch.
    /// Leaves the chip in standby.
    pub fn begin(&mut self, config: &RadioConfig) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("begin({})", config);

        self.sdn.set_low().map_err(|_| Error::Pin)?;
        self.find_chip()?;

        self.device.write(
            Register::OperatingControl1,
            OperatingFlags::SOFTWARE_RESET.bits(),
        )?;
        self.mode = ChipMode::Standby;
        self.direct_path = false;
        self.clear_irq_flags()?;

        self.configure_defaults()?;
        self.set_frequency_deviation(config.frequency_deviation_khz)?;
        self.set_bit_rate(config.bit_rate_kbps)?;
        self.set_rx_bandwidth(config.rx_bandwidth_khz)?;
        self.set_preamble_length(config.preamble_length_bits)?;
        self.set_sync_word(&config.sync_word)?;
        self.packet_mode()?;
        self.set_data_shaping(config.shaping)?;
        self.set_encoding(config.encoding)?;
        self.set_crc(config.crc_enabled, config.crc_variant)?;
        match config.packet_length {
            PacketLengthConfig::Fixed(len) => self.fixed_packet_length_mode(len)?,
            PacketLengthConfig::Variable(max) => self.variable_packet_length_mode(max)?,
        }
        self.set_frequency(config.frequency_mhz)?;
        self.set_output_power(config.output_power_dbm)?;

        #[cfg(feature = "defmt")]
        defmt::info!("Si443x configured");
        Ok(())
    }

    /// Power cycles the chip through the SDN pin.
    ///
    /// Every register returns to its reset value; call [`begin`](Self::begin) again afterwards.
    pub fn reset(&mut self) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("reset()");

        self.sdn.set_high().map_err(|_| Error::Pin)?;
        self.delay.delay_ms(RESET_PULSE_MS);
        self.sdn.set_low().map_err(|_| Error::Pin)?;
        self.delay.delay_ms(POWER_ON_MS);

        self.mode = ChipMode::Standby;
        self.direct_path = false;
        self.packet_length_queried = false;
        Ok(())
    }

    fn find_chip(&mut self) -> Result<(), Error> {
        for _attempt in 1..=CHIP_PROBE_ATTEMPTS {
            self.reset()?;

            match self.device.read_register::<DeviceVersion>() {
                Ok(found) if found.version == SI443X_DEVICE_VERSION => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("Si443x found on attempt {}", _attempt);
                    return Ok(());
                }
                Ok(_found) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "Si443x not found ({} of {}), version {=u8:#x}",
                        _attempt,
                        CHIP_PROBE_ATTEMPTS,
                        _found.version
                    );
                }
                Err(_) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Si443x probe {} failed on the bus", _attempt);
                }
            }

            self.delay.delay_ms(PROBE_RETRY_MS);
        }

        #[cfg(feature = "defmt")]
        defmt::error!("no Si443x found");
        Err(Error::ChipNotFound)
    }
}

impl<SPI, SDN, IRQ, DELAY, RFS> Si443x<SPI, SDN, IRQ, DELAY, RFS>
where
    SPI: embedded_hal::spi::SpiDevice,
    RFS: RfSwitch,
{
    /// Silicon version code, valid in any mode
    pub fn chip_version(&mut self) -> Result<u8, Error> {
        let found: DeviceVersion = self.device.read_register()?;
        Ok(found.version)
    }

    /// Reads and clears every latched interrupt flag.
    pub fn irq_flags(&mut self) -> Result<IrqFlags, Error> {
        let status: InterruptStatus = self.device.read_register()?;
        Ok(status.flags)
    }

    pub fn clear_irq_flags(&mut self) -> Result<(), Error> {
        self.irq_flags().map(|_| ())
    }

    /// Received signal strength, in the chip's 0.5 dB steps
    pub fn rssi(&mut self) -> Result<u8, Error> {
        Ok(self.device.read(Register::Rssi)?)
    }

    fn set_rf_switch(&mut self, mode: RfSwitchMode) -> Result<(), Error> {
        self.rf_switch.set_mode(mode).map_err(|_| Error::Pin)
    }

    /// Forces standby after a failed operation and returns `err`.
    fn abort<T>(&mut self, err: Error) -> Result<T, Error> {
        #[cfg(feature = "defmt")]
        defmt::warn!("aborting: {}", err);

        let _ = self.standby();
        Err(err)
    }
}
