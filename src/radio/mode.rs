//! Operating mode control: sleep, standby and the direct mode data path

use embedded_hal::delay::DelayNs;

use crate::{
    config::ChipMode,
    registers::*,
    switch::{RfSwitch, RfSwitchMode},
    translate, Error,
};

use super::{settings::modulation_type, Si443x};

/// Direct mode carrier overrides are given in 1/6400 MHz steps
const FRF_STEPS_PER_MHZ: f32 = 6400.0;
/// RSSI settling time before sampling noise for random bytes
const RSSI_SETTLE_MS: u32 = 10;

impl<SPI, SDN, IRQ, DELAY, RFS> Si443x<SPI, SDN, IRQ, DELAY, RFS>
where
    SPI: embedded_hal::spi::SpiDevice,
    RFS: RfSwitch,
{
    /// Enters standby (crystal running), aborting any transfer or stream.
    ///
    /// Valid in every mode.
    pub fn standby(&mut self) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("standby()");

        self.set_rf_switch(RfSwitchMode::Idle)?;
        self.device
            .write(Register::OperatingControl1, OperatingFlags::XTAL_ON.bits())?;
        self.mode = ChipMode::Standby;
        Ok(())
    }

    /// Enters sleep, with every interrupt source disabled.
    pub fn sleep(&mut self) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("sleep()");

        self.set_rf_switch(RfSwitchMode::Idle)?;
        self.device.write_register(InterruptEnable {
            sources: IrqFlags::empty(),
        })?;
        self.device.write(
            Register::OperatingControl1,
            OperatingFlags::WAKEUP_TIMER.bits(),
        )?;
        self.mode = ChipMode::Sleep;
        Ok(())
    }

    /// Routes modulation through the FIFO again after direct mode.
    ///
    /// Transfers call this themselves when needed.
    pub fn packet_mode(&mut self) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("packet_mode()");

        self.device.modify_bits(
            Register::ModulationControl2,
            modulation_type(self.shaping),
            1,
            0,
        )?;
        self.device
            .modify_bits(Register::ModulationControl2, DATA_SOURCE_FIFO, 5, 4)?;
        self.device
            .modify_bits(Register::Gpio1Config, GPIO_RX_STATE, 4, 0)?;
        self.direct_path = false;
        Ok(())
    }

    /// Starts transmitting the bit stream presented on GPIO2, clocked by GPIO1.
    ///
    /// With `frf` given the carrier is first retuned to `frf / 6400` MHz
    /// without leaving the current mode, so the call can also hop an active
    /// direct transmission.
    pub fn transmit_direct(&mut self, frf: Option<u32>) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("transmit_direct({})", frf);

        match frf {
            Some(frf) => {
                let mhz = frf as f32 / FRF_STEPS_PER_MHZ;
                translate::check_frequency(mhz)?;
                let code = translate::carrier_frequency(mhz);
                self.write_carrier(&code, Some(true))?;
            }
            None => {
                self.ensure_idle()?;
                self.standby()?;
            }
        }

        self.set_rf_switch(RfSwitchMode::Tx)?;
        self.direct_mode(GPIO_TX_DATA_IN)?;
        self.device.write(
            Register::OperatingControl1,
            (OperatingFlags::TX_ON | OperatingFlags::XTAL_ON).bits(),
        )?;
        self.mode = ChipMode::DirectTx;
        Ok(())
    }

    /// Starts receiving; demodulated bits appear on GPIO2, clocked by GPIO1.
    pub fn receive_direct(&mut self) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("receive_direct()");

        self.ensure_idle()?;
        self.standby()?;

        self.set_rf_switch(RfSwitchMode::Rx)?;
        self.direct_mode(GPIO_RX_DATA_OUT)?;
        self.device.write(
            Register::OperatingControl1,
            (OperatingFlags::RX_ON | OperatingFlags::XTAL_ON).bits(),
        )?;
        self.mode = ChipMode::DirectRx;
        Ok(())
    }

    fn direct_mode(&mut self, data_pin_function: u8) -> Result<(), Error> {
        self.device.modify_bits(
            Register::ModulationControl2,
            DATA_SOURCE_DIRECT_GPIO,
            5,
            4,
        )?;
        self.device
            .modify_bits(Register::Gpio1Config, GPIO_DATA_CLK_OUT, 4, 0)?;
        self.device
            .modify_bits(Register::Gpio2Config, data_pin_function, 4, 0)?;
        self.device
            .modify_bits(Register::ModulationControl2, MODULATION_FSK, 1, 0)?;
        self.direct_path = true;
        Ok(())
    }
}

impl<SPI, SDN, IRQ, DELAY, RFS> Si443x<SPI, SDN, IRQ, DELAY, RFS>
where
    SPI: embedded_hal::spi::SpiDevice,
    DELAY: DelayNs,
    RFS: RfSwitch,
{
    /// Builds a byte from the least significant bit of eight RSSI samples.
    ///
    /// The receiver runs briefly with no signal expected; the chip is left in standby.
    pub fn random_byte(&mut self) -> Result<u8, Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("random_byte()");

        self.ensure_idle()?;
        match self.sample_noise() {
            Ok(byte) => {
                self.standby()?;
                Ok(byte)
            }
            Err(err) => self.abort(err),
        }
    }

    fn sample_noise(&mut self) -> Result<u8, Error> {
        self.device.write(
            Register::OperatingControl1,
            (OperatingFlags::RX_ON | OperatingFlags::XTAL_ON).bits(),
        )?;
        self.mode = ChipMode::Rx;
        self.delay.delay_ms(RSSI_SETTLE_MS);

        let mut byte = 0;
        for bit in 0..8 {
            byte |= (self.device.read(Register::Rssi)? & 0x01) << bit;
        }
        Ok(byte)
    }
}
