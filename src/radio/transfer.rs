//! Packet transmission and reception
//!
//! A transfer is split into a start step that loads the FIFO and arms the
//! interrupt, a wait for nIRQ, and a completion step. The blocking and async
//! faces only differ in how they wait.

use embassy_futures::select::{select, Either};
use embedded_hal::{delay::DelayNs, digital::InputPin};
use embedded_hal_async::{delay::DelayNs as AsyncDelayNs, digital::Wait};

use crate::{
    config::{ChipMode, PacketLengthConfig},
    registers::*,
    switch::{RfSwitch, RfSwitchMode},
    translate, Error,
};

use super::Si443x;

/// nIRQ polling period for the blocking transfers
const POLL_INTERVAL_US: u32 = 100;

impl<SPI, SDN, IRQ, DELAY, RFS> Si443x<SPI, SDN, IRQ, DELAY, RFS>
where
    SPI: embedded_hal::spi::SpiDevice,
    RFS: RfSwitch,
{
    /// Loads `data` into the FIFO and starts transmitting.
    ///
    /// nIRQ goes low once the packet is sent; call
    /// [`finish_transmit`](Self::finish_transmit) afterwards.
    pub fn start_transmit(&mut self, data: &[u8]) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("start_transmit({=usize} bytes)", data.len());

        if data.len() > self.packet_length_config.max_payload() {
            return Err(Error::PacketTooLong);
        }
        self.ensure_idle()?;

        match self.load_transmit(data) {
            Ok(()) => Ok(()),
            Err(err) => self.abort(err),
        }
    }

    fn load_transmit(&mut self, data: &[u8]) -> Result<(), Error> {
        self.standby()?;
        if self.direct_path {
            self.packet_mode()?;
        }

        self.pulse_fifo_clear(TX_FIFO_CLEAR_BIT)?;
        self.clear_irq_flags()?;

        if let PacketLengthConfig::Variable(_) = self.packet_length_config {
            self.device
                .write(Register::TransmitPacketLength, data.len() as u8)?;
        }
        if !data.is_empty() {
            self.device.write_burst(Register::FifoAccess, data)?;
        }

        self.set_rf_switch(RfSwitchMode::Tx)?;
        self.device.write_register(InterruptEnable {
            sources: IrqFlags::PACKET_SENT,
        })?;
        self.device.write(
            Register::OperatingControl1,
            (OperatingFlags::TX_ON | OperatingFlags::XTAL_ON).bits(),
        )?;
        self.mode = ChipMode::Tx;
        Ok(())
    }

    /// Clears the interrupt flags and returns to standby after a transmission.
    pub fn finish_transmit(&mut self) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("finish_transmit()");

        self.clear_irq_flags()?;
        self.standby()
    }

    /// Starts listening for a packet.
    ///
    /// nIRQ goes low when a valid packet arrived, or a corrupted one with the
    /// CRC enabled; fetch it with [`read_data`](Self::read_data).
    pub fn start_receive(&mut self) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("start_receive()");

        self.ensure_idle()?;

        match self.arm_receive() {
            Ok(()) => Ok(()),
            Err(err) => self.abort(err),
        }
    }

    fn arm_receive(&mut self) -> Result<(), Error> {
        self.standby()?;
        if self.direct_path {
            self.packet_mode()?;
        }

        self.pulse_fifo_clear(RX_FIFO_CLEAR_BIT)?;
        self.clear_irq_flags()?;

        self.set_rf_switch(RfSwitchMode::Rx)?;
        let mut sources = IrqFlags::VALID_PACKET_RECEIVED;
        if self.crc_enabled {
            sources |= IrqFlags::CRC_ERROR;
        }
        self.device.write_register(InterruptEnable { sources })?;
        self.device.write(
            Register::OperatingControl1,
            (OperatingFlags::RX_ON | OperatingFlags::XTAL_ON).bits(),
        )?;
        self.mode = ChipMode::Rx;
        Ok(())
    }

    /// Copies the received packet into `buffer` and returns to standby.
    ///
    /// Returns the number of bytes copied. A packet longer than `buffer` is
    /// truncated and the rest discarded.
    pub fn read_data(&mut self, buffer: &mut [u8]) -> Result<usize, Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("read_data({=usize})", buffer.len());

        match self.unload_receive(buffer) {
            Ok(count) => Ok(count),
            Err(err) => {
                self.packet_length_queried = false;
                self.abort(err)
            }
        }
    }

    fn unload_receive(&mut self, buffer: &mut [u8]) -> Result<usize, Error> {
        let flags = self.irq_flags()?;
        if flags.contains(IrqFlags::CRC_ERROR) {
            return Err(Error::CrcMismatch);
        }

        let length = self.packet_length(true)?.min(MAX_PACKET_LENGTH);
        let count = length.min(buffer.len());
        if count > 0 {
            self.device
                .read_burst(Register::FifoAccess, &mut buffer[..count])?;
        }
        for _ in count..length {
            self.device.read(Register::FifoAccess)?;
        }

        self.packet_length_queried = false;
        self.standby()?;
        self.clear_irq_flags()?;
        Ok(count)
    }

    /// Length of the last received packet.
    ///
    /// With `update` set the length register is read once per packet: the
    /// programmed length in fixed mode, the received length byte otherwise.
    pub fn packet_length(&mut self, update: bool) -> Result<usize, Error> {
        if !self.packet_length_queried && update {
            let register = match self.packet_length_config {
                PacketLengthConfig::Fixed(_) => Register::TransmitPacketLength,
                PacketLengthConfig::Variable(_) => Register::ReceivedPacketLength,
            };
            self.packet_length = usize::from(self.device.read(register)?);
            self.packet_length_queried = true;
        }
        Ok(self.packet_length)
    }

    fn pulse_fifo_clear(&mut self, bit: u8) -> Result<(), Error> {
        self.device
            .modify_bits(Register::OperatingControl2, 1, bit, bit)?;
        self.device
            .modify_bits(Register::OperatingControl2, 0, bit, bit)?;
        Ok(())
    }

    fn complete_transmit(&mut self, fired: Result<bool, Error>) -> Result<(), Error> {
        match fired {
            Ok(true) => self.finish_transmit(),
            Ok(false) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("transmit timed out");

                self.finish_transmit()?;
                Err(Error::TxTimeout)
            }
            Err(err) => self.abort(err),
        }
    }

    fn complete_receive(&mut self, fired: Result<bool, Error>, buffer: &mut [u8]) -> Result<usize, Error> {
        match fired {
            Ok(true) => self.read_data(buffer),
            Ok(false) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("receive timed out");

                self.standby()?;
                self.clear_irq_flags()?;
                Err(Error::RxTimeout)
            }
            Err(err) => self.abort(err),
        }
    }
}

impl<SPI, SDN, IRQ, DELAY, RFS> Si443x<SPI, SDN, IRQ, DELAY, RFS>
where
    SPI: embedded_hal::spi::SpiDevice,
    IRQ: InputPin,
    DELAY: DelayNs,
    RFS: RfSwitch,
{
    /// Sends `data` and blocks until it is on air or the timeout expires.
    ///
    /// The timeout is five times the air time plus 5 ms, see
    /// [`tx_timeout_ms`](Self::tx_timeout_ms).
    pub fn transmit(&mut self, data: &[u8]) -> Result<(), Error> {
        let timeout_ms = translate::tx_timeout_ms(data.len(), self.bit_rate);
        self.start_transmit(data)?;

        let fired = self.poll_irq(timeout_ms);
        self.complete_transmit(fired)
    }

    /// Blocks until a packet arrives or the timeout expires, then copies it
    /// into `buffer`. Returns the number of bytes copied.
    pub fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, Error> {
        let timeout_ms = translate::rx_timeout_ms(self.bit_rate);
        self.start_receive()?;

        let fired = self.poll_irq(timeout_ms);
        self.complete_receive(fired, buffer)
    }

    /// Polls nIRQ until it goes low. Returns false on timeout.
    fn poll_irq(&mut self, timeout_ms: u32) -> Result<bool, Error> {
        let timeout_us = timeout_ms.saturating_mul(1000);
        let mut elapsed_us: u32 = 0;

        while self.irq.is_high().map_err(|_| Error::Pin)? {
            if elapsed_us > timeout_us {
                return Ok(false);
            }
            self.delay.delay_us(POLL_INTERVAL_US);
            elapsed_us = elapsed_us.saturating_add(POLL_INTERVAL_US);
        }
        Ok(true)
    }
}

impl<SPI, SDN, IRQ, DELAY, RFS> Si443x<SPI, SDN, IRQ, DELAY, RFS>
where
    SPI: embedded_hal::spi::SpiDevice,
    IRQ: Wait,
    DELAY: AsyncDelayNs,
    RFS: RfSwitch,
{
    /// Async [`transmit`](Self::transmit): awaits the nIRQ edge instead of polling.
    pub async fn transmit_async(&mut self, data: &[u8]) -> Result<(), Error> {
        let timeout_ms = translate::tx_timeout_ms(data.len(), self.bit_rate);
        self.start_transmit(data)?;

        let fired = self.wait_irq(timeout_ms).await;
        self.complete_transmit(fired)
    }

    /// Async [`receive`](Self::receive).
    pub async fn receive_async(&mut self, buffer: &mut [u8]) -> Result<usize, Error> {
        let timeout_ms = translate::rx_timeout_ms(self.bit_rate);
        self.start_receive()?;

        let fired = self.wait_irq(timeout_ms).await;
        self.complete_receive(fired, buffer)
    }

    async fn wait_irq(&mut self, timeout_ms: u32) -> Result<bool, Error> {
        let timeout = AsyncDelayNs::delay_ms(&mut self.delay, timeout_ms);
        match select(self.irq.wait_for_low(), timeout).await {
            Either::First(level) => level.map(|()| true).map_err(|_| Error::Pin),
            Either::Second(()) => Ok(false),
        }
    }
}
