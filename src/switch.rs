//! RF switch control
//!
//! Boards with a separate antenna switch (or external PA/LNA) need it set
//! before the chip starts transmitting or receiving. The driver calls
//! [`RfSwitch::set_mode`] on every state change.

use embedded_hal::digital::OutputPin;

/// Antenna path requested by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RfSwitchMode {
    Idle,
    Rx,
    Tx,
}

/// External RF switch
pub trait RfSwitch {
    type Error;

    fn set_mode(&mut self, mode: RfSwitchMode) -> Result<(), Self::Error>;
}

/// No external switch fitted
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRfSwitch;

impl RfSwitch for NoRfSwitch {
    type Error = core::convert::Infallible;

    fn set_mode(&mut self, _mode: RfSwitchMode) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Two-pin switch: one enable line for the receive path, one for the transmit path
pub struct RfSwitchPins<RX, TX> {
    rx_enable: RX,
    tx_enable: TX,
}

impl<RX, TX> RfSwitchPins<RX, TX> {
    pub fn new(rx_enable: RX, tx_enable: TX) -> Self {
        Self {
            rx_enable,
            tx_enable,
        }
    }

    pub fn release(self) -> (RX, TX) {
        (self.rx_enable, self.tx_enable)
    }
}

impl<RX, TX, E> RfSwitch for RfSwitchPins<RX, TX>
where
    RX: OutputPin<Error = E>,
    TX: OutputPin<Error = E>,
{
    type Error = E;

    fn set_mode(&mut self, mode: RfSwitchMode) -> Result<(), E> {
        // Break before make
        match mode {
            RfSwitchMode::Idle => {
                self.rx_enable.set_low()?;
                self.tx_enable.set_low()
            }
            RfSwitchMode::Rx => {
                self.tx_enable.set_low()?;
                self.rx_enable.set_high()
            }
            RfSwitchMode::Tx => {
                self.rx_enable.set_low()?;
                self.tx_enable.set_high()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use std::{cell::RefCell, rc::Rc, vec::Vec};

    struct Pin {
        name: &'static str,
        log: Rc<RefCell<Vec<(&'static str, bool)>>>,
    }

    impl embedded_hal::digital::ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push((self.name, false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push((self.name, true));
            Ok(())
        }
    }

    #[test]
    fn opposite_path_released_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut switch = RfSwitchPins::new(
            Pin {
                name: "rx",
                log: log.clone(),
            },
            Pin {
                name: "tx",
                log: log.clone(),
            },
        );

        switch.set_mode(RfSwitchMode::Tx).unwrap();
        switch.set_mode(RfSwitchMode::Rx).unwrap();
        switch.set_mode(RfSwitchMode::Idle).unwrap();

        assert_eq!(
            *log.borrow(),
            [
                ("rx", false),
                ("tx", true),
                ("tx", false),
                ("rx", true),
                ("rx", false),
                ("tx", false),
            ]
        );
    }
}
