//! Simulated Si443x for driver tests
//!
//! Models the parts of the chip the driver relies on: the register file with
//! auto-incrementing bursts, the FIFOs, read-to-clear interrupt status and
//! the nIRQ level derived from status and enable registers.

#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    convert::Infallible,
    rc::Rc,
};

use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorType as PinErrorType, InputPin, OutputPin},
    spi::{ErrorType as SpiErrorType, Operation, SpiDevice},
};
use si443x::{RadioConfig, Si443x};

pub const STATUS_1: u8 = 0x03;
pub const STATUS_2: u8 = 0x04;
pub const ENABLE_1: u8 = 0x05;
pub const ENABLE_2: u8 = 0x06;
pub const OP_CONTROL_1: u8 = 0x07;
pub const OP_CONTROL_2: u8 = 0x08;
pub const FIFO: u8 = 0x7F;

const TX_ON: u8 = 0x08;
const RX_ON: u8 = 0x04;
const SOFTWARE_RESET: u8 = 0x80;

const PACKET_SENT: u16 = 0x0400;
const VALID_PACKET: u16 = 0x0200;
const CRC_ERROR: u16 = 0x0100;

/// What the simulated receiver picks up once the receiver is switched on
#[derive(Debug, Clone)]
pub enum Incoming {
    Packet(Vec<u8>),
    CorruptPacket(Vec<u8>),
}

pub struct Chip {
    pub regs: [u8; 128],
    pub tx_fifo: Vec<u8>,
    pub rx_fifo: VecDeque<u8>,
    /// Latched interrupt flags, `(status1 << 8) | status2`
    pub status: u16,
    /// Every byte written, with its register address
    pub writes: Vec<(u8, u8)>,
    /// Register address of every byte read
    pub reads: Vec<u8>,
    pub incoming: Option<Incoming>,
    /// nIRQ polls before a started transmission completes, `None` never completes
    pub tx_polls: Option<u32>,
    pub rssi: VecDeque<u8>,
}

fn reset_values() -> [u8; 128] {
    let mut regs = [0u8; 128];
    regs[0x00] = 0x08;
    regs[0x01] = 0x06;
    regs[0x07] = 0x01;
    regs[0x0B] = 0x00;
    regs[0x0C] = 0x00;
    regs[0x0D] = 0x00;
    regs[0x1C] = 0x01;
    regs[0x20..=0x25].copy_from_slice(&[0x64, 0x01, 0x47, 0xAE, 0x02, 0x8F]);
    regs[0x30] = 0x8D;
    regs[0x32] = 0x0C;
    regs[0x33] = 0x22;
    regs[0x34] = 0x08;
    regs[0x35] = 0x2A;
    regs[0x36..=0x39].copy_from_slice(&[0x2D, 0xD4, 0x00, 0x00]);
    regs[0x69] = 0x60;
    regs[0x6D] = 0x18;
    regs[0x6E] = 0x0A;
    regs[0x6F] = 0x3D;
    regs[0x70] = 0x0C;
    regs[0x71] = 0x00;
    regs[0x72] = 0x20;
    regs[0x75] = 0x75;
    regs[0x76] = 0xBB;
    regs[0x77] = 0x80;
    regs
}

impl Chip {
    fn new() -> Self {
        Self {
            regs: reset_values(),
            tx_fifo: Vec::new(),
            rx_fifo: VecDeque::new(),
            status: 0,
            writes: Vec::new(),
            reads: Vec::new(),
            incoming: None,
            tx_polls: Some(3),
            rssi: VecDeque::new(),
        }
    }

    fn write(&mut self, addr: u8, value: u8) {
        self.writes.push((addr, value));
        match addr {
            STATUS_1 | STATUS_2 => {}
            FIFO => self.tx_fifo.push(value),
            OP_CONTROL_1 if value & SOFTWARE_RESET != 0 => {
                let version = self.regs[0x01];
                self.regs = reset_values();
                self.regs[0x01] = version;
                self.tx_fifo.clear();
                self.rx_fifo.clear();
            }
            OP_CONTROL_1 => {
                self.regs[addr as usize] = value;
                if value & RX_ON != 0 {
                    self.start_receiver();
                }
            }
            OP_CONTROL_2 => {
                self.regs[addr as usize] = value;
                if value & 0x01 != 0 {
                    self.tx_fifo.clear();
                }
                if value & 0x02 != 0 {
                    self.rx_fifo.clear();
                }
            }
            _ => self.regs[addr as usize] = value,
        }
    }

    fn read(&mut self, addr: u8) -> u8 {
        self.reads.push(addr);
        match addr {
            STATUS_1 => {
                let value = (self.status >> 8) as u8;
                self.status &= 0x00FF;
                value
            }
            STATUS_2 => {
                let value = self.status as u8;
                self.status &= 0xFF00;
                value
            }
            FIFO => self.rx_fifo.pop_front().unwrap_or(0),
            0x26 => self.rssi.pop_front().unwrap_or(0),
            _ => self.regs[addr as usize],
        }
    }

    fn start_receiver(&mut self) {
        match self.incoming.take() {
            Some(Incoming::Packet(packet)) => {
                self.regs[0x4B] = packet.len() as u8;
                self.rx_fifo = packet.into();
                self.status |= VALID_PACKET;
            }
            Some(Incoming::CorruptPacket(packet)) => {
                self.regs[0x4B] = packet.len() as u8;
                self.rx_fifo = packet.into();
                self.status |= CRC_ERROR;
            }
            None => {}
        }
    }

    /// Advances the transmitter by one nIRQ poll and returns the line level.
    fn irq_level(&mut self) -> bool {
        if self.regs[OP_CONTROL_1 as usize] & TX_ON != 0 {
            match self.tx_polls {
                Some(0) => {
                    self.status |= PACKET_SENT;
                    self.regs[OP_CONTROL_1 as usize] &= !TX_ON;
                    self.tx_fifo.clear();
                }
                Some(polls) => self.tx_polls = Some(polls - 1),
                None => {}
            }
        }

        let enabled = u16::from_be_bytes([self.regs[ENABLE_1 as usize], self.regs[ENABLE_2 as usize]]);
        self.status & enabled == 0
    }

    pub fn reg(&self, addr: u8) -> u8 {
        self.regs[addr as usize]
    }

    /// Writes to `addr` recorded since `mark`
    pub fn writes_to(&self, addr: u8, mark: usize) -> Vec<u8> {
        self.writes[mark..]
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|(_, v)| *v)
            .collect()
    }
}

#[derive(Clone)]
pub struct FakeSpi(pub Rc<RefCell<Chip>>);

impl SpiErrorType for FakeSpi {
    type Error = Infallible;
}

impl SpiDevice for FakeSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
        let mut chip = self.0.borrow_mut();
        // (address, write)
        let mut cursor: Option<(u8, bool)> = None;

        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    for &byte in bytes.iter() {
                        match cursor {
                            None => cursor = Some((byte & 0x7F, byte & 0x80 != 0)),
                            Some((addr, true)) => {
                                chip.write(addr, byte);
                                cursor = Some((next(addr), true));
                            }
                            Some((_, false)) => {}
                        }
                    }
                }
                Operation::Read(buffer) => {
                    for slot in buffer.iter_mut() {
                        if let Some((addr, false)) = cursor {
                            *slot = chip.read(addr);
                            cursor = Some((next(addr), false));
                        }
                    }
                }
                Operation::DelayNs(_) => {}
                _ => unimplemented!("full duplex transfers are never used"),
            }
        }
        Ok(())
    }
}

fn next(addr: u8) -> u8 {
    if addr == FIFO {
        FIFO
    } else {
        addr + 1
    }
}

/// Shutdown pin, counts reset pulses
#[derive(Clone, Default)]
pub struct FakeSdn(pub Rc<Cell<u32>>);

impl PinErrorType for FakeSdn {
    type Error = Infallible;
}

impl OutputPin for FakeSdn {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.set(self.0.get() + 1);
        Ok(())
    }
}

/// nIRQ line of the simulated chip
#[derive(Clone)]
pub struct FakeIrq(pub Rc<RefCell<Chip>>);

impl PinErrorType for FakeIrq {
    type Error = Infallible;
}

impl InputPin for FakeIrq {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.borrow_mut().irq_level())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

impl embedded_hal_async::digital::Wait for FakeIrq {
    async fn wait_for_high(&mut self) -> Result<(), Infallible> {
        while !self.is_high()? {
            embassy_futures::yield_now().await;
        }
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), Infallible> {
        while self.is_high()? {
            embassy_futures::yield_now().await;
        }
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Infallible> {
        self.wait_for_low().await?;
        self.wait_for_high().await
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Infallible> {
        self.wait_for_high().await?;
        self.wait_for_low().await
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Infallible> {
        let level = self.is_high()?;
        while self.is_high()? == level {
            embassy_futures::yield_now().await;
        }
        Ok(())
    }
}

/// Delay that only advances a virtual clock
#[derive(Clone, Default)]
pub struct FakeDelay(pub Rc<Cell<u64>>);

impl FakeDelay {
    fn advance(&self, ns: u32) {
        self.0.set(self.0.get() + u64::from(ns));
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(ns);
    }
}

/// Advances the clock in 100 us slices, yielding after each so a racing
/// future gets polled in between.
impl embedded_hal_async::delay::DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        let mut remaining = ns;
        while remaining > 0 {
            let step = remaining.min(100_000);
            self.advance(step);
            remaining -= step;
            embassy_futures::yield_now().await;
        }
    }
}

pub type TestRadio = Si443x<FakeSpi, FakeSdn, FakeIrq, FakeDelay>;

pub struct Harness {
    pub chip: Rc<RefCell<Chip>>,
    pub resets: Rc<Cell<u32>>,
    pub clock_ns: Rc<Cell<u64>>,
}

impl Harness {
    pub fn chip(&self) -> std::cell::RefMut<'_, Chip> {
        self.chip.borrow_mut()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.clock_ns.get() / 1_000_000
    }
}

pub fn radio() -> (TestRadio, Harness) {
    let chip = Rc::new(RefCell::new(Chip::new()));
    let resets = Rc::new(Cell::new(0));
    let clock_ns = Rc::new(Cell::new(0));

    let radio = Si443x::new(
        FakeSpi(chip.clone()),
        FakeSdn(resets.clone()),
        FakeIrq(chip.clone()),
        FakeDelay(clock_ns.clone()),
    );

    (
        radio,
        Harness {
            chip,
            resets,
            clock_ns,
        },
    )
}

/// Radio initialised at 9.6 kbps, 5 kHz deviation, 10 kHz bandwidth, 4 bit preamble
pub fn started_radio() -> (TestRadio, Harness) {
    let (mut radio, harness) = radio();
    radio
        .begin(&RadioConfig::new(9.6, 5.0, 10.0, 4))
        .expect("begin");
    (radio, harness)
}
