//! Direct mode bit streaming
//!
//! In direct mode the chip samples transmit data from GPIO2 on every edge of
//! the data clock it drives on GPIO1, and presents demodulated receive data on
//! GPIO2 the same way. These helpers are meant to be called from the data
//! clock interrupt handler: one call per clock edge.

use embedded_hal::digital::{InputPin, OutputPin};

/// Feeds a byte slice to the transmit data pin, MSB first.
#[derive(Clone, Debug)]
pub struct DirectTransmitter<'a> {
    data: &'a [u8],
    /// Index of the next bit to send
    position: usize,
}

impl<'a> DirectTransmitter<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Next bit to transmit, `None` once every bit has been sent.
    pub fn next_bit(&mut self) -> Option<bool> {
        let byte = self.data.get(self.position / 8)?;
        let bit = byte & (0x80 >> (self.position % 8)) != 0;
        self.position += 1;
        Some(bit)
    }

    /// Drives the next bit onto `pin`.
    ///
    /// Returns `Ok(false)` without touching the pin when the data is exhausted.
    pub fn write_bit<P: OutputPin>(&mut self, pin: &mut P) -> Result<bool, P::Error> {
        match self.next_bit() {
            Some(true) => pin.set_high().map(|()| true),
            Some(false) => pin.set_low().map(|()| true),
            None => Ok(false),
        }
    }

    pub fn is_done(&self) -> bool {
        self.position >= self.data.len() * 8
    }
}

/// Assembles bits sampled from the receive data pin into bytes, MSB first.
///
/// Completed bytes are queued; once `N` bytes are waiting the oldest is dropped.
#[derive(Clone, Debug, Default)]
pub struct DirectReceiver<const N: usize> {
    bytes: heapless::Deque<u8, N>,
    /// Bits collected for the byte in progress
    shift: u8,
    /// Number of valid bits in `shift`
    count: u8,
}

impl<const N: usize> DirectReceiver<N> {
    pub const fn new() -> Self {
        Self {
            bytes: heapless::Deque::new(),
            shift: 0,
            count: 0,
        }
    }

    /// Adds one bit. Returns true when it completed a byte.
    pub fn push_bit(&mut self, bit: bool) -> bool {
        self.shift = (self.shift << 1) | u8::from(bit);
        self.count += 1;
        if self.count < 8 {
            return false;
        }

        if self.bytes.is_full() {
            self.bytes.pop_front();
        }
        let _ = self.bytes.push_back(self.shift);
        self.shift = 0;
        self.count = 0;
        true
    }

    /// Samples `pin` and adds the bit.
    pub fn read_bit<P: InputPin>(&mut self, pin: &mut P) -> Result<bool, P::Error> {
        let bit = pin.is_high()?;
        Ok(self.push_bit(bit))
    }

    /// Oldest completed byte
    pub fn pop(&mut self) -> Option<u8> {
        self.bytes.pop_front()
    }

    /// Number of completed bytes waiting
    pub fn available(&self) -> usize {
        self.bytes.len()
    }

    /// Drops queued bytes and any partial byte
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.shift = 0;
        self.count = 0;
    }
}
